// Headless driver: builds a scene from the config, culls it through the
// canvas camera and replays a scripted gizmo session on one visible cube.

use std::sync::Arc;

use anyhow::Context;
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vantage_core::math::restrict_angle;
use vantage_core::{ElementKind, GizmoAxis, GizmoOutcome, Handle, KeyCode, TransformType, World};
use vantage_editor::config::SceneConfig;
use vantage_editor::{logging, Canvas3D, EditorConfig};

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EditorConfig::load(&path).with_context(|| format!("loading config '{path}'"))?,
        None => EditorConfig::default(),
    };
    logging::init(config.log.level_filter()?).context("installing logger")?;
    log::info!("{} ({}x{})", config.window.title, config.window.width, config.window.height);

    let mut world = World::with_bounds(config.scene.bounds());
    populate(&mut world, &config.scene);

    let mut canvas = Canvas3D::from_config(&config);
    let (bw, bh) = canvas.viewport().backing_size();
    log::info!("offscreen target {}x{}", bw, bh);

    let visible = canvas.visible(&world);
    log::info!("{} of {} elements visible", visible.len(), world.len());

    let Some(target) = nearest_cube(&canvas, &world, &visible) else {
        log::warn!("no cube in view; nothing to drag");
        return Ok(());
    };

    drag(&mut canvas, &mut world, target, TransformType::Translate, GizmoAxis::X, 6.0);
    drag(&mut canvas, &mut world, target, TransformType::Scale, GizmoAxis::All, 4.0);
    drag(&mut canvas, &mut world, target, TransformType::Rotate, GizmoAxis::Y, 5.0);

    if let Some(e) = world.get(target) {
        let o = &e.object;
        let z = o.orientation().z_axis;
        let yaw = z.x.atan2(z.z).to_degrees();
        log::info!(
            "'{}' ends at {} scale {} yaw {:.1}°",
            e.name,
            o.position(),
            o.scale_factor(),
            restrict_angle(yaw)
        );
        log::info!("aabb {:?}", o.aabb());
    }
    Ok(())
}

/// Seeded cube scatter plus a light and a mesh.
fn populate(world: &mut World, scene: &SceneConfig) {
    let mut rng = StdRng::seed_from_u64(scene.seed);
    let b = scene.bounds();
    for i in 0..scene.scatter_count {
        let pos = Vec3::new(
            rng.gen_range(b.min.x..b.max.x),
            rng.gen_range(b.min.y..b.max.y),
            rng.gen_range(b.min.z..b.max.z),
        );
        let yaw = rng.gen_range(0.0..std::f32::consts::TAU);
        world
            .spawn(format!("Cube {i}"))
            .with_kind(ElementKind::Cube { half_extent: 0.5 })
            .with_position(pos)
            .with_orientation(Mat4::from_rotation_y(yaw))
            .with_scale(Vec3::splat(rng.gen_range(0.5..2.0)))
            .with_tag("prop")
            .build();
    }

    world
        .spawn("Key Light")
        .with_kind(ElementKind::PointLight { radius: 15.0 })
        .with_position(Vec3::new(0.0, 8.0, 0.0))
        .build();

    let pyramid: Arc<[Vec3]> = vec![
        Vec3::new(-1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(0.0, 1.5, 0.0),
    ]
    .into();
    world
        .spawn("Pyramid")
        .with_kind(ElementKind::Mesh { vertices: pyramid })
        .build();

    for h in world.iter_with_handles().map(|(h, _)| h).collect::<Vec<_>>() {
        world.constrain_position(h);
    }
    log::info!(
        "scene holds {} elements ({} props)",
        world.len(),
        world.iter_tagged("prop").count()
    );
}

/// Visible cube closest to the middle of the screen.
fn nearest_cube(canvas: &Canvas3D, world: &World, visible: &[Handle]) -> Option<Handle> {
    let vp = canvas.camera().view_projection_matrix();
    visible
        .iter()
        .filter_map(|&h| {
            let e = world.get(h)?;
            if !matches!(e.kind, ElementKind::Cube { .. }) {
                return None;
            }
            let ndc = vp.project_point3(e.object.position());
            Some((ndc.truncate().length(), h))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, h)| h)
}

/// Window pixel the element's centre projects to.
fn screen_position(canvas: &Canvas3D, world: &World, h: Handle) -> Option<(f64, f64)> {
    let p = world.position(h)?;
    let ndc = canvas.camera().view_projection_matrix().project_point3(p);
    let [x, y, w, hgt] = canvas.viewport().rect;
    Some((
        (x + (ndc.x + 1.0) * 0.5 * w) as f64,
        (y + (1.0 - ndc.y) * 0.5 * hgt) as f64,
    ))
}

/// Press on the element, move right in `step`-pixel increments, release.
fn drag(canvas: &mut Canvas3D, world: &mut World, h: Handle, mode: TransformType, axis: GizmoAxis, step: f64) {
    canvas.set_mode(mode);
    canvas.set_axis(axis);
    let Some((mut mx, my)) = screen_position(canvas, world, h) else {
        return;
    };

    if canvas.mouse_input(world, mx, my, true) != Some(h) {
        log::warn!("{:?} is hidden behind another element; skipping {:?}", h, mode);
        canvas.mouse_input(world, mx, my, false);
        return;
    }

    let mut applied = 0;
    for _ in 0..8 {
        match canvas.mouse_move(world, mx, my) {
            GizmoOutcome::Translated(_) | GizmoOutcome::Scaled(_) | GizmoOutcome::Rotated(_) => applied += 1,
            GizmoOutcome::Lost => break,
            _ => {}
        }
        mx += step;
    }
    canvas.mouse_input(world, mx, my, false);
    canvas.keyboard_input(KeyCode::Escape, true);
    canvas.keyboard_input(KeyCode::Escape, false);
    canvas.end_frame();
    log::info!("{:?} along {:?}: {} updates", mode, axis, applied);
}
