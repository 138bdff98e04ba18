use glam::{Vec2, Vec3};
use vantage_core::{
    Camera, GizmoAxis, GizmoOutcome, GizmoSession, GizmoSettings, Handle, InputState, KeyCode,
    MouseButton, TransformType, World,
};

use crate::config::EditorConfig;
use crate::viewport::ViewportWidget;

/// The 3D view: a camera looking into a [`World`] through a viewport, plus
/// the gizmo session that turns mouse drags into object transforms.
///
/// The canvas does not own the world; every call that touches elements
/// takes it explicitly and resolves the selected handle again.
pub struct Canvas3D {
    camera: Camera,
    viewport: ViewportWidget,
    input: InputState,
    session: GizmoSession,
    settings: GizmoSettings,
    /// mode and axis picked from the keyboard; survive a lost session
    mode: TransformType,
    axis: GizmoAxis,
    selection: Option<Handle>,
    last_cursor: Option<(f64, f64)>,
}

impl Canvas3D {
    /// The camera should already have its pose; the frustum is derived here.
    pub fn new(camera: Camera, viewport: ViewportWidget, settings: GizmoSettings) -> Self {
        let mut canvas = Self {
            camera,
            viewport,
            input: InputState::new(),
            session: GizmoSession::new(),
            settings,
            mode: TransformType::Translate,
            axis: GizmoAxis::X,
            selection: None,
            last_cursor: None,
        };
        canvas.session.set_axis(canvas.axis);
        canvas.session.set_transform_type(canvas.mode);
        let aspect = canvas.viewport.aspect();
        canvas.camera.set_aspect(aspect);
        canvas.camera.recalculate_projection_volume();
        canvas
    }

    /// Full-window canvas set up from the `[window]`, `[camera]` and
    /// `[gizmo]` sections.
    pub fn from_config(cfg: &EditorConfig) -> Self {
        let (w, h) = (cfg.window.width as f32, cfg.window.height as f32);
        let viewport = ViewportWidget::new(0.0, 0.0, w, h);
        let mut camera = Camera::new(cfg.camera.projection(viewport.aspect()));
        camera.object_mut().set_position(Vec3::from(cfg.camera.position));
        camera.object_mut().look_at(Vec3::from(cfg.camera.look_at));
        Self::new(camera, viewport, GizmoSettings::from(&cfg.gizmo))
    }

    // ── Layout ────────────────────────────────────────────────────────────

    pub fn resize(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.viewport.set_rect(x, y, w, h);
        self.camera.set_aspect(self.viewport.aspect());
        self.camera.recalculate_projection_volume();
        log::debug!("canvas resized to {}x{}", w, h);
    }

    /// Move the camera and refresh the frustum.
    pub fn set_camera_pose(&mut self, position: Vec3, target: Vec3) {
        let object = self.camera.object_mut();
        object.set_position(position);
        object.look_at(target);
        self.camera.recalculate_projection_volume();
    }

    // ── Input ─────────────────────────────────────────────────────────────

    /// `T`/`R`/`S` pick the mode, `X`/`Y`/`Z`/`A` the axis, `Escape` drops
    /// the selection.
    pub fn keyboard_input(&mut self, key: KeyCode, pressed: bool) {
        self.input.update_key(key, pressed);
        if !self.input.just_pressed(key) {
            return;
        }

        match key {
            KeyCode::KeyT => self.set_mode(TransformType::Translate),
            KeyCode::KeyR => self.set_mode(TransformType::Rotate),
            KeyCode::KeyS => self.set_mode(TransformType::Scale),
            KeyCode::KeyX => self.set_axis(GizmoAxis::X),
            KeyCode::KeyY => self.set_axis(GizmoAxis::Y),
            KeyCode::KeyZ => self.set_axis(GizmoAxis::Z),
            KeyCode::KeyA => self.set_axis(GizmoAxis::All),
            KeyCode::Escape => {
                self.selection = None;
                self.session.release();
            }
            _ => {}
        }
    }

    pub fn set_mode(&mut self, mode: TransformType) {
        self.mode = mode;
        self.session.set_transform_type(mode);
    }

    pub fn set_axis(&mut self, axis: GizmoAxis) {
        self.axis = axis;
        self.session.set_axis(axis);
    }

    /// Left button.  A press inside the viewport picks the element under
    /// the cursor and arms the gizmo on it; a release disarms.
    pub fn mouse_input(&mut self, world: &World, mx: f64, my: f64, pressed: bool) -> Option<Handle> {
        self.viewport.mouse_input(mx, my, pressed);
        self.input.update_mouse_button(MouseButton::Left, pressed);
        self.input.set_mouse_position(mx, my);
        self.last_cursor = Some((mx, my));

        if !pressed {
            self.session.release();
            return self.selection;
        }
        if !self.viewport.focused {
            return self.selection;
        }

        let picked = self
            .viewport
            .to_ndc(mx, my)
            .and_then(|ndc| world.pick(&self.camera.pick_ray(ndc)));
        self.selection = picked;
        match picked {
            Some(handle) => {
                self.session.set_axis(self.axis);
                self.session.begin(handle, self.mode);
            }
            None => self.session.release(),
        }
        picked
    }

    /// Cursor moved.  While the button is held over an armed target, the
    /// gizmo transforms it and translated or scaled elements are pulled
    /// back inside the scene bounds.  Moves outside the viewport are
    /// ignored, and the drag primes again once the cursor is back.
    pub fn mouse_move(&mut self, world: &mut World, mx: f64, my: f64) -> GizmoOutcome {
        self.input.set_mouse_position(mx, my);
        let rel = match self.last_cursor.replace((mx, my)) {
            Some((lx, ly)) => Vec2::new((mx - lx) as f32, (my - ly) as f32),
            None => Vec2::ZERO,
        };

        if !self.input.is_button_down(MouseButton::Left) {
            return GizmoOutcome::Idle;
        }
        let Some(target) = self.session.target() else {
            return GizmoOutcome::Idle;
        };
        let Some(ndc) = self.viewport.to_ndc(mx, my) else {
            self.session.reset_ray();
            return GizmoOutcome::Idle;
        };
        let Some(element) = world.get_mut(target) else {
            log::warn!("gizmo target {:?} no longer exists", target);
            self.session.release();
            self.selection = None;
            return GizmoOutcome::Lost;
        };

        let outcome = self
            .session
            .drag(&self.camera, &mut element.object, ndc, rel, &self.settings);
        if matches!(outcome, GizmoOutcome::Translated(_) | GizmoOutcome::Scaled(_)) {
            world.constrain_position(target);
        }
        log::trace!("drag {:?} -> {:?}", target, outcome);
        outcome
    }

    /// Clear per-frame input edges.
    pub fn end_frame(&mut self) {
        self.input.end_frame();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Elements that pass frustum culling this frame.
    pub fn visible(&self, world: &World) -> Vec<Handle> {
        world.cull(&self.camera)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> &ViewportWidget {
        &self.viewport
    }

    pub fn session(&self) -> &GizmoSession {
        &self.session
    }

    pub fn selection(&self) -> Option<Handle> {
        self.selection
    }

    pub fn mode(&self) -> TransformType {
        self.mode
    }

    pub fn axis(&self) -> GizmoAxis {
        self.axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::{BoundingBox, Projection};

    fn setup() -> (Canvas3D, World, Handle) {
        let mut world = World::with_bounds(BoundingBox::new(Vec3::splat(-10.0), Vec3::splat(10.0)));
        let cube = world.spawn_cube("Crate", Vec3::new(0.0, 0.0, -5.0));
        let camera = Camera::new(Projection::perspective(90.0, 1.0, 0.1, 100.0));
        let canvas = Canvas3D::new(
            camera,
            ViewportWidget::new(0.0, 0.0, 200.0, 200.0),
            GizmoSettings::default(),
        );
        (canvas, world, cube)
    }

    #[test]
    fn keys_pick_mode_and_axis() {
        let (mut canvas, _, _) = setup();
        assert_eq!(canvas.mode(), TransformType::Translate);
        assert_eq!(canvas.axis(), GizmoAxis::X);

        canvas.keyboard_input(KeyCode::KeyR, true);
        canvas.keyboard_input(KeyCode::KeyR, false);
        canvas.keyboard_input(KeyCode::KeyZ, true);
        assert_eq!(canvas.mode(), TransformType::Rotate);
        assert_eq!(canvas.axis(), GizmoAxis::Z);
        assert_eq!(canvas.session().transform_type(), TransformType::Rotate);

        canvas.keyboard_input(KeyCode::KeyA, true);
        assert_eq!(canvas.axis(), GizmoAxis::All);
        canvas.keyboard_input(KeyCode::KeyS, true);
        assert_eq!(canvas.mode(), TransformType::Scale);
    }

    #[test]
    fn click_picks_and_drag_translates_within_bounds() {
        let (mut canvas, mut world, cube) = setup();

        assert_eq!(canvas.mouse_input(&world, 100.0, 100.0, true), Some(cube));
        assert_eq!(canvas.selection(), Some(cube));
        assert!(canvas.session().is_active());

        assert_eq!(canvas.mouse_move(&mut world, 100.0, 100.0), GizmoOutcome::Primed);
        let out = canvas.mouse_move(&mut world, 110.0, 100.0);
        assert!(matches!(out, GizmoOutcome::Translated(d) if d.x > 90.0));

        // pushed ~99.5 units along x, then clamped to the scene box
        let p = world.position(cube).unwrap();
        assert!(p.abs_diff_eq(Vec3::new(9.5, 0.0, -5.0), 1e-4), "{p}");

        canvas.mouse_input(&world, 110.0, 100.0, false);
        assert!(canvas.session().target().is_none());
        assert_eq!(canvas.selection(), Some(cube));
        assert_eq!(canvas.mouse_move(&mut world, 120.0, 100.0), GizmoOutcome::Idle);
    }

    #[test]
    fn click_on_empty_space_clears_selection() {
        let (mut canvas, world, cube) = setup();
        canvas.mouse_input(&world, 100.0, 100.0, true);
        canvas.mouse_input(&world, 100.0, 100.0, false);
        assert_eq!(canvas.selection(), Some(cube));

        assert_eq!(canvas.mouse_input(&world, 5.0, 5.0, true), None);
        assert_eq!(canvas.selection(), None);
        assert!(!canvas.session().is_active());
    }

    #[test]
    fn orthographic_click_picks_under_cursor() {
        let mut world = World::new();
        let cube = world.spawn_cube("Crate", Vec3::new(2.5, 0.0, -10.0));
        let camera = Camera::new(Projection::orthographic(10.0, 1.0, 0.1, 100.0));
        let mut canvas = Canvas3D::new(
            camera,
            ViewportWidget::new(0.0, 0.0, 200.0, 200.0),
            GizmoSettings::default(),
        );
        // (2.5, 0) is NDC (0.5, 0), i.e. pixel (150, 100)
        assert_eq!(canvas.mouse_input(&world, 150.0, 100.0, true), Some(cube));
        canvas.mouse_input(&world, 150.0, 100.0, false);
        assert_eq!(canvas.mouse_input(&world, 50.0, 100.0, true), None);
    }

    #[test]
    fn leaving_viewport_reprimes_drag() {
        let (mut canvas, mut world, cube) = setup();
        canvas.mouse_input(&world, 100.0, 100.0, true);
        assert_eq!(canvas.mouse_move(&mut world, 100.0, 100.0), GizmoOutcome::Primed);

        assert_eq!(canvas.mouse_move(&mut world, 250.0, 100.0), GizmoOutcome::Idle);
        assert_eq!(canvas.session().last_ray_direction(), Vec3::ZERO);

        // coming back in does not replay the motion made outside
        assert_eq!(canvas.mouse_move(&mut world, 190.0, 100.0), GizmoOutcome::Primed);
        assert_eq!(world.position(cube), Some(Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn despawned_target_is_lost() {
        let (mut canvas, mut world, cube) = setup();
        canvas.mouse_input(&world, 100.0, 100.0, true);
        world.despawn(cube);
        assert_eq!(canvas.mouse_move(&mut world, 105.0, 100.0), GizmoOutcome::Lost);
        assert_eq!(canvas.selection(), None);
    }

    #[test]
    fn escape_drops_selection() {
        let (mut canvas, world, _) = setup();
        canvas.mouse_input(&world, 100.0, 100.0, true);
        canvas.keyboard_input(KeyCode::Escape, true);
        assert_eq!(canvas.selection(), None);
        assert!(canvas.session().target().is_none());
    }

    #[test]
    fn resize_updates_aspect_and_culling() {
        let (mut canvas, mut world, cube) = setup();
        let side = world.spawn_cube("Side", Vec3::new(8.0, 0.0, -5.0));
        let visible = canvas.visible(&world);
        assert!(visible.contains(&cube));
        assert!(!visible.contains(&side));

        // a 4:1 viewport widens the horizontal field of view
        canvas.resize(0.0, 0.0, 800.0, 200.0);
        assert_eq!(canvas.camera().projection().aspect(), 4.0);
        assert!(canvas.visible(&world).contains(&side));
    }

    #[test]
    fn built_from_config() {
        let cfg = EditorConfig::from_toml_str(
            "[window]\nwidth = 400\nheight = 200\n[camera]\nposition = [0.0, 0.0, 10.0]\n",
        )
        .unwrap();
        let canvas = Canvas3D::from_config(&cfg);
        assert_eq!(canvas.viewport().size(), Vec2::new(400.0, 200.0));
        assert_eq!(canvas.camera().projection().aspect(), 2.0);
        assert!(canvas.camera().object().direction().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }
}
