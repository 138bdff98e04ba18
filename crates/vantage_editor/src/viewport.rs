use glam::Vec2;
use vantage_core::math::{clp2, pixel_to_ndc};

/// Rectangular window area the 3D view renders into.
///
/// The widget draws nothing itself.  It tracks focus so the host knows when
/// a click landed in the 3D view and maps window pixels to normalised
/// device coordinates for picking and gizmo rays.
#[derive(Debug, Clone)]
pub struct ViewportWidget {
    /// `[x, y, width, height]` in window pixels, origin top-left.
    pub rect: [f32; 4],
    pub focused: bool,
}

impl ViewportWidget {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: [x, y, w, h],
            focused: false,
        }
    }

    pub fn hit(&self, mx: f64, my: f64) -> bool {
        let x = mx as f32;
        let y = my as f32;
        x >= self.rect[0]
            && x <= self.rect[0] + self.rect[2]
            && y >= self.rect[1]
            && y <= self.rect[1] + self.rect[3]
    }

    pub fn mouse_input(&mut self, mx: f64, my: f64, pressed: bool) {
        if pressed {
            self.focused = self.hit(mx, my);
        }
    }

    pub fn set_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.rect = [x, y, w, h];
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.rect[2], self.rect[3])
    }

    /// Width over height; `1.0` for a collapsed viewport.
    pub fn aspect(&self) -> f32 {
        if self.rect[2] > 0.0 && self.rect[3] > 0.0 {
            self.rect[2] / self.rect[3]
        } else {
            1.0
        }
    }

    /// Power-of-two size of an offscreen target that can hold the viewport.
    pub fn backing_size(&self) -> (u32, u32) {
        let w = self.rect[2].max(1.0).ceil() as u32;
        let h = self.rect[3].max(1.0).ceil() as u32;
        (clp2(w), clp2(h))
    }

    /// Window pixel → NDC, `None` outside the viewport.
    pub fn to_ndc(&self, mx: f64, my: f64) -> Option<Vec2> {
        let local = Vec2::new(mx as f32 - self.rect[0], my as f32 - self.rect[1]);
        pixel_to_ndc(local, self.size())
    }
}
