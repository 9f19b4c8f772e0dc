//! Orthographic 3D camera for the viewport.

use horizon_types::Vec3;

pub const DEFAULT_ELEVATION: f64 = 30.0;
pub const DEFAULT_AZIMUTH: f64 = -60.0;
pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 8.0;
const ZOOM_STEP: f64 = 1.25;
const MAX_ELEVATION: f64 = 90.0;

/// A point in view space. `x` grows rightward, `y` upward, and larger `depth`
/// is closer to the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Degrees above the disk plane.
    elevation: f64,
    /// Degrees around the z axis, in (-180, 180].
    azimuth: f64,
    zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            elevation: DEFAULT_ELEVATION,
            azimuth: DEFAULT_AZIMUTH,
            zoom: 1.0,
        }
    }
}

impl Camera {
    #[must_use]
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    #[must_use]
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotate(&mut self, degrees: f64) {
        let mut azimuth = (self.azimuth + degrees) % 360.0;
        if azimuth > 180.0 {
            azimuth -= 360.0;
        } else if azimuth <= -180.0 {
            azimuth += 360.0;
        }
        self.azimuth = azimuth;
    }

    pub fn tilt(&mut self, degrees: f64) {
        self.elevation = (self.elevation + degrees).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Project a world point. Coordinates are in world units scaled by zoom.
    #[must_use]
    pub fn project(&self, p: Vec3) -> Projected {
        let (sin_a, cos_a) = self.azimuth.to_radians().sin_cos();
        let (sin_e, cos_e) = self.elevation.to_radians().sin_cos();

        let right = Vec3::new(-sin_a, cos_a, 0.0);
        let up = Vec3::new(-sin_e * cos_a, -sin_e * sin_a, cos_e);
        let toward_eye = Vec3::new(cos_e * cos_a, cos_e * sin_a, sin_e);

        Projected {
            x: p.dot(right) * self.zoom,
            y: p.dot(up) * self.zoom,
            depth: p.dot(toward_eye),
        }
    }
}

#[cfg(test)]
mod tests {
    use horizon_types::Vec3;

    use super::{Camera, DEFAULT_AZIMUTH, DEFAULT_ELEVATION, MAX_ZOOM, MIN_ZOOM};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn side_view_maps_y_right_and_z_up() {
        let mut camera = Camera::default();
        camera.tilt(-DEFAULT_ELEVATION);
        camera.rotate(-DEFAULT_AZIMUTH);
        assert_eq!(camera.azimuth(), 0.0);

        let p = camera.project(Vec3::new(3.0, 1.0, 2.0));
        assert!(close(p.x, 1.0));
        assert!(close(p.y, 2.0));
        assert!(close(p.depth, 3.0));
    }

    #[test]
    fn top_down_view_ignores_height() {
        let mut camera = Camera::default();
        camera.tilt(180.0);
        assert_eq!(camera.elevation(), 90.0);
        let a = camera.project(Vec3::new(1.0, 2.0, 0.0));
        let b = camera.project(Vec3::new(1.0, 2.0, 5.0));
        assert!(close(a.x, b.x));
        assert!(close(a.y, b.y));
        assert!(b.depth > a.depth);
    }

    #[test]
    fn projection_preserves_length_at_unit_zoom() {
        let camera = Camera::default();
        let v = Vec3::new(0.3, -1.2, 0.7);
        let p = camera.project(v);
        let len = (p.x * p.x + p.y * p.y + p.depth * p.depth).sqrt();
        assert!(close(len, v.norm()));
    }

    #[test]
    fn azimuth_wraps_and_zoom_clamps() {
        let mut camera = Camera::default();
        camera.rotate(270.0);
        assert!(close(camera.azimuth(), -150.0));
        camera.rotate(-60.0);
        assert!(close(camera.azimuth(), 150.0));

        for _ in 0..40 {
            camera.zoom_in();
        }
        assert_eq!(camera.zoom(), MAX_ZOOM);
        for _ in 0..40 {
            camera.zoom_out();
        }
        assert_eq!(camera.zoom(), MIN_ZOOM);

        camera.reset();
        assert_eq!(camera, Camera::default());
    }
}
