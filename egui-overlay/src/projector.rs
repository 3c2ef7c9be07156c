//! World to screen projection

use glam::{Mat4, Vec2, Vec3};

const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// View-projection matrix plus the viewport it maps onto
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    view_proj: Mat4,
    viewport: Vec2,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec2::ONE)
    }
}

impl Projector {
    pub fn new(view_proj: Mat4, viewport: Vec2) -> Self {
        Self {
            view_proj,
            viewport,
        }
    }

    /// Right-handed perspective camera looking from `eye` at `target`
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_radians: f32, viewport: Vec2) -> Self {
        let aspect = if viewport.y > 0.0 {
            viewport.x / viewport.y
        } else {
            1.0
        };
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(fov_y_radians, aspect, NEAR, FAR);
        Self::new(proj * view, viewport)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Screen pixels of `world`, top-left origin
    ///
    /// `None` behind the camera or outside the view volume.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    /// Approximate on-screen size of a world-space radius at `center`
    pub fn project_radius(&self, center: Vec3, radius: f32) -> Option<f32> {
        let a = self.project(center)?;
        let b = self.project(center + Vec3::Y * radius)?;
        Some(a.distance(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Projector {
        Projector::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_2,
            Vec2::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_target_projects_to_center() {
        let screen = camera().project(Vec3::ZERO);
        let Some(screen) = screen else {
            panic!("target should be visible");
        };
        assert!((screen - Vec2::new(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn test_up_is_screen_up() {
        let projector = camera();
        let center = projector.project(Vec3::ZERO);
        let above = projector.project(Vec3::new(0.0, 1.0, 0.0));
        assert!(matches!((center, above), (Some(c), Some(a)) if a.y < c.y));
    }

    #[test]
    fn test_behind_camera_is_none() {
        assert_eq!(camera().project(Vec3::new(0.0, 0.0, 10.0)), None);
    }

    #[test]
    fn test_outside_frustum_is_none() {
        assert_eq!(camera().project(Vec3::new(100.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_project_radius_shrinks_with_distance() {
        let projector = camera();
        let near = projector.project_radius(Vec3::new(0.0, 0.0, 2.0), 0.1);
        let far = projector.project_radius(Vec3::new(0.0, 0.0, -20.0), 0.1);
        assert!(matches!((near, far), (Some(n), Some(f)) if n > f));
    }
}
