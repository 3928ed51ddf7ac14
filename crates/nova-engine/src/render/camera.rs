use glam::{Affine2, Mat4, Vec2, Vec4};
use rand::Rng;

use crate::coords::Viewport;
use crate::math::{NodeId, TransformTree};

use super::batch::SceneView;

const DEFAULT_NEAR: f32 = -1.0;
const DEFAULT_FAR: f32 = 1.0;

#[derive(Debug, Copy, Clone, Default, PartialEq)]
struct Shake {
    magnitude: f32,
    duration: f32,
    timer: f32,
}

/// Orthographic 2D camera.
///
/// The camera sits at the centre of its viewport, so world coordinates
/// equal pixel coordinates with the origin bottom-left and +Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    viewport: Viewport,
    resizable: bool,
    near: f32,
    far: f32,
    position: Vec2,
    rotation: f32,
    projection: Mat4,
    shake: Option<Shake>,
    shake_offset: Vec2,
}

impl Camera {
    pub fn new(viewport: Viewport) -> Self {
        let mut camera = Self {
            viewport,
            resizable: true,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            position: Vec2::ZERO,
            rotation: 0.0,
            projection: Mat4::IDENTITY,
            shake: None,
            shake_offset: Vec2::ZERO,
        };
        camera.set_viewport(viewport);
        camera
    }

    /// A camera that ignores window resizes.
    pub fn fixed(viewport: Viewport) -> Self {
        Self {
            resizable: false,
            ..Self::new(viewport)
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Recentres the camera and rebuilds the projection.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.position = viewport.center();
        self.rebuild_projection();
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn set_resizable(&mut self, resizable: bool) {
        self.resizable = resizable;
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        if self.resizable {
            self.set_viewport(Viewport::from_size(width as f32, height as f32));
        }
    }

    pub fn near_clip(&self) -> f32 {
        self.near
    }

    pub fn far_clip(&self) -> f32 {
        self.far
    }

    pub fn set_depth_clip(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.rebuild_projection();
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    #[inline]
    pub fn rotation_radians(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation_radians(&mut self, radians: f32) {
        self.rotation = radians;
    }

    /// Moves the camera onto the world pose of `node`.
    ///
    /// Call once per frame to parent the camera under something in the tree.
    pub fn follow(&mut self, tree: &mut TransformTree, node: NodeId) {
        self.position = tree.world_position(node);
        self.rotation = tree.world_rotation_radians(node);
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Inverse of the camera transform, translated by the current shake.
    pub fn view_matrix(&self) -> Mat4 {
        let mut view = Affine2::from_angle_translation(self.rotation, self.position).inverse();
        view.translation += self.shake_offset;
        affine_to_mat4(view)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// What the renderers need from the camera for one scene.
    pub fn scene_view(&self) -> SceneView {
        SceneView {
            view_projection: self.view_projection_matrix(),
            viewport: self.viewport,
        }
    }

    /// Starts a shake of `magnitude` pixels that decays to nothing over `duration` seconds.
    pub fn shake(&mut self, magnitude: f32, duration: f32) {
        self.shake = Some(Shake {
            magnitude,
            duration,
            timer: 0.0,
        });
        self.shake_offset = Vec2::ZERO;
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    #[inline]
    pub fn shake_offset(&self) -> Vec2 {
        self.shake_offset
    }

    /// Advances the shake timer.
    pub fn update(&mut self, dt: f32) {
        self.update_with(dt, &mut rand::thread_rng());
    }

    pub(crate) fn update_with(&mut self, dt: f32, rng: &mut impl Rng) {
        let Some(shake) = self.shake.as_mut() else {
            return;
        };

        shake.timer += dt;
        if shake.timer >= shake.duration {
            self.shake = None;
            self.shake_offset = Vec2::ZERO;
            return;
        }

        let progress = shake.timer / shake.duration;
        let magnitude = shake.magnitude * (1.0 - progress * progress);
        self.shake_offset = Vec2::new(
            rng.gen_range(-1.0..=1.0) * magnitude,
            rng.gen_range(-1.0..=1.0) * magnitude,
        );
    }

    fn rebuild_projection(&mut self) {
        let (w, h) = (self.viewport.width, self.viewport.height);
        self.projection = Mat4::orthographic_rh(-w / 2.0, w / 2.0, -h / 2.0, h / 2.0, self.near, self.far);
    }
}

fn affine_to_mat4(a: Affine2) -> Mat4 {
    Mat4::from_cols(
        a.matrix2.x_axis.extend(0.0).extend(0.0),
        a.matrix2.y_axis.extend(0.0).extend(0.0),
        Vec4::Z,
        a.translation.extend(0.0).extend(1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn camera() -> Camera {
        Camera::new(Viewport::from_size(800.0, 600.0))
    }

    fn to_ndc(camera: &Camera, world: Vec2) -> Vec2 {
        let clip = camera.view_projection_matrix() * world.extend(0.0).extend(1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn camera_centres_on_viewport() {
        let cam = camera();
        assert_eq!(cam.position(), Vec2::new(400.0, 300.0));
        assert!(to_ndc(&cam, Vec2::new(400.0, 300.0)).length() < 1e-6);
    }

    #[test]
    fn viewport_corners_map_to_ndc_corners() {
        let cam = camera();
        let bl = to_ndc(&cam, Vec2::ZERO);
        let tr = to_ndc(&cam, Vec2::new(800.0, 600.0));
        assert!((bl - Vec2::new(-1.0, -1.0)).length() < 1e-5);
        assert!((tr - Vec2::new(1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn fixed_camera_ignores_resize() {
        let mut cam = Camera::fixed(Viewport::from_size(800.0, 600.0));
        cam.on_resize(100, 100);
        assert_eq!(cam.viewport(), Viewport::from_size(800.0, 600.0));

        let mut cam = camera();
        cam.on_resize(100, 50);
        assert_eq!(cam.viewport(), Viewport::from_size(100.0, 50.0));
        assert_eq!(cam.position(), Vec2::new(50.0, 25.0));
    }

    #[test]
    fn follow_takes_the_node_world_pose() {
        let mut tree = TransformTree::new();
        let rig = tree.create_at(Vec2::new(100.0, 50.0));
        let mount = tree.create_at(Vec2::new(20.0, 0.0));
        tree.attach_to(mount, Some(rig)).unwrap();
        tree.set_rotation_radians(rig, std::f32::consts::FRAC_PI_2);

        let mut cam = camera();
        cam.follow(&mut tree, mount);
        assert!((cam.position() - Vec2::new(100.0, 70.0)).length() < 1e-4);
        assert!((cam.rotation_radians() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(to_ndc(&cam, Vec2::new(100.0, 70.0)).length() < 1e-5);
    }

    // ── shake ─────────────────────────────────────────────────────────────

    #[test]
    fn shake_offset_stays_within_decayed_magnitude() {
        let mut cam = camera();
        let mut rng = StepRng::new(u64::MAX / 3, 7919);
        cam.shake(10.0, 1.0);

        cam.update_with(0.5, &mut rng);
        let limit = 10.0 * (1.0 - 0.25);
        assert!(cam.shake_offset().x.abs() <= limit);
        assert!(cam.shake_offset().y.abs() <= limit);
        assert!(cam.is_shaking());
    }

    #[test]
    fn shake_ends_exactly_at_duration() {
        let mut cam = camera();
        cam.shake(25.0, 0.5);
        cam.update(0.2);
        cam.update(0.3);
        assert_eq!(cam.shake_offset(), Vec2::ZERO);
        assert!(!cam.is_shaking());

        cam.update(0.1);
        assert_eq!(cam.shake_offset(), Vec2::ZERO);
    }

    #[test]
    fn shake_moves_view_not_camera() {
        let mut cam = camera();
        let mut rng = StepRng::new(u64::MAX, 0);
        let still = cam.view_matrix();
        cam.shake(5.0, 1.0);
        cam.update_with(0.1, &mut rng);

        assert_eq!(cam.position(), Vec2::new(400.0, 300.0));
        let moved = cam.view_matrix();
        let delta = moved.w_axis.truncate().truncate() - still.w_axis.truncate().truncate();
        assert!((delta - cam.shake_offset()).length() < 1e-3);
    }
}
