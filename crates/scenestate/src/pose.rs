use bytemuck::{Pod, Zeroable};

/// Pointer x values outside this range clamp to the nearest bound before
/// any derived value is computed.
pub const STRIP_X_MIN: f32 = 50.0;
pub const STRIP_X_MAX: f32 = 270.0;

/// Float indices inside the uploaded pose vector.
pub const POSE_TRANSLATE: usize = 0;
pub const POSE_ROTATE: usize = 1;
pub const POSE_FOCUS: usize = 2;

/// Strip pose the film kernel reads every frame: translate scrolls the
/// strip, rotate tilts it, focus selects the highlighted cell. Uploaded as
/// a 16-byte uniform; the fourth float is layout padding only.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilmPose {
    pub translate: f32,
    pub rotate: f32,
    pub focus: f32,
    pad: f32,
}

unsafe impl Zeroable for FilmPose {}
unsafe impl Pod for FilmPose {}

impl FilmPose {
    /// Derives the pose from raw pointer coordinates. `x` is clamped into
    /// [`STRIP_X_MIN`, `STRIP_X_MAX`] and normalized over that span, so
    /// the two bounds map to the rest and fully-advanced poses exactly.
    pub fn from_pointer(x: f32, y: f32) -> Self {
        let clamped = x.clamp(STRIP_X_MIN, STRIP_X_MAX);
        let anim = (clamped - STRIP_X_MIN) / (STRIP_X_MAX - STRIP_X_MIN);
        Self {
            translate: 2.0 * anim + 0.5,
            rotate: anim * 40.0,
            focus: y / 16.0 - 10.0,
            pad: 0.0,
        }
    }

    /// Pose uploaded at the end of scene setup, before any pointer input.
    pub fn initial() -> Self {
        Self::from_pointer(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_pose(pose: FilmPose, translate: f32, rotate: f32, focus: f32) {
        assert!((pose.translate - translate).abs() < 1e-6, "translate {}", pose.translate);
        assert!((pose.rotate - rotate).abs() < 1e-6, "rotate {}", pose.rotate);
        assert!((pose.focus - focus).abs() < 1e-6, "focus {}", pose.focus);
    }

    #[test]
    fn rest_position_at_lower_bound() {
        assert_pose(FilmPose::from_pointer(50.0, 0.0), 0.5, 0.0, -10.0);
    }

    #[test]
    fn below_range_clamps_to_lower_bound() {
        assert_eq!(
            FilmPose::from_pointer(10.0, 42.0),
            FilmPose::from_pointer(50.0, 42.0)
        );
    }

    #[test]
    fn above_range_clamps_to_upper_bound() {
        assert_pose(FilmPose::from_pointer(320.0, 160.0), 2.5, 40.0, 0.0);
    }

    #[test]
    fn upper_bound_reaches_full_advance() {
        assert_pose(FilmPose::from_pointer(270.0, 160.0), 2.5, 40.0, 0.0);
    }

    #[test]
    fn initial_pose_matches_origin_pointer() {
        assert_pose(FilmPose::initial(), 0.5, 0.0, -10.0);
    }

    #[test]
    fn pose_uploads_as_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<FilmPose>(), 16);
        let pose = FilmPose::from_pointer(50.0, 0.0);
        let bytes = bytemuck::bytes_of(&pose);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(floats[POSE_TRANSLATE], 0.5);
        assert_eq!(floats[POSE_ROTATE], 0.0);
        assert_eq!(floats[POSE_FOCUS], -10.0);
    }
}
