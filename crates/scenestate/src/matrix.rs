use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Float offsets of the three matrices inside the block.
pub const MODEL_OFFSET: usize = 0;
pub const PROJECTION_OFFSET: usize = 16;
pub const TEXTURE_OFFSET: usize = 32;

/// Matrix block bound to the kernels: model, projection, and texture
/// matrices packed as 48 floats at fixed offsets. The host writes it at
/// setup and again on resize; kernels only read it and keep transient
/// transforms in registers.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixBlock {
    pub model: [f32; 16],
    pub projection: [f32; 16],
    pub texture: [f32; 16],
}

unsafe impl Zeroable for MatrixBlock {}
unsafe impl Pod for MatrixBlock {}

impl MatrixBlock {
    pub fn identity() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array(),
            projection: Mat4::IDENTITY.to_cols_array(),
            texture: Mat4::IDENTITY.to_cols_array(),
        }
    }

    /// Normalized perspective for the film strip: an aspect-corrected
    /// frustum multiplied by a 180-degree y rotation, a (-2, 2, 1) scale,
    /// and a (0, 0, 2) translate, so the shorter surface axis spans
    /// [-1, 1] at the strip's resting depth.
    pub fn projection_normalized(width: f32, height: f32) -> Self {
        let frustum = if width >= height {
            let aspect = width / height;
            frustum(-aspect, aspect, -1.0, 1.0, 1.0, 100.0)
        } else {
            let aspect = height / width;
            frustum(-1.0, 1.0, -aspect, aspect, 1.0, 100.0)
        };
        let projection = frustum
            * Mat4::from_rotation_y(std::f32::consts::PI)
            * Mat4::from_scale(Vec3::new(-2.0, 2.0, 1.0))
            * Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0));
        Self {
            projection: projection.to_cols_array(),
            ..Self::identity()
        }
    }

    /// Window-space ortho for the grass scene: pixel (0, 0) in the top
    /// left, (width, height) bottom right.
    pub fn ortho_window(width: f32, height: f32) -> Self {
        let projection = Mat4::orthographic_rh_gl(0.0, width, height, 0.0, -1.0, 1.0);
        Self {
            projection: projection.to_cols_array(),
            ..Self::identity()
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.projection)
    }
}

/// GL-convention perspective frustum.
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let x = 2.0 * near / (right - left);
    let y = 2.0 * near / (top - bottom);
    let a = (right + left) / (right - left);
    let b = (top + bottom) / (top - bottom);
    let c = -(far + near) / (far - near);
    let d = -2.0 * far * near / (far - near);
    Mat4::from_cols(
        Vec4::new(x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y, 0.0, 0.0),
        Vec4::new(a, b, c, -1.0),
        Vec4::new(0.0, 0.0, d, 0.0),
    )
}
