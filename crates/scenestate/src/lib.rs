//! Host-side scene state for the film and grass demos: the flat numeric
//! buffers handed to the kernel modules (pose, strip state, blade records,
//! frame state, matrix block), the generators that fill them, and the slot
//! tables that name every kernel binding. No GPU types here; the renderer
//! uploads these records verbatim.

pub mod blades;
pub mod matrix;
pub mod pose;
pub mod slots;
pub mod strip;

pub use blades::{blade_rng, generate_blades, BladeRecord, FrameState, BLADE_COUNT, BLADE_FLOATS};
pub use matrix::{frustum, MatrixBlock, MODEL_OFFSET, PROJECTION_OFFSET, TEXTURE_OFFSET};
pub use pose::{FilmPose, POSE_FOCUS, POSE_ROTATE, POSE_TRANSLATE, STRIP_X_MAX, STRIP_X_MIN};
pub use slots::{film_slot_table, grass_slot_table};
pub use strip::{StripGeometry, StripState, StripVertex, LAST_FOCUS_UNSET, TRIANGLES_PER_CELL};
