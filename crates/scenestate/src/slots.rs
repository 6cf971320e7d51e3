//! Slot numbering shared between the host and the kernel modules.
//!
//! The numbers are a versioned ABI: kernels address buffers by bind group 0
//! binding index, and a silent renumbering would not fail loudly anywhere.
//! Every slot therefore also carries a symbolic name, and the layouts, bind
//! groups, and regression tests all read the same tables below.

/// Film bind group 0.
pub const FILM_SLOT_TEXTURE_IDS: u32 = 0;
pub const FILM_SLOT_POSE: u32 = 1;
pub const FILM_SLOT_STRIP_STATE: u32 = 2;
pub const FILM_SLOT_MATRICES: u32 = 3;
pub const FILM_SLOT_TRIANGLE_OFFSETS: u32 = 4;
pub const FILM_SLOT_TEXTURE_OFFSETS: u32 = 5;

/// Grass bind group 0. Slots 0..=2 are the historical contract; slot 3
/// carries the ortho transform that fixed-function vertex state used to
/// hold outside the numbered slots.
pub const GRASS_SLOT_FRAME_STATE: u32 = 0;
pub const GRASS_SLOT_TEXTURE_IDS: u32 = 1;
pub const GRASS_SLOT_BLADES: u32 = 2;
pub const GRASS_SLOT_MATRICES: u32 = 3;

/// Slot table for the film kernel, in binding order.
pub fn film_slot_table() -> &'static [(u32, &'static str)] {
    &[
        (FILM_SLOT_TEXTURE_IDS, "texture_ids"),
        (FILM_SLOT_POSE, "pose"),
        (FILM_SLOT_STRIP_STATE, "strip_state"),
        (FILM_SLOT_MATRICES, "matrices"),
        (FILM_SLOT_TRIANGLE_OFFSETS, "triangle_offsets"),
        (FILM_SLOT_TEXTURE_OFFSETS, "texture_offsets"),
    ]
}

/// Slot table for the grass kernels, in binding order.
pub fn grass_slot_table() -> &'static [(u32, &'static str)] {
    &[
        (GRASS_SLOT_FRAME_STATE, "frame_state"),
        (GRASS_SLOT_TEXTURE_IDS, "texture_ids"),
        (GRASS_SLOT_BLADES, "blades"),
        (GRASS_SLOT_MATRICES, "matrices"),
    ]
}
