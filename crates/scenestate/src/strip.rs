use bytemuck::{Pod, Zeroable};

/// Integer indices inside the strip state buffer.
pub const STATE_TRIANGLE_OFFSET_COUNT: usize = 0;
pub const STATE_LAST_FOCUS: usize = 1;

/// Sentinel stored in `last_focus` until the kernel picks a cell.
pub const LAST_FOCUS_UNSET: i32 = -1;

/// Rows of quads in each image cell of the strip mesh.
pub const ROWS_PER_CELL: u32 = 4;
/// Triangles contributed by one image cell.
pub const TRIANGLES_PER_CELL: u32 = ROWS_PER_CELL * 2;

/// Two-word state buffer handed to the film kernel at setup. The host
/// writes it once; after bind the kernel owns it and records the focused
/// cell in `last_focus`.
#[repr(C, align(8))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripState {
    pub triangle_offset_count: i32,
    pub last_focus: i32,
}

unsafe impl Zeroable for StripState {}
unsafe impl Pod for StripState {}

impl StripState {
    pub fn new(triangle_offset_count: i32) -> Self {
        Self {
            triangle_offset_count,
            last_focus: LAST_FOCUS_UNSET,
        }
    }
}

/// One strip mesh vertex: position in strip space plus a cell-local uv.
/// The y coordinate counts cells, so the kernel can curl the strip as a
/// function of it without knowing the tessellation density.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

unsafe impl Zeroable for StripVertex {}
unsafe impl Pod for StripVertex {}

/// Film strip mesh and the two offset tables the kernel consumes. Each of
/// the `cells` image cells is a one-quad-wide column of [`ROWS_PER_CELL`]
/// quads; cells do not share vertices because every cell maps its own
/// texture. `triangle_offsets[i]` is the triangle index where cell `i`
/// starts, with one trailing end sentinel; `texture_offsets[i]` is the
/// matching strip-space coordinate.
#[derive(Debug, Clone)]
pub struct StripGeometry {
    pub vertices: Vec<StripVertex>,
    pub indices: Vec<u32>,
    pub triangle_offsets: Vec<i32>,
    pub texture_offsets: Vec<f32>,
}

impl StripGeometry {
    pub fn generate(cells: u32) -> Self {
        let mut vertices = Vec::with_capacity((cells * (ROWS_PER_CELL + 1) * 2) as usize);
        let mut indices = Vec::with_capacity((cells * TRIANGLES_PER_CELL * 3) as usize);
        let mut triangle_offsets = Vec::with_capacity(cells as usize + 1);
        let mut texture_offsets = Vec::with_capacity(cells as usize + 1);

        for cell in 0..cells {
            triangle_offsets.push((cell * TRIANGLES_PER_CELL) as i32);
            texture_offsets.push(cell as f32);

            let base = vertices.len() as u32;
            for row in 0..=ROWS_PER_CELL {
                let v = row as f32 / ROWS_PER_CELL as f32;
                for col in 0..2u32 {
                    vertices.push(StripVertex {
                        position: [col as f32 - 0.5, cell as f32 + v, 0.0],
                        uv: [col as f32, v],
                    });
                }
            }
            for row in 0..ROWS_PER_CELL {
                let v00 = base + row * 2;
                let v10 = v00 + 1;
                let v01 = v00 + 2;
                let v11 = v00 + 3;
                indices.extend_from_slice(&[v00, v10, v11, v00, v11, v01]);
            }
        }
        triangle_offsets.push((cells * TRIANGLES_PER_CELL) as i32);
        texture_offsets.push(cells as f32);

        Self {
            vertices,
            indices,
            triangle_offsets,
            texture_offsets,
        }
    }

    /// Number of image cells in the strip.
    pub fn cells(&self) -> u32 {
        (self.triangle_offsets.len() - 1) as u32
    }

    /// Index-buffer range covering one cell, for the per-cell draw.
    pub fn cell_index_range(&self, cell: u32) -> std::ops::Range<u32> {
        let start = self.triangle_offsets[cell as usize] as u32 * 3;
        let end = self.triangle_offsets[cell as usize + 1] as u32 * 3;
        start..end
    }

    /// State buffer matching this geometry.
    pub fn strip_state(&self) -> StripState {
        StripState::new(self.triangle_offsets.len() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_cell_strip_shapes() {
        let geometry = StripGeometry::generate(13);
        assert_eq!(geometry.cells(), 13);
        assert_eq!(geometry.triangle_offsets.len(), 14);
        assert_eq!(geometry.texture_offsets.len(), 14);
        assert_eq!(geometry.vertices.len(), 13 * 10);
        assert_eq!(geometry.indices.len(), 13 * 8 * 3);
        assert_eq!(*geometry.triangle_offsets.last().unwrap(), 13 * 8);
    }

    #[test]
    fn offsets_step_by_one_cell() {
        let geometry = StripGeometry::generate(13);
        for (i, window) in geometry.triangle_offsets.windows(2).enumerate() {
            assert_eq!(window[1] - window[0], TRIANGLES_PER_CELL as i32);
            assert_eq!(geometry.texture_offsets[i], i as f32);
        }
    }

    #[test]
    fn cell_ranges_tile_the_index_buffer() {
        let geometry = StripGeometry::generate(13);
        let mut cursor = 0;
        for cell in 0..geometry.cells() {
            let range = geometry.cell_index_range(cell);
            assert_eq!(range.start, cursor);
            cursor = range.end;
        }
        assert_eq!(cursor as usize, geometry.indices.len());
    }

    #[test]
    fn vertices_stay_in_strip_space() {
        let geometry = StripGeometry::generate(13);
        for vertex in &geometry.vertices {
            assert!(vertex.position[0] == -0.5 || vertex.position[0] == 0.5);
            assert!(vertex.position[1] >= 0.0 && vertex.position[1] <= 13.0);
            assert_eq!(vertex.position[2], 0.0);
            assert!(vertex.uv[0] == 0.0 || vertex.uv[0] == 1.0);
            assert!((0.0..=1.0).contains(&vertex.uv[1]));
        }
    }

    #[test]
    fn state_starts_with_unset_focus() {
        let state = StripGeometry::generate(13).strip_state();
        assert_eq!(state.triangle_offset_count, 14);
        assert_eq!(state.last_focus, LAST_FOCUS_UNSET);
        assert_eq!(std::mem::size_of::<StripState>(), 8);
    }

    #[test]
    fn indices_reference_existing_vertices() {
        let geometry = StripGeometry::generate(4);
        let max = geometry.vertices.len() as u32;
        assert!(geometry.indices.iter().all(|&i| i < max));
    }
}
