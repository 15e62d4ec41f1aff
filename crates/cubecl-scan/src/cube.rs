use cubecl_core as cubecl;
use cubecl_core::prelude::*;

use crate::{
    Partition, ScanInstruction, ScanSettings, inclusive_scan_plane, partition_in_range,
    partition_item,
};

/// Inclusive scan of `data[0..range]` by all units of a cube.
///
/// Ranges that fit a plane are handled by [inclusive_scan_plane]. Larger ranges are split in
/// chunks of one plane:
///
/// 1. Each plane scans its chunk. Units keep their scanned values and the last unit of each chunk
///    writes the chunk total to shared memory.
/// 2. The chunk totals are scanned recursively.
/// 3. Every item outside of the first chunk is combined with the total of the preceding chunks.
///
/// Each recursion level allocates its own shared memory, following [ScratchLayout].
#[cube]
pub fn inclusive_scan_cube<N: Numeric, I: ScanInstruction>(
    data: &mut SliceMut<N>,
    #[comptime] range: u32,
    #[comptime] settings: ScanSettings,
) {
    if comptime!(range <= settings.plane_dim) {
        inclusive_scan_plane::<N, I>(data, range, settings);
    } else {
        inclusive_scan_chunks::<N, I>(data, range, settings);
    }
}

#[cube]
fn inclusive_scan_chunks<N: Numeric, I: ScanInstruction>(
    data: &mut SliceMut<N>,
    #[comptime] range: u32,
    #[comptime] settings: ScanSettings,
) {
    let plane_dim = comptime!(settings.plane_dim);
    let last_plane_unit = comptime!(settings.plane_dim - 1);
    let padded = comptime!(range.next_multiple_of(settings.plane_dim));
    let num_chunks = comptime!(range.div_ceil(settings.plane_dim));
    let num_iterations = comptime!(Partition::new(padded, settings.cube_dim).num_iterations());
    let num_write_iterations = comptime!(Partition::new(range, settings.cube_dim).num_iterations());

    // One scanned value per iteration, private to the unit.
    let mut fine = Array::<N>::new(num_iterations);
    let mut coarse = SharedMemory::<N>::new(num_chunks);

    #[unroll]
    for iteration in 0..num_iterations {
        let item = partition_item(iteration, settings.cube_dim);

        if partition_in_range(iteration, padded.runtime(), settings.cube_dim) {
            let value = if partition_in_range(iteration, range.runtime(), settings.cube_dim) {
                data[item]
            } else {
                I::identity::<N>()
            };
            let scanned = I::plane_inclusive::<N>(value);
            fine[iteration] = scanned;

            if item % plane_dim == last_plane_unit {
                coarse[item / plane_dim] = scanned;
            }
        }
    }

    sync_cube();

    inclusive_scan_cube::<N, I>(&mut coarse.to_slice_mut(), num_chunks, settings);

    sync_cube();

    #[unroll]
    for iteration in 0..num_write_iterations {
        let item = partition_item(iteration, settings.cube_dim);

        if partition_in_range(iteration, range.runtime(), settings.cube_dim) {
            let mut value = fine[iteration];
            if item >= plane_dim {
                value = I::combine::<N>(coarse[item / plane_dim - 1], value);
            }
            data[item] = value;
        }
    }
}

/// Shared memory used by [inclusive_scan_cube] for a given range.
///
/// Level `k` holds one total per plane chunk of level `k - 1`, level 0 being the scanned range.
/// The recursion stops at the first level that fits in a single plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchLayout {
    levels: Vec<u32>,
}

impl ScratchLayout {
    pub fn new(range: u32, plane_dim: u32) -> Self {
        let mut levels = Vec::new();
        let mut range = range;

        while range > plane_dim && plane_dim > 1 {
            range = range.div_ceil(plane_dim);
            levels.push(range);
        }

        Self { levels }
    }

    /// Number of shared memory allocations, which is also the recursion depth.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Length of the shared memory at each recursion level.
    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    /// Total shared memory needed for elements of `elem_size` bytes.
    pub fn size_bytes(&self, elem_size: usize) -> usize {
        self.levels.iter().map(|len| *len as usize).sum::<usize>() * elem_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_within_plane_needs_no_scratch() {
        let layout = ScratchLayout::new(32, 32);

        assert_eq!(layout.depth(), 0);
        assert_eq!(layout.size_bytes(4), 0);
    }

    #[test]
    fn single_unit_planes_terminate() {
        assert_eq!(ScratchLayout::new(512, 1).depth(), 0);
    }

    #[test]
    fn default_block_needs_one_level() {
        let layout = ScratchLayout::new(512, 32);

        assert_eq!(layout.levels(), &[16]);
        assert_eq!(layout.size_bytes(4), 64);
    }

    #[test]
    fn depth_grows_with_log_of_range() {
        let layout = ScratchLayout::new(32 * 32 * 32 + 1, 32);

        assert_eq!(layout.levels(), &[1025, 33, 2]);
        assert_eq!(layout.depth(), 3);
    }

    #[test]
    fn narrow_planes_recurse_deeper() {
        let layout = ScratchLayout::new(512, 4);

        assert_eq!(layout.levels(), &[128, 32, 8, 2]);
    }
}
