use cubecl_core as cubecl;
use cubecl_core::prelude::*;

use crate::{Partition, ScanInstruction, ScanSettings, partition_in_range, partition_item};

/// Inclusive scan of `data[0..range]` when `range` fits in a single plane.
///
/// The range is padded to the plane dimension so a whole plane takes part in the plane scan.
/// Units past `range` contribute the instruction identity and discard their result.
#[cube]
pub fn inclusive_scan_plane<N: Numeric, I: ScanInstruction>(
    data: &mut SliceMut<N>,
    #[comptime] range: u32,
    #[comptime] settings: ScanSettings,
) {
    let padded = comptime!(range.next_multiple_of(settings.plane_dim));
    let num_iterations = comptime!(Partition::new(padded, settings.cube_dim).num_iterations());

    #[unroll]
    for iteration in 0..num_iterations {
        let item = partition_item(iteration, settings.cube_dim);

        // Whole planes are either in or out, the plane instruction stays uniform.
        if partition_in_range(iteration, padded.runtime(), settings.cube_dim) {
            let in_range = partition_in_range(iteration, range.runtime(), settings.cube_dim);
            let value = if in_range {
                data[item]
            } else {
                I::identity::<N>()
            };
            let scanned = I::plane_inclusive::<N>(value);

            if in_range {
                data[item] = scanned;
            }
        }
    }
}
