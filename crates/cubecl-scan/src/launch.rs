use cubecl_core as cubecl;
use cubecl_core::prelude::*;
use cubecl_runtime::server::Handle;

use crate::{
    Cascade, Partition, ScanInstruction, ScanPass, ScanProfiler, ScanSettings,
    inclusive_scan_cube, partition_in_range, partition_item, partition_iterations,
};

/// Launch the reduction and expansion passes that scan `buffer` in place.
///
/// This function assumes that all parameters are already validated. See the main entrypoint
/// [hierarchical_inclusive_scan](crate::hierarchical_inclusive_scan) for the checks it relies on.
///
/// Passes are submitted in order on the same client, so every pass observes the writes of the
/// passes before it.
pub fn launch_hierarchical_inclusive_scan<R: Runtime, N: Numeric, I: ScanInstruction>(
    client: &ComputeClient<R::Server, R::Channel>,
    buffer: &Handle,
    len: usize,
    cascade: &Cascade<R, N>,
    settings: ScanSettings,
    profiler: &ScanProfiler,
) {
    let layout = cascade.layout();
    let levels = layout.levels();
    let cube_dim = CubeDim::new_1d(settings.cube_dim);

    log::trace!(
        "Scanning {len} elements over {} levels with scratch {:?}",
        levels.len(),
        settings.scratch().levels()
    );

    for pass in layout.passes() {
        let level = pass.level();
        let (source, source_len) = match level {
            0 => (buffer, len),
            _ => (cascade.handle(level - 1), levels[level - 1].len),
        };
        let totals = cascade.handle(level);
        let (source, totals) = unsafe {
            (
                ArrayArg::from_raw_parts::<N>(source, source_len, 1),
                ArrayArg::from_raw_parts::<N>(totals, levels[level].len, 1),
            )
        };
        let cube_count = CubeCount::new_1d(pass.cube_count());
        let label = pass.to_string();
        log::debug!("{label} with {} cubes", pass.cube_count());

        profiler.submit::<R>(client, &label, || match pass {
            ScanPass::Reduce { .. } => unsafe {
                scan_reduce_kernel::launch_unchecked::<N, I, R>(
                    client, cube_count, cube_dim, source, totals, settings,
                )
            },
            ScanPass::Expand { .. } => unsafe {
                scan_expand_kernel::launch_unchecked::<N, I, R>(
                    client, cube_count, cube_dim, source, totals, settings,
                )
            },
        });
    }
}

/// Scan one block of `granularity` elements in place and write its total to `totals`.
///
/// The total is written by the unit that scanned the last item of the block, which reads back its
/// own global write.
#[cube(launch_unchecked)]
fn scan_reduce_kernel<N: Numeric, I: ScanInstruction>(
    big: &mut Array<N>,
    totals: &mut Array<N>,
    #[comptime] config: ScanSettings,
) {
    let last = comptime!(config.granularity - 1);
    let last_owner = comptime!(Partition::new(config.granularity, config.cube_dim).owner(last));
    let offset = CUBE_POS * config.granularity;
    let mut block = big.slice_mut(offset, offset + config.granularity);

    inclusive_scan_cube::<N, I>(&mut block, config.granularity, config);

    if UNIT_POS == last_owner {
        totals[CUBE_POS] = block[last];
    }
}

/// Combine every element of block `CUBE_POS + 1` with the scanned total of the blocks before it.
///
/// Block 0 is already exact and isn't launched.
#[cube(launch_unchecked)]
fn scan_expand_kernel<N: Numeric, I: ScanInstruction>(
    big: &mut Array<N>,
    totals: &Array<N>,
    #[comptime] config: ScanSettings,
) {
    let offset = (CUBE_POS + 1) * config.granularity;
    let carry = totals[CUBE_POS];

    let range = config.granularity.runtime();
    let num_iterations = partition_iterations(range, config.cube_dim);

    for iteration in 0..num_iterations {
        if partition_in_range(iteration, range, config.cube_dim) {
            let index = offset + partition_item(iteration, config.cube_dim);
            big[index] = I::combine::<N>(carry, big[index]);
        }
    }
}

/// Scan the first `range` elements of `data` with a single cube.
#[cube(launch_unchecked)]
pub fn scan_block_kernel<N: Numeric, I: ScanInstruction>(
    data: &mut Array<N>,
    #[comptime] range: u32,
    #[comptime] config: ScanSettings,
) {
    let mut block = data.slice_mut(0, range.runtime());
    inclusive_scan_cube::<N, I>(&mut block, range, config);
}

/// Scan `len` elements of `buffer` with a single cube.
///
/// Useful for ranges smaller than the granularity, which the hierarchical scan doesn't accept.
/// The range is a comptime value, so each distinct `len` compiles its own kernel.
pub fn launch_block_scan<R: Runtime, N: Numeric, I: ScanInstruction>(
    client: &ComputeClient<R::Server, R::Channel>,
    buffer: &Handle,
    len: usize,
    settings: ScanSettings,
) {
    let partition = Partition::new(len as u32, settings.cube_dim);
    log::debug!(
        "Block scan of {len} elements in {} iterations",
        partition.num_iterations()
    );

    unsafe {
        scan_block_kernel::launch_unchecked::<N, I, R>(
            client,
            CubeCount::new_single(),
            CubeDim::new_1d(settings.cube_dim),
            ArrayArg::from_raw_parts::<N>(buffer, len, 1),
            len as u32,
            settings,
        );
    }
}
