use cubecl_core as cubecl;
use cubecl_core::prelude::*;

/// An associative combine operator for the scan kernels.
#[cube]
pub trait ScanInstruction: Send + Sync + 'static {
    /// The identity of [combine](ScanInstruction::combine).
    ///
    /// Units that don't hold an item feed this value to the plane scan so the padding never
    /// changes the result of the units that do.
    fn identity<N: Numeric>() -> N;

    /// Combine a prefix with the value that follows it.
    fn combine<N: Numeric>(prefix: N, value: N) -> N;

    /// Inclusive scan of `value` across the units of the current plane.
    fn plane_inclusive<N: Numeric>(value: N) -> N;
}
