use cubecl_core as cubecl;
use cubecl_core::prelude::*;

use super::ScanInstruction;

/// Running sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

#[cube]
impl ScanInstruction for Sum {
    fn identity<N: Numeric>() -> N {
        N::from_int(0)
    }

    fn combine<N: Numeric>(prefix: N, value: N) -> N {
        prefix + value
    }

    fn plane_inclusive<N: Numeric>(value: N) -> N {
        plane_inclusive_sum(value)
    }
}
