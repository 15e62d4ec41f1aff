use cubecl_core as cubecl;
use cubecl_core::prelude::*;

use super::ScanInstruction;

/// Running product. Padding uses one rather than zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prod;

#[cube]
impl ScanInstruction for Prod {
    fn identity<N: Numeric>() -> N {
        N::from_int(1)
    }

    fn combine<N: Numeric>(prefix: N, value: N) -> N {
        prefix * value
    }

    fn plane_inclusive<N: Numeric>(value: N) -> N {
        plane_inclusive_prod(value)
    }
}
