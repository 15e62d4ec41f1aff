use core::fmt::Display;
use std::marker::PhantomData;

use cubecl_core::prelude::*;
use cubecl_runtime::server::Handle;

use crate::ScanError;

/// Sizes of the intermediate buffers used to scan a buffer of `len` elements.
///
/// Level `i` holds one total per block of `granularity` elements of level `i - 1`, level `-1`
/// being the scanned buffer itself. Every level buffer is padded to a multiple of the granularity
/// so that the reduction of that level never reads past its end. The last level holds a single
/// total: the combination of the whole input.
///
/// A granularity below two never reduces the element count, so it yields no level at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeLayout {
    len: usize,
    granularity: usize,
    levels: Vec<CascadeLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeLevel {
    /// Number of block totals stored in this level.
    pub num_elems: usize,
    /// Allocated length, a multiple of the granularity.
    pub len: usize,
}

impl CascadeLayout {
    pub fn new(len: usize, granularity: usize) -> Self {
        let mut levels = Vec::new();
        let mut num_elems = len;

        while num_elems > 1 && granularity > 1 {
            num_elems = num_elems.div_ceil(granularity);
            levels.push(CascadeLevel {
                num_elems,
                len: num_elems.next_multiple_of(granularity),
            });
        }

        Self {
            len,
            granularity,
            levels,
        }
    }

    /// Length of the scanned buffer.
    pub fn input_len(&self) -> usize {
        self.len
    }

    /// Number of intermediate buffers.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn granularity(&self) -> usize {
        self.granularity
    }

    pub fn levels(&self) -> &[CascadeLevel] {
        &self.levels
    }

    /// Length of the buffer reduced into `level`: the previous level, or the scanned buffer for
    /// level 0.
    pub fn source_len(&self, level: usize) -> usize {
        match level {
            0 => self.len,
            _ => self.levels[level - 1].len,
        }
    }

    /// Passes to submit, in order, to scan the buffer.
    ///
    /// Every level is reduced from the finest to the coarsest. Then every level but the last is
    /// expanded from the coarsest to the finest: a level is only expanded once its own totals
    /// have been corrected by the expansion of the level above it.
    pub fn passes(&self) -> Vec<ScanPass> {
        let reduce = (0..self.levels.len()).map(|level| ScanPass::Reduce {
            level,
            cube_count: self.source_len(level).div_ceil(self.granularity) as u32,
        });
        let expand = (0..self.levels.len().saturating_sub(1))
            .rev()
            .map(|level| ScanPass::Expand {
                level,
                cube_count: (self.levels[level].num_elems - 1) as u32,
            });

        reduce.chain(expand).collect()
    }
}

/// A single kernel submission of the hierarchical scan.
///
/// The source of `level` is the buffer one step finer: level `level - 1`, or the scanned buffer
/// for level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPass {
    /// Scan each block of the source in place and write the block totals into `level`.
    Reduce { level: usize, cube_count: u32 },
    /// Combine block `b + 1` of the source with total `b` of `level`, for each launched cube `b`.
    Expand { level: usize, cube_count: u32 },
}

impl ScanPass {
    pub fn level(&self) -> usize {
        match self {
            ScanPass::Reduce { level, .. } | ScanPass::Expand { level, .. } => *level,
        }
    }

    pub fn cube_count(&self) -> u32 {
        match self {
            ScanPass::Reduce { cube_count, .. } | ScanPass::Expand { cube_count, .. } => {
                *cube_count
            }
        }
    }
}

impl Display for ScanPass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ScanPass::Reduce { level, .. } => {
                write!(f, "hierarchical_inclusive_scan reduce {level}")
            }
            ScanPass::Expand { level, .. } => {
                write!(f, "hierarchical_inclusive_scan expand {level}")
            }
        }
    }
}

/// Device buffers of a [CascadeLayout].
///
/// The cascade doesn't depend on the scanned values, so it can be kept and reused for every scan
/// of a buffer with the same length.
pub struct Cascade<R: Runtime, N: CubePrimitive> {
    layout: CascadeLayout,
    handles: Vec<Handle>,
    _runtime: PhantomData<R>,
    _elem: PhantomData<N>,
}

impl<R: Runtime, N: CubePrimitive> Cascade<R, N> {
    /// Allocate one buffer per level of the layout.
    pub fn allocate(client: &ComputeClient<R::Server, R::Channel>, layout: CascadeLayout) -> Self {
        let handles = layout
            .levels()
            .iter()
            .map(|level| client.empty(level.len * size_of::<N>()))
            .collect();

        Self {
            layout,
            handles,
            _runtime: PhantomData,
            _elem: PhantomData,
        }
    }

    pub fn layout(&self) -> &CascadeLayout {
        &self.layout
    }

    /// Buffer of the given level.
    pub fn handle(&self, level: usize) -> &Handle {
        &self.handles[level]
    }

    /// Check that this cascade was built to scan `len` elements with the given granularity.
    pub fn validate(&self, len: usize, granularity: u32) -> Result<(), ScanError> {
        let expected = (len, granularity as usize);
        let actual = (self.layout.input_len(), self.layout.granularity());

        if expected != actual {
            return Err(ScanError::CascadeMismatch { expected, actual });
        }

        Ok(())
    }
}
