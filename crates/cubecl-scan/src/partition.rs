use cubecl_core as cubecl;
use cubecl_core::prelude::*;

/// Assignment of `range` items to the `local_size` units of a cube.
///
/// Unit `u` handles item `iteration * local_size + u` for every full iteration. The remaining
/// `range % local_size` items are handled by the first units in a last, partial iteration.
///
/// The same assignment is used by kernels, either with a comptime range and unrolled loops or with
/// a runtime range through [partition_iterations]. Both visit the exact same items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    pub range: u32,
    pub local_size: u32,
}

/// One item visited by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionItem {
    pub item: u32,
    pub iteration: u32,
    pub unit: u32,
}

impl Partition {
    pub const fn new(range: u32, local_size: u32) -> Self {
        Self { range, local_size }
    }

    /// Iterations in which every unit has an item.
    pub const fn full_iterations(&self) -> u32 {
        self.range / self.local_size
    }

    /// Number of units active in the partial iteration, zero if there is none.
    pub const fn tail_len(&self) -> u32 {
        self.range % self.local_size
    }

    /// Full iterations plus the partial one, if any.
    pub const fn num_iterations(&self) -> u32 {
        self.range.div_ceil(self.local_size)
    }

    /// Item handled by `unit` at `iteration`, if any.
    pub fn item(&self, iteration: u32, unit: u32) -> Option<u32> {
        if unit >= self.local_size {
            return None;
        }
        let item = iteration * self.local_size + unit;
        (item < self.range).then_some(item)
    }

    /// Unit that handles `item`, whatever the range.
    ///
    /// Every scan kernel writes item `i` from unit `i % local_size`, so that unit can read its own
    /// write back without a storage barrier.
    pub const fn owner(&self, item: u32) -> u32 {
        item % self.local_size
    }

    /// Every visited item, full iterations first, then the partial iteration.
    pub fn items(&self) -> impl Iterator<Item = PartitionItem> + '_ {
        (0..self.num_iterations()).flat_map(move |iteration| {
            (0..self.local_size).filter_map(move |unit| {
                self.item(iteration, unit).map(|item| PartitionItem {
                    item,
                    iteration,
                    unit,
                })
            })
        })
    }
}

/// Item handled by the current unit at the given iteration.
#[cube]
pub fn partition_item(iteration: u32, #[comptime] local_size: u32) -> u32 {
    iteration * local_size + UNIT_POS
}

/// Whether the item of the current unit at `iteration` falls in `range`.
///
/// Only the partial iteration has units out of range, and always the last ones.
#[cube]
pub fn partition_in_range(iteration: u32, range: u32, #[comptime] local_size: u32) -> bool {
    partition_item(iteration, local_size) < range
}

/// Number of iterations (full and partial) needed to cover a runtime `range`.
#[cube]
#[allow(clippy::manual_div_ceil)]
pub fn partition_iterations(range: u32, #[comptime] local_size: u32) -> u32 {
    (range + local_size - 1) / local_size
}
