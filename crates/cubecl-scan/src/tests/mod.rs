
use cubecl_core::prelude::Numeric;

#[allow(missing_docs)]
#[macro_export]
macro_rules! testgen_scan {
    () => {
        mod test_scan {
            use super::*;
            use cubecl_core::Runtime;

            $crate::testgen_scan_partition!();
            $crate::testgen_scan_block!();
            $crate::testgen_scan_hierarchical!();
        }
    };
}

/// Inclusive scan computed sequentially on the host.
pub fn reference_scan<T: Copy>(data: &[T], op: impl Fn(T, T) -> T) -> Vec<T> {
    let mut output = Vec::with_capacity(data.len());
    let mut accumulator = None;

    for value in data {
        let next = match accumulator {
            Some(prefix) => op(prefix, *value),
            None => *value,
        };
        output.push(next);
        accumulator = Some(next);
    }

    output
}

/// Input values of the device tests.
#[derive(Debug, Clone, Copy)]
pub enum Values {
    /// Uniform in `1..20`.
    Uniform,
    /// Odd values in `1..20`, so wrapping products never reach zero.
    Odd,
}

impl Values {
    pub fn generate<N: Numeric>(&self, len: usize) -> Vec<N> {
        match self {
            Values::Uniform => random_values(len, 20),
            Values::Odd => random_values::<i64>(len, 10)
                .into_iter()
                .map(|value| N::from_int(2 * value - 1))
                .collect(),
        }
    }
}

pub(crate) fn random_values<N: Numeric>(len: usize, max: i64) -> Vec<N> {
    use rand::{Rng, SeedableRng, distr::Uniform, rngs::StdRng};

    StdRng::seed_from_u64(1234)
        .sample_iter(Uniform::<i64>::new(1, max).unwrap())
        .take(len)
        .map(N::from_int)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_products_never_collapse_to_zero() {
        let data = Values::Odd.generate::<u32>(512 * 17);
        let expected = reference_scan(&data, |a, b| a.wrapping_mul(b));

        assert!(data.iter().all(|value| value % 2 == 1 && *value < 20));
        assert!(expected.iter().all(|value| *value != 0));
    }

    #[test]
    fn reference_scan_is_inclusive() {
        assert_eq!(reference_scan(&[1, 2, 3, 4], |a, b| a + b), vec![1, 3, 6, 10]);
        assert!(reference_scan::<u32>(&[], |a, b| a + b).is_empty());
    }
}
