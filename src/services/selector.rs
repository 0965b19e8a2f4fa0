//! Sampling primitives: uniform pick and percentage-weighted pick.
//!
//! Both take the RNG explicitly so a seeded generator reproduces the exact
//! same sequence of picks.

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("cannot pick from an empty pool")]
    EmptyPool,

    #[error("no entry has a positive weight")]
    NoPositiveWeight,
}

/// Uniform draw over `pool`.
pub fn pick_uniform<'a, T, R>(rng: &mut R, pool: &'a [T]) -> Result<&'a T, SelectionError>
where
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return Err(SelectionError::EmptyPool);
    }
    Ok(&pool[rng.gen_range(0..pool.len())])
}

/// Percentage-weighted draw.
///
/// Non-positive (and non-finite) weights are dropped, the rest re-normalized to
/// sum to 100. A value `r` in `[0, 100)` is drawn and entries are walked in the
/// given order until the running sum reaches `r`.
pub fn pick_weighted<K, I, R>(rng: &mut R, entries: I) -> Result<K, SelectionError>
where
    K: Copy,
    I: IntoIterator<Item = (K, f64)>,
    R: Rng + ?Sized,
{
    let positive: Vec<(K, f64)> = entries
        .into_iter()
        .filter(|(_, w)| w.is_finite() && *w > 0.0)
        .collect();

    let total: f64 = positive.iter().map(|(_, w)| w).sum();
    if positive.is_empty() || total <= 0.0 {
        return Err(SelectionError::NoPositiveWeight);
    }

    let r: f64 = rng.gen_range(0.0..100.0);
    let mut running = 0.0;
    for (key, weight) in &positive {
        running += weight * 100.0 / total;
        if running >= r {
            return Ok(*key);
        }
    }

    // rounding can leave the final running sum a hair under r
    Ok(positive[positive.len() - 1].0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_pick_uniform_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pool: [u8; 0] = [];
        assert_eq!(pick_uniform(&mut rng, &pool), Err(SelectionError::EmptyPool));
    }

    #[test]
    fn test_pick_uniform_single() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(*pick_uniform(&mut rng, &["only"]).unwrap(), "only");
    }

    #[test]
    fn test_pick_uniform_seeded_is_reproducible() {
        let pool: Vec<u32> = (0..50).collect();
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        let first: Vec<u32> = (0..20).map(|_| *pick_uniform(&mut a, &pool).unwrap()).collect();
        let second: Vec<u32> = (0..20).map(|_| *pick_uniform(&mut b, &pool).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pick_weighted_rejects_all_non_positive() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let result = pick_weighted(&mut rng, [("a", 0.0), ("b", -5.0)]);
        assert_eq!(result, Err(SelectionError::NoPositiveWeight));

        let empty: [(&str, f64); 0] = [];
        assert_eq!(pick_weighted(&mut rng, empty), Err(SelectionError::NoPositiveWeight));
    }

    #[test]
    fn test_pick_weighted_single_positive_always_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let picked = pick_weighted(&mut rng, [("zero", 0.0), ("one", 3.0), ("neg", -1.0)]).unwrap();
            assert_eq!(picked, "one");
        }
    }

    #[test]
    fn test_pick_weighted_distribution_70_30() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut a = 0u32;
        let mut b = 0u32;
        for _ in 0..100_000 {
            match pick_weighted(&mut rng, [("a", 70.0), ("b", 30.0), ("never", 0.0)]).unwrap() {
                "a" => a += 1,
                "b" => b += 1,
                other => panic!("zero-weight entry selected: {other}"),
            }
        }
        let share = f64::from(a) / 100_000.0;
        assert!((share - 0.70).abs() < 0.01, "share of a was {share}");
        assert_eq!(a + b, 100_000);
    }

    #[test]
    fn test_pick_weighted_normalizes_unscaled_weights() {
        // 7:3 expressed as 0.7/0.3 behaves the same as 70/30
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut a = 0u32;
        for _ in 0..20_000 {
            if pick_weighted(&mut rng, [("a", 0.7), ("b", 0.3)]).unwrap() == "a" {
                a += 1;
            }
        }
        let share = f64::from(a) / 20_000.0;
        assert!((share - 0.70).abs() < 0.02, "share of a was {share}");
    }

    #[test]
    fn test_pick_weighted_seeded_is_reproducible() {
        let weights = [("de_DE", 10.0), ("en_US", 60.0), ("fr_FR", 30.0)];
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);
        let first: Vec<&str> = (0..50).map(|_| pick_weighted(&mut a, weights).unwrap()).collect();
        let second: Vec<&str> = (0..50).map(|_| pick_weighted(&mut b, weights).unwrap()).collect();
        assert_eq!(first, second);
    }
}
