//! Random sampling without replacement.
//!
//! Both samplers work on a private copy of the candidates, so the caller's slice is
//! never reordered.

use rand::Rng;
use rand::seq::index;

/// Draws up to `k` distinct items uniformly at random.
///
/// Returns every item (in random order) when `k >= items.len()`.
pub fn uniform_sample<T, R>(items: &[T], k: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let amount = k.min(items.len());
    if amount == 0 {
        return Vec::new();
    }
    index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Draws up to `k` distinct items, each draw proportional to `weight`.
///
/// Weights are recomputed over the shrinking pool before every draw. Negative or
/// non-finite weights count as zero. When the remaining weights sum to zero the
/// rest of the draw falls back to [`uniform_sample`].
///
/// `k == 0` or an empty `items` yields an empty result; `k > items.len()` yields
/// every item.
pub fn weighted_sample<T, R, F>(items: &[T], k: usize, mut weight: F, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
    F: FnMut(&T) -> f64,
{
    if k == 0 || items.is_empty() {
        return Vec::new();
    }

    let mut pool = items.to_vec();
    let mut picked = Vec::with_capacity(k.min(pool.len()));

    while picked.len() < k && !pool.is_empty() {
        let weights: Vec<f64> = pool.iter().map(|item| clamp_weight(weight(item))).collect();
        let total: f64 = weights.iter().sum();

        if !(total.is_finite() && total > 0.0) {
            let needed = k - picked.len();
            picked.extend(uniform_sample(&pool, needed, rng));
            break;
        }

        let chosen = roulette(&weights, total, rng);
        picked.push(pool.remove(chosen));
    }

    picked
}

fn clamp_weight(raw: f64) -> f64 {
    if raw.is_finite() { raw.max(0.0) } else { 0.0 }
}

/// Single roulette-wheel draw over `weights`, which must sum to `total > 0`.
fn roulette<R: Rng + ?Sized>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let mut remainder = rng.random_range(0.0..total);
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        last_positive = i;
        remainder -= w;
        if remainder <= 0.0 {
            return i;
        }
    }
    // rounding can leave a sliver of remainder after the last weight
    last_positive
}
