// Randomized train/test row split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seeded when `seed` is given, otherwise seeded from the OS.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Shuffle `0..n` and split it. The test side gets `ceil(n * test_fraction)`
/// rows, capped so at least one training row remains when `n > 0`.
pub fn train_test_split(n: usize, test_fraction: f64, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n.saturating_sub(1));
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Hold out the trailing `fraction` of `rows` (in their given order) for
/// validation. Returns `(fit, validation)`.
pub fn holdout_tail(rows: &[usize], fraction: f64) -> (Vec<usize>, Vec<usize>) {
    let n_fit = (rows.len() as f64 * (1.0 - fraction)).floor() as usize;
    let n_fit = n_fit.clamp(usize::from(!rows.is_empty()), rows.len());
    (rows[..n_fit].to_vec(), rows[n_fit..].to_vec())
}
