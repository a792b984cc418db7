//! Inequality Index
//!
//! Gini-style statistic over the population's wealth.

/// Inequality of a wealth distribution, 0.0 meaning everyone holds the same.
///
/// With wealth sorted ascending into x_0..x_{N-1}:
/// `B = sum(x_i * (N - i)) / (N * sum(x_i))` and the index is `1 + 1/N - 2B`.
///
/// An empty population or one with no wealth at all has nothing to compare,
/// and yields 0.0.
pub fn inequality_index(wealths: &[u32]) -> f64 {
    let n = wealths.len();
    let total: u64 = wealths.iter().map(|&w| u64::from(w)).sum();
    if n == 0 || total == 0 {
        tracing::warn!(
            "Inequality index undefined for {} agents holding {} total wealth, reporting 0",
            n,
            total
        );
        return 0.0;
    }

    let mut sorted = wealths.to_vec();
    sorted.sort_unstable();

    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| f64::from(x) * (n - i) as f64)
        .sum();
    let n = n as f64;
    let b = weighted / (n * total as f64);
    1.0 + 1.0 / n - 2.0 * b
}
