//! Seeded row sampling.

use super::Table;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Draw `n` rows without replacement using a generator seeded with `seed`.
///
/// Sampled rows keep their order in `table`. When `n` is at least the number
/// of rows, the whole table is returned.
pub fn sample_rows(table: &Table, n: usize, seed: u64) -> Table {
    if n >= table.n_rows() {
        log::info!("sample size {} covers all {} rows", n, table.n_rows());
        return table.clone();
    }

    let mut indices: Vec<usize> = (0..table.n_rows()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices.truncate(n);
    indices.sort_unstable();

    log::info!("sampled {} of {} rows (seed {})", n, table.n_rows(), seed);
    table.select_rows(&indices)
}
