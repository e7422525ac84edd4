use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::error::{Error, Result};
use crate::reader::read_dem;
use crate::sample::sample_random_points;

/// Root-mean-square error between two paired series.
///
/// The series must be the same, nonzero length; mismatches fail instead of
/// silently truncating or dividing by zero.
pub fn rmse(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(Error::EmptySeries);
    }

    let sum_sq_diff: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();

    Ok((sum_sq_diff / a.len() as f64).sqrt())
}

/// Compare two DEMs by sampling both at `count` random points and reducing
/// the paired values to a single RMSE.
///
/// A fixed `seed` makes the run reproducible; `None` seeds from the OS.
pub fn dem_rmse<P: AsRef<Path>>(
    dem1_path: P,
    dem2_path: P,
    count: usize,
    max_attempts: usize,
    seed: Option<u64>,
) -> Result<f64> {
    info!("Loading DEMs...");
    let dem1 = read_dem(dem1_path)?;
    let dem2 = read_dem(dem2_path)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!("Sampling {} points...", count);
    let pairs = sample_random_points(&dem1, &dem2, count, max_attempts, &mut rng)?;

    let (vals1, vals2): (Vec<f32>, Vec<f32>) = pairs.iter().map(|p| (p.a, p.b)).unzip();
    rmse(&vals1, &vals2)
}
