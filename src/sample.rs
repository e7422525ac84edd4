use rand::Rng;
use tracing::debug;

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use crate::raster::{DemRaster, SampleValue};

/// Values of two rasters at one shared coordinate. Both values are valid by
/// construction; no-data draws never become pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePair {
    pub a: f32,
    pub b: f32,
}

/// Draw uniformly random coordinates inside the overlap of two rasters and
/// sample both, keeping pairs where both values are valid, until `count`
/// pairs are collected.
///
/// Draws where either raster reports no-data are rejected and retried. The
/// loop is bounded by `max_attempts` total draws; exhausting it fails with
/// [`Error::InsufficientValidSamples`] so an overlap that is all no-data in
/// one raster cannot spin forever. Rasters whose extents do not overlap fail
/// with [`Error::EmptyIntersection`] before any draw.
///
/// The generator is supplied by the caller, so a fixed seed reproduces the
/// exact sample set.
pub fn sample_random_points<R: Rng>(
    dem1: &DemRaster,
    dem2: &DemRaster,
    count: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Vec<SamplePair>> {
    let overlap = overlap_bounds(dem1, dem2)?;

    let mut pairs = Vec::with_capacity(count);
    let mut attempts = 0;

    while pairs.len() < count && attempts < max_attempts {
        attempts += 1;

        let x = rng.gen_range(overlap.min_x..=overlap.max_x);
        let y = rng.gen_range(overlap.min_y..=overlap.max_y);

        match (dem1.sample_point(x, y), dem2.sample_point(x, y)) {
            (SampleValue::Valid(a), SampleValue::Valid(b)) => pairs.push(SamplePair { a, b }),
            _ => continue,
        }
    }

    debug!(
        "Collected {} sample pairs in {} attempts",
        pairs.len(),
        attempts
    );

    if pairs.len() < count {
        return Err(Error::InsufficientValidSamples {
            got: pairs.len(),
            want: count,
            attempts,
        });
    }

    Ok(pairs)
}

/// The common extent of two rasters.
pub fn overlap_bounds(dem1: &DemRaster, dem2: &DemRaster) -> Result<BoundingBox> {
    BoundingBox::intersection(&[dem1.bounding_box(), dem2.bounding_box()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::GeoTransform;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn raster(values: Vec<f32>, rows: usize, cols: usize, origin_x: f64) -> DemRaster {
        DemRaster::new(
            rows,
            cols,
            GeoTransform::new(origin_x, rows as f64, 1.0, -1.0),
            None,
            Some(-9999.0),
            vec![values],
        )
        .unwrap()
    }

    #[test]
    fn test_collects_requested_count() {
        let dem1 = raster(vec![1.0; 100], 10, 10, 0.0);
        let dem2 = raster(vec![2.0; 100], 10, 10, 0.0);

        let mut rng = StdRng::seed_from_u64(42);
        let pairs = sample_random_points(&dem1, &dem2, 25, 10_000, &mut rng).unwrap();

        assert_eq!(pairs.len(), 25);
        assert!(pairs.iter().all(|p| p.a == 1.0 && p.b == 2.0));
    }

    #[test]
    fn test_seed_reproduces_samples() {
        let values: Vec<f32> = (0..100).map(|v| v as f32).collect();
        let dem1 = raster(values.clone(), 10, 10, 0.0);
        let dem2 = raster(values, 10, 10, 0.0);

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);

        let first = sample_random_points(&dem1, &dem2, 50, 10_000, &mut rng1).unwrap();
        let second = sample_random_points(&dem1, &dem2, 50, 10_000, &mut rng2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nodata_pairs_are_rejected() {
        // dem2 is all no-data, so no draw can ever produce a pair.
        let dem1 = raster(vec![1.0; 16], 4, 4, 0.0);
        let dem2 = raster(vec![-9999.0; 16], 4, 4, 0.0);

        let mut rng = StdRng::seed_from_u64(1);
        let result = sample_random_points(&dem1, &dem2, 5, 200, &mut rng);

        assert!(matches!(
            result,
            Err(Error::InsufficientValidSamples {
                got: 0,
                want: 5,
                attempts: 200,
            })
        ));
    }

    #[test]
    fn test_disjoint_rasters_fail_before_sampling() {
        let dem1 = raster(vec![1.0; 16], 4, 4, 0.0);
        let dem2 = raster(vec![1.0; 16], 4, 4, 100.0);

        let mut rng = StdRng::seed_from_u64(1);
        let result = sample_random_points(&dem1, &dem2, 5, 200, &mut rng);
        assert!(matches!(result, Err(Error::EmptyIntersection)));
    }

    #[test]
    fn test_partial_overlap_only_yields_valid_pairs() {
        // dem2 shifted right by 2 pixels; only the overlapping strip can
        // produce pairs, and pairs must agree where the data agrees.
        let values: Vec<f32> = (0..100).map(|v| v as f32).collect();
        let dem1 = raster(values.clone(), 10, 10, 0.0);
        let dem2 = raster(values, 10, 10, 2.0);

        let mut rng = StdRng::seed_from_u64(99);
        let pairs = sample_random_points(&dem1, &dem2, 20, 100_000, &mut rng).unwrap();

        assert_eq!(pairs.len(), 20);
        // Same grid, shifted two columns: dem2's value at a shared point is
        // dem1's value two columns to the left.
        assert!(pairs.iter().all(|p| p.a - p.b == 2.0));
    }
}
