use std::path::Path;

use gdal::Dataset;
use tracing::{debug, warn};

use crate::error::Result;
use crate::raster::DemRaster;
use crate::transform::GeoTransform;

/// Read a raster into a [`DemRaster`], decoding every band as `f32`.
///
/// The no-data value is taken from band 1 and applied to the whole raster,
/// matching the convention of the DEM products this tooling is used with.
/// Rasters with rotated or sheared geotransforms are accepted but warned
/// about, since point and window sampling ignore the rotation terms.
pub fn read_dem<P: AsRef<Path>>(path: P) -> Result<DemRaster> {
    let path = path.as_ref();
    let dataset = Dataset::open(path)?;

    let (cols, rows) = dataset.raster_size();
    let transform = GeoTransform::from_gdal(dataset.geo_transform()?);

    if !transform.is_north_up() {
        warn!(
            "Raster {:?} is not north-up; pixel lookups assume zero rotation",
            path
        );
    }

    let projection = {
        let wkt = dataset.projection();
        if wkt.is_empty() {
            None
        } else {
            Some(wkt)
        }
    };

    let band_count = dataset.raster_count();
    let mut nodata = None;
    let mut bands = Vec::with_capacity(band_count);

    for index in 1..=band_count {
        let band = dataset.rasterband(index)?;
        if index == 1 {
            nodata = band.no_data_value().map(|v| v as f32);
        }
        let buffer = band.read_as::<f32>((0, 0), (cols, rows), (cols, rows), None)?;
        bands.push(buffer.data().to_vec());
    }

    debug!(
        "Read {:?}: {}x{} pixels, {} band(s), nodata {:?}",
        path, cols, rows, band_count, nodata
    );

    DemRaster::new(rows, cols, transform, projection, nodata, bands)
}
