//! Clip rasters to a shared extent.

use tracing::debug;

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use crate::raster::DemRaster;
use crate::transform::GeoTransform;

/// The minimum bounding box common to all rasters.
pub fn common_bounds(rasters: &[DemRaster]) -> Result<BoundingBox> {
    let boxes: Vec<BoundingBox> = rasters.iter().map(DemRaster::bounding_box).collect();
    BoundingBox::intersection(&boxes)
}

/// Clip a raster to a bounding box, producing a new raster whose origin is
/// re-derived from the clip window's upper-left pixel.
///
/// The box is converted to a pixel window through the raster's own
/// transform, so rasters with different origins clip to the same
/// geographic extent. All bands are clipped. A box entirely outside the
/// raster fails with [`Error::WindowOutOfBounds`].
pub fn clip_to_bounds(raster: &DemRaster, bounds: &BoundingBox) -> Result<DemRaster> {
    let [ulx, uly, lrx, lry] = bounds.proj_win();

    let (row_start, col_start) = raster.transform.to_pixel(ulx, uly);
    let (row_end, col_end) = raster.transform.to_pixel(lrx, lry);

    // Clamp to the raster extent; rounding at the edges may push the window
    // a pixel past it.
    let row_start = row_start.max(0);
    let col_start = col_start.max(0);
    let row_end = row_end.min(raster.rows as i64);
    let col_end = col_end.min(raster.cols as i64);

    if row_start >= row_end || col_start >= col_end {
        return Err(Error::WindowOutOfBounds {
            rows: raster.rows,
            cols: raster.cols,
            row: row_start,
            col: col_start,
        });
    }

    let (row_start, col_start) = (row_start as usize, col_start as usize);
    let (row_end, col_end) = (row_end as usize, col_end as usize);
    let out_rows = row_end - row_start;
    let out_cols = col_end - col_start;

    debug!(
        "Clip window: rows {}..{}, cols {}..{} of {}x{}",
        row_start, row_end, col_start, col_end, raster.rows, raster.cols
    );

    let mut out_bands = Vec::with_capacity(raster.bands.len());
    for band in &raster.bands {
        let mut out = Vec::with_capacity(out_rows * out_cols);
        for row in row_start..row_end {
            let offset = row * raster.cols;
            out.extend_from_slice(&band[offset + col_start..offset + col_end]);
        }
        out_bands.push(out);
    }

    let (origin_x, origin_y) = raster
        .transform
        .to_geo(row_start as i64, col_start as i64);
    let transform = GeoTransform {
        origin_x,
        origin_y,
        ..raster.transform
    };

    DemRaster::new(
        out_rows,
        out_cols,
        transform,
        raster.projection.clone(),
        raster.nodata,
        out_bands,
    )
}
