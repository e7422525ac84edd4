use thiserror::Error;

/// Error type for DEM comparison and sampling operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("band data length {len} does not match raster dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize, len: usize },

    #[error("band index {index} out of range for raster with {count} bands")]
    BandIndex { index: usize, count: usize },

    #[error("invalid bounding box: min ({min_x}, {min_y}) exceeds max ({max_x}, {max_y})")]
    InvalidBounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("no bounding boxes to intersect")]
    NoBounds,

    #[error("bounding boxes do not overlap")]
    EmptyIntersection,

    #[error("collected {got} of {want} valid sample pairs in {attempts} attempts")]
    InsufficientValidSamples {
        got: usize,
        want: usize,
        attempts: usize,
    },

    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("cannot compute RMSE of an empty series")]
    EmptySeries,

    #[error("window size must be odd and nonzero, got {rows}x{cols}")]
    InvalidWindow { rows: usize, cols: usize },

    #[error("window {rows}x{cols} centered at pixel ({row}, {col}) extends beyond the raster")]
    WindowOutOfBounds {
        rows: usize,
        cols: usize,
        row: i64,
        col: i64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
