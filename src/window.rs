//! Window aggregation around a point, with adaptive growth.

use crate::error::{Error, Result};
use crate::raster::DemRaster;

/// Odd-sized pixel neighborhood dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    rows: usize,
    cols: usize,
}

impl WindowSpec {
    /// Create a window spec; both dimensions must be odd so the window stays
    /// centered on a pixel.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 || rows % 2 == 0 || cols % 2 == 0 {
            return Err(Error::InvalidWindow { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Square window of the given odd size.
    pub fn square(size: usize) -> Result<Self> {
        Self::new(size, size)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    /// The next larger window: +2 rows and +2 columns, still odd, still
    /// centered.
    fn grown(&self) -> Self {
        Self {
            rows: self.rows + 2,
            cols: self.cols + 2,
        }
    }
}

/// Statistic applied over the valid cells of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggMethod {
    Mean,
    Sum,
    Min,
    Max,
}

/// What to do when a window holds no valid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowPolicy {
    /// Keep the requested window.
    Fixed,
    /// Grow the window by +2/+2 until a valid cell appears or the window
    /// area would exceed `max_area`.
    Grow { max_area: usize },
}

/// Aggregation outcome. `AllNoData` is distinct from any computed value, so
/// an all-no-data window can never be mistaken for a legitimate zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowValue {
    Valid(f32),
    AllNoData,
}

impl WindowValue {
    pub fn ok(self) -> Option<f32> {
        match self {
            WindowValue::Valid(v) => Some(v),
            WindowValue::AllNoData => None,
        }
    }
}

/// Aggregate the first band of `raster` over a window centered on the pixel
/// containing `(x, y)`.
///
/// No-data cells are excluded from the statistic (not treated as zero). A
/// window with no valid cells either grows per `policy` or terminates as
/// [`WindowValue::AllNoData`]. A window (requested or grown) extending past
/// the raster edge fails with [`Error::WindowOutOfBounds`] rather than
/// silently truncating.
pub fn sample_window(
    raster: &DemRaster,
    x: f64,
    y: f64,
    spec: WindowSpec,
    method: AggMethod,
    policy: GrowPolicy,
) -> Result<WindowValue> {
    let (center_row, center_col) = raster.transform.to_pixel(x, y);
    let mut spec = spec;

    loop {
        let (row_min, row_max, col_min, col_max) =
            window_bounds(raster, spec, center_row, center_col)?;

        if let Some(value) = aggregate(raster, method, row_min, row_max, col_min, col_max) {
            return Ok(WindowValue::Valid(value));
        }

        match policy {
            GrowPolicy::Fixed => return Ok(WindowValue::AllNoData),
            GrowPolicy::Grow { max_area } => {
                let next = spec.grown();
                if next.area() > max_area {
                    return Ok(WindowValue::AllNoData);
                }
                spec = next;
            }
        }
    }
}

/// Inclusive pixel bounds of a window centered at `(center_row, center_col)`.
fn window_bounds(
    raster: &DemRaster,
    spec: WindowSpec,
    center_row: i64,
    center_col: i64,
) -> Result<(usize, usize, usize, usize)> {
    let half_rows = (spec.rows / 2) as i64;
    let half_cols = (spec.cols / 2) as i64;

    let row_min = center_row - half_rows;
    let row_max = center_row + half_rows;
    let col_min = center_col - half_cols;
    let col_max = center_col + half_cols;

    if row_min < 0
        || col_min < 0
        || row_max >= raster.rows as i64
        || col_max >= raster.cols as i64
    {
        return Err(Error::WindowOutOfBounds {
            rows: spec.rows,
            cols: spec.cols,
            row: center_row,
            col: center_col,
        });
    }

    Ok((
        row_min as usize,
        row_max as usize,
        col_min as usize,
        col_max as usize,
    ))
}

/// Apply the statistic over valid cells, or `None` when every cell is
/// no-data.
fn aggregate(
    raster: &DemRaster,
    method: AggMethod,
    row_min: usize,
    row_max: usize,
    col_min: usize,
    col_max: usize,
) -> Option<f32> {
    let mut sum = 0.0f64;
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut count = 0usize;

    for row in row_min..=row_max {
        for col in col_min..=col_max {
            let value = raster.value_at(row, col);
            if raster.is_nodata(value) {
                continue;
            }
            sum += value as f64;
            min = min.min(value);
            max = max.max(value);
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }

    let result = match method {
        AggMethod::Mean => (sum / count as f64) as f32,
        AggMethod::Sum => sum as f32,
        AggMethod::Min => min,
        AggMethod::Max => max,
    };
    Some(result)
}
