/// Affine transformation between pixel indices and geocoordinates.
///
/// Maps pixel `(row, col)` to geocoordinate `(x, y)`:
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// All sampling code assumes a north-up raster (`pixel_width > 0`,
/// `pixel_height < 0`, zero rotation terms); use [`GeoTransform::is_north_up`]
/// to check an input before trusting pixel lookups on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size in the X direction
    pub pixel_width: f64,
    /// Cell size in the Y direction, negative for north-up rasters
    pub pixel_height: f64,
    /// Rotation term (usually 0)
    pub row_rotation: f64,
    /// Rotation term (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a north-up transform with no rotation.
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Create from a GDAL-style coefficient array
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Convert to a GDAL-style coefficient array.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Convert a geocoordinate to pixel indices `(row, col)`.
    ///
    /// Uses round-half-to-even, so a point exactly on a pixel boundary maps
    /// to the even-numbered neighbor. Rotation terms are ignored. Indices may
    /// be negative or past the raster extent; callers are expected to bounds
    /// check against the raster dimensions.
    pub fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let row = ((y - self.origin_y) / self.pixel_height).round_ties_even() as i64;
        let col = ((x - self.origin_x) / self.pixel_width).round_ties_even() as i64;
        (row, col)
    }

    /// Convert pixel indices to the geocoordinate of the pixel's
    /// upper-left corner.
    pub fn to_geo(&self, row: i64, col: i64) -> (f64, f64) {
        let row = row as f64;
        let col = col as f64;
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }

    /// Whether this is a north-up transform with no rotation.
    pub fn is_north_up(&self) -> bool {
        self.row_rotation == 0.0
            && self.col_rotation == 0.0
            && self.pixel_width > 0.0
            && self.pixel_height < 0.0
    }
}
