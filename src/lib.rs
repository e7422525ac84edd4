pub mod bounds;
pub mod clip;
pub mod error;
pub mod raster;
pub mod reader;
pub mod rmse;
pub mod sample;
pub mod transform;
pub mod window;
pub mod writer;

pub use bounds::BoundingBox;
pub use clip::{clip_to_bounds, common_bounds};
pub use error::{Error, Result};
pub use raster::{BandStack, DemRaster, SampleValue};
pub use reader::read_dem;
pub use rmse::{dem_rmse, rmse};
pub use sample::{sample_random_points, SamplePair};
pub use transform::GeoTransform;
pub use window::{sample_window, AggMethod, GrowPolicy, WindowSpec, WindowValue};
pub use writer::GeoTiffWriter;
