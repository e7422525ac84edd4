use anyhow::{Context, Result};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{Geometry, LayerAccess, LayerOptions};
use gdal::DriverManager;
use std::path::Path;

use crate::bounds::BoundingBox;
use crate::raster::DemRaster;

#[derive(Default)]
pub struct GeoTiffWriter {}

impl GeoTiffWriter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn write(&self, raster: &DemRaster, output_path: &Path) -> Result<()> {
        let (rows, cols) = raster.shape();

        tracing::info!(
            "Writing GeoTIFF: {} x {} pixels, {} band(s)",
            cols,
            rows,
            raster.band_count()
        );

        // GTiffドライバーを取得
        let driver =
            DriverManager::get_driver_by_name("GTiff").context("Failed to get GTiff driver")?;

        // データセットを作成
        let mut dataset = driver
            .create_with_band_type::<f32, _>(output_path, cols, rows, raster.band_count())
            .context("Failed to create dataset")?;

        // ジオトランスフォームを設定
        dataset
            .set_geo_transform(&raster.transform.to_gdal())
            .context("Failed to set geo transform")?;

        // 座標系を設定
        if let Some(wkt) = &raster.projection {
            dataset
                .set_projection(wkt)
                .context("Failed to set projection")?;
        }

        // バンドにデータを書き込み
        for (index, band_data) in raster.bands.iter().enumerate() {
            let mut band = dataset
                .rasterband(index + 1)
                .with_context(|| format!("Failed to get raster band {}", index + 1))?;

            // NoData値を設定
            if let Some(nodata) = raster.nodata {
                band.set_no_data_value(Some(nodata as f64))
                    .context("Failed to set no data value")?;
            }

            // データを書き込み（GDALは行優先順を期待）
            let mut buffer = Buffer::new((cols, rows), band_data.clone());
            band.write((0, 0), (cols, rows), &mut buffer)
                .with_context(|| format!("Failed to write raster band {}", index + 1))?;
        }

        Ok(())
    }

    /// Write a bounding box as a single-polygon ESRI Shapefile.
    pub fn write_bounds_shapefile(
        &self,
        bounds: &BoundingBox,
        projection: Option<&str>,
        output_path: &Path,
    ) -> Result<()> {
        // Shapefileドライバーを取得
        let driver = DriverManager::get_driver_by_name("ESRI Shapefile")
            .context("Failed to get ESRI Shapefile driver")?;

        let mut dataset = driver
            .create_vector_only(output_path)
            .context("Failed to create shapefile")?;

        // 座標系を設定
        let srs = match projection {
            Some(wkt) => {
                Some(SpatialRef::from_wkt(wkt).context("Failed to parse projection WKT")?)
            }
            None => None,
        };

        let mut layer = dataset
            .create_layer(LayerOptions {
                name: "minimum_bb",
                srs: srs.as_ref(),
                ..Default::default()
            })
            .context("Failed to create layer")?;

        // バウンディングボックスのポリゴンを作成
        let wkt = format!(
            "POLYGON(({0} {1},{2} {1},{2} {3},{0} {3},{0} {1}))",
            bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
        );
        let geometry = Geometry::from_wkt(&wkt).context("Failed to build polygon geometry")?;

        layer
            .create_feature(geometry)
            .context("Failed to write bounding box feature")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_dem;
    use crate::transform::GeoTransform;
    use gdal::Dataset;
    use std::sync::Once;
    use tempfile::TempDir;

    static INIT: Once = Once::new();

    fn init_gdal() -> bool {
        INIT.call_once(|| {
            // GDALの初期化を試みる
        });

        // GTiffドライバーが利用可能かチェック
        DriverManager::get_driver_by_name("GTiff").is_ok()
    }

    fn create_test_raster() -> DemRaster {
        DemRaster::new(
            2,
            3,
            GeoTransform::new(135.0, 35.0, 0.001, -0.001),
            None,
            Some(-9999.0),
            vec![vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_write_geotiff() {
        if !init_gdal() {
            eprintln!("Skipping test: GTiff driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("test.tif");

        let raster = create_test_raster();
        let writer = GeoTiffWriter::new();

        writer.write(&raster, &output_path).unwrap();

        // ファイルが作成されたことを確認
        assert!(output_path.exists());

        // GDALで読み返してテスト
        let dataset = Dataset::open(&output_path).unwrap();
        assert_eq!(dataset.raster_size(), (3, 2));

        let transform = dataset.geo_transform().unwrap();
        assert_eq!(transform[0], 135.0); // origin_x
        assert_eq!(transform[1], 0.001); // pixel_width

        let band = dataset.rasterband(1).unwrap();
        let nodata = band.no_data_value().unwrap();
        assert_eq!(nodata, -9999.0);
    }

    #[test]
    fn test_write_read_roundtrip() {
        if !init_gdal() {
            eprintln!("Skipping test: GTiff driver not available");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("roundtrip.tif");

        let raster = create_test_raster();
        let writer = GeoTiffWriter::new();
        writer.write(&raster, &output_path).unwrap();

        let loaded = read_dem(&output_path).unwrap();

        assert_eq!(loaded.shape(), raster.shape());
        assert_eq!(loaded.transform, raster.transform);
        assert_eq!(loaded.nodata, raster.nodata);
        assert_eq!(loaded.bands, raster.bands);
    }

    #[test]
    fn test_write_bounds_shapefile() {
        if !init_gdal() {
            eprintln!("Skipping test: GTiff driver not available");
            return;
        }
        if DriverManager::get_driver_by_name("ESRI Shapefile").is_err() {
            eprintln!("Skipping test: ESRI Shapefile driver not available");
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("minimum_bb.shp");

        let bounds = BoundingBox::new(0.0, 0.0, 10.0, 5.0).unwrap();
        let writer = GeoTiffWriter::new();
        writer
            .write_bounds_shapefile(&bounds, None, &output_path)
            .unwrap();

        assert!(output_path.exists());

        // 読み返してポリゴンの範囲を確認
        let dataset = Dataset::open(&output_path).unwrap();
        let mut layer = dataset.layer(0).unwrap();
        let feature = layer.features().next().unwrap();
        let geometry = feature.geometry().unwrap();
        let envelope = geometry.envelope();
        assert_eq!(envelope.MinX, 0.0);
        assert_eq!(envelope.MaxX, 10.0);
        assert_eq!(envelope.MinY, 0.0);
        assert_eq!(envelope.MaxY, 5.0);
    }
}
