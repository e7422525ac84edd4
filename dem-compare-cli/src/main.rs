use anyhow::Result;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use dem_compare::{
    clip_to_bounds, common_bounds, dem_rmse, read_dem, sample_window, AggMethod, DemRaster,
    GeoTiffWriter, GrowPolicy, WindowSpec, WindowValue,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// 並列処理スレッド数（デフォルト: CPUコア数）
    #[arg(short, long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 2つのDEMをランダム点でサンプリングしてRMSEを計算
    Rmse {
        /// 1つ目のDEM
        dem1: PathBuf,

        /// 2つ目のDEM
        dem2: PathBuf,

        /// サンプル点数
        #[arg(short, long, default_value_t = 1000)]
        num_points: usize,

        /// 乱数シード（再現性のため）
        #[arg(long)]
        seed: Option<u64>,

        /// サンプリングの最大試行回数（デフォルト: 点数の1000倍）
        #[arg(long)]
        max_attempts: Option<usize>,
    },

    /// 複数のラスターを共通の最小バウンディングボックスにクリップ
    Clip {
        /// 入力ラスターファイルまたはディレクトリ
        #[arg(value_name = "SRC", required = true)]
        src: Vec<PathBuf>,

        /// ディレクトリ内で探すファイルの拡張子
        #[arg(short, long, default_value = ".tif")]
        suffix: String,

        /// 出力ディレクトリ（デフォルト: 各入力と同じディレクトリ）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// バウンディングボックスをShapefileとして出力
        #[arg(long)]
        write_shp: bool,
    },

    /// 点の周囲のウィンドウを集計してサンプリング
    Window {
        /// 入力DEM
        dem: PathBuf,

        /// X座標（ラスターと同じ座標系）
        #[arg(short, long, allow_negative_numbers = true)]
        x: f64,

        /// Y座標（ラスターと同じ座標系）
        #[arg(short, long, allow_negative_numbers = true)]
        y: f64,

        /// ウィンドウサイズ（ピクセル、奇数）
        #[arg(short, long, default_value_t = 3)]
        size: usize,

        /// 集計方法（mean, sum, min, max）
        #[arg(short, long, default_value = "mean")]
        agg: String,

        /// 全てNoDataの場合にウィンドウを拡大
        #[arg(long)]
        grow: bool,

        /// 拡大時の最大ウィンドウ面積（ピクセル数）
        #[arg(long, default_value_t = 100_000)]
        max_grow: usize,
    },
}

fn main() -> Result<()> {
    // ログの初期化
    tracing_subscriber::fmt::init();

    // CLI引数の解析
    let args = Args::parse();

    // 処理開始時間を記録
    let start_time = std::time::Instant::now();

    // スレッドプールの設定
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .expect("Failed to build thread pool");
    }

    match args.command {
        Command::Rmse {
            dem1,
            dem2,
            num_points,
            seed,
            max_attempts,
        } => run_rmse(&dem1, &dem2, num_points, seed, max_attempts)?,
        Command::Clip {
            src,
            suffix,
            output,
            write_shp,
        } => run_clip(&src, &suffix, output.as_deref(), write_shp)?,
        Command::Window {
            dem,
            x,
            y,
            size,
            agg,
            grow,
            max_grow,
        } => run_window(&dem, x, y, size, &agg, grow, max_grow)?,
    }

    // 処理時間を表示
    let elapsed = start_time.elapsed();
    info!("Total processing time: {:?}", elapsed);

    Ok(())
}

fn run_rmse(
    dem1: &Path,
    dem2: &Path,
    num_points: usize,
    seed: Option<u64>,
    max_attempts: Option<usize>,
) -> Result<()> {
    let max_attempts = max_attempts.unwrap_or_else(|| num_points.saturating_mul(1000));

    let rmse = dem_rmse(dem1, dem2, num_points, max_attempts, seed)?;
    println!("RMSE: {:.3}", rmse);

    Ok(())
}

fn run_clip(src: &[PathBuf], suffix: &str, output: Option<&Path>, write_shp: bool) -> Result<()> {
    // 入力ファイルを収集
    let dem_paths = collect_dem_paths(src, suffix)?;
    if dem_paths.is_empty() {
        anyhow::bail!("No input rasters found matching suffix '{}'", suffix);
    }
    info!("Found {} input rasters", dem_paths.len());

    // 出力ディレクトリの作成
    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    // ラスターを並列で読み込み
    let results: Vec<dem_compare::Result<DemRaster>> =
        dem_paths.par_iter().map(read_dem).collect();

    let mut rasters = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(raster) => rasters.push(raster),
            Err(e) => errors.push(format!("{}: {}", dem_paths[i].display(), e)),
        }
    }
    if !errors.is_empty() {
        error!("Failed to read {} rasters:", errors.len());
        for err in &errors {
            error!("  {}", err);
        }
        anyhow::bail!("{} rasters failed to read", errors.len());
    }

    // 共通の最小バウンディングボックスを計算
    let bounds = common_bounds(&rasters)?;
    info!(
        "Minimum bounding box: ({}, {}) to ({}, {})",
        bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
    );

    // 並列処理でクリップして出力
    let results: Vec<Result<()>> = rasters
        .par_iter()
        .zip(&dem_paths)
        .map(|(raster, path)| clip_and_write(raster, path, &bounds, output))
        .collect();

    // エラーをチェック
    let mut errors = Vec::new();
    for (i, result) in results.into_iter().enumerate() {
        if let Err(e) = result {
            errors.push(format!("{}: {}", dem_paths[i].display(), e));
        }
    }
    if !errors.is_empty() {
        error!("Failed to clip {} rasters:", errors.len());
        for err in &errors {
            error!("  {}", err);
        }
        anyhow::bail!("{} rasters failed to clip", errors.len());
    }

    if write_shp {
        // バウンディングボックスをShapefileとして出力
        let out_dir = match output {
            Some(dir) => dir.to_path_buf(),
            None => dem_paths[0]
                .parent()
                .unwrap_or(Path::new("."))
                .to_path_buf(),
        };
        let shp_path = out_dir.join("minimum_bb.shp");

        let writer = GeoTiffWriter::new();
        writer.write_bounds_shapefile(&bounds, rasters[0].projection.as_deref(), &shp_path)?;
        info!("Written bounding box: {:?}", shp_path);
    }

    Ok(())
}

fn clip_and_write(
    raster: &DemRaster,
    path: &Path,
    bounds: &dem_compare::BoundingBox,
    output: Option<&Path>,
) -> Result<()> {
    info!("Clipping {:?}...", path);
    let clipped = clip_to_bounds(raster, bounds)?;

    // 出力ファイル名を生成
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("raster");
    let output_filename = format!("{}_trans.tif", stem);
    let out_dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => path.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    let output_path = out_dir.join(&output_filename);

    let writer = GeoTiffWriter::new();
    writer.write(&clipped, &output_path)?;
    info!("Written GeoTIFF: {:?}", output_path);

    Ok(())
}

fn run_window(
    dem: &Path,
    x: f64,
    y: f64,
    size: usize,
    agg: &str,
    grow: bool,
    max_grow: usize,
) -> Result<()> {
    let method = parse_agg(agg)?;

    let raster = read_dem(dem)?;
    let spec = WindowSpec::square(size)?;
    let policy = if grow {
        GrowPolicy::Grow { max_area: max_grow }
    } else {
        GrowPolicy::Fixed
    };

    match sample_window(&raster, x, y, spec, method, policy)? {
        WindowValue::Valid(value) => println!("{}", value),
        WindowValue::AllNoData => {
            info!("No valid values within the window");
            println!("NoData");
        }
    }

    Ok(())
}

fn parse_agg(agg: &str) -> Result<AggMethod> {
    match agg {
        "mean" => Ok(AggMethod::Mean),
        "sum" => Ok(AggMethod::Sum),
        "min" => Ok(AggMethod::Min),
        "max" => Ok(AggMethod::Max),
        _ => anyhow::bail!(
            "Unsupported aggregation '{}'. Must be one of: mean, sum, min, max",
            agg
        ),
    }
}

fn collect_dem_paths(src: &[PathBuf], suffix: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for item in src {
        if item.is_dir() {
            // ディレクトリ内のファイルを再帰的に収集
            paths.extend(collect_matching_files(item, suffix)?);
        } else if item.is_file() {
            // 明示的に指定されたファイルはそのまま追加
            paths.push(item.clone());
        } else {
            error!("Invalid input path: {:?}", item);
            anyhow::bail!("Input path must be a file or directory");
        }
    }

    Ok(paths)
}

fn collect_matching_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    use std::sync::{Arc, Mutex};

    let files = Arc::new(Mutex::new(Vec::new()));

    // ディレクトリエントリを並列で収集
    let entries: Result<Vec<_>, _> = fs::read_dir(dir)?.collect();
    let entries = entries?;

    // エントリを並列処理
    entries
        .into_par_iter()
        .try_for_each(|entry| -> Result<()> {
            let path = entry.path();

            if path.is_dir() {
                // サブディレクトリを再帰的に探索
                let sub_files = collect_matching_files(&path, suffix)?;
                if !sub_files.is_empty() {
                    let mut files_guard = files.lock().unwrap();
                    files_guard.extend(sub_files);
                }
            } else if path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or(false, |name| name.ends_with(suffix))
            {
                let mut files_guard = files.lock().unwrap();
                files_guard.push(path);
            }
            Ok(())
        })?;

    let files = Arc::try_unwrap(files).unwrap().into_inner().unwrap();
    Ok(files)
}
