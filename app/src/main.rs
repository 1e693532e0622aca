use std::{
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use chrono::Local;
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;

use coordinate_transformer::{CoordinateReprojector, ProjOptions};
use mound_detector::{
    BorderMode, Detector as _, Mound, MoundError, MoundPipelineBuilder, PipelineConfig,
    PipelineError,
};
use pcd_core::{raster::PixelAnchor, region::BoundingBox};
use pcd_exporter::{export_to_path, ExportError, OutputFormat};
use pcd_gridder::{GdalGridCommand, GridAlgorithm, GridSize, Gridder, InProcessGridder};
use pcd_parser::{
    reader::{las::LasPointReader, PointCloudReader as _},
    region::load_polygon,
    ParseError,
};

#[derive(Parser, Debug)]
#[command(
    name = "Mound Finder",
    about = "Finds mound-shaped local maxima in a LiDAR survey",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    /// LAS or LAZ point cloud.
    #[arg(short, long, required = true, value_name = "FILE")]
    input: PathBuf,

    /// GeoJSON polygon of the region of interest (WGS84).
    #[arg(short, long, required = true, value_name = "FILE")]
    region: PathBuf,

    /// Additional crop: lon_min,lat_min,lon_max,lat_max.
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// CRS of the input when its own record is missing or wrong (WKT, PROJ string or EPSG:xxxx).
    #[arg(long)]
    source_crs: Option<String>,

    /// Input coordinates are already longitude/latitude; skip PROJ.
    #[arg(long, conflicts_with = "source_crs")]
    geographic: bool,

    /// Directory holding proj.db.
    #[arg(long, value_name = "DIR")]
    proj_data: Option<PathBuf>,

    #[arg(long, default_value_t = 670.0)]
    height_cutoff: f64,

    #[arg(long, default_value_t = 646.0)]
    elevation_threshold: f64,

    #[arg(long, default_value_t = 2.0)]
    sigma: f64,

    #[arg(long, value_enum, default_value_t = Border::Nearest)]
    border: Border,

    #[arg(long, default_value_t = 1)]
    min_distance: usize,

    /// Report maxima closer than min-distance to the raster edge.
    #[arg(long)]
    keep_border: bool,

    #[arg(long, value_enum, default_value_t = Anchor::Center)]
    anchor: Anchor,

    #[arg(long, value_enum, default_value_t = GridderKind::Gdal)]
    gridder: GridderKind,

    /// gdal_grid executable.
    #[arg(long, default_value = "gdal_grid", value_name = "PATH")]
    gdal_grid: PathBuf,

    /// Seconds before gdal_grid is killed.
    #[arg(long, default_value_t = 600)]
    grid_timeout: u64,

    #[arg(long, default_value_t = 1)]
    grid_retries: u32,

    #[arg(long, default_value_t = 256)]
    grid_width: usize,

    #[arg(long, default_value_t = 256)]
    grid_height: usize,

    #[arg(long, value_enum, default_value_t = Algorithm::Invdist)]
    algorithm: Algorithm,

    #[arg(long, default_value_t = 2.0)]
    idw_power: f64,

    #[arg(long, default_value_t = 0.0)]
    idw_smoothing: f64,

    /// Output file; format follows the extension unless --format is given.
    #[arg(short, long, required = true, value_name = "FILE")]
    output: PathBuf,

    #[arg(long, value_enum)]
    format: Option<Format>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Border {
    Nearest,
    Reflect,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Anchor {
    Center,
    Corner,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum GridderKind {
    Gdal,
    InProcess,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Algorithm {
    Invdist,
    Nearest,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Csv,
    Geojson,
    #[value(alias = "shp")]
    Shapefile,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] MoundError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in bounding box: {e}"))?;
    match values[..] {
        [lon_min, lat_min, lon_max, lat_max] => {
            BoundingBox::new(lon_min, lat_min, lon_max, lat_max).map_err(|e| e.to_string())
        }
        _ => Err(format!("expected 4 comma-separated values, got {}", values.len())),
    }
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            height_cutoff: self.height_cutoff,
            elevation_threshold: self.elevation_threshold,
            sigma: self.sigma,
            border: match self.border {
                Border::Nearest => BorderMode::Nearest,
                Border::Reflect => BorderMode::Reflect,
            },
            min_distance: self.min_distance,
            exclude_border: !self.keep_border,
            anchor: match self.anchor {
                Anchor::Center => PixelAnchor::Center,
                Anchor::Corner => PixelAnchor::Corner,
            },
            bbox: self.bbox,
        }
    }

    fn reprojector(&self) -> CoordinateReprojector {
        if self.geographic {
            return CoordinateReprojector::identity();
        }
        let reprojector = CoordinateReprojector::new(ProjOptions {
            data_dir: self.proj_data.clone(),
            network: false,
        });
        match &self.source_crs {
            Some(crs) => reprojector.with_source_crs(crs.clone()),
            None => reprojector,
        }
    }

    fn gridder(&self) -> Box<dyn Gridder> {
        match self.gridder {
            GridderKind::Gdal => Box::new(GdalGridCommand {
                program: self.gdal_grid.clone(),
                timeout: Duration::from_secs(self.grid_timeout),
                retries: self.grid_retries,
                ..GdalGridCommand::default()
            }),
            GridderKind::InProcess => Box::new(InProcessGridder),
        }
    }

    fn algorithm(&self) -> GridAlgorithm {
        match self.algorithm {
            Algorithm::Invdist => GridAlgorithm::InverseDistance {
                power: self.idw_power,
                smoothing: self.idw_smoothing,
            },
            Algorithm::Nearest => GridAlgorithm::NearestNeighbor,
        }
    }

    fn output_format(&self) -> OutputFormat {
        match self.format {
            Some(Format::Csv) => OutputFormat::Csv,
            Some(Format::Geojson) => OutputFormat::GeoJson,
            Some(Format::Shapefile) => OutputFormat::Shapefile,
            None => OutputFormat::from_path(&self.output),
        }
    }
}

fn run(args: &Cli) -> Result<usize, AppError> {
    let region = load_polygon(&args.region)?;
    log::info!(
        "region: {} vertices from {:?}",
        region.vertices().len(),
        args.region
    );

    let pipeline = MoundPipelineBuilder::new(region)
        .config(args.pipeline_config())
        .reprojector(args.reprojector())
        .gridder(args.gridder())
        .algorithm(args.algorithm())
        .grid_size(GridSize::new(args.grid_width, args.grid_height))
        .build()?;

    let cloud = LasPointReader::new(&args.input).read_cloud()?;

    let mounds: Vec<Mound> = match pipeline.execute(cloud) {
        Ok(mounds) => mounds,
        Err(err) if err.is_empty_region() => {
            log::warn!("{err}; writing an empty result");
            Vec::new()
        }
        Err(err) => return Err(err.into()),
    };

    write_output(&args.output, args.output_format(), &mounds)?;
    Ok(mounds.len())
}

fn write_output(path: &Path, format: OutputFormat, mounds: &[Mound]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    export_to_path(path, format, mounds)
}

fn main() -> ExitCode {
    let args = Cli::parse();

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(
            None,
            if args.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        )
        .init();

    log::info!("input file: {:?}", args.input);
    log::info!("region: {:?}", args.region);
    log::info!("output file: {:?}", args.output);
    log::info!(
        "height cutoff: {}, elevation threshold: {}, sigma: {}",
        args.height_cutoff,
        args.elevation_threshold,
        args.sigma
    );

    let start = std::time::Instant::now();
    match run(&args) {
        Ok(count) => {
            log::info!("{} mounds found in {:?}", count, start.elapsed());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Cli {
        let mut argv = vec![
            "mound-finder",
            "-i",
            "survey.laz",
            "-r",
            "region.json",
            "-o",
            "out/mounds.geojson",
        ];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.pipeline_config(), PipelineConfig::default());
        assert_eq!(cli.algorithm(), GridAlgorithm::default());
        assert_eq!(cli.output_format(), OutputFormat::GeoJson);
        assert_eq!(cli.gridder().name(), "gdal_grid");
        assert_eq!(cli.grid_timeout, 600);
        assert_eq!((cli.grid_width, cli.grid_height), (256, 256));
    }

    #[test]
    fn options_map_to_configuration() {
        let cli = parse(&[
            "--bbox",
            "-83.44,39.36,-83.42,39.38",
            "--height-cutoff",
            "700",
            "--sigma",
            "1.5",
            "--border",
            "reflect",
            "--keep-border",
            "--anchor",
            "corner",
            "--gridder",
            "in-process",
            "--algorithm",
            "nearest",
            "--format",
            "csv",
        ]);
        let config = cli.pipeline_config();
        assert_eq!(config.height_cutoff, 700.0);
        assert_eq!(config.sigma, 1.5);
        assert_eq!(config.border, BorderMode::Reflect);
        assert!(!config.exclude_border);
        assert_eq!(config.anchor, PixelAnchor::Corner);
        assert_eq!(
            config.bbox,
            Some(BoundingBox::new(-83.44, 39.36, -83.42, 39.38).unwrap())
        );
        assert_eq!(cli.gridder().name(), "in-process");
        assert_eq!(cli.algorithm(), GridAlgorithm::NearestNeighbor);
        assert_eq!(cli.output_format(), OutputFormat::Csv);
    }

    #[test]
    fn bbox_validation() {
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("1,2,x,4").is_err());
        assert!(parse_bbox("3,2,1,4").is_err());
        assert!(parse_bbox(" 1, 2, 3, 4").is_ok());
    }

    #[test]
    fn geographic_conflicts_with_source_crs() {
        assert!(Cli::try_parse_from([
            "mound-finder",
            "-i",
            "a.las",
            "-r",
            "r.json",
            "-o",
            "o.csv",
            "--geographic",
            "--source-crs",
            "EPSG:32617",
        ])
        .is_err());
    }

    #[test]
    fn shapefile_output_by_flag_or_extension() {
        assert_eq!(parse(&["--format", "shp"]).output_format(), OutputFormat::Shapefile);
        let cli = Cli::try_parse_from([
            "mound-finder",
            "-i",
            "a.las",
            "-r",
            "r.json",
            "-o",
            "out/mounds.shp",
        ])
        .unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Shapefile);
    }

    #[test]
    fn empty_result_is_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mounds.csv");
        write_output(&path, OutputFormat::Csv, &[]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "lon,lat,elevation,row,col\n"
        );
    }
}
