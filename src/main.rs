use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use meteogrid::{parse_point_list, read_point_file, ForcingPipeline, PartitionScheme, QueryPoint};
use std::path::PathBuf;

/// Extract per-point forcing time series from gridded reanalysis snapshots.
#[derive(Parser)]
#[command(name = "meteogrid", version, about)]
struct Cli {
    /// Snapshot source directory (repeatable).
    #[arg(long = "data-dir", required = true)]
    data_dirs: Vec<PathBuf>,

    /// Output directory for series files, manifest, and cache.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Query coordinate as "lon,lat" (repeatable).
    #[arg(long = "point")]
    points: Vec<String>,

    /// File of "lon,lat" lines; '#' comments and blank lines ignored.
    #[arg(long)]
    point_file: Option<PathBuf>,

    /// Keep only snapshots on or after this date (YYYYMMDD).
    #[arg(long)]
    start_date: Option<String>,

    /// Keep only snapshots on or before this date (YYYYMMDD).
    #[arg(long)]
    end_date: Option<String>,

    /// Extract a single partition starting at this date (YYYYMMDD) instead
    /// of partitioning by calendar year.
    #[arg(long)]
    from_date: Option<String>,

    /// Recompute cache artifacts and overwrite existing series files.
    #[arg(long)]
    force: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .with_context(|| format!("invalid date '{value}', expected YYYYMMDD"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let points: Vec<QueryPoint> = if let Some(path) = &cli.point_file {
        read_point_file(path)?
    } else {
        parse_point_list(&cli.points)
    };
    if points.is_empty() {
        bail!("no query points supplied; use --point or --point-file");
    }

    let scheme = match &cli.from_date {
        Some(date) => PartitionScheme::FromDate(parse_date(date)?),
        None => PartitionScheme::CalendarYear,
    };
    let start_date = cli.start_date.as_deref().map(parse_date).transpose()?;
    let end_date = cli.end_date.as_deref().map(parse_date).transpose()?;

    let pipeline = ForcingPipeline::builder()
        .source_roots(cli.data_dirs)
        .output_dir(cli.output_dir.clone())
        .points(points)
        .scheme(scheme)
        .maybe_start_date(start_date)
        .maybe_end_date(end_date)
        .force(cli.force)
        .build();

    let summary = pipeline.run()?;
    println!(
        "Wrote {} series file(s), manifest `{}`, locations `{}`",
        summary.series_written,
        summary.manifest_path.display(),
        summary.locations_path.display()
    );
    Ok(())
}
