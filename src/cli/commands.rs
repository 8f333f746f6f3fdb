//! Command execution logic for the survey processor CLI.

use std::path::Path;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use tracing::{debug, info};

use crate::cli::args::{Args, Commands};
use crate::config::PipelineConfig;
use crate::constants::{FIELD_OUTPUT_FILE, MEANS_OUTPUT_FILE};
use crate::error::Result;
use crate::field::FieldDataProcessor;
use crate::models::OutputReport;
use crate::weather::WeatherDataProcessor;

/// Main command runner: set up logging, load configuration, dispatch.
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);

    info!("starting survey processor");
    debug!("command line arguments: {:?}", args);

    args.validate()?;
    let config = PipelineConfig::load(args.config_file.as_deref())?;

    match args.command.clone().unwrap_or(Commands::Run) {
        Commands::Fields => run_fields(&args, &config).await?,
        Commands::Weather => run_weather(&args, &config).await?,
        Commands::Run => {
            run_fields(&args, &config).await?;
            run_weather(&args, &config).await?;
        }
    }

    Ok(())
}

async fn run_fields(args: &Args, config: &PipelineConfig) -> Result<()> {
    let spinner = create_spinner("Processing field survey data", args.quiet);

    let mut processor = FieldDataProcessor::new(config);
    let stats = processor.process().await?;

    spinner.finish_and_clear();

    let mut report = OutputReport::default();
    if let (Some(dir), Some(df)) = (&args.output_path, processor.data()) {
        let path = dir.join(FIELD_OUTPUT_FILE);
        let size = write_parquet(df, &path)?;
        report.files.push((path, size));
    }

    if !args.quiet {
        println!("{}", "Field pipeline".bright_green().bold());
        println!(
            "  {} {}",
            "Rows ingested:".bright_cyan(),
            stats.rows_ingested.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Rows after merge:".bright_cyan(),
            stats.rows_merged.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Values normalized:".bright_cyan(),
            stats.values_normalized.to_string().bright_white()
        );
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        print_outputs(&report);
    }

    Ok(())
}

async fn run_weather(args: &Args, config: &PipelineConfig) -> Result<()> {
    let spinner = create_spinner("Processing weather station messages", args.quiet);

    let mut processor = WeatherDataProcessor::new(config)?;
    let stats = processor.process().await?;
    let means = processor.station_means()?;

    spinner.finish_and_clear();

    let mut report = OutputReport::default();
    if let Some(dir) = &args.output_path {
        let path = dir.join(MEANS_OUTPUT_FILE);
        let size = write_parquet(&means, &path)?;
        report.files.push((path, size));
    }

    if !args.quiet {
        println!("{}", "Weather pipeline".bright_green().bold());
        println!(
            "  {} {}",
            "Messages ingested:".bright_cyan(),
            stats.messages_ingested.to_string().bright_white()
        );
        println!(
            "  {} {} matched, {} missed",
            "Extraction:".bright_cyan(),
            stats.measurements_extracted.to_string().bright_white(),
            stats.extraction_misses.to_string().bright_white()
        );
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!("\n{}", "Mean measurement per station".bright_yellow());
        println!("{}", means);
        print_outputs(&report);
    }

    Ok(())
}

/// Set up structured logging. The subscriber is installed here, once, by
/// the binary; library code only emits events.
fn setup_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("agrisurvey_processor={}", args.get_log_level()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn create_spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("static template is well-formed"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}

fn write_parquet(df: &DataFrame, path: &Path) -> Result<u64> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let mut df = df.clone();
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut df)?;

    let size = std::fs::metadata(path)?.len();
    info!(path = %path.display(), size, "wrote parquet output");
    Ok(size)
}

fn print_outputs(report: &OutputReport) {
    for (path, size) in &report.files {
        println!(
            "  {} {} ({} bytes)",
            "Wrote:".bright_cyan(),
            path.display(),
            size
        );
    }
}
