//! Entry point for the masked-stats application.
//! Handles CLI parsing, file loading, and runs one statistics pass over the chosen variable.

use clap::Parser;
use masked_stats::netcdf_io::{read_image, read_mask, StatisticsSource, StatisticsWriter};
use masked_stats::parallel::{compute_statistics, ParallelConfig};
use masked_stats::statistics::ReductionController;
use netcdf::open;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file = open(&args.file)?;
    if args.verbose {
        println!("Successfully opened NetCDF file: {}", args.file.display());
    }

    let image = read_image(&file, &args.variable, args.vector)?;
    let mask = args
        .mask
        .as_deref()
        .map(|name| read_mask(&file, name))
        .transpose()?;

    let mut controller = ReductionController::new();
    controller.set_mask(mask)?;
    controller.set_remove_na(args.remove_na)?;

    let config = ParallelConfig::new(args.threads);
    let result = compute_statistics(&mut controller, &image, &config)?;

    if args.json {
        println!("{}", result.to_json()?);
    } else {
        println!("\n Statistics for Variable: {}", args.variable);
        println!("================================");
        println!("{result}");
        if !result.has_finite_moments() {
            println!("\n⚠ Fewer than two samples selected; mean/variance/sigma are not finite");
        }
    }

    if let Some(output_path) = &args.output_netcdf {
        let source = StatisticsSource {
            variable: &args.variable,
            mask_variable: args.mask.as_deref(),
            remove_na: args.remove_na,
        };
        StatisticsWriter::new(output_path).write_result(&result, &source)?;
        println!("✅ Saved result to {}", output_path.display());
    }

    Ok(())
}
