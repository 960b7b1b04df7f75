//! Defines command-line interface options using `clap` for the masked-stats tool.

use clap::Parser;
use std::path::PathBuf;

/// Masked image statistics over NetCDF variables
#[derive(Parser, Debug)]
#[command(
    version,
    name = "masked-stats",
    about = "Compute count/min/max/sum/mean/variance/sigma over the masked samples of a NetCDF variable"
)]
pub struct Args {
    /// Path to the NetCDF file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Variable holding the image samples
    #[arg(short, long)]
    pub variable: String,

    /// Variable holding the inclusion mask (value 1 selects a location)
    #[arg(short, long)]
    pub mask: Option<String>,

    /// Exclude NaN samples (and samples equal to `_FillValue`)
    #[arg(long, default_value_t = false)]
    pub remove_na: bool,

    /// Treat the variable's last dimension as pixel components
    #[arg(long, default_value_t = false)]
    pub vector: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Print the result as JSON instead of a text report
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Path to save the result as NetCDF attributes
    #[arg(long)]
    pub output_netcdf: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}
