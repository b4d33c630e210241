//! Chloride diffusion command-line interface.
//!
//! Evaluate the truncated diffusion series from parameter files and TOML job
//! configurations:
//! ```sh
//! chloride-cli run --params slab.txt
//! chloride-cli run --config job.toml --output results
//! chloride-cli evaluate --params slab.txt --max-index 15
//! chloride-cli defaults > slab.txt
//! chloride-cli validate --config job.toml
//! ```

mod config;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use chloride_core::series::evaluate;
use chloride_core::DEFAULT_PARAMETERS;

use crate::config::JobConfig;

#[derive(Parser)]
#[command(name = "chloride-cli")]
#[command(about = "Chloride ion diffusion in a rectangular solid (triple Fourier series)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where parameters come from.
#[derive(Args)]
struct Sources {
    /// Key-value parameter file (overrides the job's `parameter_file`).
    #[arg(short, long)]
    params: Option<PathBuf>,
    /// TOML job configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Sources {
    fn load_job(&self) -> Result<JobConfig> {
        match &self.config {
            Some(path) => config::load_config(path),
            None => Ok(JobConfig::default()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Track convergence of the series and report the final concentration.
    Run {
        #[command(flatten)]
        sources: Sources,
        /// Largest odd series depth (overrides the config file setting).
        #[arg(long)]
        max_cap: Option<u32>,
        /// Output directory (overrides the config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Evaluate the series once at a fixed truncation depth.
    Evaluate {
        #[command(flatten)]
        sources: Sources,
        /// Largest odd index summed along each axis.
        #[arg(long, default_value_t = 15)]
        max_index: u32,
    },
    /// Print the default parameter file.
    Defaults,
    /// Merge and validate parameters without evaluating anything.
    Validate {
        #[command(flatten)]
        sources: Sources,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { sources, max_cap, output } => {
            println!("Chloride Diffusion Analyzer");
            println!("===========================");
            let job = sources.load_job()?;
            let params = runner::resolve_parameters(&job, sources.params.as_deref())?;
            let max_cap = max_cap.unwrap_or(job.convergence.max_cap);

            let report = runner::run_convergence(&params, max_cap)?;
            runner::print_summary(&params, &report);

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_convergence_csv(&report, &params, &out_dir.join("convergence.csv"))?;
            }
            if job.output.save_json {
                runner::write_report_json(&report, &params, &out_dir.join("convergence.json"))?;
            }

            Ok(())
        }
        Commands::Evaluate { sources, max_index } => {
            let job = sources.load_job()?;
            let params = runner::resolve_parameters(&job, sources.params.as_deref())?;
            let value = evaluate(&params, max_index);
            println!("C(max_index={}) = {:.9}", max_index, value);
            Ok(())
        }
        Commands::Defaults => {
            print!("{}", chloride_input::write_parameters(&DEFAULT_PARAMETERS));
            Ok(())
        }
        Commands::Validate { sources } => {
            let job = sources.load_job()?;
            runner::resolve_parameters(&job, sources.params.as_deref())?;
            println!("Parameters are valid: {}", describe(&sources));
            Ok(())
        }
    }
}

fn describe(sources: &Sources) -> String {
    let names: Vec<String> = [sources.params.as_deref(), sources.config.as_deref()]
        .into_iter()
        .flatten()
        .map(|p: &Path| p.display().to_string())
        .collect();
    if names.is_empty() {
        "defaults".into()
    } else {
        names.join(", ")
    }
}
