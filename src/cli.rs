use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use feynman::core::{Engine, GenerateRequest, IntegratorBackend};

#[derive(Parser)]
#[command(name = "genint")]
#[command(about = "Generate numerical integrators for C functions")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the integral of a C function
    Generate {
        /// C file declaring the integrand
        #[arg(short, long)]
        input: PathBuf,

        /// Name of the integrand function
        #[arg(short = 'I', long)]
        integrand: String,

        /// Output path without extension
        #[arg(short, long)]
        output: PathBuf,

        /// Name of the generated integral (defaults to <integrand>_integral)
        #[arg(short = 'O', long)]
        output_name: Option<String>,

        /// Extra header to include in the generated source (repeatable)
        #[arg(short, long = "dependency")]
        dependencies: Vec<String>,

        /// Header name the generated source includes
        #[arg(short = 'H', long)]
        header: Option<String>,

        /// Integrator backend
        #[arg(short, long, value_enum)]
        backend: Option<IntegratorBackend>,

        /// Number of integrand evaluations
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
        n_calls: Option<u64>,

        /// Include the integrand's file, keeping this many trailing path components
        #[arg(long, value_name = "N")]
        source_dependency: Option<usize>,
    },

    /// List the functions declared in a C file
    Inspect {
        /// C file to inspect
        file: PathBuf,

        /// Print the declarations as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Generate {
                input,
                integrand,
                output,
                output_name,
                dependencies,
                header,
                backend,
                n_calls,
                source_dependency,
            } => {
                let request = GenerateRequest {
                    integral_name: output_name,
                    dependencies,
                    header_include_name: header,
                    backend,
                    n_calls,
                    source_dependency_components: source_dependency,
                    ..GenerateRequest::new(input, integrand, output)
                };

                let files = engine.generate(&request)?;
                println!("{}", files.header.display());
                println!("{}", files.source.display());
                Ok(())
            }
            Commands::Inspect { file, json } => {
                let summaries = engine.inspect(&file)?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&summaries)?);
                    return Ok(());
                }

                for summary in summaries {
                    let extent = summary
                        .extent
                        .map(|e| format!("{}:{}-{}:{}", e.start_line, e.start_column, e.end_line, e.end_column))
                        .unwrap_or_else(|| "-".to_string());
                    let kind = if summary.has_body { "definition" } else { "prototype" };
                    println!("{}\t{}\t{}", extent, kind, summary.signature);
                }
                Ok(())
            }
        }
    }
}
