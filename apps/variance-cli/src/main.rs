//! variance CLI
//!
//! Validates rendered content variants against an extracted claim set.
//!
//! - `variance check`: one rendered file, report JSON on stdout
//! - `variance run`: a batch of rendered files, persisted to an output directory
//!
//! Exit status is 0 when everything validated passed, 2 when a variant failed
//! compliance, and 1 on any other error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shared_types::VariantKind;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

const EXIT_NONCOMPLIANT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "variance")]
#[command(version, about = "Compliance validation for rendered content variants")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate one rendered variant and print its compliance report
    Check {
        /// Extraction output: {"claims": [...]}
        #[arg(long)]
        claims: PathBuf,

        /// Rendering style of the file
        #[arg(long, default_value = "grouped_bar")]
        variant: VariantKind,

        /// Pipeline configuration; only the [engine] section is used
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rendered markup to validate
        rendered: PathBuf,
    },

    /// Validate a batch of rendered variants and persist the results
    Run {
        /// Extraction output: {"claims": [...]}
        #[arg(long)]
        claims: PathBuf,

        /// Rendered variant as KIND=PATH, e.g. timeline=out/timeline.html
        #[arg(long = "variant", value_parser = commands::parse_variant_arg, required = true)]
        variants: Vec<(VariantKind, PathBuf)>,

        /// Pipeline configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory, overrides the configured one
        #[arg(long)]
        out: Option<PathBuf>,

        /// Minimum claim count, overrides the configured one
        #[arg(long)]
        min_claims: Option<usize>,

        /// Only expect the variants given on the command line
        #[arg(long)]
        only_given: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // stdout carries reports; logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let passed = match args.command {
        Command::Check {
            claims,
            variant,
            config,
            rendered,
        } => {
            let config = commands::load_config(config.as_deref())?;
            let output = commands::check(&claims, variant, &rendered, config.engine)?;
            println!("{}", output.json);
            output.passed
        }
        Command::Run {
            claims,
            variants,
            config,
            out,
            min_claims,
            only_given,
        } => {
            let mut config = commands::load_config(config.as_deref())?;
            if let Some(min_claims) = min_claims {
                config.pipeline.min_claims = min_claims;
            }
            if only_given {
                config.pipeline.variants = variants.iter().map(|(kind, _)| *kind).collect();
            }
            let out_dir = out.unwrap_or_else(|| config.pipeline.output_dir.clone());

            let output = commands::run(&claims, &variants, &config, &out_dir)?;
            println!("{}", commands::summarize(&output.outcome));
            tracing::info!("Wrote {} files to {}", output.written.len(), out_dir.display());
            output.outcome.all_passed()
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NONCOMPLIANT)
    })
}
