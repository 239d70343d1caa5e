#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod pipelines;

use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use skyline_sfn::compile::compile;
use skyline_sfn::state::PrefixResolver;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::pipelines::Pipeline;

// Tracing target constants
pub const TRACING_TARGET_COMPILE: &str = "skyline_cli::compile";

#[derive(Debug, Parser)]
#[command(name = "skyline-cli", version, about = "Compile Skyline pipeline definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Prefix prepended to logical function names when resolving
    /// invocation targets.
    #[arg(
        long,
        env = "SKYLINE_ARN_PREFIX",
        default_value = "arn:aws:lambda:us-east-1:000000000000:function:"
    )]
    arn_prefix: String,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the compiled workflow definition document.
    Definition {
        /// Pipeline to compile.
        #[arg(value_enum)]
        pipeline: Pipeline,
    },
    /// Print the execution-role permission manifest.
    Permissions {
        /// Pipeline to collect permissions for.
        #[arg(value_enum)]
        pipeline: Pipeline,
    },
}

fn main() {
    let Err(error) = run() else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_COMPILE,
            error = %error,
            "definition build failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let resolver = PrefixResolver::new(&cli.arn_prefix);
    let (pipeline, permissions_only) = match &cli.command {
        Command::Definition { pipeline } => (*pipeline, false),
        Command::Permissions { pipeline } => (*pipeline, true),
    };

    let chain = pipelines::build(pipeline, &resolver)
        .with_context(|| format!("failed to assemble pipeline {pipeline}"))?;
    let compiled =
        compile(&chain).with_context(|| format!("failed to compile pipeline {pipeline}"))?;

    tracing::info!(
        target: TRACING_TARGET_COMPILE,
        pipeline = %pipeline,
        states = compiled.definition.states().len(),
        permissions = compiled.permissions.len(),
        "compiled pipeline"
    );

    let output = if permissions_only {
        if cli.pretty {
            serde_json::to_string_pretty(&compiled.permissions)?
        } else {
            serde_json::to_string(&compiled.permissions)?
        }
    } else if cli.pretty {
        compiled.definition.to_json_pretty()?
    } else {
        compiled.definition.to_json()?
    };
    println!("{output}");

    Ok(())
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
