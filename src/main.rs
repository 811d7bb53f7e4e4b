use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod crs;
mod epoch;
mod errors;
mod frame;
mod gridshift;
mod helmert;
mod pipeline;
mod report;
mod trajectory;

use cli::{Cli, Commands, GridshiftArgs, ItrfToEtrsArgs};
use config::Config;
use pipeline::{ItrfToEtrs, RealizationShift};
use trajectory::Trajectory;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("failed to load config file")?;
    match cli.command {
        Commands::ItrfToEtrs(args) => itrf_to_etrs(args, &config),
        Commands::Gridshift(args) => gridshift(args, &config),
    }
}

/// Logs go to stderr, filtered by `RUST_LOG`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn itrf_to_etrs(args: ItrfToEtrsArgs, config: &Config) -> Result<()> {
    let mut trajectory = read(&args.finp)?;

    let epoch = match args.epoch {
        Some(epoch) => epoch,
        None => {
            let epoch = epoch::mean_epoch(trajectory.tstamps())
                .context("failed to derive the epoch from the timestamps")?;
            println!("Using mean epoch: {epoch:.4} (year.month)");
            epoch
        }
    };

    let conversion = ItrfToEtrs {
        epoch,
        direction: args.direction,
        realization: args.realization,
        target_epsg: args.target_epsg,
        gsb: args.gsb.unwrap_or_else(|| config.defaults.gsb.clone()),
    };
    info!(?conversion, "converting");
    conversion
        .run(&mut trajectory)
        .context("failed to convert trajectory")?;

    let fout = args.fout.unwrap_or_else(|| config.defaults.fout.clone());
    trajectory
        .to_file(&fout)
        .with_context(|| format!("failed to write {}", fout.display()))?;

    if args.print {
        report::print_positions(io::stdout().lock(), trajectory.positions(), config.output.precision)?;
    }
    if let Some(path) = args.reference {
        let reference = read(&path)?;
        let differences = report::Differences::compute(&trajectory, reference)
            .context("failed to compare against reference")?;
        differences.print(io::stdout().lock())?;
    }
    Ok(())
}

fn gridshift(args: GridshiftArgs, config: &Config) -> Result<()> {
    let mut trajectory = read(&args.finp)?;

    let shift = RealizationShift {
        gsb: args.gsb.unwrap_or_else(|| config.defaults.gsb.clone()),
        direction: args.direction,
        target_epsg: args.target_epsg,
    };
    info!(?shift, "shifting realization");
    shift
        .run(&mut trajectory)
        .context("failed to shift trajectory")?;

    let fout = args.fout.unwrap_or_else(|| config.defaults.fout.clone());
    trajectory
        .to_file(&fout)
        .with_context(|| format!("failed to write {}", fout.display()))
}

fn read(path: &std::path::Path) -> Result<Trajectory> {
    Trajectory::from_file(path).with_context(|| format!("failed to read {}", path.display()))
}
