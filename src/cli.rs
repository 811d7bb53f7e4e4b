use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::frame::{Direction, Realization};

#[derive(Parser, Debug)]
#[command(name = "trajframe")]
#[command(about = "Transform trajectories between ITRF2020 and ETRS89")]
#[command(version)]
pub struct Cli {
    /// Configuration file [default: ~/.config/trajframe/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert ITRF2020 positions to ETRS89 or back
    ItrfToEtrs(ItrfToEtrsArgs),

    /// Shift ETRS89 positions between the R2016 and R2025 realizations
    Gridshift(GridshiftArgs),
}

#[derive(Args, Debug)]
pub struct ItrfToEtrsArgs {
    /// Input trajectory file
    #[arg(long)]
    pub finp: PathBuf,

    /// Output trajectory file [default: output.traj]
    #[arg(long)]
    pub fout: Option<PathBuf>,

    /// Epoch of the conversion in decimal years, derived from the timestamps if omitted
    #[arg(long)]
    pub epoch: Option<f64>,

    /// EPSG code of the output [default: 4936 forward, 4978 inverse]
    #[arg(long = "target_epsg")]
    pub target_epsg: Option<u32>,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Direction::Forward)]
    pub direction: Direction,

    /// ETRS89 realization on the ETRS89 side
    #[arg(long, value_enum, default_value_t = Realization::R25)]
    pub realization: Realization,

    /// NTv2 grid from R2016 to R2025, used with R16 [default: R16_to_R25.gsb]
    #[arg(long)]
    pub gsb: Option<PathBuf>,

    /// Trajectory to compare the output against
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Print the transformed positions
    #[arg(long)]
    pub print: bool,
}

#[derive(Args, Debug)]
pub struct GridshiftArgs {
    /// Input trajectory file
    #[arg(long)]
    pub finp: PathBuf,

    /// Output trajectory file [default: output.traj]
    #[arg(long)]
    pub fout: Option<PathBuf>,

    /// NTv2 grid from R2016 to R2025 [default: R16_to_R25.gsb]
    #[arg(long)]
    pub gsb: Option<PathBuf>,

    /// EPSG code of the output
    #[arg(long = "target_epsg", default_value_t = 4936)]
    pub target_epsg: u32,

    /// Forward shifts R2016 to R2025
    #[arg(long, value_enum, ignore_case = true, default_value_t = Direction::Forward)]
    pub direction: Direction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn itrf_to_etrs_defaults() {
        let cli = Cli::parse_from(["trajframe", "itrf-to-etrs", "--finp", "in.traj"]);
        let Commands::ItrfToEtrs(args) = cli.command else {
            panic!("expected itrf-to-etrs");
        };
        assert_eq!(args.finp, PathBuf::from("in.traj"));
        assert_eq!(args.fout, None);
        assert_eq!(args.epoch, None);
        assert_eq!(args.direction, Direction::Forward);
        assert_eq!(args.realization, Realization::R25);
        assert!(!args.print);
        assert!(!cli.verbose);
    }

    #[test]
    fn itrf_to_etrs_options() {
        let cli = Cli::parse_from([
            "trajframe",
            "-v",
            "itrf-to-etrs",
            "--finp",
            "in.traj",
            "--epoch",
            "2024.5",
            "--target_epsg",
            "25832",
            "--direction",
            "INVERSE",
            "--realization",
            "R16",
            "--print",
        ]);
        assert!(cli.verbose);
        let Commands::ItrfToEtrs(args) = cli.command else {
            panic!("expected itrf-to-etrs");
        };
        assert_eq!(args.epoch, Some(2024.5));
        assert_eq!(args.target_epsg, Some(25832));
        assert_eq!(args.direction, Direction::Inverse);
        assert_eq!(args.realization, Realization::R16);
        assert!(args.print);
    }

    #[test]
    fn gridshift_defaults() {
        let cli = Cli::parse_from(["trajframe", "gridshift", "--finp", "in.traj"]);
        let Commands::Gridshift(args) = cli.command else {
            panic!("expected gridshift");
        };
        assert_eq!(args.target_epsg, 4936);
        assert_eq!(args.direction, Direction::Forward);
        assert_eq!(args.gsb, None);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["trajframe", "gridshift"]).is_err());
    }
}
