mod app;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dislocation_network::{Bounds, LoadOptions, Vec3};

/// Reconstruct and classify the dislocation network of a ParaDiS dump
#[derive(Parser, Debug)]
#[command(name = "dislocation-network", version, about)]
struct Cli {
    /// Dump file to load
    path: PathBuf,

    /// Lower corner of the visible subspace
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        requires = "subspace_max"
    )]
    subspace_min: Option<Vec<f64>>,

    /// Upper corner of the visible subspace
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        requires = "subspace_min"
    )]
    subspace_max: Option<Vec<f64>>,

    /// Processor index of a split run (requires --num-procs)
    #[arg(long, requires = "num_procs", conflicts_with = "subspace_min")]
    proc: Option<u32>,

    /// Number of processors in a split run; must be a power of two
    #[arg(long, requires = "proc")]
    num_procs: Option<u32>,

    /// Export the network to file (supports .json and .json.gz)
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Print the arm statistics report
    #[arg(long)]
    stats: bool,
}

fn to_vec3(v: &[f64]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let subspace = match (&cli.subspace_min, &cli.subspace_max) {
        (Some(min), Some(max)) => Some(Bounds::new(to_vec3(min), to_vec3(max))),
        _ => None,
    };
    let proc_split = cli.proc.zip(cli.num_procs);

    let config = app::AppConfig {
        path: cli.path,
        options: LoadOptions {
            subspace,
            proc_split,
        },
        export_path: cli.export,
        print_stats: cli.stats,
    };

    match app::run_headless(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
