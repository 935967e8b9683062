pub mod export;

use std::path::PathBuf;
use std::time::Instant;

use dislocation_network::{DataSet, LoadOptions, Result};

/// Configuration for a run from CLI arguments.
pub struct AppConfig {
    pub path: PathBuf,
    pub options: LoadOptions,
    pub export_path: Option<PathBuf>,
    pub print_stats: bool,
}

/// Load, report and optionally export one dump.
pub fn run_headless(config: &AppConfig) -> Result<()> {
    println!("Loading {}", config.path.display());

    print!("Reading header... ");
    let start = Instant::now();
    let mut data = DataSet::new(&config.path)?;
    println!("{:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    let bounds = data.bounds();
    println!(
        "Domain: [{:.1}, {:.1}, {:.1}] .. [{:.1}, {:.1}, {:.1}]",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    );

    data.apply_options(&config.options)?;

    print!("Reconstructing network... ");
    let start = Instant::now();
    data.read_data()?;
    println!("{:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    println!(
        "Network complete: {} nodes, {} segments, {} arms",
        data.num_nodes(),
        data.num_segments(),
        data.num_arms()
    );
    if !data.warnings().is_empty() {
        println!("{} classification warnings", data.warnings().len());
    }

    if config.print_stats {
        print!("{}", data.stats());
    }

    if let Some(path) = &config.export_path {
        export::export_network(&data, path)?;
    }
    Ok(())
}
