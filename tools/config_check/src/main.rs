use std::path::PathBuf;

use clap::Parser;
use triage_core::config::{ViewConfig, PRESET_NAMES};

#[derive(Debug, Parser)]
#[command(name = "config_check")]
#[command(about = "Validate view config files and built-in presets")]
struct Cli {
    /// View config JSON files to validate.
    paths: Vec<PathBuf>,

    /// Also validate every built-in preset.
    #[arg(long)]
    presets: bool,

    /// Print the resolved default filters of each valid config.
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    if cli.paths.is_empty() && !cli.presets {
        eprintln!("usage: config_check [--presets] [--verbose] <view_config.json>...");
        std::process::exit(2);
    }

    let mut failures = 0usize;
    if cli.presets {
        for name in PRESET_NAMES {
            let outcome = ViewConfig::preset(name)
                .ok_or_else(|| format!("preset {} missing", name))
                .and_then(|cfg| cfg.validate().map(|_| cfg).map_err(|e| e.to_string()));
            failures += report(&format!("preset:{}", name), outcome, cli.verbose);
        }
    }
    for path in &cli.paths {
        let outcome = ViewConfig::load(path).map_err(|e| e.to_string());
        failures += report(&path.display().to_string(), outcome, cli.verbose);
    }

    if failures > 0 {
        tracing::warn!(failures, "invalid view configs");
        std::process::exit(1);
    }
}

fn report(name: &str, outcome: Result<ViewConfig, String>, verbose: bool) -> usize {
    match outcome {
        Ok(cfg) => {
            println!(
                "OK {} view_id={} controls={} sortable={}",
                name,
                cfg.view_id,
                cfg.controls.len(),
                cfg.sortable_fields.join(",")
            );
            if verbose {
                match cfg.default_filters() {
                    Ok(fs) => {
                        for (control, c) in fs.iter() {
                            println!("  {} -> {} {}", control, c.kind_name(), c.describe());
                        }
                    }
                    Err(e) => println!("  default filters: {}", e),
                }
                if let Some(sort) = &cfg.default_sort {
                    println!("  default sort {}", serde_json::json!(sort));
                }
            }
            0
        }
        Err(e) => {
            println!("ERR {} {}", name, e);
            1
        }
    }
}
