//! Kickoff Simulator CLI
//!
//! Run deterministic match scenarios from the command line.

use clap::Parser;
use kickoff_core::MatchConfig;
use kickoff_sim::scenarios::ScenarioId;
use kickoff_sim::{ScenarioResult, ScenarioRunner};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Kickoff deterministic match simulator
#[derive(Parser, Debug)]
#[command(name = "kickoff-sim")]
#[command(about = "Run deterministic match scenarios for Kickoff", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (kickoff, scrimmage, pileup, formation_drill, breakaway, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Tick budget per run (defaults to each scenario's own)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Match configuration JSON; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export every tick to a JSON file for an external renderer
    #[arg(long)]
    export: Option<String>,
}

fn load_config(path: &Option<PathBuf>) -> MatchConfig {
    let Some(path) = path else {
        return MatchConfig::default();
    };

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| MatchConfig::from_json_str(&text).map_err(|e| e.to_string()));

    parsed.unwrap_or_else(|e| {
        eprintln!("Error: cannot load {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn report(result: &ScenarioResult) {
    if result.passed {
        info!(
            "✓ {} (seed={}) PASSED | {} - {} | claims={} kicks={}",
            result.scenario.name(),
            result.seed,
            result.metrics.goals[0],
            result.metrics.goals[1],
            result.metrics.claims,
            result.metrics.kicks
        );
    } else {
        error!(
            "✗ {} (seed={}) FAILED: {}",
            result.scenario.name(),
            result.seed,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Kickoff Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: kickoff, scrimmage, pileup, formation_drill, breakaway, all");
            std::process::exit(1);
        })]
    };

    let match_config = load_config(&args.config);

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let runner_for = |seed: u64| {
        let runner = ScenarioRunner::new(seed).with_config(match_config.clone());
        match args.ticks {
            Some(ticks) => runner.with_ticks(ticks),
            None => runner,
        }
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        info!("Running with export to: {}", export_path);
        let (result, export) = runner_for(base_seed).run_with_export(scenarios[0]);
        report(&result);

        match export.map(|export| export.write_to_file(export_path).map(|_| export.frames.len())) {
            Some(Ok(frames)) => info!("Exported {} frames to {}", frames, export_path),
            Some(Err(e)) => {
                error!("Failed to write export: {}", e);
                std::process::exit(1);
            }
            None => error!("Nothing to export: the scenario did not start"),
        }

        if !result.passed {
            std::process::exit(1);
        }
        return;
    }

    // Run simulations
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = runner_for(seed);

        for scenario in &scenarios {
            let result = runner.run(*scenario);
            if !args.json {
                report(&result);
            }
            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results,
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: cannot encode summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
