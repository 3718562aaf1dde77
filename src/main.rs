use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use territory_planner::extract::ExtractionPolicy;
use territory_planner::loader::TerritoryLoader;
use territory_planner::lp::GoodLpSolver;
use territory_planner::report::PhaseOutcome;
use territory_planner::solver::{Phase, PlannerResult, SolveOptions, plan_both};
use territory_planner::territory::WorkloadBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Balanced brick-to-representative assignment (distance, then disruption).
#[derive(Parser, Debug)]
#[command(name = "territory-planner", version, long_about = None)]
struct Args {
    /// CSV with columns `brick,index_value`
    #[arg(long, default_value = "data/bricks_index_values.csv")]
    index_values: PathBuf,

    /// CSV with columns `brick,rp1,rp2,...`
    #[arg(long, default_value = "data/brick_rp_distances.csv")]
    distances: PathBuf,

    /// CSV with columns `brick,rep` holding the current assignment
    #[arg(long, default_value = "data/initial_assignment.csv")]
    baseline: PathBuf,

    /// Minimum workload per representative (L)
    #[arg(long, default_value_t = 0.8)]
    min_workload: f64,

    /// Maximum workload per representative (U)
    #[arg(long, default_value_t = 1.2)]
    max_workload: f64,

    /// Accept feasible solutions whose optimality was not proven
    #[arg(long, default_value_t = false)]
    accept_feasible: bool,

    /// Resolve bricks with several selected representatives by largest value
    #[arg(long, default_value_t = false)]
    tie_break: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let loader = TerritoryLoader::new();
    let territory = loader.territory_from_paths(&args.index_values, &args.distances)?;
    let baseline = loader.baseline_from_path(&args.baseline)?;
    info!(
        bricks = territory.bricks().len(),
        reps = territory.reps().len(),
        baseline = baseline.len(),
        "inputs loaded"
    );

    let options = SolveOptions {
        bounds: WorkloadBounds::new(args.min_workload, args.max_workload),
        accept_feasible: args.accept_feasible,
        extraction: if args.tie_break {
            ExtractionPolicy::TieBreak
        } else {
            ExtractionPolicy::Strict
        },
    };

    let solver = GoodLpSolver::new();
    let PlannerResult { distance, disruption } =
        plan_both(&territory, &baseline, &solver, &options);
    let outcomes = [
        PhaseOutcome::new(Phase::MinimizeDistance, &distance),
        PhaseOutcome::new(Phase::MinimizeDisruption, &disruption),
    ];
    for err in [&distance, &disruption].into_iter().filter_map(|r| r.as_ref().err()) {
        error!(error = %err, "phase failed");
    }

    match args.format {
        OutputFormat::Text => {
            for outcome in &outcomes {
                println!("{outcome}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
    }

    if outcomes.iter().any(PhaseOutcome::is_failure) {
        return Err("at least one planning phase failed".into());
    }
    Ok(())
}
