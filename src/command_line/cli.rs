#![allow(clippy::cast_precision_loss)]

use anyhow::{bail, ensure, Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use planning_sat::planning::encoder::{EncoderOptions, Encoding};
use planning_sat::planning::problem::Problem;
use planning_sat::planning::{attempt, grounded, Attempt};
use planning_sat::sat::assignment::Model;
use planning_sat::sat::cnf::Cnf;
use planning_sat::sat::dimacs::parse_file;
use planning_sat::sat::dpll::Dpll;
use planning_sat::sat::literal::PackedLiteral;
use planning_sat::sat::solver::{SolutionStats, Solver};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Defines the command-line interface for the planner.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "planning-sat",
    version,
    about = "Classical planning by reduction to SAT"
)]
pub(crate) struct Cli {
    /// Verbosity level (-v, -vv, -vvv). `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Specifies the subcommand to execute (`plan`, `dimacs` or `completions`).
    #[clap(subcommand)]
    pub command: Commands,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Find a plan for a grounded planning problem.
    /// The problem is encoded into a CNF formula for a fixed horizon, which is then solved.
    Plan {
        /// Path to the grounded problem file. The format is described in `planning::grounded`.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        plan: PlanOptions,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF file in DIMACS format.
    Dimacs {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options controlling the planning encoding.
#[derive(Args, Debug, Clone)]
pub(crate) struct PlanOptions {
    /// Number of steps the plan may use.
    #[arg(long, default_value_t = 1)]
    pub(crate) horizon: usize,

    /// If set, try every horizon from `--horizon` up to this one and stop at the
    /// first that admits a plan.
    #[arg(long)]
    pub(crate) max_horizon: Option<usize>,

    /// Write the DIMACS CNF of each encoded horizon next to the problem file.
    #[arg(short, long, default_value_t = false)]
    pub(crate) export_dimacs: bool,

    /// Also encode negative preconditions.
    #[arg(long, default_value_t = false)]
    pub(crate) negative_preconditions: bool,
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable verification of the found solution against the formula (and, for
    /// plans, by simulating the plan).
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) verify: bool,

    /// Enable printing of performance and problem statistics after solving.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) stats: bool,

    /// Enable printing of the satisfying assignment (model) if the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,
}

/// Installs the `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` if set, otherwise from the `-v` count:
/// none prints warnings only, then `info`, `debug` and `trace`.
pub(crate) fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatches the parsed command line.
///
/// # Errors
///
/// Propagates failures to read input, write exported formulas, or verify a
/// solution.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Plan { path, plan, common } => solve_plan(&path, &plan, &common),
        Commands::Dimacs { path, common } => solve_dimacs(&path, &common),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "planning-sat",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

/// Loads a grounded problem and searches for a plan.
///
/// # Arguments
/// * `path` - The grounded problem file.
/// * `plan` - Horizon and encoding options.
/// * `common` - Verification and reporting options.
///
/// # Errors
///
/// Fails if the problem cannot be read, an export cannot be written, or
/// verification rejects the result.
pub(crate) fn solve_plan(path: &Path, plan: &PlanOptions, common: &CommonOptions) -> Result<()> {
    let max_horizon = plan.max_horizon.unwrap_or(plan.horizon);
    ensure!(
        max_horizon >= plan.horizon,
        "--max-horizon ({max_horizon}) is smaller than --horizon ({})",
        plan.horizon
    );

    let time = Instant::now();
    let problem = grounded::parse_file(path)
        .with_context(|| format!("failed to load problem {}", path.display()))?;
    let parse_time = time.elapsed();

    println!("Solving: {}", path.display());
    println!(
        "Problem: {} fluents, {} actions, {} goals",
        problem.fluents.len(),
        problem.actions.len(),
        problem.goal_state.len()
    );

    let options = EncoderOptions::new().with_negative_preconditions(plan.negative_preconditions);

    let mut result = None;
    for horizon in plan.horizon..=max_horizon {
        let outcome = attempt(&problem, horizon, &options);
        if plan.export_dimacs {
            export_dimacs(path, &outcome.encoding)?;
        }
        let found = outcome.is_satisfiable();
        result = Some(outcome);
        if found {
            break;
        }
    }
    let Some(result) = result else {
        bail!("no horizon to try");
    };

    if common.verify {
        verify_plan(&problem, &result, plan.negative_preconditions)?;
    }

    if common.stats {
        print_plan_stats(parse_time, &result);
    }

    if common.print_solution {
        if let Some(model) = &result.model {
            let literals = result.encoding.decode(model);
            println!("Model: {}", literals.iter().join(", "));
        }
    }

    match result.plan() {
        Some(found) => {
            println!("\nPlan ({} steps, horizon {}):", found.len(), result.horizon());
            print!("{found}");
        }
        None if plan.max_horizon.is_some() => {
            println!("\nNo plan within horizons {}..={max_horizon}", plan.horizon);
        }
        None => println!("\nNo plan of {} steps", plan.horizon),
    }
    Ok(())
}

/// Solves a DIMACS file with the DPLL solver.
///
/// # Errors
///
/// Fails if the file cannot be parsed or the model does not satisfy the formula.
pub(crate) fn solve_dimacs(path: &Path, common: &CommonOptions) -> Result<()> {
    let time = Instant::now();
    let cnf: Cnf = parse_file(path).with_context(|| format!("failed to parse {}", path.display()))?;
    let parse_time = time.elapsed();

    println!("Solving: {}", path.display());

    let time = Instant::now();
    let mut solver = Dpll::new(cnf.clone());
    let model = solver.solve();
    let elapsed = time.elapsed();
    info!(elapsed = ?elapsed, satisfiable = model.is_some(), "solved DIMACS formula");

    if common.verify {
        verify_solution(&cnf, model.as_ref())?;
    }

    if common.stats {
        print_stats(parse_time, elapsed, &cnf, &solver.stats());
    }

    if common.print_solution {
        if let Some(model) = &model {
            println!("Solution: {}", model.to_dimacs().iter().join(" "));
        }
    }

    report(model.is_some());
    Ok(())
}

/// Writes the encoding to `<problem>.h<horizon>.cnf`.
fn export_dimacs(problem_path: &Path, encoding: &Encoding) -> Result<()> {
    let mut name = problem_path.as_os_str().to_owned();
    name.push(format!(".h{}.cnf", encoding.horizon));
    let dimacs_path = PathBuf::from(name);

    std::fs::write(&dimacs_path, encoding.to_dimacs())
        .with_context(|| format!("unable to write {}", dimacs_path.display()))?;
    println!("DIMACS written to: {}", dimacs_path.display());
    Ok(())
}

/// Verifies a given solution against a CNF formula.
///
/// Prints whether the verification was successful. If `model` is `None`
/// (indicating UNSAT), it prints "UNSAT".
///
/// # Errors
///
/// Fails if some clause has no true literal under the model.
pub(crate) fn verify_solution(cnf: &Cnf, model: Option<&Model<PackedLiteral>>) -> Result<()> {
    if let Some(model) = model {
        let ok = cnf.verify(model);
        println!("Verified: {ok:?}");
        ensure!(ok, "solution failed verification");
    } else {
        println!("UNSAT");
    }
    Ok(())
}

/// Verifies the model against the formula, then replays the plan on the problem.
fn verify_plan(problem: &Problem, result: &Attempt, negative_preconditions: bool) -> Result<()> {
    verify_solution(&result.encoding.cnf, result.model.as_ref())?;
    if let Some(plan) = result.plan() {
        plan.validate(problem, negative_preconditions)
            .context("plan failed validation")?;
        println!("Plan validated: true");
    }
    Ok(())
}

/// Allocated and resident memory in MiB, if jemalloc statistics are available.
fn memory_mib() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
///
/// # Arguments
/// * `label` - The description of the statistic.
/// * `value` - The raw count for the statistic.
/// * `elapsed` - The elapsed time in seconds, used to calculate the rate.
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

fn print_plan_stats(parse_time: Duration, result: &Attempt) {
    let counts = &result.encoding.counts;

    println!("\n=======================[ Encoding Statistics ]========================");
    stat_line("Horizon", result.horizon());
    stat_line("Initial-state clauses", counts.initial);
    stat_line("Goal clauses", counts.goal);
    stat_line("Action clauses", counts.action);
    stat_line("Frame axioms", counts.frame);
    stat_line("Exclusion axioms", counts.exclusion);

    print_stats(parse_time, result.elapsed, &result.encoding.cnf, &result.stats);
}

/// Prints a summary of problem and search statistics.
///
/// # Arguments
/// * `parse_time` - Duration spent parsing the input.
/// * `elapsed` - Duration spent by the solver.
/// * `cnf` - The CNF formula.
/// * `s` - `SolutionStats` collected by the solver.
pub(crate) fn print_stats(parse_time: Duration, elapsed: Duration, cnf: &Cnf, s: &SolutionStats) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars.saturating_sub(1));
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line("Max depth", s.max_depth);
    if let Some((allocated, resident)) = memory_mib() {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

fn report(satisfiable: bool) {
    if satisfiable {
        println!("\nSATISFIABLE");
    } else {
        println!("\nUNSATISFIABLE");
    }
}
