//! # planning-sat
//!
//! `planning-sat` finds sequential plans for grounded planning problems by
//! encoding them into CNF ("planning as satisfiability") and deciding the formula
//! with a Davis-Putnam / DPLL solver. It can also solve plain DIMACS files.
//!
//! ## Usage
//!
//! ```sh
//! planning-sat [-v...] <SUBCOMMAND>
//! ```
//!
//! ### Subcommands
//!
//! 1.  **`plan`**: Find a plan for a grounded problem file.
//!     ```sh
//!     planning-sat plan --path robot.plan --horizon 1
//!     # Try horizons 1, 2, ... 8 and stop at the first that admits a plan:
//!     planning-sat plan --path robot.plan --max-horizon 8
//!     # Also write the encoded formula of each horizon tried:
//!     planning-sat plan --path robot.plan --export-dimacs
//!     ```
//!
//! 2.  **`dimacs`**: Solve a CNF file in DIMACS format.
//!     ```sh
//!     planning-sat dimacs --path problem.cnf --print-solution
//!     ```
//!
//! 3.  **`completions`**: Print a shell completion script.
//!
//! ### Common Options
//!
//! -   `--verify <BOOL>`: Check the model against the formula, and replay plans (default: `true`).
//! -   `--stats <BOOL>`: Print problem and search statistics (default: `true`).
//! -   `-p, --print-solution`: Print the satisfying assignment (default: `false`).
//! -   `-v`: Raise log verbosity; repeat for more. `RUST_LOG` overrides it.

mod command_line;

use clap::Parser;
use command_line::cli::{init_tracing, run, Cli};

/// Global allocator using `tikv-jemallocator`, which also provides the memory
/// usage statistics.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}
