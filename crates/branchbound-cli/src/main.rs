mod input;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use branchbound_solver::{
    BoundCoupling, DEFAULT_VARIABLE_CAP, LpProblem, MipOutcome, MipSolver, Projection, SimplexSolution,
    SimplexSolver, SolveError,
};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::input::{InputError, ProblemReader};

#[derive(Parser)]
#[command(name = "branchbound")]
#[command(about = "Simplex relaxation and integer branch-and-bound for small MILPs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Enter a problem at the prompt and solve it
    Prompt {
        #[command(flatten)]
        options: SolveOptions,
    },
    /// Solve a problem written in the prompt protocol
    Solve {
        /// The file to read (stdin when omitted)
        file: Option<PathBuf>,
        #[command(flatten)]
        options: SolveOptions,
    },
}

#[derive(Args)]
struct SolveOptions {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Largest value the integer search tries for any variable
    #[arg(long, default_value_t = DEFAULT_VARIABLE_CAP)]
    cap: u32,
    /// Pivot limit for the simplex phase
    #[arg(long, default_value_t = 10000)]
    max_iterations: usize,
    /// Search only the first two constraints over the first two variables
    #[arg(long)]
    two_variable: bool,
    /// Reuse the first row's second coefficient in the second row's check
    #[arg(long)]
    legacy_bounds: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),
    #[error("Solver error: {0}")]
    Solve(#[from] SolveError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Error writing JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SolveOptions {
    fn solver(&self) -> MipSolver {
        let projection = if self.two_variable || self.legacy_bounds {
            Projection::TwoVariable
        } else {
            Projection::Full
        };
        let coupling = if self.legacy_bounds {
            BoundCoupling::Legacy
        } else {
            BoundCoupling::Independent
        };

        MipSolver::new()
            .with_simplex(SimplexSolver::new().with_max_iterations(self.max_iterations))
            .with_variable_cap(self.cap)
            .with_projection(projection)
            .with_coupling(coupling)
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Prompt { options } => {
            let stdin = io::stdin();
            let problem = ProblemReader::interactive(stdin.lock(), io::stderr()).read_problem()?;
            solve_and_print(&problem, &options)
        }
        Commands::Solve { file, options } => {
            let problem = match file {
                Some(path) => ProblemReader::batch(BufReader::new(File::open(path)?)).read_problem()?,
                None => ProblemReader::batch(io::stdin().lock()).read_problem()?,
            };
            solve_and_print(&problem, &options)
        }
    }
}

fn solve_and_print(problem: &LpProblem, options: &SolveOptions) -> Result<(), CliError> {
    let outcome = options.solver().solve(problem)?;
    let stdout = io::stdout();
    write_outcome(&mut stdout.lock(), &outcome, options)
}

fn write_outcome<W: Write>(
    out: &mut W,
    outcome: &MipOutcome,
    options: &SolveOptions,
) -> Result<(), CliError> {
    if options.format == Format::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(outcome)?)?;
        return Ok(());
    }

    write_relaxation(out, outcome.relaxation())?;
    writeln!(out)?;

    match outcome {
        MipOutcome::Integral { .. } => {
            writeln!(out, "No optimization needed: the relaxation is already integral")?;
        }
        MipOutcome::Searched { search, .. } => {
            if options.legacy_bounds {
                writeln!(out, "Note: legacy bound check, the second constraint reuses a01 for x2")?;
            }
            writeln!(out, "Branch-and-bound optimum: {}", search.value)?;
            for (j, x) in search.point.iter().enumerate() {
                writeln!(out, "  x{} = {}", j + 1, x)?;
            }
            writeln!(
                out,
                "  ({} nodes explored, {} pruned)",
                search.nodes_explored, search.nodes_pruned
            )?;
        }
    }

    Ok(())
}

fn write_relaxation<W: Write>(out: &mut W, relaxation: &SimplexSolution) -> io::Result<()> {
    writeln!(out, "Relaxation (simplex, {} pivots):", relaxation.iterations)?;
    writeln!(out, "  objective: {:.4}", relaxation.objective_value)?;
    for (j, x) in relaxation.values.iter().enumerate() {
        writeln!(out, "  x{} = {:.4}", j + 1, x)?;
    }
    let rows: Vec<String> = relaxation.row_values.iter().map(|v| format!("{:.4}", v)).collect();
    writeln!(out, "  row values: [{}]", rows.join(", "))
}
