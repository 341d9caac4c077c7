use clap::{Parser, Subcommand, ValueEnum};
use dualsimplex_format::ProblemFile;
use dualsimplex_solver::{IterationRecord, Outcome, Solver};
use log::LevelFilter;
use std::path::{Path, PathBuf};

const DEMO: &str = "// c
-2 -7 1 0
// A
1 -6 1 0
0 -5 1 1
// b
-6 -10
// starting basis (1-based)
3 4
";

#[derive(Parser)]
#[command(name = "dualsimplex")]
#[command(about = "Dual simplex method for linear programs in standard form", long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the outcome
    Solve {
        /// Problem file (.json, or the plain text layout)
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
        /// Give up after this many iterations
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Tolerance for sign tests
        #[arg(long)]
        tolerance: Option<f64>,
        /// Print every iteration
        #[arg(short, long)]
        trace: bool,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Solve the built-in example problem
    Demo {
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
    },
}

fn setup_logger(verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{:5} | {} | {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn load(path: &Path) -> Result<ProblemFile, String> {
    let source =
        std::fs::read_to_string(path).map_err(|e| format!("Error reading file: {}", e))?;
    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&source).map_err(|e| format!("JSON error: {}", e))
    } else {
        ProblemFile::parse(&source).map_err(|e| format!("Parse error: {}", e))
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logger(cli.verbose) {
        eprintln!("Logger setup failed: {}", e);
    }

    match cli.command {
        Commands::Solve {
            file,
            format,
            max_iterations,
            tolerance,
            trace,
        } => {
            let problem_file = load(&file).unwrap_or_else(|e| fail(e));
            let mut solver = Solver::new().with_trace(trace);
            if let Some(max) = max_iterations {
                solver = solver.with_max_iterations(max);
            }
            if let Some(tol) = tolerance {
                solver = solver.with_tolerance(tol);
            }
            run(&solver, problem_file, format);
        }
        Commands::Check { file } => {
            let problem_file = load(&file).unwrap_or_else(|e| {
                eprintln!("✗ {} has errors:", file.display());
                fail(format!("  {}", e))
            });
            match problem_file.into_problem() {
                Ok((problem, basis)) => {
                    println!("✓ {} is valid", file.display());
                    println!("  {} variables", problem.num_variables());
                    println!("  {} constraints", problem.num_constraints());
                    println!("  starting basis {:?}", basis.to_one_based());
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    fail(format!("  {}", e));
                }
            }
        }
        Commands::Demo { format } => {
            let problem_file = ProblemFile::parse(DEMO).unwrap_or_else(|e| fail(e));
            if format == Format::Pretty {
                println!("Problem:");
                print!("{}", problem_file);
                println!();
            }
            run(&Solver::new().with_trace(true), problem_file, format);
        }
    }
}

fn run(solver: &Solver, problem_file: ProblemFile, format: Format) {
    let (problem, basis) = problem_file.into_problem().unwrap_or_else(|e| fail(e));
    let outcome = solver
        .solve(&problem, basis)
        .unwrap_or_else(|e| fail(format!("Solver error: {}", e)));

    match format {
        Format::Json => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(format!("JSON error: {}", e)),
        },
        Format::Pretty => print_outcome(&outcome),
    }

    if !outcome.is_optimal() {
        std::process::exit(2);
    }
}

fn print_outcome(outcome: &Outcome) {
    for record in outcome.trace() {
        print_iteration(record);
    }

    match outcome {
        Outcome::Optimal(solution) => {
            println!("Status: OPTIMAL");
            println!("Objective: {:.6}", solution.objective_value);
            println!("Basis: {:?}", solution.basis.to_one_based());
            println!();
            println!("Values:");
            for (j, v) in solution.values.iter().enumerate() {
                println!("  x{:<4} {:12.6}", j + 1, v);
            }
            println!();
            println!("Duals:");
            for (i, y) in solution.duals.iter().enumerate() {
                println!("  y{:<4} {:12.6}", i + 1, y);
            }
        }
        Outcome::Infeasible(proof) => {
            println!("Status: INFEASIBLE");
            println!("No solution satisfies Ax = b, x >= 0.");
            println!(
                "x{} is negative in basis {:?} and no column can replace it",
                proof.leaving + 1,
                proof.basis.to_one_based()
            );
            println!("Certificate: {:?}", proof.certificate);
        }
    }
    println!("Iterations: {}", outcome.iterations());
}

fn print_iteration(record: &IterationRecord) {
    println!("Iteration {}", record.iteration);
    println!("  basis {:?}", record.basis.to_one_based());
    println!("  x {:?}", record.values);
    println!("  y {:?}", record.duals);
    if let Some(pivot) = &record.pivot {
        println!(
            "  x{} leaves, x{} enters, step {}",
            pivot.leaving + 1,
            pivot.entering + 1,
            pivot.step
        );
        println!("  pivot row {:?}", pivot.direction);
    }
    println!();
}
