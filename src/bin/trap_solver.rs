use anyhow::{Context, Result};
use clap::Parser;
use mousetrap_solver::solver::{Solver, SolverConfig, Strategy, DEFAULT_BEAM_WIDTH};
use mousetrap_solver::utils::read_level_file;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Finds the clicks that send every mouse into a trap.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search strategy
    #[clap(short, long, value_enum, default_value_t = Strategy::BestFirst)]
    strategy: Strategy,

    /// Generation size above which beam search prunes by fitness
    #[clap(short, long, default_value_t = DEFAULT_BEAM_WIDTH)]
    beam_width: usize,

    /// Give up after this many node expansions
    #[clap(short, long)]
    max_expansions: Option<usize>,

    /// Level files. With more than one, each is solved in turn and timed.
    #[clap(required = true)]
    level_files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let solver = Solver::new(SolverConfig {
        strategy: args.strategy,
        beam_width: args.beam_width,
        max_expansions: args.max_expansions,
    });

    if let [path] = args.level_files.as_slice() {
        return solve_one(&solver, path);
    }

    let mut solved = 0;
    for path in &args.level_files {
        let board = read_level_file(path)
            .with_context(|| format!("Failed to load level {}", path.display()))?;
        let start = Instant::now();
        let solution = solver.solve(&board);
        let elapsed = start.elapsed().as_millis();
        match solution {
            Some(solution) => {
                solved += 1;
                println!(
                    "Solved level {} in {} ms ({} moves)",
                    path.display(),
                    elapsed,
                    solution.moves.len()
                );
            }
            None => println!("Unable to solve level {} after {} ms", path.display(), elapsed),
        }
    }
    println!("\nSolved {} of {} levels", solved, args.level_files.len());
    Ok(())
}

fn solve_one(solver: &Solver, path: &Path) -> Result<()> {
    let board = read_level_file(path)
        .with_context(|| format!("Failed to load level {}", path.display()))?;
    log::info!("Loaded level from {}", path.display());

    match solver.solve(&board) {
        Some(solution) => {
            for line in &solution.history {
                println!("{}", line);
            }
            println!("Solved in {} moves", solution.moves.len());
            for mv in &solution.moves {
                log::debug!("{}", mv);
            }
        }
        None => println!("No solution found."),
    }
    Ok(())
}
