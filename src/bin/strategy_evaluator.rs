use clap::Parser;
use mousetrap_solver::engine::Board;
use mousetrap_solver::heuristics::{count_isolated_blocks, count_removable_blocks, fitness};
use mousetrap_solver::solver::{SearchStats, Solver, SolverConfig, Strategy, DEFAULT_BEAM_WIDTH};
use rustc_hash::FxHashMap;
use std::time::Instant;

/// Compares the search strategies on seeded random levels.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of random levels to evaluate
    #[clap(short = 'n', long, default_value_t = 20)]
    boards: usize,

    /// Seed of the first level; level i uses seed + i
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    #[clap(long, default_value_t = 6)]
    width: usize,

    #[clap(long, default_value_t = 6)]
    height: usize,

    /// Number of block colours, 1 to 6
    #[clap(short, long, default_value_t = 3)]
    colors: usize,

    /// Expansion limit per search, so breadth-first cannot run away
    #[clap(short, long, default_value_t = 50_000)]
    max_expansions: usize,
}

#[derive(Default)]
struct Tally {
    solved: usize,
    total_moves: usize,
    total_expanded: usize,
    total_ms: u128,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut tallies: FxHashMap<Strategy, Tally> = FxHashMap::default();
    println!("Starting strategy evaluation for {} boards...", args.boards);

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx as u64;
        let initial_board =
            Board::new_random_with_seed(args.width, args.height, args.colors, current_seed);

        println!(
            "\nEvaluating Board {} (Seed: {}, fitness {}, {} blocks, {} isolated)",
            board_idx,
            current_seed,
            fitness(&initial_board),
            count_removable_blocks(&initial_board),
            count_isolated_blocks(&initial_board)
        );
        log::debug!("Board {}:\n{}", board_idx, initial_board);

        for strategy in Strategy::ALL {
            let solver = Solver::new(SolverConfig {
                strategy,
                beam_width: DEFAULT_BEAM_WIDTH,
                max_expansions: Some(args.max_expansions),
            });
            let start = Instant::now();
            let (solution, stats) = solver.solve_with_stats(&initial_board);
            let elapsed = start.elapsed().as_millis();

            let tally = tallies.entry(strategy).or_default();
            tally.total_expanded += stats.expanded;
            tally.total_ms += elapsed;
            let moves = match &solution {
                Some(solution) => {
                    tally.solved += 1;
                    tally.total_moves += solution.moves.len();
                    solution.moves.len().to_string()
                }
                None => "-".to_string(),
            };
            report(strategy, &moves, &stats, elapsed);
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", args.boards);
    println!("\n--- Summary ---");
    for strategy in Strategy::ALL {
        let Some(tally) = tallies.get(&strategy) else {
            continue;
        };
        let avg_moves = if tally.solved == 0 {
            0.0
        } else {
            tally.total_moves as f64 / tally.solved as f64
        };
        println!(
            "Strategy {:<14}: Solved {}/{}, Avg Moves = {:.2}, Expanded = {}, Time = {} ms",
            strategy, tally.solved, args.boards, avg_moves, tally.total_expanded, tally.total_ms
        );
    }
}

fn report(strategy: Strategy, moves: &str, stats: &SearchStats, elapsed: u128) {
    println!(
        "  Strategy: {:<14}, Moves: {:<4}, Expanded: {:<8}, Frontier: {:<8}, {} ms",
        strategy,
        moves,
        stats.expanded,
        stats.max_frontier,
        elapsed
    );
}
