//! Search over click sequences.
//!
//! Three interchangeable strategies share the same primitives (move enumeration,
//! move application and the fitness heuristic):
//! - `BreadthFirst`: exhaustive FIFO search, no pruning or deduplication.
//! - `Beam`: generation-by-generation expansion with in-round deduplication and
//!   fitness-threshold pruning once a generation grows past the beam width.
//! - `BestFirst`: lowest-fitness-first search that never expands a state twice.
//!
//! Failing to find a solution is a normal result (`None`), not an error.
use crate::engine::{Board, Move};
use crate::heuristics::fitness;
use clap::ValueEnum;
use rustc_hash::FxHashSet;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;

/// Largest generation the beam search keeps before pruning by fitness.
pub const DEFAULT_BEAM_WIDTH: usize = 100_000;

/// Which search to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Strategy {
    /// Exhaustive breadth-first search. Shortest solutions, impractical on big boards.
    BreadthFirst,
    /// Beam search with fitness pruning. Lossy: pruning may drop the only path to a solution.
    Beam,
    /// Best-first search ordered by fitness, with cross-round deduplication.
    BestFirst,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::BreadthFirst, Strategy::Beam, Strategy::BestFirst];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::BreadthFirst => "breadth-first",
            Strategy::Beam => "beam",
            Strategy::BestFirst => "best-first",
        };
        f.pad(name)
    }
}

/// Tuning for a [`Solver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    pub strategy: Strategy,
    /// Generation size above which the beam search prunes.
    pub beam_width: usize,
    /// Stop after this many node expansions. `None` searches until the frontier
    /// is exhausted, which on a pathological board may never happen.
    pub max_expansions: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            strategy: Strategy::BestFirst,
            beam_width: DEFAULT_BEAM_WIDTH,
            max_expansions: None,
        }
    }
}

/// Represents a solution found by the solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// The clicks, in order, that clear every mouse.
    pub moves: Vec<Move>,
    /// The initial rendering, then for each move its `Click at x,y (c)` line
    /// followed by the rendering of the board after it.
    pub history: Vec<String>,
}

impl Solution {
    /// Rebuilds the printable history by replaying `moves` from `initial`.
    fn replay(initial: &Board, moves: Vec<Move>) -> Self {
        let mut history = Vec::with_capacity(1 + 2 * moves.len());
        history.push(initial.render());
        let mut board = initial.clone();
        for mv in &moves {
            history.push(mv.describe());
            board = board.make_move(&mv.removed);
            history.push(board.render());
        }
        Solution { moves, history }
    }
}

/// Counters collected during one search. Purely observational.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes whose successors were generated.
    pub expanded: usize,
    /// Successor states produced.
    pub generated: usize,
    /// Boards in the best-first dead-set when the search stopped.
    pub dead_set: usize,
    /// Largest frontier seen.
    pub max_frontier: usize,
}

/// A search node: an owned board, the clicks that led to it and its cached fitness.
#[derive(Clone, Debug)]
struct Node {
    board: Board,
    fitness: i32,
    path: Vec<Move>,
}

impl Node {
    fn root(board: Board) -> Self {
        Node {
            fitness: fitness(&board),
            board,
            path: Vec::new(),
        }
    }

    fn child(&self, mv: Move) -> Self {
        let board = self.board.make_move(&mv.removed);
        let mut path = self.path.clone();
        path.push(mv);
        Node {
            fitness: fitness(&board),
            board,
            path,
        }
    }

    fn is_goal(&self) -> bool {
        !self.board.has_mice()
    }
}

/// Best-first queue entry, ordered so that `BinaryHeap` pops the lowest fitness
/// first and, among equal fitness, the earliest inserted.
struct Queued {
    key: Reverse<(i32, u64)>,
    node: Node,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Fitness cut-off for an oversized beam generation.
///
/// Keeps roughly `beam_width` of `size` nodes by assuming fitness is spread
/// evenly between `best` and `worst`.
fn fitness_threshold(best: i32, worst: i32, beam_width: usize, size: usize) -> i32 {
    let spread = i64::from(worst - best);
    best + (spread * beam_width as i64 / size as i64) as i32
}

/// Drops the worse part of a beam generation once it holds more than
/// `beam_width` nodes.
///
/// # Returns
/// The fitness threshold applied, or `None` when the generation was small
/// enough to keep whole.
fn prune_generation(generation: &mut Vec<Node>, beam_width: usize) -> Option<i32> {
    if generation.len() <= beam_width {
        return None;
    }
    let best = generation.iter().map(|node| node.fitness).min()?;
    let worst = generation.iter().map(|node| node.fitness).max()?;
    log::debug!("Best fitness {} worst fitness {}", best, worst);

    let threshold = fitness_threshold(best, worst, beam_width, generation.len());
    generation.retain(|node| node.fitness <= threshold);
    Some(threshold)
}

/// Searches for a click sequence that removes every mouse.
#[derive(Clone, Debug, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver { config }
    }

    pub fn with_strategy(strategy: Strategy) -> Self {
        Solver::new(SolverConfig {
            strategy,
            ..SolverConfig::default()
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves `initial` with the configured strategy.
    ///
    /// A board that already has no mice is solved by the empty sequence; its
    /// history is just its own rendering.
    ///
    /// # Examples
    /// ```
    /// use mousetrap_solver::solver::{Solver, Strategy};
    /// use mousetrap_solver::utils::board_from_str_array;
    ///
    /// let board = board_from_str_array(&["..r.b..", "M.r.b.T", "#######"]).unwrap();
    /// let solution = Solver::with_strategy(Strategy::BestFirst).solve(&board).unwrap();
    /// assert_eq!(solution.history[1], "Click at 2,0 (r)");
    /// assert_eq!(solution.history[3], "Click at 4,0 (b)");
    /// ```
    pub fn solve(&self, initial: &Board) -> Option<Solution> {
        self.solve_with_stats(initial).0
    }

    /// Like [`Solver::solve`], also returning the search counters.
    pub fn solve_with_stats(&self, initial: &Board) -> (Option<Solution>, SearchStats) {
        let mut stats = SearchStats::default();
        if !initial.has_mice() {
            return (Some(Solution::replay(initial, Vec::new())), stats);
        }

        log::info!(
            "Solving {}x{} board with {} search, initial fitness {}",
            initial.width(),
            initial.height(),
            self.config.strategy,
            fitness(initial)
        );
        let path = match self.config.strategy {
            Strategy::BreadthFirst => self.breadth_first(initial, &mut stats),
            Strategy::Beam => self.beam(initial, &mut stats),
            Strategy::BestFirst => self.best_first(initial, &mut stats),
        };
        match &path {
            Some(moves) => log::info!(
                "Found a {}-move solution after {} expansions",
                moves.len(),
                stats.expanded
            ),
            None => log::info!("No solution found after {} expansions", stats.expanded),
        }

        (path.map(|moves| Solution::replay(initial, moves)), stats)
    }

    fn budget_exhausted(&self, stats: &SearchStats) -> bool {
        match self.config.max_expansions {
            Some(limit) if stats.expanded >= limit => {
                log::warn!("Expansion limit of {} reached, giving up", limit);
                true
            }
            _ => false,
        }
    }

    fn breadth_first(&self, initial: &Board, stats: &mut SearchStats) -> Option<Vec<Move>> {
        let mut queue = VecDeque::new();
        queue.push_back(Node::root(initial.clone()));

        while let Some(node) = queue.pop_front() {
            if node.is_goal() {
                return Some(node.path);
            }
            if self.budget_exhausted(stats) {
                return None;
            }
            stats.expanded += 1;
            for mv in node.board.possible_moves() {
                queue.push_back(node.child(mv));
                stats.generated += 1;
            }
            stats.max_frontier = stats.max_frontier.max(queue.len());
            if stats.expanded % 10_000 == 0 {
                log::debug!("Expanded {}, queue holds {}", stats.expanded, queue.len());
            }
        }
        None
    }

    fn beam(&self, initial: &Board, stats: &mut SearchStats) -> Option<Vec<Move>> {
        let mut generation = vec![Node::root(initial.clone())];
        let mut round = 0;

        while !generation.is_empty() {
            log::info!("Move {}, we have {} possible solutions", round, generation.len());
            round += 1;

            let mut next = Vec::new();
            let mut seen: FxHashSet<Board> = FxHashSet::default();
            for node in &generation {
                if self.budget_exhausted(stats) {
                    return None;
                }
                stats.expanded += 1;
                for mv in node.board.possible_moves() {
                    let child = node.child(mv);
                    stats.generated += 1;
                    if !seen.insert(child.board.clone()) {
                        continue;
                    }
                    if child.is_goal() {
                        return Some(child.path);
                    }
                    next.push(child);
                }
            }
            stats.max_frontier = stats.max_frontier.max(next.len());

            if next.is_empty() {
                break;
            }
            let before = next.len();
            if let Some(threshold) = prune_generation(&mut next, self.config.beam_width) {
                log::info!(
                    "Limiting fitness to {}, cut from {} to {}",
                    threshold,
                    before,
                    next.len()
                );
            }
            generation = next;
        }
        None
    }

    fn best_first(&self, initial: &Board, stats: &mut SearchStats) -> Option<Vec<Move>> {
        let mut live_queue = BinaryHeap::new();
        let mut live: FxHashSet<Board> = FxHashSet::default();
        let mut dead: FxHashSet<Board> = FxHashSet::default();
        let mut inserted: u64 = 0;

        let root = Node::root(initial.clone());
        live.insert(root.board.clone());
        live_queue.push(Queued {
            key: Reverse((root.fitness, inserted)),
            node: root,
        });

        let result = loop {
            let Some(Queued { node, .. }) = live_queue.pop() else {
                break None;
            };
            if self.budget_exhausted(stats) {
                break None;
            }
            live.remove(&node.board);
            dead.insert(node.board.clone());
            stats.expanded += 1;

            let mut goal = None;
            for mv in node.board.possible_moves() {
                let child = node.child(mv);
                stats.generated += 1;
                if dead.contains(&child.board) || live.contains(&child.board) {
                    continue;
                }
                if child.is_goal() {
                    goal = Some(child.path);
                    break;
                }
                inserted += 1;
                live.insert(child.board.clone());
                live_queue.push(Queued {
                    key: Reverse((child.fitness, inserted)),
                    node: child,
                });
            }
            if goal.is_some() {
                break goal;
            }

            stats.max_frontier = stats.max_frontier.max(live_queue.len());
            if stats.expanded % 10_000 == 0 {
                log::info!(
                    "Expanded {}, live {}, dead {}, best live fitness {:?}",
                    stats.expanded,
                    live_queue.len(),
                    dead.len(),
                    live_queue.peek().map(|q| q.key.0 .0)
                );
            }
        };

        stats.dead_set = dead.len();
        result
    }
}
