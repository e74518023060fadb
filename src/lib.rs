//! # Mouse Trap Solver Library
//!
//! This library simulates a falling-block puzzle in which mice walk toward cheese
//! and traps, and searches for the sequence of clicks that sends every mouse into
//! a trap.
//!
//! It is used by two binaries:
//! - `trap_solver`: Loads one or more level files and prints the solution history
//!   (or per-level timing when solving a batch).
//! - `strategy_evaluator`: Generates seeded random levels and compares the search
//!   strategies on them.
//!
//! ## Modules
//! - `engine`: The cell types (`Cell`, `Color`), the board (`Board`) and every game
//!   rule: linked groups, gravity, bombs, mouse pathing and move enumeration.
//! - `heuristics`: The fitness estimate that orders the search, plus board statistics.
//! - `solver`: Breadth-first, beam and best-first search behind one `Solver` type.
//! - `utils`: Level parsing from strings and files.
//! - `error`: Parse and I/O errors raised while loading levels.

pub mod engine;
pub mod error;
pub mod heuristics;
pub mod solver;
pub mod utils;
