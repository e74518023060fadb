//! Error types for level loading.
//!
//! The simulation and search never fail: out-of-range reads return a wall,
//! illegal bomb clicks are not enumerated and an exhausted search yields `None`.
//! Errors only exist where raw text or files enter the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Problems found while turning level text into a [`Board`](crate::engine::Board).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("level text contains no rows")]
    EmptyLevel,

    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("unrecognized character '{character}' at row {row} col {col}")]
    UnknownCell { character: char, row: usize, col: usize },
}

/// Errors raised when loading a level from disk.
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("failed to read level file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid level file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}
