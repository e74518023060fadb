use crate::engine::{Board, Position};

/// Scores how far a board is from being solved. Lower is better.
///
/// For each mouse, takes the integer-truncated Euclidean distance to the nearest
/// trap, and sums these over all mice. A board with no mice scores 0. A mouse on
/// a board without traps contributes nothing, since no click sequence can help it.
///
/// The goal test is "no mice left", never a fitness value.
///
/// # Examples
/// ```
/// use mousetrap_solver::heuristics::fitness;
/// use mousetrap_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["M...", "r..T", "####"]).unwrap();
/// // dx = 3, dy = 1, sqrt(10) truncates to 3
/// assert_eq!(fitness(&board), 3);
/// ```
pub fn fitness(board: &Board) -> i32 {
    let traps: Vec<Position> = board.traps().collect();
    board
        .mice()
        .map(|mouse| {
            traps
                .iter()
                .map(|&trap| truncated_distance(mouse, trap))
                .min()
                .unwrap_or(0)
        })
        .sum()
}

fn truncated_distance(a: Position, b: Position) -> i32 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    dx.hypot(dy) as i32
}

/// Counts the removable blocks left on the board.
pub fn count_removable_blocks(board: &Board) -> usize {
    board.cells().iter().filter(|cell| cell.is_clickable()).count()
}

/// Counts removable blocks that cannot currently be clicked.
///
/// A block is isolated when its linked group has fewer than two cells. Blocks
/// that are part of a clickable group are visited once per group.
pub fn count_isolated_blocks(board: &Board) -> usize {
    let mut isolated_count = 0;
    let mut visited = vec![false; board.width() * board.height()];

    for y in 0..board.height() as i32 {
        for x in 0..board.width() as i32 {
            let index = y as usize * board.width() + x as usize;
            if visited[index] || !board.get(x, y).is_clickable() {
                continue;
            }
            let group = board.linked_blocks(x, y);
            if group.len() >= 2 {
                for p in &group {
                    visited[p.y as usize * board.width() + p.x as usize] = true;
                }
            } else {
                visited[index] = true;
                isolated_count += 1;
            }
        }
    }

    isolated_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    #[test]
    fn test_fitness_nearest_trap() {
        let board = board_from_str_array(&[
            ".........",
            ".........",
            "..MrrC...",
            "Crrgggg.#",
            "#r#######",
            ".r.C.TT##",
        ])
        .unwrap();
        // (2,2) -> (5,5): sqrt(18) = 4.24, (6,5): sqrt(25) = 5
        assert_eq!(fitness(&board), 4);
    }

    #[test]
    fn test_fitness_sums_over_mice() {
        let board = board_from_str_array(&["M..M", "....", "T..."]).unwrap();
        // (0,0) -> (0,2) = 2, (3,0) -> (0,2) = sqrt(13) = 3
        assert_eq!(fitness(&board), 5);
    }

    #[test]
    fn test_fitness_no_mice_is_zero() {
        let board = board_from_str_array(&["rr.T", "####"]).unwrap();
        assert_eq!(fitness(&board), 0);
    }

    #[test]
    fn test_fitness_no_traps() {
        let board = board_from_str_array(&["M.rr", "####"]).unwrap();
        assert_eq!(fitness(&board), 0);
    }

    #[test]
    fn test_fitness_mouse_next_to_trap() {
        let board = board_from_str_array(&["MT", "##"]).unwrap();
        assert_eq!(fitness(&board), 1);
    }

    #[test]
    fn test_count_removable_blocks() {
        let board = board_from_str_array(&["rgM", "bbW", "###"]).unwrap();
        assert_eq!(count_removable_blocks(&board), 4);
    }

    #[test]
    fn test_count_isolated_blocks() {
        let board = board_from_str_array(&["rg.y", "bbry", "####"]).unwrap();
        // r at (0,0), g at (1,0) and r at (2,1) are alone; bb and yy are groups
        assert_eq!(count_isolated_blocks(&board), 3);
    }

    #[test]
    fn test_count_isolated_blocks_ignores_non_blocks() {
        let board = board_from_str_array(&["MCT", "W*V"]).unwrap();
        assert_eq!(count_isolated_blocks(&board), 0);
    }
}
