use crate::engine::Board;
use crate::error::{LevelError, ParseError};
use std::fs;
use std::path::Path;

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is one row, starting from the top (row 0). All rows must
/// have the same length; the first row fixes the board width.
///
/// Valid characters are:
/// - `'#'` wall, `'.'` or `' '` empty, `'='` tunnel
/// - `'M'` mouse, `'C'` cheese, `'T'` trap
/// - `'W'` wood, `'*'` bomb, `'V'` crystal
/// - `'r' 'b' 'g' 'y' 'o' 'p'` removable blocks
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(ParseError)` if there are no rows, the rows differ in length, or a
///   character is not a known cell.
///
/// # Examples
/// ```
/// use mousetrap_solver::utils::board_from_str_array;
/// use mousetrap_solver::engine::{Cell, Color};
///
/// let board = board_from_str_array(&["M.C", "r#T"]).unwrap();
/// assert_eq!(board.get(0, 0), Cell::Mouse);
/// assert_eq!(board.get(0, 1), Cell::Block(Color::Red));
/// assert_eq!(board.get(2, 1), Cell::Trap);
///
/// assert!(board_from_str_array(&["MX"]).is_err());
/// assert!(board_from_str_array(&["M..", "##"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, ParseError> {
    Board::from_rows(s)
}

/// Parses a whole level file's text. Carriage returns are stripped and empty
/// lines ignored, so files saved with either line ending load the same way.
pub fn parse_level(text: &str) -> Result<Board, ParseError> {
    text.parse()
}

/// Reads and parses a level file.
pub fn read_level_file(path: &Path) -> Result<Board, LevelError> {
    let content = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&content).map_err(|source| LevelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Cell, Color};

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&["rgb.", "#MCT", "W*V="]).unwrap();
        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 3);
        assert_eq!(board.get(0, 0), Cell::Block(Color::Red));
        assert_eq!(board.get(1, 0), Cell::Block(Color::Green));
        assert_eq!(board.get(2, 0), Cell::Block(Color::Blue));
        assert_eq!(board.get(3, 0), Cell::Empty);
        assert_eq!(board.get(0, 1), Cell::Wall);
        assert_eq!(board.get(1, 2), Cell::Bomb);
        assert_eq!(board.get(2, 2), Cell::Crystal);
        assert_eq!(board.get(3, 2), Cell::Tunnel);
    }

    #[test]
    fn test_board_from_str_array_spaces_are_empty() {
        let board = board_from_str_array(&["M C", "###"]).unwrap();
        assert_eq!(board.get(1, 0), Cell::Empty);
        assert_eq!(board.render(), "M.C\n###\n");
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["M.X"]);
        assert_eq!(
            result.unwrap_err(),
            ParseError::UnknownCell {
                character: 'X',
                row: 0,
                col: 2
            }
        );
    }

    #[test]
    fn test_board_from_str_array_ragged_rows() {
        let result = board_from_str_array(&["M..", "##"]);
        let err = result.unwrap_err();
        assert_eq!(
            err,
            ParseError::RaggedRow {
                row: 1,
                expected: 3,
                got: 2
            }
        );
        assert!(err.to_string().contains("row 1 has 2 cells"));
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let rows: [&str; 0] = [];
        assert_eq!(board_from_str_array(&rows).unwrap_err(), ParseError::EmptyLevel);
    }

    #[test]
    fn test_parse_level_strips_cr_and_blank_lines() {
        let board = parse_level("\r\nM.C\r\n\r\n#T#\r\n\n").unwrap();
        assert_eq!(board.height(), 2);
        assert_eq!(board.render(), "M.C\n#T#\n");
    }

    #[test]
    fn test_parse_level_empty_text() {
        assert_eq!(parse_level("\n\r\n").unwrap_err(), ParseError::EmptyLevel);
    }

    #[test]
    fn test_parse_render_roundtrip() {
        let text = "..r..g..yy\nC.rM.gT#bb\n##########\n";
        let board = parse_level(text).unwrap();
        assert_eq!(board.render(), text);
        assert_eq!(parse_level(&board.render()).unwrap(), board);
    }

    #[test]
    fn test_read_level_file_missing() {
        let path = std::env::temp_dir().join("mousetrap_solver_missing_level.txt");
        let err = read_level_file(&path).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }

    #[test]
    fn test_read_level_file_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "mousetrap_solver_level_{}.txt",
            std::process::id()
        ));
        fs::write(&path, ".M.\r\n.r.\r\n.r.\r\n.T.\r\n###\r\n").unwrap();
        let board = read_level_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 5);
        assert_eq!(board.get(1, 0), Cell::Mouse);
    }
}
