//! Simulation engine for the mouse trap puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Cell`: the closed set of things a grid square can hold, with the category
//!   predicates (clickable, fallable, explodable, ...) derived from it.
//! - `Board`: the rectangular grid plus every rule that moves things around on it:
//!   linked-block flood fill, gravity, bomb blasts, mouse pathing, move application
//!   and move enumeration.
//! - `Move`: a click and the set of cells it removes.
//!
//! A board is a plain value. Every successor state is produced by cloning the
//! parent and mutating the clone, so search branches never share a grid.
use crate::error::ParseError;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Colours of the removable blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
}

impl Color {
    /// Every colour in palette order.
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Purple,
    ];

    /// The lowercase letter a block of this colour uses in level text.
    pub fn to_char(self) -> char {
        match self {
            Color::Red => 'r',
            Color::Blue => 'b',
            Color::Green => 'g',
            Color::Yellow => 'y',
            Color::Orange => 'o',
            Color::Purple => 'p',
        }
    }

    /// Inverse of [`Color::to_char`]. Only the lowercase letters map to a colour.
    pub fn from_char(c: char) -> Option<Color> {
        Color::ALL.into_iter().find(|color| color.to_char() == c)
    }
}

/// Represents the content of a single square on the board.
///
/// Categories such as "clickable" or "fallable" are not stored; they are
/// derived by the predicate methods below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    /// Solid, immovable. Also what every out-of-bounds read returns.
    Wall,
    Empty,
    /// Passes line of sight and mice, never falls, holds up what rests on it.
    Tunnel,
    Mouse,
    Cheese,
    Trap,
    Wood,
    Bomb,
    Crystal,
    /// A removable coloured block.
    Block(Color),
}

impl Cell {
    /// Converts the cell to its level-text character.
    ///
    /// # Examples
    ///
    /// ```
    /// use mousetrap_solver::engine::{Cell, Color};
    /// assert_eq!(Cell::Mouse.to_char(), 'M');
    /// assert_eq!(Cell::Block(Color::Red).to_char(), 'r');
    /// assert_eq!(Cell::Empty.to_char(), '.');
    /// ```
    pub fn to_char(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Empty => '.',
            Cell::Tunnel => '=',
            Cell::Mouse => 'M',
            Cell::Cheese => 'C',
            Cell::Trap => 'T',
            Cell::Wood => 'W',
            Cell::Bomb => '*',
            Cell::Crystal => 'V',
            Cell::Block(color) => color.to_char(),
        }
    }

    /// Maps a level-text character to a cell. Both `' '` and `'.'` are empty.
    ///
    /// Block colours are lowercase only: `'R'`, `'B'` and the other uppercase
    /// colour letters are not cells and yield `None`.
    ///
    /// ```
    /// use mousetrap_solver::engine::{Cell, Color};
    /// assert_eq!(Cell::from_char('g'), Some(Cell::Block(Color::Green)));
    /// assert_eq!(Cell::from_char('G'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Cell> {
        let cell = match c {
            ' ' | '.' => Cell::Empty,
            '#' => Cell::Wall,
            '=' => Cell::Tunnel,
            'M' => Cell::Mouse,
            'C' => Cell::Cheese,
            'T' => Cell::Trap,
            'W' => Cell::Wood,
            '*' => Cell::Bomb,
            'V' => Cell::Crystal,
            other => Cell::Block(Color::from_char(other)?),
        };
        Some(cell)
    }

    /// Cells a player can click as part of a linked group.
    pub fn is_clickable(self) -> bool {
        matches!(self, Cell::Block(_))
    }

    /// Material that drops into empty space below it.
    pub fn is_fallable(self) -> bool {
        matches!(self, Cell::Block(_) | Cell::Cheese | Cell::Wood | Cell::Bomb)
    }

    /// Cells destroyed by a neighbouring bomb. Bombs do not set each other off.
    pub fn is_explodable(self) -> bool {
        match self {
            Cell::Block(_) | Cell::Cheese | Cell::Wood | Cell::Mouse | Cell::Crystal => true,
            Cell::Wall | Cell::Empty | Cell::Tunnel | Cell::Trap | Cell::Bomb => false,
        }
    }

    /// Cheese and traps: what a mouse walks toward once it sees it.
    pub fn is_mouse_attracting(self) -> bool {
        matches!(self, Cell::Cheese | Cell::Trap)
    }

    /// Everything except empty space and tunnels stops a mouse's view along its row.
    pub fn blocks_line_of_sight(self) -> bool {
        !matches!(self, Cell::Empty | Cell::Tunnel)
    }

    /// Cells moved by gravity: fallable material plus mice, which are carried
    /// down like anything else resting on removed blocks.
    pub fn sinks(self) -> bool {
        self.is_fallable() || self == Cell::Mouse
    }
}

/// A grid coordinate. `x` grows to the right, `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction in which a mouse sees something worth walking to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sight {
    Left,
    Right,
    Nothing,
}

impl Sight {
    fn step(self) -> Option<i32> {
        match self {
            Sight::Left => Some(-1),
            Sight::Right => Some(1),
            Sight::Nothing => None,
        }
    }
}

/// A legal click: where the player clicks, what was there, and every cell it removes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub click: Position,
    pub cell: Cell,
    /// For a grouped click this is the linked group (at least two cells);
    /// for a bomb it is the blast set, which always contains the bomb itself.
    pub removed: Vec<Position>,
}

impl Move {
    /// Human-readable description used in solution histories.
    ///
    /// ```
    /// use mousetrap_solver::engine::{Cell, Color, Move, Position};
    /// let mv = Move {
    ///     click: Position::new(3, 2),
    ///     cell: Cell::Block(Color::Green),
    ///     removed: vec![Position::new(3, 2), Position::new(4, 2)],
    /// };
    /// assert_eq!(mv.describe(), "Click at 3,2 (g)");
    /// ```
    pub fn describe(&self) -> String {
        format!(
            "Click at {},{} ({})",
            self.click.x,
            self.click.y,
            self.cell.to_char()
        )
    }
}

impl fmt::Display for Move {
    /// Debug form: the click followed by every removed cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let removed: Vec<String> = self.removed.iter().map(|p| p.to_string()).collect();
        write!(f, "{}:[{}]", self.click, removed.join(","))
    }
}

const ADJACENT: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Represents the game board as a rectangular grid of `Cell`s.
///
/// The grid is stored row-major in one owned buffer. Dimensions are fixed at
/// construction. Equality and hashing are structural, which is exactly equality
/// of the canonical text rendering (the rendering encodes both the cells and the
/// row breaks), so a `Board` can key deduplication sets directly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates a `width` x `height` board with every cell empty.
    pub fn new_empty(width: usize, height: usize) -> Self {
        Board {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Builds a board from rows of level text, one string per row.
    ///
    /// Every row must have the same number of characters and every character
    /// must be a known cell tag. Callers are expected to have dropped blank lines.
    ///
    /// # Returns
    /// * `Ok(Board)` for a well-formed rectangle.
    /// * `Err(ParseError)` for no rows, ragged rows or an unknown character.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, ParseError> {
        let first = rows.first().ok_or(ParseError::EmptyLevel)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(ParseError::EmptyLevel);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let got = line.chars().count();
            if got != width {
                return Err(ParseError::RaggedRow {
                    row,
                    expected: width,
                    got,
                });
            }
            for (col, character) in line.chars().enumerate() {
                let cell = Cell::from_char(character).ok_or(ParseError::UnknownCell {
                    character,
                    row,
                    col,
                })?;
                cells.push(cell);
            }
        }

        Ok(Board {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Creates a solvable-looking random level from a seed.
    ///
    /// The layout is: a mouse somewhere on the top row, a field of random blocks
    /// drawn from the first `colors` palette entries underneath it, a trap at one
    /// end of the lowest field row and a floor of walls. The same arguments always
    /// produce the same board. Dimensions are clamped to at least 2 x 3 and
    /// `colors` to `1..=6`.
    pub fn new_random_with_seed(width: usize, height: usize, colors: usize, seed: u64) -> Self {
        let width = width.max(2);
        let height = height.max(3);
        let colors = colors.clamp(1, Color::ALL.len());
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new_empty(width, height);

        let floor = height - 1;
        let trap_x = if rng.gen_bool(0.5) { 0 } else { width - 1 };
        for y in 1..floor {
            for x in 0..width {
                let cell = if y == floor - 1 && x == trap_x {
                    Cell::Trap
                } else {
                    Cell::Block(Color::ALL[rng.gen_range(0..colors)])
                };
                board.cells[y * width + x] = cell;
            }
        }
        for x in 0..width {
            board.cells[floor * width + x] = Cell::Wall;
        }
        let mouse_x = rng.gen_range(0..width);
        board.cells[mouse_x] = Cell::Mouse;
        board
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `(x, y)` lies on the board.
    pub fn valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width + x as usize
    }

    fn position_of(&self, index: usize) -> Position {
        Position::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Returns the cell at `(x, y)`, or `Cell::Wall` when off the board.
    ///
    /// ```
    /// use mousetrap_solver::engine::{Board, Cell};
    /// let board: Board = "M.\n##\n".parse().unwrap();
    /// assert_eq!(board.get(0, 0), Cell::Mouse);
    /// assert_eq!(board.get(-1, 0), Cell::Wall);
    /// assert_eq!(board.get(0, 7), Cell::Wall);
    /// ```
    pub fn get(&self, x: i32, y: i32) -> Cell {
        if self.valid(x, y) {
            self.cells[self.index(x, y)]
        } else {
            Cell::Wall
        }
    }

    /// [`Board::get`] by position.
    pub fn get_at(&self, p: Position) -> Cell {
        self.get(p.x, p.y)
    }

    /// Writes a cell. Writes outside the board are ignored so the wall sentinel
    /// is never mutated.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if self.valid(x, y) {
            let i = self.index(x, y);
            self.cells[i] = cell;
        }
    }

    /// [`Board::set`] by position.
    pub fn set_at(&mut self, p: Position, cell: Cell) {
        self.set(p.x, p.y, cell);
    }

    /// Canonical text rendering: one row per line, each row newline-terminated.
    /// This string is the equality and deduplication key of a state.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|cell| cell.to_char()));
            out.push('\n');
        }
        out
    }

    fn positions_of(&self, wanted: Cell) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |&(_, &cell)| cell == wanted)
            .map(move |(i, _)| self.position_of(i))
    }

    /// Every mouse on the board in row-major order.
    pub fn mice(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions_of(Cell::Mouse)
    }

    /// Every trap on the board in row-major order.
    pub fn traps(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions_of(Cell::Trap)
    }

    /// The goal test: the puzzle is solved once no mouse is left.
    pub fn has_mice(&self) -> bool {
        self.cells.contains(&Cell::Mouse)
    }

    /// Counts the cells equal to `wanted`.
    ///
    /// # Arguments
    /// * `wanted` - The exact cell to look for; `Cell::Block(Color::Red)` does not
    ///   match other colours.
    pub fn count(&self, wanted: Cell) -> usize {
        self.cells.iter().filter(|&&cell| cell == wanted).count()
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Finds the maximal group of identical, 4-connected cells containing `(x, y)`.
    ///
    /// Uses a breadth-first flood fill. The seed is always part of the result, so a
    /// lone cell yields a group of one; an off-board seed yields an empty group.
    /// Positions come back in discovery order.
    pub fn linked_blocks(&self, x: i32, y: i32) -> Vec<Position> {
        if !self.valid(x, y) {
            return Vec::new();
        }
        let kind = self.get(x, y);
        let mut group = Vec::new();
        let mut visited = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();

        visited[self.index(x, y)] = true;
        queue.push_back(Position::new(x, y));

        while let Some(current) = queue.pop_front() {
            group.push(current);
            for (dx, dy) in ADJACENT {
                let (nx, ny) = (current.x + dx, current.y + dy);
                if !self.valid(nx, ny) {
                    continue;
                }
                let ni = self.index(nx, ny);
                if !visited[ni] && self.cells[ni] == kind {
                    visited[ni] = true;
                    queue.push_back(Position::new(nx, ny));
                }
            }
        }
        group
    }

    /// Sets every listed position to `Cell::Empty`.
    pub fn remove_blocks(&mut self, positions: &[Position]) {
        for &p in positions {
            self.set_at(p, Cell::Empty);
        }
    }

    /// Lets everything that can fall drop to rest, column by column.
    ///
    /// Each column is scanned top to bottom, swapping an empty cell with the
    /// sinking cell directly above it, and the scan repeats until a full pass makes
    /// no swap. Walls and tunnels never move, so anything resting on them stays.
    pub fn apply_gravity(&mut self) {
        let w = self.width;
        for x in 0..w {
            loop {
                let mut fell = false;
                for y in 1..self.height {
                    let below = y * w + x;
                    let above = below - w;
                    if self.cells[below] == Cell::Empty && self.cells[above].sinks() {
                        self.cells.swap(below, above);
                        fell = true;
                    }
                }
                if !fell {
                    break;
                }
            }
        }
    }

    /// Cells destroyed by clicking the bomb at `(x, y)`.
    ///
    /// Looks at the 3x3 neighbourhood (clipped to the board). Returns `None` when a
    /// mouse is in it, since a bomb next to a mouse cannot be clicked. Otherwise
    /// returns every explodable neighbour plus the bomb's own cell.
    pub fn bomb_blast(&self, x: i32, y: i32) -> Option<Vec<Position>> {
        let mut blast = Vec::new();
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if !self.valid(nx, ny) {
                    continue;
                }
                let cell = self.get(nx, ny);
                if cell == Cell::Mouse {
                    return None;
                }
                if cell.is_explodable() {
                    blast.push(Position::new(nx, ny));
                }
            }
        }
        blast.push(Position::new(x, y));
        Some(blast)
    }

    /// Looks along the row from `p` for cheese or a trap, left side first.
    ///
    /// Each side is scanned outward until the first attractor (seen) or the first
    /// line-of-sight blocker (not seen).
    pub fn can_mouse_see_cheese(&self, p: Position) -> Sight {
        let looking = |step: i32| {
            let mut x = p.x + step;
            while self.valid(x, p.y) {
                let cell = self.get(x, p.y);
                if cell.is_mouse_attracting() {
                    return true;
                }
                if cell.blocks_line_of_sight() {
                    return false;
                }
                x += step;
            }
            false
        };

        if looking(-1) {
            Sight::Left
        } else if looking(1) {
            Sight::Right
        } else {
            Sight::Nothing
        }
    }

    /// Moves the mouse at `mouse` as far as it will go.
    ///
    /// The mouse walks toward whatever it can see, eats cheese on the way (then
    /// looks again), passes through tunnels, drops down holes, and dies when it
    /// steps onto or falls into a trap. After every landing the whole board settles
    /// under gravity.
    ///
    /// # Returns
    /// The final position of the mouse. If the mouse died this is the trap it died
    /// in, and the mouse is no longer on the board.
    pub fn update_mouse(&mut self, mouse: Position) -> Position {
        let (mut mx, mut my) = (mouse.x, mouse.y);
        loop {
            if self.get(mx, my + 1) == Cell::Trap {
                self.set(mx, my, Cell::Empty);
                return Position::new(mx, my + 1);
            }

            let Some(step) = self.can_mouse_see_cheese(Position::new(mx, my)).step() else {
                break;
            };
            self.set(mx, my, Cell::Empty);

            loop {
                mx += step;
                match self.get(mx, my) {
                    Cell::Trap => return Position::new(mx, my),
                    Cell::Cheese => {
                        self.set(mx, my, Cell::Empty);
                        break;
                    }
                    Cell::Tunnel => {}
                    Cell::Empty => match self.get(mx, my + 1) {
                        Cell::Trap => return Position::new(mx, my + 1),
                        Cell::Empty => break,
                        _ => {}
                    },
                    _ => {
                        mx -= step;
                        break;
                    }
                }
            }

            while self.get(mx, my + 1) == Cell::Empty {
                my += 1;
            }
            self.set(mx, my, Cell::Mouse);
            self.apply_gravity();
        }
        Position::new(mx, my)
    }

    /// Runs every mouse until a full sweep moves none of them.
    ///
    /// One mouse leaving can open a path for another, so a single sweep is not
    /// enough. Each sweep works from a snapshot of mouse positions; a snapshot
    /// entry that no longer holds a mouse was displaced earlier in the sweep, which
    /// already forces another sweep.
    pub fn move_all_mice(&mut self) {
        loop {
            let mut moved = false;
            let mice: Vec<Position> = self.mice().collect();
            for mouse in mice {
                if self.get_at(mouse) != Cell::Mouse {
                    continue;
                }
                if self.update_mouse(mouse) != mouse {
                    moved = true;
                    self.apply_gravity();
                }
            }
            if !moved {
                break;
            }
        }
    }

    /// Produces the board that results from removing `removed`.
    ///
    /// The removed cells are emptied on a clone, gravity settles the board and
    /// then every mouse runs to a fixed point. `self` is left untouched.
    ///
    /// ```
    /// use mousetrap_solver::engine::{Board, Position};
    /// let board: Board = ".M.\n.r.\n.r.\n.T.\n###\n".parse().unwrap();
    /// let after = board.make_move(&[Position::new(1, 1), Position::new(1, 2)]);
    /// assert!(!after.has_mice());
    /// assert!(board.has_mice());
    /// ```
    pub fn make_move(&self, removed: &[Position]) -> Board {
        let mut next = self.clone();
        next.remove_blocks(removed);
        next.apply_gravity();
        next.move_all_mice();
        next
    }

    /// Lists every legal click in row-major order.
    ///
    /// The iterator is lazy and borrows the board; call this again for a fresh pass.
    pub fn possible_moves(&self) -> PossibleMoves<'_> {
        PossibleMoves {
            board: self,
            next: 0,
            covered: vec![false; self.cells.len()],
        }
    }
}

impl fmt::Display for Board {
    /// Formats the board as its canonical rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for Board {
    type Err = ParseError;

    /// Parses level text: carriage returns are stripped and empty lines skipped.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.replace('\r', "");
        let rows: Vec<&str> = text.split('\n').filter(|line| !line.is_empty()).collect();
        Board::from_rows(&rows)
    }
}

/// Iterator over the legal moves of a board, created by [`Board::possible_moves`].
///
/// Cells of a grouped move already yielded are not offered again. Bombs are
/// never marked covered, so overlapping blasts are each enumerated.
#[derive(Clone, Debug)]
pub struct PossibleMoves<'a> {
    board: &'a Board,
    next: usize,
    covered: Vec<bool>,
}

impl Iterator for PossibleMoves<'_> {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        let board = self.board;
        while self.next < board.cells.len() {
            let i = self.next;
            self.next += 1;
            let cell = board.cells[i];
            let click = board.position_of(i);

            if cell.is_clickable() && !self.covered[i] {
                let group = board.linked_blocks(click.x, click.y);
                // minimum 2 blocks to click
                if group.len() >= 2 {
                    for p in &group {
                        self.covered[board.index(p.x, p.y)] = true;
                    }
                    return Some(Move {
                        click,
                        cell,
                        removed: group,
                    });
                }
            } else if cell == Cell::Bomb {
                if let Some(blast) = board.bomb_blast(click.x, click.y) {
                    return Some(Move {
                        click,
                        cell,
                        removed: blast,
                    });
                }
            }
        }
        None
    }
}
