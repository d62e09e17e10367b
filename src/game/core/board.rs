use serde::{Deserialize, Serialize};
use std::fmt;

pub const SIZE: usize = 3;

/// A player's mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::X => write!(f, "X"),
            Symbol::O => write!(f, "O"),
        }
    }
}

/// Result of evaluating a board: a three-in-a-row for one symbol, or a full
/// board with no line.
///
/// Serialized as `"X"`, `"O"` or `"draw"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Outcome {
    Win(Symbol),
    Draw,
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.to_string()
    }
}

impl TryFrom<String> for Outcome {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "X" => Ok(Outcome::Win(Symbol::X)),
            "O" => Ok(Outcome::Win(Symbol::O)),
            "draw" => Ok(Outcome::Draw),
            other => Err(format!("unknown outcome {other:?}")),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(symbol) => write!(f, "{symbol}"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// 3x3 grid, row-major. Serializes as `[[cell; 3]; 3]` with `null` for empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([[Option<Symbol>; SIZE]; SIZE]);

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: [[Option<Symbol>; SIZE]; SIZE]) -> Self {
        Self(rows)
    }

    /// Cell contents, or `None` when out of range or empty
    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        self.0.get(row)?.get(col).copied().flatten()
    }

    pub fn in_bounds(row: usize, col: usize) -> bool {
        row < SIZE && col < SIZE
    }

    /// Returns a copy with `symbol` placed at (row, col).
    /// The caller is responsible for checking the cell is empty.
    pub fn with_placed(&self, row: usize, col: usize, symbol: Symbol) -> Self {
        let mut next = *self;
        next.0[row][col] = Some(symbol);
        next
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().flatten().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().flatten().all(Option::is_some)
    }

    /// Cells whose contents differ between `self` and `other`, as (row, col)
    pub fn diff(&self, other: &Board) -> Vec<(usize, usize)> {
        let mut changed = Vec::new();
        for row in 0..SIZE {
            for col in 0..SIZE {
                if self.0[row][col] != other.0[row][col] {
                    changed.push((row, col));
                }
            }
        }
        changed
    }

    fn lines(&self) -> impl Iterator<Item = [Option<Symbol>; SIZE]> + '_ {
        let rows = self.0.iter().copied();
        let columns = (0..SIZE).map(move |col| [self.0[0][col], self.0[1][col], self.0[2][col]]);
        let diagonals = [
            [self.0[0][0], self.0[1][1], self.0[2][2]],
            [self.0[0][2], self.0[1][1], self.0[2][0]],
        ];
        rows.chain(columns).chain(diagonals)
    }
}

/// Full-board scan over rows, columns and both diagonals.
/// Returns `None` while the game is still open.
pub fn evaluate(board: &Board) -> Option<Outcome> {
    for line in board.lines() {
        if let [Some(first), rest @ ..] = line
            && rest.iter().all(|cell| *cell == Some(first))
        {
            return Some(Outcome::Win(first));
        }
    }

    board.is_full().then_some(Outcome::Draw)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                match cell {
                    Some(symbol) => write!(f, "{symbol}")?,
                    None => write!(f, "_")?,
                }
            }
        }
        Ok(())
    }
}
