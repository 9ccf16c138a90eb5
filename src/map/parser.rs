//! Map parsing functionality for converting raw board layouts into structured data.

use crate::error::ParseError;
use crate::map::grid::CellKind;

/// Represents the parsed data from a raw board layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBoard {
    /// The parsed cells, row-major.
    pub cells: Vec<CellKind>,
    pub rows: usize,
    pub columns: usize,
}

/// Parser for converting raw board layouts into structured map data.
pub struct BoardParser;

impl BoardParser {
    /// Parses a single character into a cell.
    pub fn parse_character(c: char) -> Result<CellKind, ParseError> {
        match c {
            '#' => Ok(CellKind::Wall),
            ' ' => Ok(CellKind::Empty),
            '_' => Ok(CellKind::Floor),
            '.' => Ok(CellKind::Pellet),
            'o' => Ok(CellKind::PowerPellet),
            _ => Err(ParseError::UnknownCharacter(c)),
        }
    }

    /// Parses a raw board layout into structured map data.
    ///
    /// # Errors
    ///
    /// Returns an error if the board is empty, contains unknown characters, or if its
    /// rows are not all the same width.
    pub fn parse_board<S: AsRef<str>>(raw_board: &[S]) -> Result<ParsedBoard, ParseError> {
        let columns = raw_board.first().ok_or(ParseError::EmptyBoard)?.as_ref().chars().count();
        if columns == 0 {
            return Err(ParseError::EmptyBoard);
        }

        let mut cells = Vec::with_capacity(columns * raw_board.len());
        for (row, line) in raw_board.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != columns {
                return Err(ParseError::RaggedRow {
                    row,
                    expected: columns,
                    found,
                });
            }

            for character in line.chars() {
                cells.push(Self::parse_character(character)?);
            }
        }

        Ok(ParsedBoard {
            cells,
            rows: raw_board.len(),
            columns,
        })
    }
}
