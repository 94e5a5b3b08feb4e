//! Text tile maps.

use std::{fs, path::Path};

use tessera_core::{Error, Result, Vec2};

use crate::Grid;

/// Reads character matrices where every cell is a single tile id.
///
/// Cells are separated by a configurable separator (`,` by default) and taken
/// verbatim, so a space is a valid tile id. Empty lines are skipped and every
/// row must hold the same number of cells.
#[derive(Clone, Copy, Debug)]
pub struct GridParser {
    separator: char,
}

impl GridParser {
    /// Creates a parser using `,` as the cell separator.
    #[must_use]
    pub const fn new() -> Self {
        Self { separator: ',' }
    }

    /// Creates a parser using `separator` between cells.
    #[must_use]
    pub const fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    /// Cell separator in use.
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Parses `text` into a character matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParse`] for cells that are not exactly one
    /// character and for rows whose length differs from the first row.
    pub fn parse(&self, text: &str) -> Result<Vec<Vec<char>>> {
        let mut map: Vec<Vec<char>> = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }

            let mut row = Vec::new();
            for cell in line.split(self.separator) {
                let mut chars = cell.chars();
                match (chars.next(), chars.next()) {
                    (Some(id), None) => row.push(id),
                    _ => {
                        return Err(Error::InvalidParse {
                            line: number + 1,
                            reason: format!("'{cell}' is not a single tile id"),
                        })
                    }
                }
            }

            if let Some(first) = map.first() {
                if first.len() != row.len() {
                    return Err(Error::InvalidParse {
                        line: number + 1,
                        reason: format!("expected {} tiles, found {}", first.len(), row.len()),
                    });
                }
            }
            map.push(row);
        }
        Ok(map)
    }

    /// Reads and parses the map stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] when the file cannot be read, otherwise
    /// the errors of [`GridParser::parse`].
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<Vec<char>>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|error| Error::FileNotFound {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;
        self.parse(&text)
    }

    /// Parses `text` and builds a grid of `tile_size` tiles from it.
    ///
    /// # Errors
    ///
    /// Same as [`GridParser::parse`].
    pub fn parse_grid(&self, text: &str, tile_size: Vec2) -> Result<Grid> {
        Grid::from_map(&self.parse(text)?, tile_size)
    }
}

impl Default for GridParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::Index;

    use super::*;

    #[test]
    fn parses_rows_of_single_character_cells() {
        let map = GridParser::new()
            .parse("#,#,#\n#, ,#\n\n#,.,#\n")
            .expect("valid map");
        assert_eq!(map.len(), 3);
        assert_eq!(map[1], vec!['#', ' ', '#']);
    }

    #[test]
    fn custom_separators_are_honoured() {
        let grid = GridParser::with_separator(';')
            .parse_grid("a;b\nc;d", Vec2::splat(8.0))
            .expect("valid map");
        assert_eq!(grid.tile(Index::new(1, 0)).id, 'c');
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let parser = GridParser::new();
        assert!(matches!(
            parser.parse("#,#\n#,##"),
            Err(Error::InvalidParse { line: 2, .. })
        ));
        assert!(matches!(
            parser.parse("#,#\n#"),
            Err(Error::InvalidParse { line: 2, .. })
        ));
    }
}
