//! Plain-text overworld map descriptions.
//!
//! ```text
//! overworld.png
//! 32,32
//! 4,3
//! 1,1,1,1,
//! 1,5,1,1,
//! 1,1,1,1
//! ```
//!
//! The first three lines name the tileset image, the tile extents and the map
//! dimensions. Every remaining line is joined and split on commas into
//! 1-based tileset indices, one per tile in flat index order. Blank lines are
//! ignored anywhere in the file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use loaf_core::HexLayout;
use thiserror::Error;

/// Parsed map description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MapDescription {
    pub(crate) tileset: String,
    pub(crate) layout: HexLayout,
    pub(crate) indices: Vec<u32>,
}

/// Errors raised while parsing a map description.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MapFormatError {
    /// One of the three header lines is absent.
    #[error("map description is missing the {line} line")]
    MissingLine {
        /// Which header line is missing.
        line: &'static str,
    },
    /// A header line is not a pair of positive integers.
    #[error("{line} must be two positive integers separated by a comma (found `{value}`)")]
    InvalidPair {
        /// Which header line failed.
        line: &'static str,
        /// Offending text.
        value: String,
    },
    /// A tile entry is not a non-negative integer.
    #[error("tile entry {position} is not a tileset index (found `{value}`)")]
    InvalidIndex {
        /// Zero-based position of the entry.
        position: usize,
        /// Offending text.
        value: String,
    },
    /// The number of tile entries differs from `width * height`.
    #[error("expected {expected} tile entries but found {actual}")]
    TileCount {
        /// `width * height`.
        expected: usize,
        /// Entries present.
        actual: usize,
    },
}

impl MapDescription {
    /// Parses the textual map format.
    pub(crate) fn parse(contents: &str) -> Result<Self, MapFormatError> {
        let mut lines = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());

        let tileset = lines
            .next()
            .ok_or(MapFormatError::MissingLine { line: "tileset" })?
            .to_owned();
        let (tile_width, tile_height) = parse_pair(lines.next(), "tile size")?;
        let (width, height) = parse_pair(lines.next(), "map size")?;
        let layout = HexLayout::new(width, height, tile_width, tile_height);

        let body: String = lines.collect();
        let indices = body
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .enumerate()
            .map(|(position, entry)| {
                entry
                    .parse::<u32>()
                    .map_err(|_| MapFormatError::InvalidIndex {
                        position,
                        value: entry.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let expected = layout.tile_count();
        if indices.len() != expected {
            return Err(MapFormatError::TileCount {
                expected,
                actual: indices.len(),
            });
        }

        Ok(Self {
            tileset,
            layout,
            indices,
        })
    }

    /// Reads and parses a map description from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read map description {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse map description {}", path.display()))
    }
}

fn parse_pair(line: Option<&str>, name: &'static str) -> Result<(u32, u32), MapFormatError> {
    let line = line.ok_or(MapFormatError::MissingLine { line: name })?;
    let invalid = || MapFormatError::InvalidPair {
        line: name,
        value: line.to_owned(),
    };

    let (first, second) = line.split_once(',').ok_or_else(invalid)?;
    let first: u32 = first.trim().parse().map_err(|_| invalid())?;
    let second: u32 = second.trim().parse().map_err(|_| invalid())?;
    if first == 0 || second == 0 {
        return Err(invalid());
    }
    Ok((first, second))
}
