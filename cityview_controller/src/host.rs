// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits: the grid being viewed, the renderer's tile sink, and
//! the tap targets (tools, inspector, failure notifier).
//!
//! Every trait is implemented for matching closures so small hosts and tests
//! can wire things up inline.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use core::error::Error;
use core::fmt;

use cityview_view2d::GridLocation;

/// Read-only view of the simulated tile grid.
///
/// Locations passed to these methods are always inside
/// `width() x height()`.
pub trait TileGrid {
    /// Tile identity handed through to the renderer.
    type Tile: Copy;

    /// Number of columns.
    fn width(&self) -> u32;

    /// Number of rows.
    fn height(&self) -> u32;

    /// Tile at `loc`.
    fn tile_at(&self, loc: GridLocation) -> Self::Tile;

    /// Whether the tile at `loc` currently receives power.
    fn is_powered(&self, loc: GridLocation) -> bool;

    /// Whether the tile at `loc` should blink when it is unpowered.
    ///
    /// Grids where only some tiles (zone centers, say) carry a power state
    /// override this.
    fn needs_power(&self, loc: GridLocation) -> bool {
        let _ = loc;
        true
    }
}

/// Which glyph the renderer should draw for a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileGlyph<T> {
    /// Draw the tile as-is.
    Normal(T),
    /// Draw the blink-alternate (unpowered) glyph in place of the tile.
    Unpowered(T),
}

impl<T: Copy> TileGlyph<T> {
    /// The underlying tile, whichever glyph was chosen.
    #[must_use]
    pub fn tile(&self) -> T {
        match *self {
            Self::Normal(t) | Self::Unpowered(t) => t,
        }
    }
}

/// Receives one call per visible cell during a draw pass.
///
/// Cells are visited row by row. The sink draws in map pixels
/// (`loc * tile_size`) under the controller's render transform.
pub trait TileSink<T> {
    /// Draws `glyph` for the cell at `loc`.
    fn draw_tile(&mut self, loc: GridLocation, glyph: TileGlyph<T>);
}

impl<T, F: FnMut(GridLocation, TileGlyph<T>)> TileSink<T> for F {
    fn draw_tile(&mut self, loc: GridLocation, glyph: TileGlyph<T>) {
        self(loc, glyph);
    }
}

/// Error raised by a [`Tool`] that could not act on a location.
#[derive(Debug)]
pub struct ToolError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ToolError {
    /// Creates an error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, using its `Display` output as the message.
    pub fn from_source(source: impl Error + Send + Sync + 'static) -> Self {
        Self {
            message: format!("{source}"),
            source: Some(Box::new(source)),
        }
    }

    /// The message shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ToolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

impl From<&str> for ToolError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ToolError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// An editing tool applied to the grid cell under a tap.
pub trait Tool<G: ?Sized> {
    /// Applies the tool at `loc`.
    fn apply(&mut self, grid: &mut G, loc: GridLocation) -> Result<(), ToolError>;
}

impl<G: ?Sized, F> Tool<G> for F
where
    F: FnMut(&mut G, GridLocation) -> Result<(), ToolError>,
{
    fn apply(&mut self, grid: &mut G, loc: GridLocation) -> Result<(), ToolError> {
        self(grid, loc)
    }
}

/// Receives inspect requests for taps made while no tool is selected.
pub trait Inspector {
    /// Shows details for the cell at `loc`.
    fn inspect(&mut self, loc: GridLocation);
}

impl<F: FnMut(GridLocation)> Inspector for F {
    fn inspect(&mut self, loc: GridLocation) {
        self(loc);
    }
}

/// Surfaces tool failures to the user, once per failure.
pub trait Notifier {
    /// Reports `error`.
    fn notify_failure(&mut self, error: &ToolError);
}

impl<F: FnMut(&ToolError)> Notifier for F {
    fn notify_failure(&mut self, error: &ToolError) {
        self(error);
    }
}
