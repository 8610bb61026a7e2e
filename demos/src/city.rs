// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::HashSet;

use cityview_controller::{TileGrid, Tool, ToolError};
use cityview_view2d::GridLocation;

/// Tile id for bare land.
pub const DIRT: u16 = 0;
/// Tile id for a residential zone center.
pub const RESIDENTIAL: u16 = 244;
/// Tile id for open water.
pub const RIVER: u16 = 4;

/// A tiny in-memory city: a river three columns right of the center and a
/// few zones, some of them cut off from power.
#[derive(Debug, Clone)]
pub struct SampleCity {
    width: u32,
    height: u32,
    tiles: Vec<u16>,
    unpowered: HashSet<GridLocation>,
}

impl SampleCity {
    /// Builds a `width` x `height` city.
    pub fn new(width: u32, height: u32) -> Self {
        let len = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut city = Self {
            width,
            height,
            tiles: vec![DIRT; len],
            unpowered: HashSet::new(),
        };
        let river = i32::try_from(width / 2 + 3).unwrap_or(0);
        for y in 0..i32::try_from(height).unwrap_or(0) {
            city.set(GridLocation::new(river, y), RIVER);
        }
        for (x, y) in [(60, 50), (62, 50), (58, 52)] {
            city.set(GridLocation::new(x, y), RESIDENTIAL);
        }
        city.unpowered.insert(GridLocation::new(60, 50));
        city.unpowered.insert(GridLocation::new(58, 52));
        city
    }

    /// Marks every zone as powered.
    pub fn connect_power(&mut self) {
        self.unpowered.clear();
    }

    fn index(&self, loc: GridLocation) -> Option<usize> {
        if !loc.is_within(self.width, self.height) {
            return None;
        }
        let row = usize::try_from(loc.y).ok()?;
        let col = usize::try_from(loc.x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + col)
    }

    fn set(&mut self, loc: GridLocation, tile: u16) {
        if let Some(i) = self.index(loc) {
            self.tiles[i] = tile;
        }
    }
}

impl TileGrid for SampleCity {
    type Tile = u16;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tile_at(&self, loc: GridLocation) -> u16 {
        self.index(loc).map_or(DIRT, |i| self.tiles[i])
    }

    fn is_powered(&self, loc: GridLocation) -> bool {
        !self.unpowered.contains(&loc)
    }

    fn needs_power(&self, loc: GridLocation) -> bool {
        self.tile_at(loc) == RESIDENTIAL
    }
}

/// Clears a tile back to dirt. Refuses to bulldoze water.
#[derive(Debug, Default)]
pub struct Bulldozer {
    /// Number of tiles cleared so far.
    pub cleared: usize,
}

impl Tool<SampleCity> for Bulldozer {
    fn apply(&mut self, city: &mut SampleCity, loc: GridLocation) -> Result<(), ToolError> {
        match city.tile_at(loc) {
            RIVER => Err(ToolError::new(format!("cannot bulldoze water at {loc}"))),
            _ => {
                city.set(loc, DIRT);
                city.unpowered.remove(&loc);
                self.cleared += 1;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cityview_controller::{TileGrid, Tool};
    use cityview_view2d::GridLocation;

    use super::{Bulldozer, DIRT, RESIDENTIAL, SampleCity};

    #[test]
    fn bulldozer_clears_zones_but_not_water() {
        let mut city = SampleCity::new(120, 100);
        let mut dozer = Bulldozer::default();
        let zone = GridLocation::new(60, 50);
        assert_eq!(city.tile_at(zone), RESIDENTIAL);
        assert!(!city.is_powered(zone));

        dozer.apply(&mut city, zone).unwrap();
        assert_eq!(city.tile_at(zone), DIRT);
        assert!(city.is_powered(zone));

        let err = dozer.apply(&mut city, GridLocation::new(63, 0)).unwrap_err();
        assert_eq!(err.message(), "cannot bulldoze water at (63, 0)");
        assert_eq!(dozer.cleared, 1);
    }

    #[test]
    fn only_zones_need_power() {
        let city = SampleCity::new(120, 100);
        assert!(city.needs_power(GridLocation::new(62, 50)));
        assert!(!city.needs_power(GridLocation::new(0, 0)));
    }
}
