//! Reading battle maps from text and writing them back.

use tracing::debug;

use crate::config::MapSymbols;
use crate::error::{Result, SkirmishError};
use crate::factions::Faction;
use crate::grid::{CellType, Coord, GridModel};
use crate::units::UnitRegistry;

/// Initial placement of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Owning faction.
    pub faction: Faction,
    /// Starting cell.
    pub position: Coord,
}

/// A parsed map: static topology plus where the units start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleMap {
    /// Walkable cells.
    pub grid: GridModel,
    /// Unit placements in reading order.
    pub placements: Vec<Placement>,
}

impl BattleMap {
    /// Number of units a faction starts with.
    #[must_use]
    pub fn unit_count(&self, faction: Faction) -> usize {
        self.placements
            .iter()
            .filter(|p| p.faction == faction)
            .count()
    }
}

/// Parse a rectangular character map.
///
/// Unit markers stand on open floor. Leading and trailing blank lines and
/// `\r` line endings are tolerated; a blank line inside the map is a
/// ragged row. Anything else that is not part of `symbols` is rejected.
pub fn parse_map(input: &str, symbols: &MapSymbols) -> Result<BattleMap> {
    symbols.validate()?;

    let mut rows: Vec<&str> = input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while rows.last().is_some_and(|row| row.trim().is_empty()) {
        rows.pop();
    }
    let leading = rows.iter().take_while(|row| row.trim().is_empty()).count();
    rows.drain(..leading);
    if rows.is_empty() {
        return Err(SkirmishError::EmptyMap);
    }

    let width = rows[0].chars().count();
    if width == 0 {
        return Err(SkirmishError::EmptyMap);
    }

    let mut cells = Vec::with_capacity(width * rows.len());
    let mut placements = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != width {
            return Err(SkirmishError::RaggedRow {
                row: y,
                expected: width,
                found,
            });
        }

        for (x, symbol) in row.chars().enumerate() {
            let coord = Coord::new(x as u32, y as u32);
            let cell = if symbol == symbols.wall {
                CellType::Wall
            } else if symbol == symbols.open {
                CellType::Open
            } else if let Some(faction) = symbols.faction_for(symbol) {
                placements.push(Placement {
                    faction,
                    position: coord,
                });
                CellType::Open
            } else {
                return Err(SkirmishError::UnknownSymbol {
                    symbol,
                    x: coord.x,
                    y: coord.y,
                });
            };
            cells.push(cell);
        }
    }

    let map = BattleMap {
        grid: GridModel::from_cells(width as u32, rows.len() as u32, cells),
        placements,
    };

    for faction in Faction::ALL {
        if map.unit_count(faction) == 0 {
            return Err(SkirmishError::MissingFaction(faction));
        }
    }

    debug!(
        width = map.grid.width(),
        height = map.grid.height(),
        open_cells = map.grid.open_count(),
        elves = map.unit_count(Faction::Elves),
        goblins = map.unit_count(Faction::Goblins),
        "Parsed battle map"
    );

    Ok(map)
}

/// Render the grid with current unit positions, one string per row.
#[must_use]
pub fn render_map(grid: &GridModel, units: &UnitRegistry, symbols: &MapSymbols) -> Vec<String> {
    (0..grid.height())
        .map(|y| {
            (0..grid.width())
                .map(|x| {
                    let coord = Coord::new(x, y);
                    match units.occupant_at(coord) {
                        Some(unit) => symbols.marker(unit.faction),
                        None if grid.is_open(coord) => symbols.open,
                        None => symbols.wall,
                    }
                })
                .collect()
        })
        .collect()
}
