//! Placement engine: roads, building placement/removal and grid consistency

mod revenue;

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Serialize;

use crate::building::{Building, BuildingId};
use crate::config::PlotConfiguration;
use crate::grid::{Grid, GridError, Plot, PlotId, Position, Rect, Tile};

pub use revenue::{revenue_per_hour, BonusAnalysis, ChannelOutput, RevenueTotals};

/// Why a placement attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementRejection {
    OutOfBounds,
    NoPlot,
    SpansPlots,
    Overlap,
    NoRoadAccess,
    /// A building with the same id is already placed.
    DuplicateId,
}

/// Result of a single placement attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementOutcome {
    pub building: Building,
    pub position: Position,
    pub plot_id: Option<PlotId>,
    pub is_valid: bool,
    /// Only evaluated once the geometric checks pass; `false` otherwise.
    pub has_road_access: bool,
    pub rejection: Option<PlacementRejection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

struct Verdict {
    plot_id: Option<PlotId>,
    has_road_access: bool,
    rejection: Option<PlacementRejection>,
}

pub struct PlacementEngine {
    grid: Grid,
    buildings: Vec<Building>,
    inventory: HashMap<String, u32>,
}

impl PlacementEngine {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            buildings: Vec::new(),
            inventory: HashMap::new(),
        }
    }

    pub fn from_config(config: PlotConfiguration) -> Result<Self, GridError> {
        Grid::new(config).map(Self::new)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn plots(&self) -> &[Plot] {
        self.grid.plots()
    }

    /// Placed buildings in placement order.
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, id: &BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| &b.id == id)
    }

    pub fn inventory_count(&self, name: &str) -> u32 {
        self.inventory.get(name).copied().unwrap_or(0)
    }

    pub fn inventory(&self) -> BTreeMap<&str, u32> {
        self.inventory
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, count)| (name.as_str(), *count))
            .collect()
    }

    /// Marks a tile as road. Row 0 and out-of-bounds positions are refused.
    pub fn place_road(&mut self, position: Position) -> bool {
        if !self.grid.in_bounds(position) || position.y == 0 {
            return false;
        }
        match self.grid.tile(position) {
            Some(Tile::Road) => true,
            Some(Tile::Building(id)) => {
                debug!("road at {position} refused, occupied by {id}");
                false
            }
            Some(Tile::Empty) => {
                self.grid.set_tile(position, Tile::Road);
                true
            }
            None => false,
        }
    }

    /// Places every position in order, returning how many became road.
    pub fn place_roads(&mut self, positions: &[Position]) -> usize {
        positions
            .iter()
            .filter(|pos| self.place_road(**pos))
            .count()
    }

    /// Checks whether `building` could be placed at `position` without mutating anything.
    pub fn can_place(&self, building: &Building, position: Position) -> bool {
        self.check(building, position).rejection.is_none()
    }

    pub fn place_building(&mut self, building: &Building, position: Position) -> PlacementOutcome {
        let verdict = self.check(building, position);
        let mut placed = building.clone();

        if let Some(reason) = verdict.rejection {
            debug!(
                "placement of {} ({}) at {position} rejected: {reason:?}",
                building.id, building.name
            );
        } else {
            placed.position = Some(position);
            for tile in placed.footprint_at(position).tiles() {
                self.grid.set_tile(tile, Tile::Building(placed.id.clone()));
            }
            *self.inventory.entry(placed.name.clone()).or_insert(0) += 1;
            self.buildings.push(placed.clone());
        }

        PlacementOutcome {
            building: placed,
            position,
            plot_id: verdict.plot_id,
            is_valid: verdict.rejection.is_none(),
            has_road_access: verdict.has_road_access,
            rejection: verdict.rejection,
        }
    }

    /// Clears a placed building. Returns the building, unplaced, when it was tracked.
    pub fn remove_building(&mut self, id: &BuildingId) -> Option<Building> {
        let index = self.buildings.iter().position(|b| &b.id == id)?;
        let footprint = self.buildings[index].footprint()?;
        let mut building = self.buildings.remove(index);

        for tile in footprint.tiles() {
            self.grid.set_tile(tile, Tile::Empty);
        }
        if let Some(count) = self.inventory.get_mut(&building.name) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.inventory.remove(&building.name);
            }
        }
        building.position = None;
        Some(building)
    }

    fn check(&self, building: &Building, position: Position) -> Verdict {
        let reject = |plot_id, rejection| Verdict {
            plot_id,
            has_road_access: false,
            rejection: Some(rejection),
        };

        // a zero-area footprint covers no tiles and could never be tracked
        if !self.grid.in_bounds(position) || building.size.area() == 0 {
            return reject(None, PlacementRejection::OutOfBounds);
        }
        let Some(plot) = self.grid.plot_at(position) else {
            return reject(None, PlacementRejection::NoPlot);
        };
        let plot_id = Some(plot.id());
        let footprint = building.footprint_at(position);
        if !plot.bounds().contains_rect(&footprint) {
            return reject(plot_id, PlacementRejection::SpansPlots);
        }
        if self.overlaps(&footprint) {
            return reject(plot_id, PlacementRejection::Overlap);
        }
        if self.building(&building.id).is_some() {
            return reject(plot_id, PlacementRejection::DuplicateId);
        }

        let has_road_access = !building.requires_road() || self.touches_road(&footprint);
        Verdict {
            plot_id,
            has_road_access,
            rejection: (!has_road_access).then_some(PlacementRejection::NoRoadAccess),
        }
    }

    /// Out-of-bounds tiles count as overlap.
    fn overlaps(&self, footprint: &Rect) -> bool {
        footprint
            .tiles()
            .any(|pos| self.grid.tile(pos).map_or(true, Tile::is_occupied))
    }

    fn touches_road(&self, footprint: &Rect) -> bool {
        footprint
            .border()
            .into_iter()
            .any(|pos| self.grid.tile(pos).is_some_and(Tile::is_road))
    }

    /// Cross-checks tiles, plots and the building set.
    pub fn validate_grid(&self) -> GridValidation {
        let mut errors = Vec::new();
        let tracked: HashMap<&BuildingId, &Building> =
            self.buildings.iter().map(|b| (&b.id, b)).collect();
        if tracked.len() != self.buildings.len() {
            errors.push("building ids are not unique".to_string());
        }

        for (pos, tile) in self.grid.iter_tiles() {
            if pos.y == 0 && !tile.is_road() {
                errors.push(format!("tile {pos} in the permanent road row is not road"));
            }
            if let Some(id) = tile.building() {
                match tracked.get(id).and_then(|b| b.footprint()) {
                    Some(footprint) if footprint.contains(pos) => {}
                    Some(_) => errors.push(format!(
                        "tile {pos} references {id} outside its footprint"
                    )),
                    None => errors.push(format!("tile {pos} references untracked building {id}")),
                }
            }
            if let Some(plot) = self.grid.plot_at(pos) {
                if plot.tile(pos) != Some(tile) {
                    errors.push(format!("{} mirror disagrees with grid at {pos}", plot.id()));
                }
            }
        }

        for building in &self.buildings {
            let Some(footprint) = building.footprint() else {
                errors.push(format!("building {} is tracked without a position", building.id));
                continue;
            };
            let inside_plot = self
                .grid
                .plot_at(footprint.origin)
                .is_some_and(|plot| plot.bounds().contains_rect(&footprint));
            if !inside_plot {
                errors.push(format!(
                    "building {} at {} is not contained in a single plot",
                    building.id, footprint.origin
                ));
            }
            for pos in footprint.tiles() {
                if self.grid.tile(pos).and_then(Tile::building) != Some(&building.id) {
                    errors.push(format!(
                        "building {} does not own its tile {pos}",
                        building.id
                    ));
                }
            }
        }

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for building in &self.buildings {
            *counts.entry(building.name.as_str()).or_insert(0) += 1;
        }
        let indexed: HashMap<&str, u32> = self
            .inventory
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        if counts != indexed {
            errors.push("inventory counts disagree with placed buildings".to_string());
        }

        GridValidation {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// One line per row: `.` empty, `R` road, building initial otherwise.
    pub fn visualize(&self) -> String {
        let width = self.grid.width() as usize;
        let mut lines = Vec::with_capacity(self.grid.height() as usize);
        let mut row = Vec::with_capacity(width);
        for (pos, tile) in self.grid.iter_tiles() {
            let glyph = match tile {
                Tile::Empty => '.',
                Tile::Road => 'R',
                Tile::Building(id) => self.building(id).map_or('?', Building::glyph),
            };
            row.push(glyph.to_string());
            if pos.x as usize == width - 1 {
                lines.push(row.join(" "));
                row.clear();
            }
        }
        lines.join("\n")
    }
}
