//! Tile grid subdivided into fixed-size plots

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::building::BuildingId;
use crate::config::PlotConfiguration;

/// Tile coordinates, relative to the grid origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Axis-aligned tile rectangle, inclusive of its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub origin: Position,
    pub size: Size,
}

impl Rect {
    pub fn new(origin: Position, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn min_x(&self) -> i32 {
        self.origin.x
    }

    pub fn min_y(&self) -> i32 {
        self.origin.y
    }

    pub fn max_x(&self) -> i32 {
        self.origin.x + self.size.width as i32 - 1
    }

    pub fn max_y(&self) -> i32 {
        self.origin.y + self.size.height as i32 - 1
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min_x()
            && pos.x <= self.max_x()
            && pos.y >= self.min_y()
            && pos.y <= self.max_y()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min_x() >= self.min_x()
            && other.max_x() <= self.max_x()
            && other.min_y() >= self.min_y()
            && other.max_y() <= self.max_y()
    }

    /// Every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Position> + '_ {
        (self.min_y()..=self.max_y())
            .flat_map(move |y| (self.min_x()..=self.max_x()).map(move |x| Position::new(x, y)))
    }

    /// Tiles directly above, below, left and right of the rectangle (no corners).
    pub fn border(&self) -> Vec<Position> {
        let mut border = Vec::with_capacity(2 * (self.size.width + self.size.height) as usize);
        for x in self.min_x()..=self.max_x() {
            border.push(Position::new(x, self.min_y() - 1));
            border.push(Position::new(x, self.max_y() + 1));
        }
        for y in self.min_y()..=self.max_y() {
            border.push(Position::new(self.min_x() - 1, y));
            border.push(Position::new(self.max_x() + 1, y));
        }
        border
    }

    /// Per-axis distance between the closest tiles of two rectangles.
    pub fn axis_distance(&self, other: &Rect) -> (u32, u32) {
        let dx = (other.min_x() - self.max_x())
            .max(self.min_x() - other.max_x())
            .max(0);
        let dy = (other.min_y() - self.max_y())
            .max(self.min_y() - other.max_y())
            .max(0);
        (dx as u32, dy as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tile {
    #[default]
    Empty,
    Road,
    Building(BuildingId),
}

impl Tile {
    pub fn is_occupied(&self) -> bool {
        !matches!(self, Tile::Empty)
    }

    pub fn is_road(&self) -> bool {
        matches!(self, Tile::Road)
    }

    pub fn building(&self) -> Option<&BuildingId> {
        match self {
            Tile::Building(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlotId(u32);

impl PlotId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plot-{}", self.0)
    }
}

/// Fixed-size region of the grid that any single building must fit inside.
#[derive(Debug, Clone)]
pub struct Plot {
    id: PlotId,
    plot_x: u32,
    plot_y: u32,
    bounds: Rect,
    tiles: Vec<Tile>,
}

impl Plot {
    pub fn id(&self) -> PlotId {
        self.id
    }

    /// Coordinates in the grid-of-plots.
    pub fn plot_coords(&self) -> (u32, u32) {
        (self.plot_x, self.plot_y)
    }

    pub fn position(&self) -> Position {
        self.bounds.origin
    }

    pub fn size(&self) -> Size {
        self.bounds.size
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.bounds.contains(pos)
    }

    /// Local mirror of the grid tile at a grid position inside this plot.
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.local_index(pos).map(|idx| &self.tiles[idx])
    }

    fn set_tile(&mut self, pos: Position, tile: Tile) {
        if let Some(idx) = self.local_index(pos) {
            self.tiles[idx] = tile;
        }
    }

    fn local_index(&self, pos: Position) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let lx = (pos.x - self.bounds.min_x()) as usize;
        let ly = (pos.y - self.bounds.min_y()) as usize;
        Some(ly * self.bounds.size.width as usize + lx)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("plot configuration must contain at least one plot with a non-empty size")]
    EmptyConfiguration,
    #[error("plot ({plot_x}, {plot_y}) has no neighboring plot")]
    PlotWithoutNeighbor { plot_x: u32, plot_y: u32 },
    #[error("plot configuration {plots_x}x{plots_y} of {width}x{height} exceeds the grid size limit")]
    TooLarge {
        plots_x: u32,
        plots_y: u32,
        width: u32,
        height: u32,
    },
}

/// Tile grid with a permanent road along row 0.
#[derive(Debug, Clone)]
pub struct Grid {
    config: PlotConfiguration,
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    plots: Vec<Plot>,
}

impl Grid {
    pub fn new(config: PlotConfiguration) -> Result<Self, GridError> {
        if config.plots_x == 0 || config.plots_y == 0 || config.plot_size.area() == 0 {
            return Err(GridError::EmptyConfiguration);
        }

        let Some((width, height)) = config.tile_dimensions() else {
            return Err(GridError::TooLarge {
                plots_x: config.plots_x,
                plots_y: config.plots_y,
                width: config.plot_size.width,
                height: config.plot_size.height,
            });
        };
        let mut tiles = vec![Tile::Empty; (width * height) as usize];
        for tile in tiles.iter_mut().take(width as usize) {
            *tile = Tile::Road;
        }

        let mut plots = Vec::with_capacity(config.plots_x as usize * config.plots_y as usize);
        for plot_x in 0..config.plots_x {
            for plot_y in 0..config.plots_y {
                let has_neighbor = plot_x > 0
                    || plot_x + 1 < config.plots_x
                    || plot_y > 0
                    || plot_y + 1 < config.plots_y;
                if !has_neighbor {
                    return Err(GridError::PlotWithoutNeighbor { plot_x, plot_y });
                }

                let origin = Position::new(
                    (plot_x * config.plot_size.width) as i32,
                    (plot_y * config.plot_size.height) as i32 + 1,
                );
                plots.push(Plot {
                    id: PlotId(plots.len() as u32),
                    plot_x,
                    plot_y,
                    bounds: Rect::new(origin, config.plot_size),
                    tiles: vec![Tile::Empty; config.plot_size.area() as usize],
                });
            }
        }

        Ok(Self {
            config,
            width,
            height,
            tiles,
            plots,
        })
    }

    pub fn config(&self) -> &PlotConfiguration {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).map(|idx| &self.tiles[idx])
    }

    /// Writes a tile to the grid and to the owning plot's mirror.
    pub(crate) fn set_tile(&mut self, pos: Position, tile: Tile) {
        let Some(idx) = self.index(pos) else {
            return;
        };
        if let Some(plot) = self.plots.iter_mut().find(|plot| plot.contains(pos)) {
            plot.set_tile(pos, tile.clone());
        }
        self.tiles[idx] = tile;
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.get(id.0 as usize)
    }

    pub fn plot_at(&self, pos: Position) -> Option<&Plot> {
        self.plots.iter().find(|plot| plot.contains(pos))
    }

    /// Iterates all tiles with their positions in row-major order.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        let width = self.width as usize;
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            (
                Position::new((idx % width) as i32, (idx / width) as i32),
                tile,
            )
        })
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(plots_x: u32, plots_y: u32, w: u32, h: u32) -> PlotConfiguration {
        PlotConfiguration::new(plots_x, plots_y, Size::new(w, h))
    }

    #[test]
    fn grid_dimensions_include_road_row() {
        let grid = Grid::new(config(3, 2, 4, 5)).unwrap();
        assert_eq!(grid.width(), 12);
        assert_eq!(grid.height(), 11);
        assert_eq!(grid.plots().len(), 6);
    }

    #[test]
    fn first_row_is_road_and_rest_empty() {
        let grid = Grid::new(config(2, 1, 3, 3)).unwrap();
        for (pos, tile) in grid.iter_tiles() {
            if pos.y == 0 {
                assert_eq!(tile, &Tile::Road);
                assert!(tile.is_occupied());
            } else {
                assert_eq!(tile, &Tile::Empty);
            }
        }
    }

    #[test]
    fn single_plot_has_no_neighbor() {
        let err = Grid::new(config(1, 1, 4, 4)).unwrap_err();
        assert_eq!(err, GridError::PlotWithoutNeighbor { plot_x: 0, plot_y: 0 });
    }

    #[test]
    fn oversized_configuration_is_an_error() {
        let err = Grid::new(config(2, 1, 65536, 65536)).unwrap_err();
        assert!(matches!(err, GridError::TooLarge { plots_x: 2, .. }));
        let err = Grid::new(config(u32::MAX, 2, u32::MAX, 1)).unwrap_err();
        assert!(matches!(err, GridError::TooLarge { .. }));
    }

    #[test]
    fn plots_are_offset_below_road_row() {
        let grid = Grid::new(config(2, 2, 4, 3)).unwrap();
        let positions: Vec<_> = grid.plots().iter().map(|p| p.position()).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(0, 1),
                Position::new(0, 4),
                Position::new(4, 1),
                Position::new(4, 4),
            ]
        );
        assert_eq!(grid.plot_at(Position::new(5, 5)).map(|p| p.id().raw()), Some(3));
        assert!(grid.plot_at(Position::new(1, 0)).is_none());
    }

    #[test]
    fn set_tile_updates_plot_mirror() {
        let mut grid = Grid::new(config(2, 1, 3, 3)).unwrap();
        let pos = Position::new(4, 2);
        grid.set_tile(pos, Tile::Road);
        assert_eq!(grid.tile(pos), Some(&Tile::Road));
        let plot = grid.plot_at(pos).unwrap();
        assert_eq!(plot.tile(pos), Some(&Tile::Road));
    }

    #[test]
    fn rect_border_excludes_corners() {
        let rect = Rect::new(Position::new(2, 2), Size::new(2, 1));
        let border = rect.border();
        assert_eq!(border.len(), 6);
        assert!(border.contains(&Position::new(1, 2)));
        assert!(border.contains(&Position::new(4, 2)));
        assert!(!border.contains(&Position::new(1, 1)));
    }

    #[test]
    fn rect_axis_distance_between_closest_tiles() {
        let a = Rect::new(Position::new(0, 0), Size::new(2, 2));
        let b = Rect::new(Position::new(2, 0), Size::new(1, 1));
        let c = Rect::new(Position::new(5, 4), Size::new(1, 1));
        assert_eq!(a.axis_distance(&b), (1, 0));
        assert_eq!(a.axis_distance(&c), (4, 3));
        assert_eq!(c.axis_distance(&a), (4, 3));
        assert_eq!(a.axis_distance(&a), (0, 0));
    }
}
