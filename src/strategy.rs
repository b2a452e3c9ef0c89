//! Road layout generators and the best-layout search

use std::collections::HashSet;
use std::fmt;

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::building::Building;
use crate::config::PlotConfiguration;
use crate::grid::{GridError, Position};
use crate::optimizer::place_sequentially;
use crate::placement::{BonusAnalysis, GridValidation, PlacementEngine};

/// Label of the placeholder result returned when there was nothing to select from.
pub const UNAVAILABLE: &str = "unavailable";

/// Predetermined road network topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoadStrategy {
    /// Only the permanent road row.
    None,
    CentralCross,
    GridNetwork,
    PlotBorders,
    Sparse,
}

impl RoadStrategy {
    /// Evaluation order; ties go to the earlier entry.
    pub const ALL: [RoadStrategy; 5] = [
        RoadStrategy::None,
        RoadStrategy::CentralCross,
        RoadStrategy::GridNetwork,
        RoadStrategy::PlotBorders,
        RoadStrategy::Sparse,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RoadStrategy::None => "none",
            RoadStrategy::CentralCross => "central-cross",
            RoadStrategy::GridNetwork => "grid-network",
            RoadStrategy::PlotBorders => "plot-borders",
            RoadStrategy::Sparse => "sparse",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Road tiles for this layout, without duplicates, in generation order.
    pub fn roads(self, config: &PlotConfiguration) -> Vec<Position> {
        let layout = Layout::new(config);
        let positions = match self {
            RoadStrategy::None => Vec::new(),
            RoadStrategy::CentralCross => layout.central_cross(),
            RoadStrategy::GridNetwork => layout.grid_network(),
            RoadStrategy::PlotBorders => layout.plot_borders(),
            RoadStrategy::Sparse => layout.sparse(),
        };
        let mut seen = HashSet::with_capacity(positions.len());
        positions.into_iter().filter(|pos| seen.insert(*pos)).collect()
    }
}

impl fmt::Display for RoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct Layout {
    width: i32,
    height: i32,
    plots_x: i32,
    plots_y: i32,
    plot_width: i32,
    plot_height: i32,
}

impl Layout {
    fn new(config: &PlotConfiguration) -> Self {
        Self {
            width: config.grid_width() as i32,
            height: config.grid_height() as i32,
            plots_x: config.plots_x as i32,
            plots_y: config.plots_y as i32,
            plot_width: config.plot_size.width as i32,
            plot_height: config.plot_size.height as i32,
        }
    }

    fn vertical(&self, x: i32) -> impl Iterator<Item = Position> {
        (1..self.height).map(move |y| Position::new(x, y))
    }

    fn horizontal(&self, y: i32) -> impl Iterator<Item = Position> {
        (0..self.width).map(move |x| Position::new(x, y))
    }

    fn central_cross(&self) -> Vec<Position> {
        let cx = self.width / 2;
        let cy = self.height / 2;
        self.vertical(cx)
            .chain(self.horizontal(cy).filter(|pos| pos.x != cx))
            .collect()
    }

    fn grid_network(&self) -> Vec<Position> {
        let mut roads = Vec::new();
        for k in 1..self.plots_x {
            roads.extend(self.vertical(k * self.plot_width));
        }
        for k in 1..self.plots_y {
            roads.extend(self.horizontal(1 + k * self.plot_height));
        }
        roads
    }

    fn plot_borders(&self) -> Vec<Position> {
        let mut roads = Vec::new();
        for plot_x in 0..self.plots_x {
            for plot_y in 0..self.plots_y {
                let left = plot_x * self.plot_width;
                let right = left + self.plot_width - 1;
                let top = 1 + plot_y * self.plot_height;
                let bottom = top + self.plot_height - 1;

                // top row of the first plot row already touches the permanent road
                if top > 1 {
                    roads.extend((left..=right).map(|x| Position::new(x, top)));
                }
                if bottom < self.height - 1 {
                    roads.extend((left..=right).map(|x| Position::new(x, bottom)));
                }
                if left > 0 {
                    roads.extend((top..=bottom).map(|y| Position::new(left, y)));
                }
                if right < self.width - 1 {
                    roads.extend((top..=bottom).map(|y| Position::new(right, y)));
                }
            }
        }
        roads
    }

    fn sparse(&self) -> Vec<Position> {
        let cx = self.width / 2;
        let mut roads: Vec<Position> = self.vertical(cx).step_by(2).collect();
        for plot_y in (0..self.plots_y).step_by(2) {
            let mid = 1 + plot_y * self.plot_height + self.plot_height / 2;
            roads.extend(
                self.horizontal(mid)
                    .step_by(2)
                    .filter(|pos| pos.x != cx),
            );
        }
        roads
    }
}

/// Outcome of one full pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub strategy: String,
    pub success: bool,
    pub placed_buildings: Vec<Building>,
    pub failed_buildings: Vec<Building>,
    pub total_coins_revenue: u64,
    pub total_passengers_revenue: u64,
    pub coins_revenue_per_hour: f64,
    pub passengers_revenue_per_hour: f64,
    pub bonus_analysis: Vec<BonusAnalysis>,
    pub grid_visualization: String,
    pub validation: GridValidation,
}

impl OptimizationResult {
    /// Result for an attempt that could not run; every building counts as failed.
    pub fn failed(strategy: impl Into<String>, buildings: &[Building], error: String) -> Self {
        Self {
            strategy: strategy.into(),
            success: false,
            placed_buildings: Vec::new(),
            failed_buildings: buildings.to_vec(),
            total_coins_revenue: 0,
            total_passengers_revenue: 0,
            coins_revenue_per_hour: 0.0,
            passengers_revenue_per_hour: 0.0,
            bonus_analysis: Vec::new(),
            grid_visualization: String::new(),
            validation: GridValidation {
                is_valid: false,
                errors: vec![error],
            },
        }
    }

    pub fn total_revenue(&self) -> u64 {
        self.total_coins_revenue + self.total_passengers_revenue
    }
}

/// Builds a fresh grid, lays `roads`, places `buildings` and totals revenue.
pub fn run_with_roads(
    label: &str,
    config: PlotConfiguration,
    buildings: &[Building],
    roads: &[Position],
) -> OptimizationResult {
    match PlacementEngine::from_config(config) {
        Ok(engine) => run_on(label, engine, buildings, roads),
        Err(err) => aborted(label, buildings, err),
    }
}

/// Road tiles are generated only once the grid exists.
pub fn run_strategy(
    strategy: RoadStrategy,
    config: PlotConfiguration,
    buildings: &[Building],
) -> OptimizationResult {
    let label = strategy.label();
    match PlacementEngine::from_config(config) {
        Ok(engine) => run_on(label, engine, buildings, &strategy.roads(&config)),
        Err(err) => aborted(label, buildings, err),
    }
}

fn aborted(label: &str, buildings: &[Building], err: GridError) -> OptimizationResult {
    warn!("strategy {label} aborted: {err}");
    OptimizationResult::failed(label, buildings, err.to_string())
}

fn run_on(
    label: &str,
    mut engine: PlacementEngine,
    buildings: &[Building],
    roads: &[Position],
) -> OptimizationResult {
    let laid = engine.place_roads(roads);
    let summary = place_sequentially(&mut engine, buildings);
    let totals = engine.revenue_totals();
    let validation = engine.validate_grid();
    info!(
        "strategy {label}: {laid} roads, {} placed, {} failed, revenue {}",
        summary.placed.len(),
        summary.failed.len(),
        totals.combined()
    );

    OptimizationResult {
        strategy: label.to_string(),
        success: validation.is_valid,
        placed_buildings: summary.placed,
        failed_buildings: summary.failed,
        total_coins_revenue: totals.total_coins_revenue,
        total_passengers_revenue: totals.total_passengers_revenue,
        coins_revenue_per_hour: totals.coins_revenue_per_hour,
        passengers_revenue_per_hour: totals.passengers_revenue_per_hour,
        bonus_analysis: engine.bonus_analysis(),
        grid_visualization: engine.visualize(),
        validation,
    }
}

/// Runs every strategy on its own grid. Results come back in `RoadStrategy::ALL` order.
pub fn evaluate_all(config: PlotConfiguration, buildings: &[Building]) -> Vec<OptimizationResult> {
    RoadStrategy::ALL
        .par_iter()
        .map(|strategy| run_strategy(*strategy, config, buildings))
        .collect()
}

/// Highest successful total wins; earlier candidates win ties. Falls back to
/// the first candidate when none succeeded.
pub fn select_best(
    candidates: Vec<OptimizationResult>,
    buildings: &[Building],
) -> OptimizationResult {
    let mut best: Option<OptimizationResult> = None;
    let mut first = None;
    for candidate in candidates {
        if candidate.success
            && best
                .as_ref()
                .map_or(true, |b| candidate.total_revenue() > b.total_revenue())
        {
            best = Some(candidate.clone());
        }
        first.get_or_insert(candidate);
    }

    best.or(first).unwrap_or_else(|| {
        OptimizationResult::failed(
            UNAVAILABLE,
            buildings,
            "no strategy produced a result".into(),
        )
    })
}

pub fn search(config: PlotConfiguration, buildings: &[Building]) -> OptimizationResult {
    let best = select_best(evaluate_all(config, buildings), buildings);
    info!(
        "selected strategy {} with revenue {}",
        best.strategy,
        best.total_revenue()
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{BuildingId, BuildingKind, Production};
    use crate::grid::Size;

    fn config(plots_x: u32, plots_y: u32, w: u32, h: u32) -> PlotConfiguration {
        PlotConfiguration::new(plots_x, plots_y, Size::new(w, h))
    }

    fn house(id: &str) -> Building {
        Building::new(
            BuildingId::new(id),
            "house",
            Size::new(1, 1),
            BuildingKind::Residential(Production {
                revenue: 10,
                time_to_revenue: 60,
            }),
        )
    }

    fn result(strategy: &str, success: bool, coins: u64) -> OptimizationResult {
        let mut result = OptimizationResult::failed(strategy, &[], String::new());
        result.success = success;
        result.total_coins_revenue = coins;
        result
    }

    #[test]
    fn labels_round_trip() {
        for strategy in RoadStrategy::ALL {
            assert_eq!(RoadStrategy::from_label(strategy.label()), Some(strategy));
        }
        assert_eq!(RoadStrategy::from_label("spiral"), None);
    }

    #[test]
    fn no_roads_strategy_is_empty() {
        assert!(RoadStrategy::None.roads(&config(2, 2, 4, 4)).is_empty());
    }

    #[test]
    fn central_cross_has_no_duplicate_crossing() {
        let cfg = config(2, 2, 4, 4);
        let roads = RoadStrategy::CentralCross.roads(&cfg);
        // width 8, height 9: vertical 8 tiles + horizontal 7
        assert_eq!(roads.len(), 15);
        assert!(roads.contains(&Position::new(4, 1)));
        assert!(roads.contains(&Position::new(0, 4)));
        assert!(roads.iter().all(|p| p.y > 0));
    }

    #[test]
    fn grid_network_follows_plot_boundaries() {
        let cfg = config(3, 2, 4, 4);
        let roads = RoadStrategy::GridNetwork.roads(&cfg);
        assert!(roads.contains(&Position::new(4, 1)));
        assert!(roads.contains(&Position::new(8, 8)));
        assert!(roads.contains(&Position::new(0, 5)));
        assert!(!roads.contains(&Position::new(0, 1)));
        // two vertical lines of 8 + one horizontal of 12 minus 2 crossings
        assert_eq!(roads.len(), 26);
    }

    #[test]
    fn plot_borders_skip_outer_edges_and_road_row() {
        let cfg = config(2, 1, 3, 3);
        let roads = RoadStrategy::PlotBorders.roads(&cfg);
        // only the shared inner edges: x=2 and x=3 for rows 1..=3
        let mut expected: Vec<_> = (1..=3)
            .flat_map(|y| [Position::new(2, y), Position::new(3, y)])
            .collect();
        expected.sort();
        let mut actual = roads.clone();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn sparse_is_dotted() {
        let cfg = config(2, 1, 4, 4);
        let roads = RoadStrategy::Sparse.roads(&cfg);
        assert!(roads.contains(&Position::new(4, 1)));
        assert!(!roads.contains(&Position::new(4, 2)));
        assert!(roads.contains(&Position::new(4, 3)));
        assert!(roads.contains(&Position::new(0, 3)));
        assert!(!roads.contains(&Position::new(1, 3)));
    }

    #[test]
    fn generated_roads_stay_in_bounds() {
        let cfg = config(3, 3, 5, 4);
        for strategy in RoadStrategy::ALL {
            for pos in strategy.roads(&cfg) {
                assert!(pos.x >= 0 && pos.x < cfg.grid_width() as i32, "{strategy}: {pos}");
                assert!(pos.y >= 1 && pos.y < cfg.grid_height() as i32, "{strategy}: {pos}");
            }
        }
    }

    #[test]
    fn selection_prefers_strictly_greater_and_successful() {
        let picked = select_best(
            vec![
                result("a", true, 10),
                result("b", false, 99),
                result("c", true, 20),
                result("d", true, 20),
            ],
            &[],
        );
        assert_eq!(picked.strategy, "c");
    }

    #[test]
    fn selection_falls_back_to_first_when_all_fail() {
        let picked = select_best(vec![result("a", false, 5), result("b", false, 50)], &[]);
        assert_eq!(picked.strategy, "a");
        let empty = select_best(Vec::new(), &[house("h")]);
        assert!(!empty.success);
        assert_eq!(empty.strategy, UNAVAILABLE);
        assert!(RoadStrategy::from_label(&empty.strategy).is_none());
        assert_eq!(empty.failed_buildings.len(), 1);
    }

    #[test]
    fn single_plot_grid_becomes_failed_result() {
        let buildings = vec![house("h1"), house("h2")];
        let result = run_strategy(RoadStrategy::CentralCross, config(1, 1, 4, 4), &buildings);
        assert!(!result.success);
        assert_eq!(result.failed_buildings.len(), 2);
        assert_eq!(result.validation.errors.len(), 1);
        assert!(result.validation.errors[0].contains("no neighboring plot"));
    }

    #[test]
    fn oversized_grid_fails_every_strategy() {
        let buildings = vec![house("h1")];
        let results = evaluate_all(config(2, 1, 65536, 65536), &buildings);
        assert_eq!(results.len(), 5);
        for result in &results {
            assert!(!result.success);
            assert_eq!(result.failed_buildings.len(), 1);
            assert!(result.validation.errors[0].contains("exceeds the grid size limit"));
        }
        let best = search(config(2, 1, 65536, 65536), &buildings);
        assert_eq!(best.strategy, "none");
        assert!(!best.success);
    }

    #[test]
    fn evaluate_all_keeps_strategy_order() {
        let results = evaluate_all(config(2, 2, 4, 4), &[house("h1")]);
        let labels: Vec<_> = results.iter().map(|r| r.strategy.as_str()).collect();
        assert_eq!(
            labels,
            vec!["none", "central-cross", "grid-network", "plot-borders", "sparse"]
        );
    }
}
