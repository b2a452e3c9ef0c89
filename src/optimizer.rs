//! Greedy first-fit placement in caller order

use log::debug;
use serde::Serialize;

use crate::building::Building;
use crate::grid::{Plot, Position};
use crate::placement::PlacementEngine;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSummary {
    /// Buildings with their final positions.
    pub placed: Vec<Building>,
    pub failed: Vec<Building>,
}

/// Places each building at the first valid position, plot by plot, row-major
/// inside a plot. Order is never changed and nothing is revisited.
pub fn place_sequentially(engine: &mut PlacementEngine, buildings: &[Building]) -> PlacementSummary {
    let mut summary = PlacementSummary::default();

    for building in buildings {
        match first_fit(engine, building) {
            Some(position) => {
                let outcome = engine.place_building(building, position);
                summary.placed.push(outcome.building);
            }
            None => {
                debug!("no position found for {} ({})", building.id, building.name);
                summary.failed.push(building.clone());
            }
        }
    }

    summary
}

fn first_fit(engine: &PlacementEngine, building: &Building) -> Option<Position> {
    engine
        .plots()
        .iter()
        .flat_map(|plot| candidate_positions(plot, building))
        .find(|pos| engine.can_place(building, *pos))
}

/// Top-left positions that keep `building` inside `plot`, y outer, x inner.
fn candidate_positions(plot: &Plot, building: &Building) -> Vec<Position> {
    let bounds = plot.bounds();
    let (width, height) = (building.size.width as i32, building.size.height as i32);
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let last_x = bounds.max_x() - width + 1;
    let last_y = bounds.max_y() - height + 1;
    (bounds.min_y()..=last_y)
        .flat_map(|y| (bounds.min_x()..=last_x).map(move |x| Position::new(x, y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{BuildingId, BuildingKind, Production};
    use crate::config::PlotConfiguration;
    use crate::grid::Size;

    fn engine() -> PlacementEngine {
        PlacementEngine::from_config(PlotConfiguration::new(2, 1, Size::new(4, 4))).unwrap()
    }

    fn shop(id: &str, w: u32, h: u32) -> Building {
        Building::new(
            BuildingId::new(id),
            "shop",
            Size::new(w, h),
            BuildingKind::Commercial(Production {
                revenue: 10,
                time_to_revenue: 60,
            }),
        )
    }

    fn tree(id: &str) -> Building {
        Building::new(
            BuildingId::new(id),
            "tree",
            Size::new(1, 1),
            BuildingKind::Decoration {
                production: None,
                bonus: None,
            },
        )
    }

    #[test]
    fn first_fit_walks_row_major_within_first_plot() {
        let mut engine = engine();
        let summary = place_sequentially(&mut engine, &[tree("t1"), tree("t2"), tree("t3")]);
        let positions: Vec<_> = summary.placed.iter().filter_map(|b| b.position).collect();
        assert_eq!(
            positions,
            vec![Position::new(0, 1), Position::new(1, 1), Position::new(2, 1)]
        );
        assert!(summary.failed.is_empty());
    }

    #[test]
    fn road_dependent_buildings_fill_first_row_then_next_plot() {
        let mut engine = engine();
        let shops: Vec<_> = (0..3).map(|i| shop(&format!("s{i}"), 2, 2)).collect();
        let summary = place_sequentially(&mut engine, &shops);
        let positions: Vec<_> = summary.placed.iter().filter_map(|b| b.position).collect();
        assert_eq!(
            positions,
            vec![Position::new(0, 1), Position::new(2, 1), Position::new(4, 1)]
        );
    }

    #[test]
    fn oversized_and_unreachable_buildings_fail() {
        let mut engine = engine();
        let buildings = vec![
            shop("big", 5, 1),
            shop("a", 4, 1),
            shop("b", 4, 1),
            shop("c", 4, 1),
        ];
        let summary = place_sequentially(&mut engine, &buildings);
        assert_eq!(summary.placed.len(), 2);
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(summary.failed[0].id, BuildingId::new("big"));
        assert_eq!(summary.failed[1].id, BuildingId::new("c"));
        assert!(summary.failed.iter().all(|b| b.position.is_none()));
    }

    #[test]
    fn order_is_preserved() {
        let mut engine = engine();
        let buildings = vec![tree("z"), shop("a", 1, 1), tree("m")];
        let summary = place_sequentially(&mut engine, &buildings);
        let ids: Vec<_> = summary.placed.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
