//! Per-building output with proximity bonuses

use serde::Serialize;

use super::PlacementEngine;
use crate::building::{Building, BuildingId, Channel};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Output of one building on one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutput {
    pub base: u32,
    pub bonus_percentage: u32,
    pub final_output: u64,
}

impl ChannelOutput {
    fn new(base: u32, bonus_percentage: u32) -> Self {
        let final_output = if base == 0 {
            0
        } else {
            // ceil(base * (100 + pct) / 100) in integers
            (u64::from(base) * (100 + u64::from(bonus_percentage))).div_ceil(100)
        };
        Self {
            base,
            bonus_percentage,
            final_output,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusAnalysis {
    pub building_id: BuildingId,
    pub name: String,
    pub coins: ChannelOutput,
    pub passengers: ChannelOutput,
    pub bonus_sources: Vec<BuildingId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueTotals {
    pub total_coins_revenue: u64,
    pub total_passengers_revenue: u64,
    pub coins_revenue_per_hour: f64,
    pub passengers_revenue_per_hour: f64,
}

impl RevenueTotals {
    pub fn combined(&self) -> u64 {
        self.total_coins_revenue + self.total_passengers_revenue
    }
}

impl PlacementEngine {
    /// Placed decorations whose bonus reaches `target` on `channel`.
    pub fn bonus_sources(&self, target: &Building, channel: Channel) -> Vec<&Building> {
        let Some(target_rect) = target.footprint() else {
            return Vec::new();
        };
        self.buildings
            .iter()
            .filter(|source| source.id != target.id)
            .filter_map(|source| {
                let bonus = source.bonus()?;
                let source_rect = source.footprint()?;
                let reaches = bonus.target_channel == channel
                    && bonus
                        .neighborhood_shape
                        .within(&source_rect, &target_rect, bonus.radius);
                reaches.then_some(source)
            })
            .collect()
    }

    pub fn channel_output(&self, building: &Building, channel: Channel) -> ChannelOutput {
        let base = match (building.channel(), building.production()) {
            (Some(produced), Some(production)) if produced == channel => production.revenue,
            _ => 0,
        };
        if base == 0 {
            return ChannelOutput::new(0, 0);
        }
        let percentage = self
            .bonus_sources(building, channel)
            .iter()
            .filter_map(|source| source.bonus())
            .map(|bonus| bonus.percentage)
            .sum();
        ChannelOutput::new(base, percentage)
    }

    pub fn analyze(&self, building: &Building) -> BonusAnalysis {
        let bonus_sources = building
            .channel()
            .map(|channel| {
                self.bonus_sources(building, channel)
                    .into_iter()
                    .map(|source| source.id.clone())
                    .collect()
            })
            .unwrap_or_default();
        BonusAnalysis {
            building_id: building.id.clone(),
            name: building.name.clone(),
            coins: self.channel_output(building, Channel::Coins),
            passengers: self.channel_output(building, Channel::Passengers),
            bonus_sources,
        }
    }

    /// Analysis for every placed building, in placement order.
    pub fn bonus_analysis(&self) -> Vec<BonusAnalysis> {
        self.buildings.iter().map(|b| self.analyze(b)).collect()
    }

    pub fn revenue_totals(&self) -> RevenueTotals {
        let mut totals = RevenueTotals::default();
        for building in &self.buildings {
            let per_hour = revenue_per_hour(building, Some(self));
            match building.channel() {
                Some(Channel::Coins) => {
                    totals.total_coins_revenue +=
                        self.channel_output(building, Channel::Coins).final_output;
                    totals.coins_revenue_per_hour += per_hour;
                }
                Some(Channel::Passengers) => {
                    totals.total_passengers_revenue +=
                        self.channel_output(building, Channel::Passengers).final_output;
                    totals.passengers_revenue_per_hour += per_hour;
                }
                None => {}
            }
        }
        totals
    }
}

/// Hourly revenue; bonused when an engine is supplied, base revenue otherwise.
pub fn revenue_per_hour(building: &Building, engine: Option<&PlacementEngine>) -> f64 {
    let Some(production) = building.production() else {
        return 0.0;
    };
    if production.time_to_revenue == 0 {
        return 0.0;
    }
    let effective = match (engine, building.channel()) {
        (Some(engine), Some(channel)) => engine.channel_output(building, channel).final_output,
        _ => u64::from(production.revenue),
    };
    effective as f64 * SECONDS_PER_HOUR / f64::from(production.time_to_revenue)
}
