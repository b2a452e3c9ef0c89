use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Position, Rect, Size};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(String);

impl BuildingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Revenue stream a building produces into and bonuses target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Coins,
    Passengers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborhoodShape {
    /// Chebyshev distance, diagonals included.
    #[default]
    Moore,
    /// Taxicab distance.
    Manhattan,
}

impl NeighborhoodShape {
    pub fn within(self, rect: &Rect, other: &Rect, radius: u32) -> bool {
        let (dx, dy) = rect.axis_distance(other);
        match self {
            NeighborhoodShape::Moore => dx.max(dy) <= radius,
            NeighborhoodShape::Manhattan => dx + dy <= radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    pub revenue: u32,
    /// Seconds needed to realize `revenue` once; zero means nothing is produced.
    pub time_to_revenue: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bonus {
    pub target_channel: Channel,
    pub percentage: u32,
    pub radius: u32,
    pub neighborhood_shape: NeighborhoodShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BuildingKind {
    Residential(Production),
    Commercial(Production),
    /// Decorations only produce, and only need a road, when `production` is set.
    Decoration {
        production: Option<Production>,
        bonus: Option<Bonus>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub size: Size,
    pub position: Option<Position>,
    #[serde(flatten)]
    pub kind: BuildingKind,
}

impl Building {
    pub fn new(id: BuildingId, name: impl Into<String>, size: Size, kind: BuildingKind) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            position: None,
            kind,
        }
    }

    pub fn requires_road(&self) -> bool {
        match &self.kind {
            BuildingKind::Residential(_) | BuildingKind::Commercial(_) => true,
            BuildingKind::Decoration { production, .. } => production.is_some(),
        }
    }

    pub fn production(&self) -> Option<&Production> {
        match &self.kind {
            BuildingKind::Residential(production) | BuildingKind::Commercial(production) => {
                Some(production)
            }
            BuildingKind::Decoration { production, .. } => production.as_ref(),
        }
    }

    /// Channel this building's output counts toward, if it produces at all.
    pub fn channel(&self) -> Option<Channel> {
        match &self.kind {
            BuildingKind::Residential(_) => Some(Channel::Passengers),
            BuildingKind::Commercial(_) => Some(Channel::Coins),
            BuildingKind::Decoration { production, .. } => production.map(|_| Channel::Coins),
        }
    }

    pub fn bonus(&self) -> Option<&Bonus> {
        match &self.kind {
            BuildingKind::Decoration { bonus, .. } => bonus.as_ref(),
            BuildingKind::Residential(_) | BuildingKind::Commercial(_) => None,
        }
    }

    /// Occupied rectangle once placed.
    pub fn footprint(&self) -> Option<Rect> {
        self.position.map(|pos| Rect::new(pos, self.size))
    }

    pub fn footprint_at(&self, position: Position) -> Rect {
        Rect::new(position, self.size)
    }

    /// ASCII glyph used in grid visualizations.
    pub fn glyph(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildingError {
    #[error("building '{name}' has unknown type '{kind}'")]
    UnknownType { name: String, kind: String },
    #[error("building '{name}' has non-positive size {width}x{height}")]
    InvalidSize { name: String, width: u32, height: u32 },
}

/// Flat building definition as stored by the building catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRecord {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub requires_road: bool,
    #[serde(default)]
    pub revenue: Option<u32>,
    #[serde(default)]
    pub time_to_revenue: Option<u32>,
    #[serde(default)]
    pub bonus_type: Option<Channel>,
    #[serde(default)]
    pub bonus_percentage: Option<u32>,
    #[serde(default)]
    pub bonus_radius: Option<u32>,
    #[serde(default)]
    pub neighborhood_type: Option<NeighborhoodShape>,
}

impl BuildingRecord {
    /// Converts the record into an unplaced building with the given instance id.
    pub fn to_building(&self, id: BuildingId) -> Result<Building, BuildingError> {
        if self.width == 0 || self.height == 0 {
            return Err(BuildingError::InvalidSize {
                name: self.name.clone(),
                width: self.width,
                height: self.height,
            });
        }
        let production = Production {
            revenue: self.revenue.unwrap_or(0),
            time_to_revenue: self.time_to_revenue.unwrap_or(0),
        };
        let kind = match self.kind.as_str() {
            "residential" => BuildingKind::Residential(production),
            "commercial" => BuildingKind::Commercial(production),
            "decoration" => BuildingKind::Decoration {
                production: self.requires_road.then_some(production),
                bonus: self.bonus(),
            },
            other => {
                return Err(BuildingError::UnknownType {
                    name: self.name.clone(),
                    kind: other.to_string(),
                })
            }
        };
        Ok(Building::new(
            id,
            self.name.clone(),
            Size::new(self.width, self.height),
            kind,
        ))
    }

    fn bonus(&self) -> Option<Bonus> {
        Some(Bonus {
            target_channel: self.bonus_type?,
            percentage: self.bonus_percentage?,
            radius: self.bonus_radius?,
            neighborhood_shape: self.neighborhood_type.unwrap_or_default(),
        })
    }
}

impl TryFrom<&BuildingRecord> for Building {
    type Error = BuildingError;

    fn try_from(record: &BuildingRecord) -> Result<Self, Self::Error> {
        record.to_building(BuildingId::new(record.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str) -> BuildingRecord {
        BuildingRecord {
            id: "b1".into(),
            name: "fountain".into(),
            width: 2,
            height: 1,
            kind: kind.into(),
            requires_road: false,
            revenue: None,
            time_to_revenue: None,
            bonus_type: Some(Channel::Passengers),
            bonus_percentage: Some(15),
            bonus_radius: Some(1),
            neighborhood_type: None,
        }
    }

    #[test]
    fn zero_sized_record_is_rejected() {
        let mut flat = record("decoration");
        flat.height = 0;
        assert_eq!(
            Building::try_from(&flat).unwrap_err(),
            BuildingError::InvalidSize {
                name: "fountain".into(),
                width: 2,
                height: 0,
            }
        );
    }

    #[test]
    fn decoration_without_road_has_no_production() {
        let building = Building::try_from(&record("decoration")).unwrap();
        assert!(!building.requires_road());
        assert_eq!(building.channel(), None);
        assert_eq!(building.production(), None);
        let bonus = building.bonus().unwrap();
        assert_eq!(bonus.target_channel, Channel::Passengers);
        assert_eq!(bonus.neighborhood_shape, NeighborhoodShape::Moore);
    }

    #[test]
    fn road_decoration_produces_coins() {
        let mut rec = record("decoration");
        rec.requires_road = true;
        rec.revenue = Some(20);
        rec.time_to_revenue = Some(60);
        let building = Building::try_from(&rec).unwrap();
        assert!(building.requires_road());
        assert_eq!(building.channel(), Some(Channel::Coins));
        assert_eq!(building.production().map(|p| p.revenue), Some(20));
    }

    #[test]
    fn residential_ignores_bonus_fields() {
        let mut rec = record("residential");
        rec.revenue = Some(50);
        let building = Building::try_from(&rec).unwrap();
        assert!(building.requires_road());
        assert_eq!(building.channel(), Some(Channel::Passengers));
        assert!(building.bonus().is_none());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = Building::try_from(&record("industrial")).unwrap_err();
        assert_eq!(
            err,
            BuildingError::UnknownType {
                name: "fountain".into(),
                kind: "industrial".into()
            }
        );
    }

    #[test]
    fn record_parses_camel_case_json() {
        let json = r#"{"id":"h","name":"house","width":2,"height":2,"type":"residential",
            "requiresRoad":true,"revenue":50,"timeToRevenue":120}"#;
        let rec: BuildingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.time_to_revenue, Some(120));
        assert!(rec.requires_road);
    }

    #[test]
    fn neighborhood_shapes_differ_on_diagonals() {
        let a = Rect::new(Position::new(0, 0), Size::new(1, 1));
        let b = Rect::new(Position::new(1, 1), Size::new(1, 1));
        assert!(NeighborhoodShape::Moore.within(&a, &b, 1));
        assert!(!NeighborhoodShape::Manhattan.within(&a, &b, 1));
        assert!(NeighborhoodShape::Manhattan.within(&a, &b, 2));
    }

    #[test]
    fn glyph_is_uppercase_initial() {
        let building = Building::try_from(&record("decoration")).unwrap();
        assert_eq!(building.glyph(), 'F');
    }
}
