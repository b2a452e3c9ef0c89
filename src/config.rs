use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Size;

/// Upper bound on the number of tiles a grid may hold.
pub const MAX_GRID_TILES: u64 = 1 << 24;

/// Validated plot layout driving grid construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfiguration {
    pub plots_x: u32,
    pub plots_y: u32,
    pub plot_size: Size,
}

impl PlotConfiguration {
    pub fn new(plots_x: u32, plots_y: u32, plot_size: Size) -> Self {
        Self {
            plots_x,
            plots_y,
            plot_size,
        }
    }

    /// Saturates instead of overflowing; see [`Self::tile_dimensions`].
    pub fn grid_width(&self) -> u32 {
        self.plots_x.saturating_mul(self.plot_size.width)
    }

    /// Includes the permanent road row at y=0.
    pub fn grid_height(&self) -> u32 {
        self.plots_y
            .saturating_mul(self.plot_size.height)
            .saturating_add(1)
    }

    /// Grid width and height, or `None` when the layout cannot be addressed
    /// with `i32` coordinates or holds more than [`MAX_GRID_TILES`] tiles.
    pub fn tile_dimensions(&self) -> Option<(u32, u32)> {
        let width = self.plots_x.checked_mul(self.plot_size.width)?;
        let height = self
            .plots_y
            .checked_mul(self.plot_size.height)?
            .checked_add(1)?;
        let fits_coords = i32::try_from(width).is_ok() && i32::try_from(height).is_ok();
        let tiles = u64::from(width) * u64::from(height);
        (fits_coords && tiles <= MAX_GRID_TILES).then_some((width, height))
    }
}

/// Plot configuration as it arrives from a scenario file, before validation.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlotConfiguration {
    pub plots_x: i64,
    pub plots_y: i64,
    pub plot_size: RawPlotSize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawPlotSize {
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid plot configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ConfigError {
    pub fn messages(&self) -> &[String] {
        match self {
            ConfigError::Invalid(messages) => messages,
        }
    }
}

impl RawPlotConfiguration {
    /// Checks every field and reports all problems at once.
    pub fn validate(&self) -> Result<PlotConfiguration, ConfigError> {
        let fields = [
            ("plotsX", self.plots_x),
            ("plotsY", self.plots_y),
            ("plotSize.width", self.plot_size.width),
            ("plotSize.height", self.plot_size.height),
        ];

        let mut errors = Vec::new();
        let mut values = [0u32; 4];
        for (slot, (name, value)) in values.iter_mut().zip(fields) {
            if value <= 0 {
                errors.push(format!("{name} must be a positive integer (got {value})"));
            } else {
                match u32::try_from(value) {
                    Ok(v) => *slot = v,
                    Err(_) => errors.push(format!("{name} is too large (got {value})")),
                }
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        let [plots_x, plots_y, width, height] = values;
        Ok(PlotConfiguration::new(
            plots_x,
            plots_y,
            Size::new(width, height),
        ))
    }
}
