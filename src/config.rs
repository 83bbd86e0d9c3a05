//! Tunable layout parameters.

use serde::Deserialize;

use crate::error::LayoutError;
use crate::scale::YearRange;

/// Weights and thresholds of the lane cost function.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Squared distance to mean parent lane and mean child lane.
    pub attraction: f64,
    /// Per occupied lane a connector would cut through.
    pub cut_through: f64,
    /// Per foreign connector passing through the chain's lane while it is active.
    pub blocker: f64,
    /// Numerator of the inverse-gap penalty for sharing with unrelated chains.
    pub lane_sharing: f64,
    /// Per sibling or spouse closer than `y_shape_distance` lanes.
    pub y_shape: f64,
    /// Floor of the gap (years) in the lane-sharing denominator.
    pub sharing_min_gap: f64,
    pub y_shape_distance: i32,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            attraction: 10.0,
            cut_through: 40.0,
            blocker: 25.0,
            lane_sharing: 20.0,
            y_shape: 15.0,
            sharing_min_gap: 0.5,
            y_shape_distance: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub canvas_width: f64,
    pub padding: f64,
    pub stretch: f64,
    /// Node height as a multiple of pixels per year.
    pub height_factor: f64,
    /// Row height as a multiple of node height.
    pub row_factor: f64,
    pub min_active_width: f64,
    /// Overrides the clock when set.
    pub current_year: Option<i32>,
    /// Half the vertical distance between the two waist points of a connector.
    pub waist_pinch: f64,
    /// Extra outward push of lens control points, as a fraction of arc radius.
    pub lens_bulge: f64,
    /// Viewing window; accepted but not applied to the year range.
    pub year_filter: Option<YearRange>,
    pub weights: CostWeights,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            padding: 40.0,
            stretch: 1.0,
            height_factor: 2.0,
            row_factor: 1.5,
            min_active_width: 24.0,
            current_year: None,
            waist_pinch: 2.0,
            lens_bulge: 0.2,
            year_filter: None,
            weights: CostWeights::default(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json(source: &str) -> Result<Self, LayoutError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = [
            ("canvas_width", self.canvas_width),
            ("stretch", self.stretch),
            ("height_factor", self.height_factor),
            ("row_factor", self.row_factor),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let non_negative = [
            ("padding", self.padding),
            ("min_active_width", self.min_active_width),
            ("waist_pinch", self.waist_pinch),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if !self.lens_bulge.is_finite() {
            return Err(LayoutError::InvalidConfig(format!(
                "lens_bulge must be finite, got {}",
                self.lens_bulge
            )));
        }
        if !(self.weights.sharing_min_gap > 0.0) {
            return Err(LayoutError::InvalidConfig(
                "weights.sharing_min_gap must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(clock_year)
    }
}

#[cfg(target_arch = "wasm32")]
fn clock_year() -> i32 {
    js_sys::Date::new_0().get_full_year() as i32
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}
