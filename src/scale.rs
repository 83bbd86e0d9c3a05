//! Linear year -> pixel mapping.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// Number of years covered, never less than one.
    pub fn span(&self) -> i32 {
        (self.max - self.min).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeScale {
    pub min_year: i32,
    pub max_year: i32,
    pub padding: f64,
    pub pixels_per_year: f64,
}

impl TimeScale {
    pub fn new(range: YearRange, canvas_width: f64, padding: f64, stretch: f64) -> Self {
        let available = (canvas_width - padding * 2.0).max(1.0);
        let pixels_per_year = available / range.span() as f64 * stretch;

        Self {
            min_year: range.min,
            max_year: range.max,
            padding,
            pixels_per_year,
        }
    }

    #[inline]
    pub fn x(&self, year: f64) -> f64 {
        self.padding + (year - self.min_year as f64) * self.pixels_per_year
    }

    #[inline]
    pub fn x_of(&self, year: i32) -> f64 {
        self.x(year as f64)
    }

    /// Inverse of `x`, for consumers mapping pointer positions back to time.
    pub fn year_at(&self, x: f64) -> f64 {
        self.min_year as f64 + (x - self.padding) / self.pixels_per_year
    }

    /// Right edge of the drawable range.
    pub fn right_edge(&self) -> f64 {
        self.x_of(self.max_year)
    }
}
