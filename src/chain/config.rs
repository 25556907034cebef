use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::models::iv::SolverConfig;
use crate::models::surface::GridConfig;

/// Inclusive strike/spot band a contract must fall in to be analysed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneynessBand {
    pub lower: f64,
    pub upper: f64,
}

impl Default for MoneynessBand {
    fn default() -> Self {
        Self {
            lower: 0.85,
            upper: 1.15,
        }
    }
}

impl MoneynessBand {
    pub fn contains(&self, moneyness: f64) -> bool {
        moneyness >= self.lower && moneyness <= self.upper
    }
}

/// Which expirations get analysed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Nearest expirations that are always kept
    #[serde(default = "default_near_term_count")]
    pub near_term_count: usize,
    /// Expirations further out than this are dropped
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
    /// Maximum number of expirations sampled beyond the near-term ones
    #[serde(default = "default_far_sample_cap")]
    pub far_sample_cap: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            near_term_count: default_near_term_count(),
            horizon_days: default_horizon_days(),
            far_sample_cap: default_far_sample_cap(),
        }
    }
}

/// How implied vols are grouped before the IQR filter runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierGrouping {
    /// One group over every point feeding the surface
    #[default]
    Surface,
    /// Each expiration and option type filtered on its own
    PerSlice,
}

/// IQR outlier filter settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierConfig {
    /// Band is [Q1 - k*IQR, Q3 + k*IQR]
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,
    /// Groups smaller than this are passed through untouched
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default)]
    pub grouping: OutlierGrouping,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: default_iqr_multiplier(),
            min_samples: default_min_samples(),
            grouping: OutlierGrouping::default(),
        }
    }
}

/// Main configuration for one surface build.
///
/// Passed by reference into every stage; nothing here is global, so concurrent builds with
/// different settings never interfere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    #[serde(default)]
    pub moneyness_band: MoneynessBand,

    /// Keep only out-of-the-money strikes: calls at or above spot, puts at or below
    #[serde(default)]
    pub otm_only: bool,

    /// Reported IVs above this are treated as missing
    #[serde(default = "default_max_reported_iv")]
    pub max_reported_iv: f64,

    /// Hour (UTC) on the expiry date at which contracts settle
    #[serde(default = "default_settlement_hour_utc")]
    pub settlement_hour_utc: u32,

    /// Fewer surviving contracts than this fails the whole request
    #[serde(default = "default_min_valid_contracts")]
    pub min_valid_contracts: usize,

    /// Fewer points than this omits the interpolated surface
    #[serde(default = "default_min_surface_points")]
    pub min_surface_points: usize,

    #[serde(default)]
    pub solver: SolverConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub outliers: OutlierConfig,

    #[serde(default)]
    pub grid: GridConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            moneyness_band: MoneynessBand::default(),
            otm_only: false,
            max_reported_iv: default_max_reported_iv(),
            settlement_hour_utc: default_settlement_hour_utc(),
            min_valid_contracts: default_min_valid_contracts(),
            min_surface_points: default_min_surface_points(),
            solver: SolverConfig::default(),
            sampling: SamplingConfig::default(),
            outliers: OutlierConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl SurfaceConfig {
    /// Defaults as documented on each field
    pub fn standard() -> Self {
        Self::default()
    }

    /// Wider moneyness band and a longer horizon, for names with sparse near-ATM strikes
    pub fn wide_band() -> Self {
        Self {
            moneyness_band: MoneynessBand {
                lower: 0.70,
                upper: 1.30,
            },
            sampling: SamplingConfig {
                horizon_days: 180,
                ..SamplingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Out-of-the-money wings only, each slice filtered separately
    pub fn otm_wings() -> Self {
        Self {
            otm_only: true,
            outliers: OutlierConfig {
                grouping: OutlierGrouping::PerSlice,
                ..OutlierConfig::default()
            },
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys fall back to their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: SurfaceConfig =
            toml::from_str(input).context("failed to parse surface configuration")?;
        config
            .validate()
            .context("surface configuration is out of range")?;
        Ok(config)
    }

    /// Range checks on every field that could make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        let invalid = |msg: String| -> Result<(), SurfaceError> { Err(SurfaceError::InvalidConfig(msg)) };

        if !self.risk_free_rate.is_finite() {
            return invalid(format!("risk_free_rate must be finite, got {}", self.risk_free_rate));
        }
        let band = self.moneyness_band;
        if !(band.lower > 0.0 && band.lower < band.upper && band.upper.is_finite()) {
            return invalid(format!(
                "moneyness_band must satisfy 0 < lower < upper, got [{}, {}]",
                band.lower, band.upper
            ));
        }
        if !(self.max_reported_iv > 0.0) {
            return invalid(format!("max_reported_iv must be positive, got {}", self.max_reported_iv));
        }
        if self.settlement_hour_utc > 23 {
            return invalid(format!(
                "settlement_hour_utc must be in 0..=23, got {}",
                self.settlement_hour_utc
            ));
        }
        if self.min_surface_points < 3 {
            return invalid(format!(
                "min_surface_points must be at least 3, got {}",
                self.min_surface_points
            ));
        }

        let s = &self.solver;
        if !(s.vol_lower > 0.0 && s.vol_lower < s.vol_upper && s.vol_upper.is_finite()) {
            return invalid(format!(
                "solver bracket must satisfy 0 < vol_lower < vol_upper, got [{}, {}]",
                s.vol_lower, s.vol_upper
            ));
        }
        if s.max_iterations == 0 || !(s.tolerance > 0.0) {
            return invalid(format!(
                "solver needs max_iterations > 0 and tolerance > 0, got {} and {}",
                s.max_iterations, s.tolerance
            ));
        }

        if self.sampling.horizon_days < 0 {
            return invalid(format!(
                "sampling.horizon_days must not be negative, got {}",
                self.sampling.horizon_days
            ));
        }
        if !(self.outliers.iqr_multiplier >= 0.0) {
            return invalid(format!(
                "outliers.iqr_multiplier must not be negative, got {}",
                self.outliers.iqr_multiplier
            ));
        }
        if self.grid.moneyness_steps < 2 || self.grid.dte_steps < 2 {
            return invalid(format!(
                "grid needs at least 2 steps per axis, got {}x{}",
                self.grid.moneyness_steps, self.grid.dte_steps
            ));
        }
        Ok(())
    }
}

fn default_risk_free_rate() -> f64 {
    0.05
}

fn default_max_reported_iv() -> f64 {
    5.0
}

fn default_settlement_hour_utc() -> u32 {
    20
}

fn default_min_valid_contracts() -> usize {
    5
}

fn default_min_surface_points() -> usize {
    3
}

fn default_near_term_count() -> usize {
    4
}

fn default_horizon_days() -> i64 {
    100
}

fn default_far_sample_cap() -> usize {
    12
}

fn default_iqr_multiplier() -> f64 {
    3.0
}

fn default_min_samples() -> usize {
    8
}
