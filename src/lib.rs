//! # IV-Surface: Option Chain Analytics and Implied Volatility Surfaces
//!
//! `iv-surface` turns a raw option chain into per-contract analytics and an interpolated implied
//! volatility surface over (moneyness, days to expiry). It is the numerical core behind a surface
//! endpoint: the caller supplies market data and a configuration, the library hands back a
//! response ready to be serialized as JSON.
//!
//! ## Core Features
//!
//! - **Black-Scholes Engine**: European prices and Greeks (delta, gamma, vega, per-day theta)
//! - **Implied Volatility**: Bracketed bisection with explicit, typed failures
//! - **Chain Hygiene**: Quote validation, moneyness banding, IQR outlier rejection
//! - **Expiration Sampling**: Keeps the near-term weeklies, spreads the rest over the horizon
//! - **Surface Construction**: Delaunay triangulation with linear interpolation on a regular grid
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use iv_surface::{build_surface, default_configs, ChainSnapshot};
//!
//! # fn load_snapshot() -> ChainSnapshot { ChainSnapshot { spot: 100.0, expirations: vec![] } }
//! let snapshot: ChainSnapshot = load_snapshot();
//! let config = default_configs::standard();
//!
//! let build = build_surface(&snapshot, Utc::now(), &config)?;
//! println!("{} contracts analysed", build.response.contract_count());
//! if let Some(grid) = &build.response.surface {
//!     println!("surface grid: {} x {}", grid.x.len(), grid.y.len());
//! }
//! let json = build.response.to_json()?;
//! # let _ = json;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Pipeline
//!
//! 1. Expirations are sampled ([`chain::expirations::sample_expirations`])
//! 2. Each quote is banded, validated and solved for IV ([`analyze_quote`])
//! 3. IV outliers are removed with an IQR filter ([`chain::outliers::reject_outliers`])
//! 4. Survivors are interpolated onto the (moneyness, DTE) grid ([`chain::surface`])
//!
//! Per-contract failures never abort a build; they are tallied in [`PipelineDiagnostics`].
//!
//! ## Configuration Presets
//!
//! - `standard()`: Default band, sampling and outlier settings
//! - `wide_band()`: Wider moneyness band and longer horizon
//! - `otm_wings()`: Out-of-the-money contracts only, per-slice outlier rejection

// ================================================================================================
// MODULES
// ================================================================================================

pub mod chain;
pub mod error;
pub mod models;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Errors
pub use error::{InterpolationError, QuoteRejection, SolveError, SurfaceError};

// Chain domain: configuration, inputs, outputs and the pipeline itself
pub use chain::{
    analyze_quote, build_surface, refresh, AnalyticsResult, ChainProvider, ChainSnapshot,
    ContractFailure, ContractRecord, ExpiryChain, ExpiryContracts, IvSource, MoneynessBand,
    OutlierConfig, OutlierGrouping, PipelineDiagnostics, PricingContext, Quote, SamplingConfig,
    SurfaceBuild, SurfaceConfig, SurfacePoint, SurfaceResponse,
};

// Numerical models
pub use models::bs::{bs_greeks, bs_price, Greeks, OptionType};
pub use models::iv::{solve_implied_vol, SolverConfig};
pub use models::surface::{
    DelaunayInterpolator, GridConfig, Interpolant, LinearTriangulation, SpatialInterpolator,
    SurfaceGrid,
};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured surface settings for common use cases.
///
/// # Available Configurations
///
/// - [`standard()`]: Defaults for a liquid equity or ETF chain
/// - [`wide_band()`]: Broader strike coverage and a longer horizon
/// - [`otm_wings()`]: Out-of-the-money wings only
pub mod default_configs {
    use crate::chain::config::SurfaceConfig;

    /// Default configuration for liquid chains.
    ///
    /// **Characteristics:**
    /// - Moneyness band: 0.85 to 1.15, calls and puts on both sides of spot
    /// - Horizon: 100 days, nearest 4 expirations plus up to 12 spread samples
    /// - Outliers: IQR filter with k = 3 over the whole surface
    /// - Grid: 50 x 50
    ///
    /// # Example
    ///
    /// ```rust
    /// use iv_surface::default_configs;
    ///
    /// let config = default_configs::standard();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn standard() -> SurfaceConfig {
        SurfaceConfig::standard()
    }

    /// Wider strike band and a longer horizon.
    ///
    /// **Characteristics:**
    /// - Moneyness band: 0.70 to 1.30
    /// - Horizon: 180 days
    ///
    /// **Use Cases:**
    /// - Skew studies that need the wings
    /// - Chains with sparse near-the-money strikes
    ///
    /// # Example
    ///
    /// ```rust
    /// use iv_surface::default_configs;
    ///
    /// let config = default_configs::wide_band();
    /// assert!(config.moneyness_band.contains(0.75));
    /// ```
    pub fn wide_band() -> SurfaceConfig {
        SurfaceConfig::wide_band()
    }

    /// Out-of-the-money contracts only.
    ///
    /// Calls are kept at or above spot and puts at or below it, and outliers are rejected per
    /// expiry and option type rather than across the whole surface.
    ///
    /// # Example
    ///
    /// ```rust
    /// use iv_surface::{default_configs, OutlierGrouping};
    ///
    /// let config = default_configs::otm_wings();
    /// assert!(config.otm_only);
    /// assert_eq!(config.outliers.grouping, OutlierGrouping::PerSlice);
    /// ```
    pub fn otm_wings() -> SurfaceConfig {
        SurfaceConfig::otm_wings()
    }
}

/// Black-Scholes analytics for a single contract at a known volatility.
///
/// Convenience wrapper over [`bs_greeks`] taking the time to expiry in calendar days.
///
/// # Example
///
/// ```rust
/// use iv_surface::{price_contract, OptionType};
///
/// let g = price_contract(OptionType::Call, 100.0, 100.0, 365.0, 0.05, 0.2);
/// assert!((g.price - 10.4506).abs() < 1e-3);
/// ```
#[allow(non_snake_case)]
pub fn price_contract(
    option_type: OptionType,
    S: f64,
    K: f64,
    days_to_expiry: f64,
    r: f64,
    sigma: f64,
) -> Greeks {
    let T = (days_to_expiry / 365.0).max(models::bs::MIN_TIME_TO_EXPIRY);
    bs_greeks(option_type, S, K, r, T, sigma)
}
