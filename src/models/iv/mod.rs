//! Implied-volatility root finding.
//!
//! Black-Scholes prices are strictly increasing in σ, so a plain bisection over the volatility
//! domain is enough. The solver stops on whichever of its two conditions fires first: the bracket
//! narrowing below `tolerance`, or `max_iterations` halvings.

use serde::{Deserialize, Serialize};

use crate::error::SolveError;
use crate::models::bs::{bs_price, OptionType};

/// Bisection settings. The bracket doubles as the admissible volatility domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_vol_lower")]
    pub vol_lower: f64,
    #[serde(default = "default_vol_upper")]
    pub vol_upper: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            vol_lower: default_vol_lower(),
            vol_upper: default_vol_upper(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_vol_lower() -> f64 {
    0.001
}

fn default_vol_upper() -> f64 {
    10.0
}

fn default_max_iterations() -> usize {
    120
}

fn default_tolerance() -> f64 {
    1e-6
}

/// Solve for the volatility that reproduces `target_price`.
///
/// Arguments follow [`bs_price`]: rate before time to expiry.
///
/// Fails with [`SolveError::NotBracketed`] when the prices at the two ends of the domain do not
/// straddle the target (deep ITM/OTM contracts whose price barely moves with σ, or prices below
/// intrinsic), and with [`SolveError::OutOfDomain`] when the root collapses onto a bound. A failure
/// is always explicit; the solver never hands back an endpoint as if it were a solution.
#[allow(non_snake_case)]
pub fn solve_implied_vol(
    option_type: OptionType,
    S: f64,
    K: f64,
    r: f64,
    T: f64,
    target_price: f64,
    config: &SolverConfig,
) -> Result<f64, SolveError> {
    if !target_price.is_finite() || target_price <= 0.0 {
        return Err(SolveError::InvalidInput(format!(
            "target price must be positive, got {}",
            target_price
        )));
    }
    if !(S > 0.0 && K > 0.0 && T > 0.0) || !r.is_finite() {
        return Err(SolveError::InvalidInput(format!(
            "S={}, K={}, r={}, T={}",
            S, K, r, T
        )));
    }

    let mut lo = config.vol_lower;
    let mut hi = config.vol_upper;

    let lower_price = bs_price(option_type, S, K, r, T, lo);
    let upper_price = bs_price(option_type, S, K, r, T, hi);
    if !(lower_price <= target_price && target_price <= upper_price) {
        return Err(SolveError::NotBracketed {
            target: target_price,
            lower_price,
            upper_price,
        });
    }

    for _ in 0..config.max_iterations {
        if hi - lo < config.tolerance {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if bs_price(option_type, S, K, r, T, mid) < target_price {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let sigma = 0.5 * (lo + hi);
    if sigma - config.vol_lower < config.tolerance || config.vol_upper - sigma < config.tolerance {
        return Err(SolveError::OutOfDomain(sigma));
    }
    Ok(sigma)
}
