// Analytic Black-Scholes pricer for a single European contract, with the Greeks the chain output
// needs. No dividend yield: the engine prices on spot with a flat risk-free rate.

use serde::{Deserialize, Serialize};

/// Smallest time to expiry (in years) the engine will evaluate the closed-form on.
/// Anything at or below this is treated as expired.
pub const MIN_TIME_TO_EXPIRY: f64 = 1e-6;

/// Below this σ√T the d1/d2 terms are numerically meaningless.
const MIN_STD_DEV: f64 = 1e-12;

const DAYS_PER_YEAR: f64 = 365.0;

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn is_call(self) -> bool {
        matches!(self, OptionType::Call)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price and sensitivities of one contract at one volatility.
///
/// `vega` is per 1.00 of volatility, `theta` per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
}

fn norm_cdf(x: f64) -> f64 {
    // 0.5 * [1 + erf(x / sqrt(2))]
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}

fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Intrinsic (undiscounted) value of the contract at spot `S`.
#[allow(non_snake_case)]
pub fn intrinsic_value(option_type: OptionType, S: f64, K: f64) -> f64 {
    match option_type {
        OptionType::Call => (S - K).max(0.0),
        OptionType::Put => (K - S).max(0.0),
    }
}

#[allow(non_snake_case)]
fn is_expired(T: f64, sigma: f64) -> bool {
    T <= MIN_TIME_TO_EXPIRY || sigma * T.sqrt() < MIN_STD_DEV
}

#[allow(non_snake_case)]
fn d1_d2(S: f64, K: f64, r: f64, T: f64, sigma: f64) -> (f64, f64) {
    let sd = sigma * T.sqrt();
    let d1 = ((S / K).ln() + (r + 0.5 * sigma * sigma) * T) / sd;
    (d1, d1 - sd)
}

/// Black-Scholes price of a European option.
///
/// At (or below) [`MIN_TIME_TO_EXPIRY`] the intrinsic value is returned instead of evaluating
/// the closed form.
#[allow(non_snake_case)]
pub fn bs_price(option_type: OptionType, S: f64, K: f64, r: f64, T: f64, sigma: f64) -> f64 {
    if is_expired(T, sigma) {
        return intrinsic_value(option_type, S, K);
    }
    let (d1, d2) = d1_d2(S, K, r, T, sigma);
    let df = (-r * T).exp();
    match option_type {
        OptionType::Call => S * norm_cdf(d1) - K * df * norm_cdf(d2),
        OptionType::Put => K * df * norm_cdf(-d2) - S * norm_cdf(-d1),
    }
}

/// Price plus delta, gamma, vega and per-day theta.
///
/// Near expiry the closed forms blow up (σ√T → 0), so the engine returns the intrinsic value,
/// a step delta (1/0 for calls, 0/-1 for puts) and zero gamma, vega and theta.
#[allow(non_snake_case)]
pub fn bs_greeks(option_type: OptionType, S: f64, K: f64, r: f64, T: f64, sigma: f64) -> Greeks {
    if is_expired(T, sigma) {
        let delta = match option_type {
            OptionType::Call if S > K => 1.0,
            OptionType::Put if S < K => -1.0,
            _ => 0.0,
        };
        return Greeks {
            price: intrinsic_value(option_type, S, K),
            delta,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
        };
    }

    let sqrt_t = T.sqrt();
    let (d1, d2) = d1_d2(S, K, r, T, sigma);
    let df = (-r * T).exp();
    let pdf_d1 = norm_pdf(d1);

    let gamma = pdf_d1 / (S * sigma * sqrt_t);
    let vega = S * pdf_d1 * sqrt_t;
    let decay = -S * sigma * pdf_d1 / (2.0 * sqrt_t);

    let (price, delta, theta) = match option_type {
        OptionType::Call => (
            S * norm_cdf(d1) - K * df * norm_cdf(d2),
            norm_cdf(d1),
            decay - r * K * df * norm_cdf(d2),
        ),
        OptionType::Put => (
            K * df * norm_cdf(-d2) - S * norm_cdf(-d1),
            norm_cdf(d1) - 1.0,
            decay + r * K * df * norm_cdf(-d2),
        ),
    };

    Greeks {
        price,
        delta,
        gamma,
        vega,
        theta: theta / DAYS_PER_YEAR,
    }
}
