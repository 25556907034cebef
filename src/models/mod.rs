pub mod bs;
pub mod iv;
pub mod surface;

/// Small helpers shared by the chain pipeline
pub mod utils {
    /// Simple moneyness: K / S
    pub fn moneyness(strike: f64, spot: f64) -> f64 {
        strike / spot
    }

    /// True for finite, strictly positive values
    pub fn is_positive(value: f64) -> bool {
        value.is_finite() && value > 0.0
    }

    /// Treats non-finite and non-positive values as missing
    pub fn positive(value: Option<f64>) -> Option<f64> {
        value.filter(|v| is_positive(*v))
    }
}
