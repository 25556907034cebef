use crate::chain::config::SurfaceConfig;
use crate::chain::types::Quote;
use crate::error::QuoteRejection;
use crate::models::bs::OptionType;
use crate::models::utils::{is_positive, moneyness, positive};

/// Price the solver should match for a quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceTarget {
    /// (bid + ask) / 2
    Mid(f64),
    /// One side of the market missing; last traded price instead
    Last(f64),
    /// No usable price: fall back to the reported IV
    ReportedIv,
}

impl PriceTarget {
    pub fn price(&self) -> Option<f64> {
        match *self {
            PriceTarget::Mid(p) | PriceTarget::Last(p) => Some(p),
            PriceTarget::ReportedIv => None,
        }
    }
}

/// Reject structurally invalid quotes before any solving.
///
/// A present bid or ask must be positive and bid must not exceed ask. Missing (or NaN) sides
/// are tolerated one at a time; a quote with neither is rejected.
pub fn validate_quote(quote: &Quote) -> Result<(), QuoteRejection> {
    if !is_positive(quote.strike) {
        return Err(QuoteRejection::NonPositiveStrike);
    }

    let bid = quote.bid.filter(|b| b.is_finite());
    let ask = quote.ask.filter(|a| a.is_finite());

    if matches!(bid, Some(b) if b <= 0.0) {
        return Err(QuoteRejection::NonPositiveBid);
    }
    if matches!(ask, Some(a) if a <= 0.0) {
        return Err(QuoteRejection::NonPositiveAsk);
    }
    match (bid, ask) {
        (Some(b), Some(a)) if b > a => Err(QuoteRejection::CrossedMarket),
        (None, None) => Err(QuoteRejection::NoUsablePrice),
        _ => Ok(()),
    }
}

/// Mid when both sides are usable, else last price, else the reported IV.
pub fn price_target(quote: &Quote) -> PriceTarget {
    match (positive(quote.bid), positive(quote.ask)) {
        (Some(b), Some(a)) => PriceTarget::Mid(0.5 * (b + a)),
        _ => match positive(quote.last_price) {
            Some(last) => PriceTarget::Last(last),
            None => PriceTarget::ReportedIv,
        },
    }
}

/// The provider's IV if it is usable as a fallback: finite, positive and not absurd.
pub fn usable_reported_iv(quote: &Quote, max_reported_iv: f64) -> Option<f64> {
    positive(quote.reported_iv).filter(|iv| *iv <= max_reported_iv)
}

/// Whether the strike sits inside the configured moneyness band for its option type.
pub fn in_moneyness_band(quote: &Quote, spot: f64, config: &SurfaceConfig) -> bool {
    let m = moneyness(quote.strike, spot);
    if !config.moneyness_band.contains(m) {
        return false;
    }
    if !config.otm_only {
        return true;
    }
    match quote.option_type {
        OptionType::Call => m >= 1.0,
        OptionType::Put => m <= 1.0,
    }
}
