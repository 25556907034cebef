use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::config::SurfaceConfig;
use crate::models::bs::{Greeks, OptionType, MIN_TIME_TO_EXPIRY};
use crate::models::surface::SurfaceGrid;

const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// One raw option-chain record, as delivered by the market-data collaborator.
///
/// Price fields are optional: providers regularly omit them or send NaN, and both count as
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub option_type: OptionType,
    pub expiry: NaiveDate,
    pub strike: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last_price: Option<f64>,
    /// Provider-reported implied volatility (decimal)
    pub reported_iv: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub in_the_money: Option<bool>,
}

impl Quote {
    /// Bare quote with a two-sided market and no optional fields.
    pub fn new(option_type: OptionType, expiry: NaiveDate, strike: f64, bid: f64, ask: f64) -> Self {
        Self {
            option_type,
            expiry,
            strike,
            bid: Some(bid),
            ask: Some(ask),
            last_price: None,
            reported_iv: None,
            volume: None,
            open_interest: None,
            in_the_money: None,
        }
    }
}

/// All quotes for a single expiration date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryChain {
    pub expiry: NaiveDate,
    pub calls: Vec<Quote>,
    pub puts: Vec<Quote>,
}

impl ExpiryChain {
    /// Split a flat list of quotes into calls and puts.
    pub fn from_quotes(expiry: NaiveDate, quotes: Vec<Quote>) -> Self {
        let (calls, puts) = quotes.into_iter().partition(|q| q.option_type.is_call());
        Self {
            expiry,
            calls,
            puts,
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

/// Spot plus every available expiration of one underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub spot: f64,
    pub expirations: Vec<ExpiryChain>,
}

/// Market inputs shared by every contract of one expiration during one refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingContext {
    pub spot: f64,
    /// Years to expiry, never below [`MIN_TIME_TO_EXPIRY`]
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    /// Calendar days from the refresh date to expiry, floored at 0
    pub days_to_expiry: i64,
}

impl PricingContext {
    /// Derive T and DTE from the expiry date and the refresh instant.
    ///
    /// Contracts settle at `settlement_hour_utc` on their expiry date.
    pub fn new(
        spot: f64,
        expiry: NaiveDate,
        refresh_at: DateTime<Utc>,
        config: &SurfaceConfig,
    ) -> Self {
        let settle_time =
            NaiveTime::from_hms_opt(config.settlement_hour_utc.min(23), 0, 0).unwrap_or_default();
        let settle = Utc.from_utc_datetime(&expiry.and_time(settle_time));
        let seconds = (settle - refresh_at).num_seconds() as f64;

        Self {
            spot,
            time_to_expiry: (seconds / SECONDS_PER_YEAR).max(MIN_TIME_TO_EXPIRY),
            risk_free_rate: config.risk_free_rate,
            days_to_expiry: days_to_expiry(expiry, refresh_at.date_naive()).max(0),
        }
    }
}

/// Signed calendar-day difference between `expiry` and `today`.
pub fn days_to_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Where a contract's implied volatility came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IvSource {
    /// Root-found from the market price
    Solved,
    /// Solver failed or no price was usable; the provider's IV was kept
    Reported,
}

/// Analytics derived from one quote under one pricing context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    /// Annualised implied volatility (decimal) the Greeks were evaluated at
    pub implied_vol: f64,
    pub iv_source: IvSource,
    pub greeks: Greeks,
}

impl AnalyticsResult {
    /// The root-found IV, if the solver produced it.
    pub fn solved_iv(&self) -> Option<f64> {
        (self.iv_source == IvSource::Solved).then_some(self.implied_vol)
    }
}

/// A contract that made it through validation and pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedContract {
    /// Expiration the contract was listed under
    pub expiry: NaiveDate,
    pub quote: Quote,
    pub context: PricingContext,
    pub analytics: AnalyticsResult,
}

impl AnalyzedContract {
    pub fn moneyness(&self) -> f64 {
        self.quote.strike / self.context.spot
    }

    pub fn to_surface_point(&self) -> SurfacePoint {
        SurfacePoint {
            moneyness: self.moneyness(),
            days_to_expiry: self.context.days_to_expiry,
            implied_vol: self.analytics.implied_vol * 100.0,
            option_type: self.quote.option_type,
            quote: self.quote.clone(),
            analytics: self.analytics,
        }
    }

    pub fn to_record(&self) -> ContractRecord {
        let q = &self.quote;
        let g = &self.analytics.greeks;
        ContractRecord {
            strike: q.strike,
            bid: q.bid,
            ask: q.ask,
            last_price: q.last_price,
            implied_volatility: self.analytics.implied_vol,
            reported_volatility: q.reported_iv,
            iv_source: self.analytics.iv_source,
            volume: q.volume,
            open_interest: q.open_interest,
            in_the_money: q.in_the_money,
            bs_price: g.price,
            delta: g.delta,
            gamma: g.gamma,
            vega: g.vega,
            theta: g.theta,
        }
    }
}

/// Scatter point fed to the surface builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePoint {
    /// strike / spot
    pub moneyness: f64,
    pub days_to_expiry: i64,
    /// Implied volatility in percent
    pub implied_vol: f64,
    pub option_type: OptionType,
    pub quote: Quote,
    pub analytics: AnalyticsResult,
}

/// Output record for one contract: the quote fields merged with its analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    pub strike: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last_price: Option<f64>,
    pub implied_volatility: f64,
    pub reported_volatility: Option<f64>,
    pub iv_source: IvSource,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub in_the_money: Option<bool>,
    #[serde(rename = "BSprice")]
    pub bs_price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
}

/// Calls and puts of one expiration in the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpiryContracts {
    pub calls: Vec<ContractRecord>,
    pub puts: Vec<ContractRecord>,
}

/// The response handed to the transport layer.
///
/// `data` is keyed by ISO date. `surface` is left out of the JSON entirely when interpolation
/// was not possible, in which case only the scatter points are meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceResponse {
    pub spot: f64,
    pub data: BTreeMap<String, ExpiryContracts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<SurfaceGrid>,
}

impl SurfaceResponse {
    pub fn contract_count(&self) -> usize {
        self.data
            .values()
            .map(|e| e.calls.len() + e.puts.len())
            .sum()
    }

    pub fn to_json(&self) -> Result<String, crate::error::SurfaceError> {
        Ok(serde_json::to_string(self)?)
    }
}
