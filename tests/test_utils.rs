#![allow(dead_code)] // Each integration test binary uses a different subset

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use iv_surface::{bs_price, ChainSnapshot, ExpiryChain, OptionType, Quote};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

/// Spot the sample chain was generated at
pub const SAMPLE_SPOT: f64 = 100.0;

/// CSV row structure matching the fixture format
#[derive(Debug, Deserialize)]
struct CsvRow {
    expiration: NaiveDate,
    option_type: String,
    strike: f64,
    bid: Option<f64>,
    ask: Option<f64>,
    last_price: Option<f64>,
    implied_volatility: Option<f64>,
    volume: Option<u64>,
    open_interest: Option<u64>,
    in_the_money: Option<bool>,
}

/// Absolute path of a file under `tests/data/`
pub fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Load an option chain from CSV and group it by expiration
pub fn load_chain(file_path: &str, spot: f64) -> Result<ChainSnapshot, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(file_path)?;
    let mut by_expiry: BTreeMap<NaiveDate, Vec<Quote>> = BTreeMap::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let option_type = match row.option_type.as_str() {
            "call" => OptionType::Call,
            "put" => OptionType::Put,
            other => return Err(format!("unknown option type {}", other).into()),
        };

        let quote = Quote {
            option_type,
            expiry: row.expiration,
            strike: row.strike,
            bid: row.bid,
            ask: row.ask,
            last_price: row.last_price,
            reported_iv: row.implied_volatility,
            volume: row.volume,
            open_interest: row.open_interest,
            in_the_money: row.in_the_money,
        };
        by_expiry.entry(row.expiration).or_default().push(quote);
    }

    Ok(ChainSnapshot {
        spot,
        expirations: by_expiry
            .into_iter()
            .map(|(expiry, quotes)| ExpiryChain::from_quotes(expiry, quotes))
            .collect(),
    })
}

/// The bundled sample chain
pub fn load_sample_chain() -> ChainSnapshot {
    load_chain(&fixture_path("sample_chain.csv"), SAMPLE_SPOT).expect("sample chain fixture")
}

/// Refresh instant the sample chain was generated for
pub fn sample_refresh_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap()
}

/// Expiration `days` calendar days after the sample refresh date
pub fn expiry_in(days: i64) -> NaiveDate {
    sample_refresh_at().date_naive() + chrono::Duration::days(days)
}

/// Two-sided quote priced exactly at `sigma`, with a one-cent spread around the model price
pub fn model_quote(
    option_type: OptionType,
    expiry: NaiveDate,
    spot: f64,
    strike: f64,
    t: f64,
    r: f64,
    sigma: f64,
) -> Quote {
    let price = bs_price(option_type, spot, strike, r, t, sigma);
    Quote::new(option_type, expiry, strike, price - 0.005, price + 0.005)
}

/// Deterministic RNG for property-style tests
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed_1234)
}
