//! End-to-end surface build from a synthetic option chain
//!
//! This example shows how to:
//! 1. Assemble a chain snapshot (normally delivered by a `ChainProvider`)
//! 2. Run the pipeline with a preset configuration
//! 3. Inspect diagnostics, per-contract analytics and the interpolated grid
//!
//! Run with `RUST_LOG=debug` to see per-expiration logging.

use anyhow::Result;
use chrono::{Duration, Utc};
use iv_surface::{
    bs_price, build_surface, default_configs, ChainSnapshot, ExpiryChain, OptionType, Quote,
};
use tracing_subscriber::EnvFilter;

fn smile(moneyness: f64, days: i64) -> f64 {
    let k = moneyness.ln();
    0.20 - 0.08 * k + 0.6 * k * k + 0.02 * (days as f64 / 30.0).sqrt()
}

fn create_demo_chain(spot: f64, rate: f64) -> ChainSnapshot {
    let today = Utc::now().date_naive();
    let expirations = [1, 3, 7, 14, 21, 35, 49, 63, 91, 120]
        .iter()
        .map(|&days| {
            let expiry = today + Duration::days(days);
            let t = days as f64 / 365.0;
            let mut quotes = Vec::new();
            for i in 0..=16 {
                let strike = 80.0 + 2.5 * i as f64;
                let vol = smile(strike / spot, days);
                for option_type in [OptionType::Call, OptionType::Put] {
                    let price = bs_price(option_type, spot, strike, rate, t, vol);
                    if price < 0.05 {
                        continue;
                    }
                    let half = (0.005 * price).max(0.01);
                    let mut quote =
                        Quote::new(option_type, expiry, strike, price - half, price + half);
                    quote.reported_iv = Some(vol);
                    quotes.push(quote);
                }
            }
            ExpiryChain::from_quotes(expiry, quotes)
        })
        .collect();

    ChainSnapshot {
        spot,
        expirations,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Implied Volatility Surface Demo");
    println!("===============================");

    let config = default_configs::standard();
    let snapshot = create_demo_chain(100.0, config.risk_free_rate);
    let build = build_surface(&snapshot, Utc::now(), &config)?;

    let d = &build.diagnostics;
    println!("\nDiagnostics:");
    println!(
        "  Expirations: {} listed, {} sampled",
        d.expirations_available, d.expirations_sampled
    );
    println!(
        "  Quotes: {} seen, {} outside band, {} rejected",
        d.quotes_seen,
        d.out_of_band,
        d.rejected_total()
    );
    println!(
        "  Solved: {}, reported-IV fallbacks: {}, dropped: {}, outliers: {}",
        d.solved, d.reported_fallbacks, d.unsolvable, d.outliers_excluded
    );

    println!("\nATM contracts:");
    println!(
        "{:<12} {:<6} {:<10} {:<10} {:<8} {:<8}",
        "Expiry", "Type", "IV", "BS Price", "Delta", "Theta"
    );
    println!("{}", "-".repeat(60));
    for (expiry, slice) in &build.response.data {
        for (label, records) in [("call", &slice.calls), ("put", &slice.puts)] {
            if let Some(r) = records.iter().find(|r| r.strike == 100.0) {
                println!(
                    "{:<12} {:<6} {:<10.4} {:<10.4} {:<8.4} {:<8.4}",
                    expiry, label, r.implied_volatility, r.bs_price, r.delta, r.theta
                );
            }
        }
    }

    match &build.response.surface {
        Some(grid) => {
            println!(
                "\nSurface: {} x {} grid, {} cells outside the hull",
                grid.x.len(),
                grid.y.len(),
                grid.undefined_count()
            );
            let step = (grid.y.len() / 5).max(1);
            for (j, row) in grid.z.iter().enumerate().step_by(step) {
                let mid = row.len() / 2;
                match row[mid] {
                    Some(v) => println!(
                        "  DTE {:>6.1}, moneyness {:.3}: {:.2}%",
                        grid.y[j], grid.x[mid], v
                    ),
                    None => println!("  DTE {:>6.1}, moneyness {:.3}: undefined", grid.y[j], grid.x[mid]),
                }
            }
        }
        None => println!("\nNo surface: {:?}", d.interpolation),
    }

    let json = build.response.to_json()?;
    println!("\nJSON payload: {} bytes", json.len());

    Ok(())
}
