//! Black-Scholes pricing and implied-volatility round trip
//!
//! This example shows how to:
//! 1. Price a strip of contracts at a known volatility
//! 2. Solve the implied volatility back from those prices
//! 3. Inspect the Greeks the surface output carries

use anyhow::Result;
use iv_surface::{bs_price, price_contract, solve_implied_vol, OptionType, SolverConfig};

fn main() -> Result<()> {
    println!("Black-Scholes Pricing Demo");
    println!("==========================");

    let spot = 100.0;
    let rate = 0.05;
    let days = 30.0;
    let t = days / 365.0;
    let solver = SolverConfig::default();

    println!("Spot: ${:.0}, rate: {:.1}%, expiry: {} days\n", spot, rate * 100.0, days);
    println!(
        "{:<6} {:<8} {:<8} {:<10} {:<10} {:<8} {:<8} {:<8} {:<8}",
        "Type", "Strike", "Vol", "Price", "Solved", "Delta", "Gamma", "Vega", "Theta"
    );
    println!("{}", "-".repeat(80));

    for option_type in [OptionType::Call, OptionType::Put] {
        for (strike, vol) in [(90.0, 0.26), (95.0, 0.23), (100.0, 0.20), (105.0, 0.19), (110.0, 0.21)] {
            let price = bs_price(option_type, spot, strike, rate, t, vol);
            let solved = solve_implied_vol(option_type, spot, strike, rate, t, price, &solver)?;
            let g = price_contract(option_type, spot, strike, days, rate, solved);

            println!(
                "{:<6} {:<8.1} {:<8.2} {:<10.4} {:<10.4} {:<8.4} {:<8.4} {:<8.4} {:<8.4}",
                option_type, strike, vol, price, solved, g.delta, g.gamma, g.vega, g.theta
            );
        }
    }

    // Prices the model cannot produce are reported, not clamped
    println!("\nSolving a call priced below intrinsic:");
    match solve_implied_vol(OptionType::Call, spot, 90.0, rate, t, 5.0, &solver) {
        Ok(iv) => println!("  unexpectedly solved: {:.4}", iv),
        Err(e) => println!("  {}", e),
    }

    Ok(())
}
