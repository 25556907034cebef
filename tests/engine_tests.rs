mod test_utils;

use iv_surface::models::bs::intrinsic_value;
use iv_surface::{
    bs_greeks, bs_price, price_contract, solve_implied_vol, OptionType, SolveError, SolverConfig,
};
use rand::Rng;
use test_utils::seeded_rng;

/// Prices generated at a known σ solve back to that σ.
/// Samples 500 random contracts across spot, moneyness, maturity, rate and vol.
#[test]
fn test_implied_vol_round_trip() {
    let mut rng = seeded_rng();
    let config = SolverConfig::default();

    for _ in 0..500 {
        let option_type = if rng.gen_bool(0.5) {
            OptionType::Call
        } else {
            OptionType::Put
        };
        let s = rng.gen_range(50.0..150.0);
        let k = s * rng.gen_range(0.85..1.15);
        let t = rng.gen_range(0.1..2.0);
        let r = rng.gen_range(0.0..0.08);
        let sigma = rng.gen_range(0.15..0.8);

        let price = bs_price(option_type, s, k, r, t, sigma);
        let solved = solve_implied_vol(option_type, s, k, r, t, price, &config)
            .unwrap_or_else(|e| panic!("{} S={} K={} T={} σ={}: {}", option_type, s, k, t, sigma, e));
        assert!(
            (solved - sigma).abs() < 1e-4,
            "expected {}, solved {}",
            sigma,
            solved
        );
    }
}

/// C - P = S - K e^{-rT} for any strike, maturity and vol.
#[test]
fn test_put_call_parity() {
    let mut rng = seeded_rng();

    for _ in 0..500 {
        let s = rng.gen_range(20.0..500.0);
        let k = s * rng.gen_range(0.5..1.5);
        let t = rng.gen_range(0.01..3.0);
        let r = rng.gen_range(0.0..0.1);
        let sigma = rng.gen_range(0.05..1.5);

        let call = bs_price(OptionType::Call, s, k, r, t, sigma);
        let put = bs_price(OptionType::Put, s, k, r, t, sigma);
        let forward_value = s - k * (-r * t).exp();
        assert!(
            (call - put - forward_value).abs() < 1e-6,
            "parity violated: C={} P={} S-Ke^-rT={}",
            call,
            put,
            forward_value
        );
    }
}

/// Before expiry, delta lies strictly inside (0, 1) for calls and (-1, 0) for puts, with gamma
/// and vega strictly positive. Contracts stay within a few standard deviations of the money so
/// N(d1) is not rounded to 0 or 1.
#[test]
fn test_greek_bounds() {
    let mut rng = seeded_rng();

    for _ in 0..500 {
        let s = rng.gen_range(20.0..500.0);
        let k = s * rng.gen_range(0.8..1.2);
        let t = rng.gen_range(0.25..3.0);
        let r = rng.gen_range(0.0..0.1);
        let sigma = rng.gen_range(0.15..1.5);

        let call = bs_greeks(OptionType::Call, s, k, r, t, sigma);
        let put = bs_greeks(OptionType::Put, s, k, r, t, sigma);

        assert!(call.delta > 0.0 && call.delta < 1.0, "call delta {}", call.delta);
        assert!(put.delta > -1.0 && put.delta < 0.0, "put delta {}", put.delta);
        assert!((call.delta - put.delta - 1.0).abs() < 1e-9);
        assert!(call.gamma > 0.0 && call.vega > 0.0);
        assert!((call.gamma - put.gamma).abs() < 1e-12);
        assert!((call.vega - put.vega).abs() < 1e-9);
    }
}

/// At or below the minimum time to expiry the engine reports intrinsic value and flat Greeks.
#[test]
fn test_expiry_boundary() {
    for (option_type, k) in [
        (OptionType::Call, 90.0),
        (OptionType::Call, 110.0),
        (OptionType::Put, 90.0),
        (OptionType::Put, 110.0),
    ] {
        for t in [0.0, 1e-7, 1e-6] {
            let g = bs_greeks(option_type, 100.0, k, 0.05, t, 0.3);
            assert_eq!(g.price, intrinsic_value(option_type, 100.0, k));
            assert_eq!(g.gamma, 0.0);
            assert_eq!(g.vega, 0.0);
            assert_eq!(g.theta, 0.0);
            assert!(g.delta.abs() == 0.0 || g.delta.abs() == 1.0);
        }
    }
}

/// A price the model cannot reach is reported as a failure, never as a boundary σ.
#[test]
fn test_unreachable_prices_fail_explicitly() {
    let config = SolverConfig::default();

    // Below intrinsic
    let err = solve_implied_vol(OptionType::Call, 100.0, 80.0, 0.05, 0.5, 15.0, &config).unwrap_err();
    assert!(matches!(err, SolveError::NotBracketed { .. }));

    // Above the spot, unreachable at any σ
    let err = solve_implied_vol(OptionType::Call, 100.0, 100.0, 0.05, 0.5, 101.0, &config).unwrap_err();
    assert!(matches!(err, SolveError::NotBracketed { .. }));

    let err = solve_implied_vol(OptionType::Put, 100.0, 100.0, 0.05, 0.5, f64::NAN, &config).unwrap_err();
    assert!(matches!(err, SolveError::InvalidInput(_)));
}

/// The solver takes the rate before the time to expiry, in the same order as the pricer.
/// Rate and maturity are far apart so swapping them would change the solved σ.
#[test]
fn test_solver_argument_order_matches_pricer() {
    let config = SolverConfig::default();
    let (s, k, r, t, sigma) = (100.0, 105.0, 0.02, 1.5, 0.27);

    for option_type in [OptionType::Call, OptionType::Put] {
        let price = bs_price(option_type, s, k, r, t, sigma);
        let solved = solve_implied_vol(option_type, s, k, r, t, price, &config).unwrap();
        assert!((solved - sigma).abs() < 1e-5, "{}: solved {}", option_type, solved);

        let greeks = bs_greeks(option_type, s, k, r, t, solved);
        assert!((greeks.price - price).abs() < 1e-3);
    }
}

/// Reference contract from the 30-day end-to-end scenario.
#[test]
fn test_price_contract_in_days() {
    let g = price_contract(OptionType::Call, 100.0, 100.0, 30.0, 0.05, 0.2);
    assert!((g.delta - 0.54).abs() < 0.01, "delta {}", g.delta);
    assert!(g.theta < 0.0);

    let expired = price_contract(OptionType::Put, 100.0, 105.0, 0.0, 0.05, 0.2);
    assert_eq!(expired.price, 5.0);
}
