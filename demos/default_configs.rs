use iv_surface::{default_configs, SurfaceConfig};

fn describe(name: &str, config: &SurfaceConfig, use_case: &str) {
    println!("{}:", name);
    println!(
        "   Moneyness band: {:.2} - {:.2}{}",
        config.moneyness_band.lower,
        config.moneyness_band.upper,
        if config.otm_only { " (OTM only)" } else { "" }
    );
    println!(
        "   Expirations: nearest {} plus up to {} within {} days",
        config.sampling.near_term_count, config.sampling.far_sample_cap, config.sampling.horizon_days
    );
    println!(
        "   Outliers: k = {}, grouping {:?}, min {} samples",
        config.outliers.iqr_multiplier, config.outliers.grouping, config.outliers.min_samples
    );
    println!(
        "   Grid: {} x {}",
        config.grid.moneyness_steps, config.grid.dte_steps
    );
    println!("   Use case: {}\n", use_case);
}

fn main() -> anyhow::Result<()> {
    println!("IV-Surface Default Configuration Examples\n");

    describe(
        "1. Standard Configuration",
        &default_configs::standard(),
        "Liquid equity and ETF chains",
    );
    describe(
        "2. Wide Band Configuration",
        &default_configs::wide_band(),
        "Skew studies, sparse strikes",
    );
    describe(
        "3. OTM Wings Configuration",
        &default_configs::otm_wings(),
        "Out-of-the-money smile only",
    );

    // Configurations can also come from TOML; missing fields keep their defaults
    println!("4. Configuration from TOML:");
    let config = SurfaceConfig::from_toml_str(
        r#"
        risk_free_rate = 0.043

        [sampling]
        horizon_days = 60

        [grid]
        moneyness_steps = 80
        "#,
    )?;
    config.validate()?;
    describe("   Parsed", &config, "Service deployment overrides");

    Ok(())
}
