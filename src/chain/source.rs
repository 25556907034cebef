use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::chain::config::SurfaceConfig;
use crate::chain::expirations::sample_expirations;
use crate::chain::pipeline::{build_surface, SurfaceBuild};
use crate::chain::types::{ChainSnapshot, ExpiryChain};
use crate::error::SurfaceError;

/// Market-data collaborator supplying spot, listed expirations and per-expiry chains.
///
/// Implementations may block; any failure is passed through untouched as
/// [`SurfaceError::Upstream`].
pub trait ChainProvider {
    fn spot(&self, ticker: &str) -> anyhow::Result<f64>;

    fn expirations(&self, ticker: &str) -> anyhow::Result<Vec<NaiveDate>>;

    fn chain(&self, ticker: &str, expiry: NaiveDate) -> anyhow::Result<ExpiryChain>;
}

/// Fetch a snapshot from `provider` and run the pipeline on it.
///
/// Expirations are sampled before fetching, so only the selected chains are requested.
pub fn refresh<P: ChainProvider + ?Sized>(
    provider: &P,
    ticker: &str,
    refresh_at: DateTime<Utc>,
    config: &SurfaceConfig,
) -> Result<SurfaceBuild, SurfaceError> {
    config.validate()?;

    let spot = provider
        .spot(ticker)
        .inspect_err(|e| warn!(ticker, error = %e, "spot fetch failed"))?;
    let listed = provider
        .expirations(ticker)
        .inspect_err(|e| warn!(ticker, error = %e, "expiration listing failed"))?;
    let selected = sample_expirations(&listed, refresh_at.date_naive(), &config.sampling);
    debug!(
        ticker,
        listed = listed.len(),
        selected = selected.len(),
        "fetching option chains"
    );

    let mut expirations = Vec::with_capacity(selected.len());
    for expiry in selected {
        let chain = provider
            .chain(ticker, expiry)
            .inspect_err(|e| warn!(ticker, %expiry, error = %e, "chain fetch failed"))?;
        expirations.push(chain);
    }

    let build = build_surface(&ChainSnapshot { spot, expirations }, refresh_at, config)?;
    info!(
        ticker,
        contracts = build.response.contract_count(),
        "refresh complete"
    );
    Ok(build)
}

/// An in-memory snapshot serves any ticker.
impl ChainProvider for ChainSnapshot {
    fn spot(&self, _ticker: &str) -> anyhow::Result<f64> {
        Ok(self.spot)
    }

    fn expirations(&self, _ticker: &str) -> anyhow::Result<Vec<NaiveDate>> {
        Ok(self.expirations.iter().map(|e| e.expiry).collect())
    }

    fn chain(&self, _ticker: &str, expiry: NaiveDate) -> anyhow::Result<ExpiryChain> {
        self.expirations
            .iter()
            .find(|e| e.expiry == expiry)
            .cloned()
            .with_context(|| format!("no chain listed for {}", expiry))
    }
}
