use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::chain::config::{OutlierGrouping, SurfaceConfig};
use crate::chain::expirations::sample_expirations;
use crate::chain::outliers::reject_outliers;
use crate::chain::surface::build_surface_grid;
use crate::chain::types::{
    AnalyticsResult, AnalyzedContract, ChainSnapshot, ExpiryContracts, IvSource, PricingContext,
    Quote, SurfacePoint, SurfaceResponse,
};
use crate::chain::validation::{in_moneyness_band, price_target, usable_reported_iv, validate_quote};
use crate::error::{InterpolationError, QuoteRejection, SolveError, SurfaceError};
use crate::models::bs::{bs_greeks, OptionType};
use crate::models::iv::solve_implied_vol;
use crate::models::utils::is_positive;

/// Why a single contract did not make it into the result.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractFailure {
    Rejected(QuoteRejection),
    /// No solvable price and no usable reported IV. Carries the solver error when the solver ran.
    Unsolvable(Option<SolveError>),
}

/// Per-stage tallies for one build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineDiagnostics {
    pub expirations_available: usize,
    pub expirations_sampled: usize,
    pub quotes_seen: usize,
    pub out_of_band: usize,
    pub rejected: BTreeMap<QuoteRejection, usize>,
    pub solved: usize,
    pub reported_fallbacks: usize,
    pub unsolvable: usize,
    pub outliers_excluded: usize,
    /// Set when the surface had to be omitted
    pub interpolation: Option<InterpolationError>,
}

impl PipelineDiagnostics {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Everything produced by one refresh.
#[derive(Debug, Clone)]
pub struct SurfaceBuild {
    pub response: SurfaceResponse,
    /// Scatter points behind the surface, IV in percent
    pub points: Vec<SurfacePoint>,
    pub diagnostics: PipelineDiagnostics,
}

/// Validate, price and solve a single quote.
///
/// Falls back to the provider's IV when the solver fails or no price is usable; without a
/// usable reported IV the contract is dropped.
pub fn analyze_quote(
    quote: &Quote,
    ctx: &PricingContext,
    config: &SurfaceConfig,
) -> Result<AnalyticsResult, ContractFailure> {
    validate_quote(quote).map_err(ContractFailure::Rejected)?;

    let solved = match price_target(quote).price() {
        Some(target) => solve_implied_vol(
            quote.option_type,
            ctx.spot,
            quote.strike,
            ctx.risk_free_rate,
            ctx.time_to_expiry,
            target,
            &config.solver,
        )
        .map_err(Some),
        None => Err(None),
    };

    let (implied_vol, iv_source) = match solved {
        Ok(iv) => (iv, IvSource::Solved),
        Err(err) => match usable_reported_iv(quote, config.max_reported_iv) {
            Some(iv) => {
                debug!(
                    strike = quote.strike,
                    option_type = %quote.option_type,
                    reason = ?err,
                    "falling back to reported IV"
                );
                (iv, IvSource::Reported)
            }
            None => return Err(ContractFailure::Unsolvable(err)),
        },
    };

    let greeks = bs_greeks(
        quote.option_type,
        ctx.spot,
        quote.strike,
        ctx.risk_free_rate,
        ctx.time_to_expiry,
        implied_vol,
    );
    let finite = [greeks.price, greeks.delta, greeks.gamma, greeks.vega, greeks.theta]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Err(ContractFailure::Unsolvable(None));
    }

    Ok(AnalyticsResult {
        implied_vol,
        iv_source,
        greeks,
    })
}

/// Run the whole chain-to-surface pipeline on an in-memory snapshot.
///
/// Expirations are sampled, each quote is validated, solved and priced, IV outliers are
/// removed, and the survivors are interpolated onto the grid. Per-contract failures are
/// absorbed and counted; the only request-level failures are bad inputs and
/// [`SurfaceError::InsufficientData`]. A missing surface is not an error: the response simply
/// carries no `surface` and the reason sits in the diagnostics.
pub fn build_surface(
    snapshot: &ChainSnapshot,
    refresh_at: DateTime<Utc>,
    config: &SurfaceConfig,
) -> Result<SurfaceBuild, SurfaceError> {
    config.validate()?;
    let spot = snapshot.spot;
    if !is_positive(spot) {
        return Err(SurfaceError::InvalidSpot(spot));
    }

    let mut diag = PipelineDiagnostics {
        expirations_available: snapshot.expirations.len(),
        ..PipelineDiagnostics::default()
    };

    let dates: Vec<NaiveDate> = snapshot.expirations.iter().map(|e| e.expiry).collect();
    let selected = sample_expirations(&dates, refresh_at.date_naive(), &config.sampling);
    diag.expirations_sampled = selected.len();

    let mut contracts: Vec<AnalyzedContract> = Vec::new();
    let mut seen = BTreeSet::new();
    for chain in &snapshot.expirations {
        if !selected.contains(&chain.expiry) || !seen.insert(chain.expiry) {
            continue;
        }
        let ctx = PricingContext::new(spot, chain.expiry, refresh_at, config);
        let before = contracts.len();

        for quote in chain.calls.iter().chain(&chain.puts) {
            diag.quotes_seen += 1;
            if !in_moneyness_band(quote, spot, config) {
                diag.out_of_band += 1;
                continue;
            }
            match analyze_quote(quote, &ctx, config) {
                Ok(analytics) => {
                    match analytics.iv_source {
                        IvSource::Solved => diag.solved += 1,
                        IvSource::Reported => diag.reported_fallbacks += 1,
                    }
                    contracts.push(AnalyzedContract {
                        expiry: chain.expiry,
                        quote: quote.clone(),
                        context: ctx,
                        analytics,
                    });
                }
                Err(ContractFailure::Rejected(reason)) => {
                    *diag.rejected.entry(reason).or_insert(0) += 1;
                }
                Err(ContractFailure::Unsolvable(_)) => diag.unsolvable += 1,
            }
        }

        let added = &contracts[before..];
        let calls = added.iter().filter(|c| c.quote.option_type.is_call()).count();
        debug!(
            expiry = %chain.expiry,
            dte = ctx.days_to_expiry,
            calls,
            puts = added.len() - calls,
            "analysed expiration"
        );
    }

    let (contracts, removed) = remove_outliers(contracts, config);
    diag.outliers_excluded = removed;

    if contracts.len() < config.min_valid_contracts {
        warn!(
            found = contracts.len(),
            required = config.min_valid_contracts,
            "not enough valid contracts to build a surface"
        );
        return Err(SurfaceError::InsufficientData {
            found: contracts.len(),
            required: config.min_valid_contracts,
        });
    }

    let mut data: BTreeMap<String, ExpiryContracts> = selected
        .iter()
        .map(|d| (d.format("%Y-%m-%d").to_string(), ExpiryContracts::default()))
        .collect();
    for contract in &contracts {
        let entry = data
            .entry(contract.expiry.format("%Y-%m-%d").to_string())
            .or_default();
        match contract.quote.option_type {
            OptionType::Call => entry.calls.push(contract.to_record()),
            OptionType::Put => entry.puts.push(contract.to_record()),
        }
    }
    for entry in data.values_mut() {
        entry.calls.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        entry.puts.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    }

    let points: Vec<SurfacePoint> = contracts.iter().map(|c| c.to_surface_point()).collect();
    let surface = match build_surface_grid(&points, config) {
        Ok(grid) => Some(grid),
        Err(err) => {
            warn!(points = points.len(), error = %err, "surface interpolation unavailable");
            diag.interpolation = Some(err);
            None
        }
    };

    info!(
        spot,
        expirations = diag.expirations_sampled,
        contracts = contracts.len(),
        rejected = diag.rejected_total(),
        reported_fallbacks = diag.reported_fallbacks,
        outliers = diag.outliers_excluded,
        surface_points = points.len(),
        grid = ?surface.as_ref().map(|g| (g.x.len(), g.y.len())),
        "surface build complete"
    );

    Ok(SurfaceBuild {
        response: SurfaceResponse {
            spot,
            data,
            surface,
        },
        points,
        diagnostics: diag,
    })
}

fn remove_outliers(
    contracts: Vec<AnalyzedContract>,
    config: &SurfaceConfig,
) -> (Vec<AnalyzedContract>, usize) {
    let iv = |c: &AnalyzedContract| c.analytics.implied_vol;
    match config.outliers.grouping {
        OutlierGrouping::Surface => reject_outliers(contracts, iv, &config.outliers),
        OutlierGrouping::PerSlice => {
            let mut slices: BTreeMap<(NaiveDate, OptionType), Vec<AnalyzedContract>> =
                BTreeMap::new();
            for c in contracts {
                slices
                    .entry((c.expiry, c.quote.option_type))
                    .or_default()
                    .push(c);
            }
            let mut kept = Vec::new();
            let mut removed = 0;
            for (_, slice) in slices {
                let (survivors, n) = reject_outliers(slice, iv, &config.outliers);
                kept.extend(survivors);
                removed += n;
            }
            (kept, removed)
        }
    }
}
