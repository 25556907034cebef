pub mod config;
pub mod expirations;
pub mod outliers;
pub mod pipeline;
pub mod source;
pub mod surface;
pub mod types;
pub mod validation;

pub use config::{MoneynessBand, OutlierConfig, OutlierGrouping, SamplingConfig, SurfaceConfig};
pub use pipeline::{analyze_quote, build_surface, ContractFailure, PipelineDiagnostics, SurfaceBuild};
pub use source::{refresh, ChainProvider};
pub use types::{
    AnalyticsResult, AnalyzedContract, ChainSnapshot, ContractRecord, ExpiryChain,
    ExpiryContracts, IvSource, PricingContext, Quote, SurfacePoint, SurfaceResponse,
};
