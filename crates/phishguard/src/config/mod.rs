//! Injected configuration: cache TTLs, size limits, scoring policy,
//! quota tiers, and AI provider settings.

mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    AiConfig, CacheConfig, CategoryWeights, Config, LimitsConfig, QuotaPolicy, ScoringConfig,
};
