pub mod ai;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod ledger;
pub mod logging;
pub mod pipeline;
pub mod request;
pub mod scoring;

pub use ai::{AiAssessor, AiError, HttpAiClient, Verdict};
pub use cache::CacheStore;
pub use config::{load_config, Config, QuotaPolicy};
pub use error::{ConfigError, PhishguardError, Result, ScanError};
pub use fingerprint::Fingerprint;
pub use ledger::{Operation, QuotaDecision, UsageLedger};
pub use pipeline::ScanPipeline;
pub use request::{Classification, ScanKind, ScanRequest, ScanResult, Source};
