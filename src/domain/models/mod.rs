pub mod batch;
pub mod blacklist;
pub mod config;
pub mod platform;
pub mod pool;

pub use batch::{
    BatchOutcome, BatchProgress, BatchStatus, DeviceSelector, FailureTally, GenerationRequest,
    StopReason,
};
pub use blacklist::{agent_hash, BlacklistEntry};
pub use config::{
    BlacklistConfig, Config, DatabaseConfig, GenerationConfig, LoggingConfig, PoolSourceConfig,
};
pub use platform::{AppType, Platform};
pub use pool::{
    component_tags, BuildNumberEntry, CatalogSummary, ComponentPools, DeviceModel, LanguageWeightMap,
    PlatformPools, PoolCatalog, VersionComponent,
};
