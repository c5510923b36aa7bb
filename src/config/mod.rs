pub mod settings;

pub use settings::{AppConfig, CacheSettings, RankingSettings, StoreSettings};
