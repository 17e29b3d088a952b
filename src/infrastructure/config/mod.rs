mod settings;

pub use settings::{
    ApiConfig, CacheConfig, DatabaseConfig, LoggingConfig, OtelConfig, RedisConfig, RenderConfig,
    ServerConfig, Settings, StoreConfig,
};
