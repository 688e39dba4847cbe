mod settings;

pub use settings::{
    Config, ConfigError, RelaySettings, SessionSettings, StoreSettings, SyncSettings,
    EXAMPLE_CONFIG,
};
