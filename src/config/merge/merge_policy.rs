//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};

/// A builder seeded with every default, so later sources only need to name
/// what they change.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("aggregation.collection_policy", "summary")?
        .set_default("aggregation.delivery_order", "fifo")?
        .set_default("aggregation.max_deliveries", 10_000_i64)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}

/// Environment overrides win over every file, e.g.
/// `RESTVIEW__AGGREGATION__COLLECTION_POLICY=resolved`.
pub fn with_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("RESTVIEW")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
