use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    BPS_DENOMINATOR, Config, FeeSettings, OperatorSettings, STANDARD_FEE_BPS, Settlement, Simulation,
};

/// Loads the application configuration from `path` (without extension, e.g. `"config"`).
///
/// Values from the file can be overridden with `NESTED__<SECTION>__<KEY>` environment
/// variables, e.g. `NESTED__FEES__VIP_FEE_BPS=40`. The result is validated before it
/// is returned.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix("NESTED")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate().map_err(ConfigError::ValidationError)?;

    Ok(config)
}
