#[cfg(feature = "cli")]
pub mod cli;
pub mod regulation;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use regulation::Regulation;
pub use settings::AuditSettings;
pub use toml_config::TomlConfig;
