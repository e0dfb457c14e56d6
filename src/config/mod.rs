//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → InvokerConfig (validated, immutable)
//!     → ClientSettings::to_options() → functional options for RestClient
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Files only produce options; resolution into the effective client
//!   configuration stays in `options`, so file and code paths agree

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ClientSettings, InvokerConfig, LogFormat, ObservabilityConfig, TlsConfig};
pub use validation::{validate_config, ValidationError};
