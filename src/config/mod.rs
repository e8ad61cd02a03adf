//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → DispatchConfig handed to the Router, the rest to main
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table is built in code, not config
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, DispatchConfig, ListenerConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
