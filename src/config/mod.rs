//! Configuration for the request pipeline
//!
//! - **store**: `Configuration`, the ordered key/value set loaded from `config.env`
//! - **env_file**: reader/writer for the shell-sourceable file format
//! - **catalog**: metadata for known keys (labels, categories, sensitivity)
//! - **presets**: named bundles of values applied atomically
//! - **token**: authorization token state and resolution

pub mod catalog;
pub mod env_file;
pub mod presets;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use catalog::Category;
pub use presets::{PresetKind, apply_preset};
pub use store::Configuration;
pub use token::AuthToken;
