// Configuration module
// Public interface for configuration loading

pub mod constants;
mod loader;
pub mod persona;
mod settings;

pub use loader::{default_config_path, load_config, load_config_from, parse_config};
pub use persona::Persona;
pub use settings::{BusyPolicy, Config, ProviderConfig, ProviderKind, SessionConfig};
