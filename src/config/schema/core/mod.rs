mod env_overrides;
mod loader;
mod template;
mod types;
mod validation;

pub use types::Config;
pub use validation::is_placeholder;
