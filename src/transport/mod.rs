pub mod auth;
pub mod client;
pub mod http_client;
pub mod scrub;
pub mod traits;

pub use auth::{ClientCredentials, TokenCache};
pub use client::{ApiClient, classify_failure};
pub use http_client::build_api_client_with_timeout;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::{ApiRequest, ApiTransport, Method};
