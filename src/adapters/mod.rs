// Adapters layer: concrete implementations of the domain ports over HTTP.

pub mod github;
pub mod hangouts;
pub mod http;
pub mod steam;
pub mod token_cache;

pub use github::GithubClient;
pub use hangouts::HangoutsSink;
pub use steam::SteamClient;
pub use token_cache::TokenCache;
