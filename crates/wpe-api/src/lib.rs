// wpe-api: Async Rust client for the WP Engine hosting API

pub mod auth;
pub mod client;
pub mod error;
mod installs;
pub mod models;
mod sites;
pub mod transport;

pub use auth::Credentials;
pub use client::{ClientConfig, DEFAULT_BASE_URL, WpEngineClient};
pub use error::{Error, ErrorBody};
pub use models::{
    ApiInstall, ApiSite, CacheType, Install, PORTAL_INSTALLS_URL, Page, PurgeOutcome, Site,
    SiteListing,
};
pub use reqwest::Method;
pub use transport::{TlsMode, TransportConfig};
