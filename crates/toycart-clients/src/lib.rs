//! HTTP adapters for the entitlement and catalog services.
//!
//! `HttpEntitlementClient` and `HttpCatalogClient` implement the
//! `toycart-core` capability traits over `reqwest`.

pub mod catalog;
pub mod entitlement;
pub mod error;
pub mod retry;

pub use catalog::HttpCatalogClient;
pub use entitlement::HttpEntitlementClient;
pub use error::ClientError;

/// Validates a configured service base URL and strips any trailing `/`.
fn normalize_base_url(raw: impl Into<String>) -> Result<String, ClientError> {
    let raw = raw.into();
    let trimmed = raw.trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed)
        .map_err(|err| ClientError::InvalidBaseUrl(format!("{raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ClientError::InvalidBaseUrl(format!(
            "{raw}: expected an http(s) url with a host"
        )));
    }
    Ok(trimmed.to_owned())
}
