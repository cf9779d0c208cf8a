//! Shared HTTP plumbing for REST provider adapters.

use super::{ProviderConfig, ProviderError, ProviderResult};
use once_cell::sync::Lazy;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client, StatusCode,
};
use serde::de::DeserializeOwned;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("footy-odds")
        .build()
        .expect("Failed to build http client")
});

fn headers_for(config: &ProviderConfig) -> ProviderResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(key) = &config.api_key {
        let value = HeaderValue::from_str(key)
            .map_err(|e| ProviderError::Permanent(format!("bad api key header: {e}")))?;
        headers.insert("X-Auth-Token", value);
    }
    Ok(headers)
}

/// GET a JSON payload from `{base_url}{path}`, mapping transport and status
/// failures onto the transient/permanent taxonomy: network errors, timeouts,
/// rate limits and 5xx retry; other 4xx do not.
pub(super) async fn get_json<T: DeserializeOwned>(
    config: &ProviderConfig,
    path: &str,
    query: &[(&str, String)],
) -> ProviderResult<T> {
    let url = format!("{}{}", config.base_url.trim_end_matches('/'), path);
    let headers = headers_for(config)?;

    let response = CLIENT
        .get(&url)
        .headers(headers)
        .query(query)
        .send()
        .await
        .map_err(|e| ProviderError::Transient(format!("{}: {e}", config.name)))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(ProviderError::Transient(format!(
            "{}: status {status} from {url}",
            config.name
        )));
    }
    if !status.is_success() {
        return Err(ProviderError::Permanent(format!(
            "{}: status {status} from {url}",
            config.name
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Permanent(format!("{}: bad payload: {e}", config.name)))
}
