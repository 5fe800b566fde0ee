//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with proxy support.

use std::time::Duration;

use writedeck_core::proxy::ProxyConfig;

use crate::types::{LlmError, LlmResult};

/// Build a `reqwest::Client` with the resolved proxy configuration.
///
/// - `Some(proxy)` -> configure proxy on the client
/// - `None` -> explicitly disable proxy (`no_proxy`), ignoring env vars
///
/// Only the connect phase is bounded by `connect_timeout`; a streaming body
/// may take as long as the endpoint needs.
pub fn build_http_client(
    proxy: Option<&ProxyConfig>,
    connect_timeout: Duration,
) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().connect_timeout(connect_timeout);
    match proxy {
        Some(cfg) => {
            let url = cfg.url();
            let mut p = reqwest::Proxy::all(&url).map_err(|e| LlmError::ClientBuild {
                message: format!("invalid proxy {}: {}", url, e),
            })?;
            if let Some(user) = &cfg.username {
                p = p.basic_auth(user, cfg.password.as_deref().unwrap_or(""));
            }
            builder = builder.proxy(p);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    builder.build().map_err(|e| LlmError::ClientBuild {
        message: e.to_string(),
    })
}
