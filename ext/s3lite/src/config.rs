//! Client configuration.
//!
//! `ClientConfig` is the single source of truth every easy-handle builder
//! and backend consults: endpoint/credentials, TLS verification knobs,
//! proxy routing, timeouts, and connection-pool limits. Defaults mirror
//! conservative values a production S3 client would pick implicitly when
//! a caller leaves an option unset.

use crate::proxy::ProxyOptions;

/// Which `Backend` implementation a client drives requests through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// One `curl_easy_perform` per request, serialized by the caller.
    Serial,
    /// A shared `curl_multi` handle driven by a dedicated driver thread.
    Multiplexed,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub require_sigv4: bool,
    pub default_bucket: Option<String>,

    pub ca_file: Option<String>,
    pub ca_path: Option<String>,
    pub verify_peer: bool,
    pub verify_host: bool,
    pub proxy: Option<ProxyOptions>,

    pub connect_timeout_ms: u32,
    pub request_timeout_ms: u32,
    pub max_total_connections: u32,
    pub max_connections_per_host: u32,
    pub multi_idle_timeout_ms: u32,

    pub backend: BackendKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: None,
            require_sigv4: true,
            default_bucket: None,
            ca_file: None,
            ca_path: None,
            verify_peer: true,
            verify_host: true,
            proxy: None,
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
            max_total_connections: 64,
            max_connections_per_host: 16,
            multi_idle_timeout_ms: 50,
            backend: BackendKind::Serial,
        }
    }
}

impl ClientConfig {
    pub fn credentials(&self) -> crate::auth::Credentials {
        crate::auth::Credentials {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.connect_timeout_ms, 5_000);
        assert_eq!(cfg.request_timeout_ms, 30_000);
        assert_eq!(cfg.max_total_connections, 64);
        assert_eq!(cfg.max_connections_per_host, 16);
        assert_eq!(cfg.multi_idle_timeout_ms, 50);
        assert_eq!(cfg.backend, BackendKind::Serial);
    }
}
