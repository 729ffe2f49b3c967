//! HTTP proxy configuration.
//!
//! A Rust-side configuration struct for proxy settings. Applied onto an
//! easy handle via `CURLOPT_PROXY`/`CURLOPT_PROXYUSERPWD` in `handle.rs`.

/// Proxy authentication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyAuthType {
    /// No proxy authentication.
    None,
    /// HTTP Basic authentication (username + password).
    Basic,
}

/// Configuration for routing connections through an HTTP proxy.
#[derive(Debug, Clone)]
pub struct ProxyOptions {
    /// Proxy server hostname.
    pub host: String,
    /// Proxy server port.
    pub port: u32,
    /// Authentication type.
    pub auth_type: ProxyAuthType,
    /// Username for Basic auth (required when auth_type is Basic).
    pub auth_username: Option<String>,
    /// Password for Basic auth (required when auth_type is Basic).
    pub auth_password: Option<String>,
}

impl ProxyOptions {
    pub fn url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
