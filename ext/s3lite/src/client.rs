//! Client façade: owns configuration, the chosen backend, and the
//! single-threaded-convenience last-error slot.
//!
//! A thin public wrapper over the heavier lifting done by `Backend`:
//! validate once at construction, delegate every call, and never let the
//! wrapper itself become a second source of truth for request state.

use std::os::unix::io::RawFd;
use std::sync::{Mutex, Once, OnceLock};

use crate::backend::{Backend, MultiBackend, SerialBackend};
use crate::config::{BackendKind, ClientConfig};
use crate::curl_sys;
use crate::error::S3Error;
use crate::runner::{BlockingRunner, DirectRunner};
use crate::xml::ListResult;

static CURL_GLOBAL_INIT: Once = Once::new();

/// `curl_global_init` is neither thread-safe to call repeatedly nor cheap;
/// every `Client` in the process shares one call, guarded by a latch that
/// is never torn down — deinitialization is not attempted during process
/// teardown.
fn ensure_curl_global_init() {
    CURL_GLOBAL_INIT.call_once(|| unsafe {
        curl_sys::curl_global_init(curl_sys::CURL_GLOBAL_DEFAULT);
    });
}

/// Whether the linked libcurl actually honors `CURLOPT_AWS_SIGV4`. Probed
/// once per process (not once per `Client`) since the answer can only ever
/// depend on which libcurl got linked in, never on a particular client's
/// config.
static SIGV4_SUPPORTED: OnceLock<bool> = OnceLock::new();

fn sigv4_supported() -> bool {
    *SIGV4_SUPPORTED.get_or_init(|| unsafe {
        let curl = curl_sys::curl_easy_init();
        if curl.is_null() {
            return false;
        }
        let probe_param = std::ffi::CString::new("aws:amz:us-east-1:s3").unwrap();
        let rc = curl_sys::curl_easy_setopt(curl, curl_sys::CURLOPT_AWS_SIGV4, probe_param.as_ptr());
        curl_sys::curl_easy_cleanup(curl);
        rc == curl_sys::CURLE_OK
    })
}

pub struct Client {
    config: ClientConfig,
    backend: Box<dyn Backend>,
    last_error: Mutex<Option<S3Error>>,
}

impl Client {
    /// Validate `config`, perform one-time global setup, and instantiate
    /// the selected backend. Unlike the source system's manual
    /// unwind-every-prior-allocation dance on failure, there is nothing to
    /// unwind here: no partial `Client` is ever constructed, since nothing
    /// is allocated until every validation has passed.
    pub fn new(config: ClientConfig) -> Result<Self, S3Error> {
        if config.endpoint.is_empty() {
            return Err(S3Error::invalid_arg("endpoint is required"));
        }
        if config.region.is_empty() {
            return Err(S3Error::invalid_arg("region is required"));
        }
        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            return Err(S3Error::invalid_arg(
                "access_key_id and secret_access_key are required",
            ));
        }
        if config.require_sigv4 && !sigv4_supported() {
            return Err(S3Error::init(
                "linked libcurl does not support CURLOPT_AWS_SIGV4",
            ));
        }

        ensure_curl_global_init();

        let backend: Box<dyn Backend> = match config.backend {
            BackendKind::Serial => Box::new(SerialBackend::new()),
            BackendKind::Multiplexed => Box::new(MultiBackend::new(
                config.max_total_connections,
                config.max_connections_per_host,
                config.multi_idle_timeout_ms,
            )?),
        };

        tracing::debug!(
            target: "s3lite::client",
            endpoint = %config.endpoint,
            backend = ?config.backend,
            "client created"
        );

        Ok(Self {
            config,
            backend,
            last_error: Mutex::new(None),
        })
    }

    /// The authoritative error is always the returned `Result` — this slot
    /// is a single-threaded convenience for callers (e.g. the C ABI) that
    /// lose their explicit error channel somewhere upstream. Under
    /// concurrent use of one `Client` it reflects only the most recent
    /// call to finish, which may not be the one whose `Result` you're
    /// holding.
    pub fn last_error(&self) -> Option<S3Error> {
        self.last_error.lock().unwrap().clone()
    }

    fn record<T>(&self, result: Result<T, S3Error>) -> Result<T, S3Error> {
        let mut slot = self.last_error.lock().unwrap();
        *slot = result.as_ref().err().cloned();
        drop(slot);
        result
    }

    pub fn put_fd(
        &self,
        bucket: &str,
        key: &str,
        fd: RawFd,
        base_offset: i64,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<(), S3Error> {
        self.put_fd_with(&DirectRunner, bucket, key, fd, base_offset, size, content_type)
    }

    pub fn put_fd_with<R: BlockingRunner>(
        &self,
        runner: &R,
        bucket: &str,
        key: &str,
        fd: RawFd,
        base_offset: i64,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<(), S3Error> {
        let result = runner.run(|| {
            self.backend
                .put_fd(&self.config, bucket, key, fd, base_offset, size, content_type)
        });
        self.record(result)
    }

    pub fn get_fd(
        &self,
        bucket: &str,
        key: &str,
        fd: RawFd,
        base_offset: i64,
        max_size: Option<u64>,
        range: Option<&str>,
    ) -> Result<(), S3Error> {
        self.get_fd_with(&DirectRunner, bucket, key, fd, base_offset, max_size, range)
    }

    pub fn get_fd_with<R: BlockingRunner>(
        &self,
        runner: &R,
        bucket: &str,
        key: &str,
        fd: RawFd,
        base_offset: i64,
        max_size: Option<u64>,
        range: Option<&str>,
    ) -> Result<(), S3Error> {
        let result = runner.run(|| {
            self.backend
                .get_fd(&self.config, bucket, key, fd, base_offset, max_size, range)
        });
        self.record(result)
    }

    pub fn create_bucket(&self, bucket: &str) -> Result<(), S3Error> {
        self.create_bucket_with(&DirectRunner, bucket)
    }

    pub fn create_bucket_with<R: BlockingRunner>(&self, runner: &R, bucket: &str) -> Result<(), S3Error> {
        let result = runner.run(|| self.backend.create_bucket(&self.config, bucket));
        self.record(result)
    }

    pub fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
        max_keys: Option<u32>,
    ) -> Result<ListResult, S3Error> {
        self.list_objects_with(&DirectRunner, bucket, prefix, continuation_token, max_keys)
    }

    pub fn list_objects_with<R: BlockingRunner>(
        &self,
        runner: &R,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
        max_keys: Option<u32>,
    ) -> Result<ListResult, S3Error> {
        let result = runner.run(|| {
            self.backend
                .list_objects(&self.config, bucket, prefix, continuation_token, max_keys)
        });
        self.record(result)
    }

    pub fn delete_objects(&self, bucket: &str, keys: &[String], quiet: bool) -> Result<(), S3Error> {
        self.delete_objects_with(&DirectRunner, bucket, keys, quiet)
    }

    pub fn delete_objects_with<R: BlockingRunner>(
        &self,
        runner: &R,
        bucket: &str,
        keys: &[String],
        quiet: bool,
    ) -> Result<(), S3Error> {
        let result = runner.run(|| self.backend.delete_objects(&self.config, bucket, keys, quiet));
        self.record(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ClientConfig {
        ClientConfig {
            endpoint: "https://s3.example.com".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            require_sigv4: false,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn rejects_missing_endpoint() {
        let cfg = ClientConfig {
            endpoint: String::new(),
            ..base_config()
        };
        let err = Client::new(cfg).unwrap_err();
        assert_eq!(err.kind, crate::error::S3ErrorKind::InvalidArg);
    }

    #[test]
    fn rejects_missing_credentials() {
        let cfg = ClientConfig {
            access_key_id: String::new(),
            ..base_config()
        };
        let err = Client::new(cfg).unwrap_err();
        assert_eq!(err.kind, crate::error::S3ErrorKind::InvalidArg);
    }

    #[test]
    fn serial_client_constructs_with_valid_config() {
        let client = Client::new(base_config()).unwrap();
        assert!(client.last_error().is_none());
    }

    #[test]
    fn put_fd_rejects_invalid_fd_through_client() {
        let client = Client::new(base_config()).unwrap();
        let err = client.put_fd("bucket", "key", -1, 0, 10, None).unwrap_err();
        assert_eq!(err.kind, crate::error::S3ErrorKind::InvalidArg);
        assert_eq!(client.last_error().unwrap().kind, crate::error::S3ErrorKind::InvalidArg);
    }
}
