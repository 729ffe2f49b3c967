//! Serial backend: one `curl_easy_perform` per request, executed on
//! whichever thread calls into it. The caller is responsible for any
//! serialization it needs across threads — this backend does none itself.

use std::os::unix::io::RawFd;

use crate::config::ClientConfig;
use crate::curl_sys;
use crate::error::S3Error;
use crate::handle::{self, EasyHandle};
use crate::xml::ListResult;

use super::{map_completion, parse_list_response, Backend};

#[derive(Debug, Default)]
pub struct SerialBackend;

impl SerialBackend {
    pub fn new() -> Self {
        Self
    }

    /// Perform the transaction synchronously and map its outcome, returning
    /// the handle on success so callers that need the response body (List,
    /// Delete) can still read it before the handle is dropped. On failure,
    /// any in-memory response body collected so far (List/Delete only — Put
    /// and Get never populate one) is logged here, since this is the last
    /// point it is reachable before the handle's `Drop` frees it.
    fn execute(&self, mut handle: EasyHandle) -> Result<EasyHandle, S3Error> {
        tracing::debug!(target: "s3lite::backend::serial", "performing request");
        let code = unsafe { curl_sys::curl_easy_perform(handle.curl) };
        if let Err(err) = map_completion(&handle, code) {
            if let Some(body) = handle.take_response_mem() {
                if !body.is_empty() {
                    tracing::warn!(
                        target: "s3lite::backend::serial",
                        status = handle.response_status(),
                        body = %String::from_utf8_lossy(body.as_slice()),
                        "request failed"
                    );
                }
            }
            return Err(err);
        }
        tracing::debug!(
            target: "s3lite::backend::serial",
            status = handle.response_status(),
            "request completed"
        );
        Ok(handle)
    }
}

impl Backend for SerialBackend {
    fn put_fd(
        &self,
        cfg: &ClientConfig,
        bucket: &str,
        key: &str,
        fd: RawFd,
        base_offset: i64,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<(), S3Error> {
        if fd < 0 {
            return Err(S3Error::invalid_arg("fd must be >= 0"));
        }
        let handle = handle::build_put_fd(cfg, bucket, key, fd, base_offset, size, content_type)?;
        self.execute(handle).map(|_| ())
    }

    fn get_fd(
        &self,
        cfg: &ClientConfig,
        bucket: &str,
        key: &str,
        fd: RawFd,
        base_offset: i64,
        max_size: Option<u64>,
        range: Option<&str>,
    ) -> Result<(), S3Error> {
        if fd < 0 {
            return Err(S3Error::invalid_arg("fd must be >= 0"));
        }
        let handle = handle::build_get_fd(cfg, bucket, key, fd, base_offset, max_size, range)?;
        self.execute(handle).map(|_| ())
    }

    fn create_bucket(&self, cfg: &ClientConfig, bucket: &str) -> Result<(), S3Error> {
        let handle = handle::build_create_bucket(cfg, bucket)?;
        self.execute(handle).map(|_| ())
    }

    fn list_objects(
        &self,
        cfg: &ClientConfig,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
        max_keys: Option<u32>,
    ) -> Result<ListResult, S3Error> {
        let handle = handle::build_list_objects(cfg, bucket, prefix, continuation_token, max_keys)?;
        let mut handle = self.execute(handle)?;
        parse_list_response(&mut handle)
    }

    fn delete_objects(
        &self,
        cfg: &ClientConfig,
        bucket: &str,
        keys: &[String],
        quiet: bool,
    ) -> Result<(), S3Error> {
        let handle = handle::build_delete_objects(cfg, bucket, keys, quiet)?;
        self.execute(handle).map(|_| ())
    }
}
