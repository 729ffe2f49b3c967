//! The `Backend` capability trait: one vtable behind which the serial and
//! multiplexed execution strategies hide. A `Client` holds a single
//! `Box<dyn Backend>` chosen at construction time from
//! `ClientConfig::backend` and never switches it afterward.

pub mod multi;
pub mod serial;

use std::os::unix::io::RawFd;

use crate::config::ClientConfig;
use crate::curl_sys;
use crate::error::S3Error;
use crate::handle::EasyHandle;
use crate::xml::ListResult;

pub use multi::MultiBackend;
pub use serial::SerialBackend;

pub trait Backend: Send + Sync {
    fn put_fd(
        &self,
        cfg: &ClientConfig,
        bucket: &str,
        key: &str,
        fd: RawFd,
        base_offset: i64,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<(), S3Error>;

    fn get_fd(
        &self,
        cfg: &ClientConfig,
        bucket: &str,
        key: &str,
        fd: RawFd,
        base_offset: i64,
        max_size: Option<u64>,
        range: Option<&str>,
    ) -> Result<(), S3Error>;

    fn create_bucket(&self, cfg: &ClientConfig, bucket: &str) -> Result<(), S3Error>;

    fn list_objects(
        &self,
        cfg: &ClientConfig,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
        max_keys: Option<u32>,
    ) -> Result<ListResult, S3Error>;

    fn delete_objects(
        &self,
        cfg: &ClientConfig,
        bucket: &str,
        keys: &[String],
        quiet: bool,
    ) -> Result<(), S3Error>;
}

/// Interpret a handle that has finished transferring: non-OK `CURLcode`
/// takes priority (the request never got a complete HTTP response), else
/// a non-2xx status is mapped to a classified error, else success.
pub(crate) fn map_completion(handle: &EasyHandle, code: curl_sys::CURLcode) -> Result<(), S3Error> {
    if code != curl_sys::CURLE_OK {
        let strerror = curl_sys::strerror(code);
        let mut err = S3Error::from_curl_code(code, &strerror);
        if let Some(msg) = handle.error_message() {
            err.message = msg;
        }
        return Err(err);
    }
    let status = handle.response_status();
    if let Some(err) = S3Error::from_http_status(status) {
        return Err(err);
    }
    Ok(())
}

pub(crate) fn parse_list_response(handle: &mut EasyHandle) -> Result<ListResult, S3Error> {
    let body = handle
        .take_response_mem()
        .map(|b| b.into_vec())
        .unwrap_or_default();
    crate::xml::parse_list_objects_v2(&body)
}
