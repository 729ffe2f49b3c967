//! Error taxonomy for the request-execution core.
//!
//! Every fallible operation in this crate returns `Result<T, S3Error>`.
//! `S3Error` classifies the failure into a small, stable `S3ErrorKind` so a
//! caller across the C ABI can switch on an integer without parsing strings,
//! while still carrying the transport-level detail (libcurl's `CURLcode`,
//! the HTTP status, and `errno` for I/O failures) for diagnostics.

use std::ffi::CStr;

use crate::curl_sys::{CURLcode, CURLE_OK};

/// Coarse classification of a failure, stable across libcurl/transport
/// detail. Mirrors the taxonomy a C caller switches on directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum S3ErrorKind {
    Ok = 0,
    InvalidArg,
    NoMem,
    Init,
    Transport,
    Http,
    SigV4,
    Io,
    Timeout,
    NotFound,
    Auth,
    AccessDenied,
    Cancelled,
    Internal,
}

/// A classified error: the kind for dispatch, plus whatever transport or
/// HTTP detail produced it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?}: {message} (http_status={http_status}, transport_code={transport_code}, os_errno={os_errno})")]
pub struct S3Error {
    pub kind: S3ErrorKind,
    pub http_status: u32,
    pub transport_code: i32,
    pub os_errno: i32,
    pub message: String,
}

impl S3Error {
    pub fn new(kind: S3ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            http_status: 0,
            transport_code: 0,
            os_errno: 0,
            message: message.into(),
        }
    }

    pub fn invalid_arg(message: impl Into<String>) -> Self {
        Self::new(S3ErrorKind::InvalidArg, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(S3ErrorKind::Internal, message)
    }

    pub fn init(message: impl Into<String>) -> Self {
        Self::new(S3ErrorKind::Init, message)
    }

    /// Classify a non-OK `CURLcode` returned by `curl_easy_perform` /
    /// `curl_multi_info_read`. Operation-timed-out maps to `Timeout`,
    /// DNS/connect failures to `Init`, send/recv failures to `Io`,
    /// everything else to `Transport`.
    pub fn from_curl_code(code: CURLcode, strerror: &CStr) -> Self {
        let message = strerror.to_string_lossy().into_owned();
        let kind = match code {
            c if c == crate::curl_sys::CURLE_OPERATION_TIMEDOUT => S3ErrorKind::Timeout,
            c if c == crate::curl_sys::CURLE_COULDNT_RESOLVE_HOST
                || c == crate::curl_sys::CURLE_COULDNT_CONNECT
                || c == crate::curl_sys::CURLE_COULDNT_RESOLVE_PROXY =>
            {
                S3ErrorKind::Init
            }
            c if c == crate::curl_sys::CURLE_SEND_ERROR
                || c == crate::curl_sys::CURLE_RECV_ERROR =>
            {
                S3ErrorKind::Io
            }
            _ => S3ErrorKind::Transport,
        };
        Self {
            kind,
            http_status: 0,
            transport_code: code,
            os_errno: 0,
            message,
        }
    }

    /// Classify a completed HTTP response by status code.
    pub fn from_http_status(status: u32) -> Option<Self> {
        if (200..300).contains(&status) {
            return None;
        }
        let kind = match status {
            401 => S3ErrorKind::Auth,
            403 => S3ErrorKind::AccessDenied,
            404 => S3ErrorKind::NotFound,
            408 => S3ErrorKind::Timeout,
            _ => S3ErrorKind::Http,
        };
        Some(Self {
            kind,
            http_status: status,
            transport_code: CURLE_OK,
            os_errno: 0,
            message: format!("HTTP {status}"),
        })
    }

    pub fn from_errno(errno: i32, message: impl Into<String>) -> Self {
        Self {
            kind: S3ErrorKind::Io,
            http_status: 0,
            transport_code: 0,
            os_errno: errno,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for S3Error {
    fn from(e: std::io::Error) -> Self {
        Self::from_errno(e.raw_os_error().unwrap_or(0), e.to_string())
    }
}
