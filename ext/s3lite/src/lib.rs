//! C ABI surface.
//!
//! Everything above this module is a safe Rust core (`Client`, `ClientConfig`,
//! `S3Error`, the `Backend` trait and its two implementations, the builders,
//! the parser). This file is the only place that crosses into `extern "C"`:
//! it owns pointer lifetimes, copies strings through a caller-supplied
//! allocator when one is given, and translates `Result<T, S3Error>` into the
//! bool-return-plus-out-parameter convention a C caller expects. No S3
//! semantics live here, only the calling convention.
//!
//! The host-language binding layer that links against this (a Ruby/Python
//! gem, a CLI) is out of scope for this crate; this module is the contract
//! such a binding is written against.

mod auth;
mod backend;
mod client;
mod config;
mod curl_sys;
mod error;
mod handle;
mod membuf;
mod proxy;
mod reactor;
mod runner;
mod url;
mod xml;

use std::ffi::{c_char, c_void, CStr};
use std::os::unix::io::RawFd;
use std::ptr;

pub use client::Client;
pub use config::{BackendKind, ClientConfig};
pub use error::{S3Error, S3ErrorKind};
pub use proxy::{ProxyAuthType, ProxyOptions};
pub use xml::{ListResult, ObjectInfo};

/// Mirrors the allocator trio a C caller may supply. Every field may be
/// left `None`/null, in which case this layer falls back to the process
/// global allocator (`Vec`/`Box`) for whatever it would otherwise have
/// routed through the caller's `alloc`/`realloc`/`free`.
///
/// `realloc` is part of the trio for parity with a caller's own allocator
/// vtable, but nothing in this layer currently grows an existing
/// allocation in place — every buffer this crate hands across the
/// boundary is sized once, up front. It is carried through unused rather
/// than dropped, so a future caller-visible growable buffer has somewhere
/// to plug in.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct S3Allocator {
    pub alloc: Option<unsafe extern "C" fn(ctx: *mut c_void, size: usize) -> *mut c_void>,
    pub realloc: Option<
        unsafe extern "C" fn(ctx: *mut c_void, ptr: *mut c_void, old_size: usize, new_size: usize) -> *mut c_void,
    >,
    pub free: Option<unsafe extern "C" fn(ctx: *mut c_void, ptr: *mut c_void)>,
    pub ctx: *mut c_void,
}

impl S3Allocator {
    /// The "no allocator supplied" sentinel: every allocation and free
    /// routed through this falls back to the process global allocator.
    fn none() -> Self {
        Self {
            alloc: None,
            realloc: None,
            free: None,
            ctx: ptr::null_mut(),
        }
    }
}

impl Default for S3Allocator {
    fn default() -> Self {
        Self::none()
    }
}

/// Allocate `len` bytes through `alloc`, if one was supplied, else through
/// the global allocator by leaking a boxed slice.
unsafe fn alloc_bytes(allocator: Option<&S3Allocator>, len: usize) -> *mut u8 {
    match allocator.and_then(|a| a.alloc) {
        Some(alloc_fn) => {
            let ctx = allocator.map(|a| a.ctx).unwrap_or(ptr::null_mut());
            alloc_fn(ctx, len) as *mut u8
        }
        None => {
            let buf = vec![0u8; len].into_boxed_slice();
            Box::into_raw(buf) as *mut u8
        }
    }
}

/// Copy a Rust `&str` into a NUL-terminated buffer allocated via
/// `alloc_bytes`. Returns null for a string containing an interior NUL,
/// which cannot round-trip through a C string, rather than truncating it.
unsafe fn dup_str(allocator: Option<&S3Allocator>, s: &str) -> *mut c_char {
    if s.as_bytes().contains(&0) {
        return ptr::null_mut();
    }
    let len = s.len() + 1;
    let buf = alloc_bytes(allocator, len);
    if buf.is_null() {
        return ptr::null_mut();
    }
    ptr::copy_nonoverlapping(s.as_ptr(), buf, s.len());
    *buf.add(s.len()) = 0;
    buf as *mut c_char
}

/// Free a NUL-terminated buffer obtained from `dup_str`. The exact
/// allocation length is recovered from the string's own terminator (these
/// buffers never contain an interior NUL — `dup_str` refuses to produce
/// one) rather than threaded in by the caller, so the global-allocator
/// path always reconstructs the identical `Box<[u8]>` layout `alloc_bytes`
/// created instead of risking a size mismatch against `GlobalAlloc::dealloc`.
unsafe fn free_cstr(allocator: Option<&S3Allocator>, ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    match allocator.and_then(|a| a.free) {
        Some(free_fn) => {
            let ctx = allocator.map(|a| a.ctx).unwrap_or(std::ptr::null_mut());
            free_fn(ctx, ptr as *mut c_void);
        }
        None => {
            let len = CStr::from_ptr(ptr).to_bytes_with_nul().len();
            drop(Box::from_raw(std::slice::from_raw_parts_mut(
                ptr as *mut u8,
                len,
            )));
        }
    }
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

unsafe fn cstr_required(ptr: *const c_char, what: &str) -> Result<String, S3Error> {
    cstr_to_string(ptr).ok_or_else(|| S3Error::invalid_arg(format!("{what} is required")))
}

// ---------------------------------------------------------------------------
// Error reporting
// ---------------------------------------------------------------------------

/// Wire-visible error kind, matching `S3ErrorKind`'s flat taxonomy
/// variant-for-variant so the two can be converted by position.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum S3ErrorCode {
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

impl From<S3ErrorKind> for S3ErrorCode {
    fn from(kind: S3ErrorKind) -> Self {
        match kind {
            S3ErrorKind::Ok => S3ErrorCode::Ok,
            S3ErrorKind::InvalidArg => S3ErrorCode::InvalidArg,
            S3ErrorKind::NoMem => S3ErrorCode::NoMem,
            S3ErrorKind::Init => S3ErrorCode::Init,
            S3ErrorKind::Transport => S3ErrorCode::Transport,
            S3ErrorKind::Http => S3ErrorCode::Http,
            S3ErrorKind::SigV4 => S3ErrorCode::SigV4,
            S3ErrorKind::Io => S3ErrorCode::Io,
            S3ErrorKind::Timeout => S3ErrorCode::Timeout,
            S3ErrorKind::NotFound => S3ErrorCode::NotFound,
            S3ErrorKind::Auth => S3ErrorCode::Auth,
            S3ErrorKind::AccessDenied => S3ErrorCode::AccessDenied,
            S3ErrorKind::Cancelled => S3ErrorCode::Cancelled,
            S3ErrorKind::Internal => S3ErrorCode::Internal,
        }
    }
}

const ERROR_MESSAGE_LEN: usize = 256;

/// `{code, http_status, transport_code, os_errno, message[bounded]}`. No
/// dynamic allocation: `message` is a fixed, NUL-padded buffer, truncated
/// (with a trailing NUL) rather than grown.
#[repr(C)]
pub struct S3ErrorInfo {
    pub code: S3ErrorCode,
    pub http_status: u32,
    pub transport_code: i32,
    pub os_errno: i32,
    pub message: [c_char; ERROR_MESSAGE_LEN],
}

impl Default for S3ErrorInfo {
    fn default() -> Self {
        Self {
            code: S3ErrorCode::Ok,
            http_status: 0,
            transport_code: 0,
            os_errno: 0,
            message: [0; ERROR_MESSAGE_LEN],
        }
    }
}

fn write_bounded_message(dest: &mut [c_char; ERROR_MESSAGE_LEN], text: &str) {
    let bytes = text.as_bytes();
    let max = ERROR_MESSAGE_LEN - 1;
    let n = bytes.len().min(max);
    for (slot, &b) in dest.iter_mut().zip(&bytes[..n]) {
        *slot = b as c_char;
    }
    dest[n] = 0;
}

/// Fill `out` (if non-null) with a success result. Every call writes its
/// outcome into the optional error pointer regardless of outcome.
unsafe fn report_ok(out: *mut S3ErrorInfo) {
    if let Some(out) = out.as_mut() {
        *out = S3ErrorInfo::default();
    }
}

unsafe fn report_err(out: *mut S3ErrorInfo, err: &S3Error) {
    if let Some(out) = out.as_mut() {
        out.code = err.kind.into();
        out.http_status = err.http_status;
        out.transport_code = err.transport_code;
        out.os_errno = err.os_errno;
        write_bounded_message(&mut out.message, &err.message);
    }
}

/// Report `result` through `err_out` and return whether it succeeded.
unsafe fn report<T>(result: &Result<T, S3Error>, err_out: *mut S3ErrorInfo) -> bool {
    match result {
        Ok(_) => {
            report_ok(err_out);
            true
        }
        Err(e) => {
            report_err(err_out, e);
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Client construction
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct S3ProxyOpts {
    pub host: *const c_char,
    pub port: u32,
    pub use_basic_auth: bool,
    pub auth_username: *const c_char,
    pub auth_password: *const c_char,
}

#[repr(C)]
pub struct S3ClientOpts {
    pub endpoint: *const c_char,
    pub region: *const c_char,
    pub access_key_id: *const c_char,
    pub secret_access_key: *const c_char,
    /// Null if no session token.
    pub session_token: *const c_char,
    /// Null if no default bucket.
    pub default_bucket: *const c_char,
    pub require_sigv4: bool,
    /// Null to use the platform default trust store.
    pub ca_file: *const c_char,
    pub ca_path: *const c_char,
    pub verify_peer: bool,
    pub verify_host: bool,
    /// Null for no proxy.
    pub proxy: *const S3ProxyOpts,
    /// 0 selects the documented default.
    pub connect_timeout_ms: u32,
    pub request_timeout_ms: u32,
    pub max_total_connections: u32,
    pub max_connections_per_host: u32,
    pub multi_idle_timeout_ms: u32,
    pub use_multiplexed_backend: bool,
    /// Null to use the process global allocator for every long-lived
    /// allocation this client hands back across the boundary (currently:
    /// the strings and array in a `ListResult`). Copied by value at
    /// construction time; not retained as a pointer.
    pub allocator: *const S3Allocator,
}

/// The opaque handle `s3_client_new` returns. Bundles the safe `Client`
/// with the allocator trio supplied at construction, so every later call
/// that must copy a string back across the boundary (`s3_list_objects`)
/// and every call that frees one (`s3_list_result_free`) use the same
/// allocator without the caller having to pass it again.
pub struct ClientHandle {
    client: Client,
    allocator: S3Allocator,
}

unsafe fn build_config(opts: &S3ClientOpts) -> Result<ClientConfig, S3Error> {
    let mut cfg = ClientConfig {
        endpoint: cstr_required(opts.endpoint, "endpoint")?,
        region: cstr_required(opts.region, "region")?,
        access_key_id: cstr_required(opts.access_key_id, "access_key_id")?,
        secret_access_key: cstr_required(opts.secret_access_key, "secret_access_key")?,
        session_token: cstr_to_string(opts.session_token),
        default_bucket: cstr_to_string(opts.default_bucket),
        require_sigv4: opts.require_sigv4,
        ca_file: cstr_to_string(opts.ca_file),
        ca_path: cstr_to_string(opts.ca_path),
        verify_peer: opts.verify_peer,
        verify_host: opts.verify_host,
        backend: if opts.use_multiplexed_backend {
            BackendKind::Multiplexed
        } else {
            BackendKind::Serial
        },
        ..ClientConfig::default()
    };

    if let Some(proxy) = opts.proxy.as_ref() {
        cfg.proxy = Some(ProxyOptions {
            host: cstr_required(proxy.host, "proxy.host")?,
            port: proxy.port,
            auth_type: if proxy.use_basic_auth {
                ProxyAuthType::Basic
            } else {
                ProxyAuthType::None
            },
            auth_username: cstr_to_string(proxy.auth_username),
            auth_password: cstr_to_string(proxy.auth_password),
        });
    }

    if opts.connect_timeout_ms != 0 {
        cfg.connect_timeout_ms = opts.connect_timeout_ms;
    }
    if opts.request_timeout_ms != 0 {
        cfg.request_timeout_ms = opts.request_timeout_ms;
    }
    if opts.max_total_connections != 0 {
        cfg.max_total_connections = opts.max_total_connections;
    }
    if opts.max_connections_per_host != 0 {
        cfg.max_connections_per_host = opts.max_connections_per_host;
    }
    if opts.multi_idle_timeout_ms != 0 {
        cfg.multi_idle_timeout_ms = opts.multi_idle_timeout_ms;
    }

    Ok(cfg)
}

/// Construct a client. Returns null on failure, with `err_out` (if
/// non-null) describing why. `opts` is read synchronously and not retained.
#[no_mangle]
pub unsafe extern "C" fn s3_client_new(
    opts: *const S3ClientOpts,
    err_out: *mut S3ErrorInfo,
) -> *mut ClientHandle {
    let opts = match opts.as_ref() {
        Some(o) => o,
        None => {
            report_err(err_out, &S3Error::invalid_arg("opts must not be null"));
            return ptr::null_mut();
        }
    };
    let config = match build_config(opts) {
        Ok(c) => c,
        Err(e) => {
            report_err(err_out, &e);
            return ptr::null_mut();
        }
    };
    let allocator = opts.allocator.as_ref().copied().unwrap_or_default();
    match Client::new(config) {
        Ok(client) => {
            report_ok(err_out);
            Box::into_raw(Box::new(ClientHandle { client, allocator }))
        }
        Err(e) => {
            report_err(err_out, &e);
            ptr::null_mut()
        }
    }
}

/// Tear down a client, joining the driver thread first if the multiplexed
/// backend was selected. `client` must have come from `s3_client_new` and
/// must not be used again afterward. A null `client` is a no-op.
#[no_mangle]
pub unsafe extern "C" fn s3_client_delete(client: *mut ClientHandle) {
    if !client.is_null() {
        drop(Box::from_raw(client));
    }
}

/// Copy the client's most recently observed error into `out`. A
/// single-threaded convenience — the return value of the call that
/// actually produced an error is always authoritative.
#[no_mangle]
pub unsafe extern "C" fn s3_client_last_error(client: *const ClientHandle, out: *mut S3ErrorInfo) {
    let client = match client.as_ref() {
        Some(c) => c,
        None => return,
    };
    match client.client.last_error() {
        Some(err) => report_err(out, &err),
        None => report_ok(out),
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[no_mangle]
pub unsafe extern "C" fn s3_put_fd(
    client: *const ClientHandle,
    bucket: *const c_char,
    key: *const c_char,
    fd: RawFd,
    base_offset: i64,
    size: u64,
    content_type: *const c_char,
    err_out: *mut S3ErrorInfo,
) -> bool {
    let client = match client.as_ref() {
        Some(c) => c,
        None => {
            report_err(err_out, &S3Error::invalid_arg("client must not be null"));
            return false;
        }
    };
    let bucket = match cstr_to_string(bucket) {
        Some(b) => b,
        None => {
            report_err(err_out, &S3Error::invalid_arg("bucket is required"));
            return false;
        }
    };
    let key = match cstr_to_string(key) {
        Some(k) => k,
        None => {
            report_err(err_out, &S3Error::invalid_arg("key is required"));
            return false;
        }
    };
    let content_type = cstr_to_string(content_type);
    let result = client.client.put_fd(&bucket, &key, fd, base_offset, size, content_type.as_deref());
    report(&result, err_out)
}

#[no_mangle]
pub unsafe extern "C" fn s3_get_fd(
    client: *const ClientHandle,
    bucket: *const c_char,
    key: *const c_char,
    fd: RawFd,
    base_offset: i64,
    max_size: u64,
    /// Null for no `Range` header.
    range: *const c_char,
    err_out: *mut S3ErrorInfo,
) -> bool {
    let client = match client.as_ref() {
        Some(c) => c,
        None => {
            report_err(err_out, &S3Error::invalid_arg("client must not be null"));
            return false;
        }
    };
    let bucket = match cstr_to_string(bucket) {
        Some(b) => b,
        None => {
            report_err(err_out, &S3Error::invalid_arg("bucket is required"));
            return false;
        }
    };
    let key = match cstr_to_string(key) {
        Some(k) => k,
        None => {
            report_err(err_out, &S3Error::invalid_arg("key is required"));
            return false;
        }
    };
    let range = cstr_to_string(range);
    let max_size = if max_size == 0 { None } else { Some(max_size) };
    let result = client.client.get_fd(&bucket, &key, fd, base_offset, max_size, range.as_deref());
    report(&result, err_out)
}

#[no_mangle]
pub unsafe extern "C" fn s3_create_bucket(
    client: *const ClientHandle,
    bucket: *const c_char,
    err_out: *mut S3ErrorInfo,
) -> bool {
    let client = match client.as_ref() {
        Some(c) => c,
        None => {
            report_err(err_out, &S3Error::invalid_arg("client must not be null"));
            return false;
        }
    };
    let bucket = match cstr_to_string(bucket) {
        Some(b) => b,
        None => {
            report_err(err_out, &S3Error::invalid_arg("bucket is required"));
            return false;
        }
    };
    let result = client.client.create_bucket(&bucket);
    report(&result, err_out)
}

#[repr(C)]
pub struct S3ObjectInfo {
    pub key: *mut c_char,
    pub size: u64,
    pub etag: *mut c_char,
    pub last_modified: *mut c_char,
    pub storage_class: *mut c_char,
}

#[repr(C)]
pub struct S3ListResult {
    pub objects: *mut S3ObjectInfo,
    pub count: usize,
    pub is_truncated: bool,
    /// Null if there is no next page.
    pub next_continuation_token: *mut c_char,
    /// The allocator `s3_list_objects` used to produce every string and
    /// the array above. Populated by `s3_list_objects`; `s3_list_result_free`
    /// reads it back so the same `alloc`/`free` pair is used on both ends,
    /// without the caller having to pass the client back in to free a result.
    allocator: S3Allocator,
}

unsafe fn free_str_fields(allocator: Option<&S3Allocator>, obj: &S3ObjectInfo) {
    free_cstr(allocator, obj.key);
    free_cstr(allocator, obj.etag);
    free_cstr(allocator, obj.last_modified);
    free_cstr(allocator, obj.storage_class);
}

/// Copy a `ListResult` across the boundary, duplicating every string
/// through `allocator` (or the global allocator if none is given). On an
/// allocation failure partway through, everything allocated so far for
/// this result is freed and `NoMem` is reported rather than handing back a
/// half-populated array.
unsafe fn export_list_result(
    result: ListResult,
    allocator: Option<&S3Allocator>,
) -> Result<S3ListResult, S3Error> {
    let mut exported: Vec<S3ObjectInfo> = Vec::with_capacity(result.objects.len());
    for obj in &result.objects {
        let key = dup_str(allocator, &obj.key);
        let etag = dup_str(allocator, &obj.etag);
        let last_modified = dup_str(allocator, &obj.last_modified);
        let storage_class = dup_str(allocator, &obj.storage_class);
        if key.is_null() || etag.is_null() || last_modified.is_null() || storage_class.is_null() {
            for done in &exported {
                free_str_fields(allocator, done);
            }
            return Err(S3Error::new(
                S3ErrorKind::NoMem,
                "failed to export ListObjectsV2 result",
            ));
        }
        exported.push(S3ObjectInfo {
            key,
            size: obj.size,
            etag,
            last_modified,
            storage_class,
        });
    }

    let next_token = match &result.next_continuation_token {
        Some(t) => {
            let p = dup_str(allocator, t);
            if p.is_null() {
                for done in &exported {
                    free_str_fields(allocator, done);
                }
                return Err(S3Error::new(
                    S3ErrorKind::NoMem,
                    "failed to export continuation token",
                ));
            }
            p
        }
        None => ptr::null_mut(),
    };

    let count = exported.len();
    let objects_ptr = if count == 0 {
        ptr::null_mut()
    } else {
        Box::into_raw(exported.into_boxed_slice()) as *mut S3ObjectInfo
    };

    Ok(S3ListResult {
        objects: objects_ptr,
        count,
        is_truncated: result.is_truncated,
        next_continuation_token: next_token,
        allocator: allocator.copied().unwrap_or_default(),
    })
}

#[no_mangle]
pub unsafe extern "C" fn s3_list_objects(
    client: *const ClientHandle,
    bucket: *const c_char,
    prefix: *const c_char,
    continuation_token: *const c_char,
    max_keys: u32,
    out: *mut S3ListResult,
    err_out: *mut S3ErrorInfo,
) -> bool {
    let client = match client.as_ref() {
        Some(c) => c,
        None => {
            report_err(err_out, &S3Error::invalid_arg("client must not be null"));
            return false;
        }
    };
    let bucket = match cstr_to_string(bucket) {
        Some(b) => b,
        None => {
            report_err(err_out, &S3Error::invalid_arg("bucket is required"));
            return false;
        }
    };
    let prefix = cstr_to_string(prefix);
    let continuation_token = cstr_to_string(continuation_token);
    let max_keys = if max_keys == 0 { None } else { Some(max_keys) };

    match client.client.list_objects(&bucket, prefix.as_deref(), continuation_token.as_deref(), max_keys) {
        Ok(list) => match export_list_result(list, Some(&client.allocator)) {
            Ok(exported) => {
                if let Some(out) = out.as_mut() {
                    *out = exported;
                }
                report_ok(err_out);
                true
            }
            Err(e) => {
                report_err(err_out, &e);
                false
            }
        },
        Err(e) => {
            report_err(err_out, &e);
            false
        }
    }
}

/// Free every string and the array allocated by `s3_list_objects`. Safe to
/// call on a zeroed `S3ListResult` (e.g. one never populated by a
/// successful call).
#[no_mangle]
pub unsafe extern "C" fn s3_list_result_free(result: *mut S3ListResult) {
    let result = match result.as_mut() {
        Some(r) => r,
        None => return,
    };
    let allocator = Some(&result.allocator);
    if !result.objects.is_null() && result.count > 0 {
        let slice = std::slice::from_raw_parts(result.objects, result.count);
        for obj in slice {
            free_str_fields(allocator, obj);
        }
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
            result.objects,
            result.count,
        )));
    }
    if !result.next_continuation_token.is_null() {
        free_cstr(allocator, result.next_continuation_token);
    }
    *result = S3ListResult {
        objects: ptr::null_mut(),
        count: 0,
        is_truncated: false,
        next_continuation_token: ptr::null_mut(),
        allocator: S3Allocator::none(),
    };
}

/// `keys` points at `count` NUL-terminated C strings. `quiet` selects the
/// Multi-Object Delete API's quiet mode (`<Quiet>true</Quiet>` in the
/// request body): suppress the success entries a verbose response would
/// otherwise list.
#[no_mangle]
pub unsafe extern "C" fn s3_delete_objects(
    client: *const ClientHandle,
    bucket: *const c_char,
    keys: *const *const c_char,
    count: usize,
    quiet: bool,
    err_out: *mut S3ErrorInfo,
) -> bool {
    let client = match client.as_ref() {
        Some(c) => c,
        None => {
            report_err(err_out, &S3Error::invalid_arg("client must not be null"));
            return false;
        }
    };
    let bucket = match cstr_to_string(bucket) {
        Some(b) => b,
        None => {
            report_err(err_out, &S3Error::invalid_arg("bucket is required"));
            return false;
        }
    };
    if keys.is_null() || count == 0 {
        report_err(
            err_out,
            &S3Error::invalid_arg("delete_objects requires at least one key"),
        );
        return false;
    }
    let slice = std::slice::from_raw_parts(keys, count);
    let mut owned_keys = Vec::with_capacity(count);
    for &k in slice {
        match cstr_to_string(k) {
            Some(s) => owned_keys.push(s),
            None => {
                report_err(err_out, &S3Error::invalid_arg("every key must be non-null"));
                return false;
            }
        }
    }

    let result = client.client.delete_objects(&bucket, &owned_keys, quiet);
    report(&result, err_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn opts(endpoint: &CString, region: &CString, key: &CString, secret: &CString) -> S3ClientOpts {
        S3ClientOpts {
            endpoint: endpoint.as_ptr(),
            region: region.as_ptr(),
            access_key_id: key.as_ptr(),
            secret_access_key: secret.as_ptr(),
            session_token: ptr::null(),
            default_bucket: ptr::null(),
            require_sigv4: false,
            ca_file: ptr::null(),
            ca_path: ptr::null(),
            verify_peer: true,
            verify_host: true,
            proxy: ptr::null(),
            connect_timeout_ms: 0,
            request_timeout_ms: 0,
            max_total_connections: 0,
            max_connections_per_host: 0,
            multi_idle_timeout_ms: 0,
            use_multiplexed_backend: false,
            allocator: ptr::null(),
        }
    }

    #[test]
    fn client_new_delete_round_trip() {
        let endpoint = CString::new("https://s3.example.com").unwrap();
        let region = CString::new("us-east-1").unwrap();
        let key = CString::new("AKIDEXAMPLE").unwrap();
        let secret = CString::new("secret").unwrap();
        let o = opts(&endpoint, &region, &key, &secret);
        let mut err = S3ErrorInfo::default();
        unsafe {
            let client = s3_client_new(&o, &mut err);
            assert!(!client.is_null());
            assert_eq!(err.code, S3ErrorCode::Ok);
            s3_client_delete(client);
        }
    }

    #[test]
    fn client_new_rejects_null_opts() {
        let mut err = S3ErrorInfo::default();
        unsafe {
            let client = s3_client_new(ptr::null(), &mut err);
            assert!(client.is_null());
            assert_eq!(err.code, S3ErrorCode::InvalidArg);
        }
    }

    #[test]
    fn put_fd_reports_invalid_arg_through_err_out() {
        let endpoint = CString::new("https://s3.example.com").unwrap();
        let region = CString::new("us-east-1").unwrap();
        let key = CString::new("AKIDEXAMPLE").unwrap();
        let secret = CString::new("secret").unwrap();
        let o = opts(&endpoint, &region, &key, &secret);
        let mut err = S3ErrorInfo::default();
        unsafe {
            let client = s3_client_new(&o, &mut err);
            assert!(!client.is_null());

            let bucket = CString::new("bucket").unwrap();
            let object_key = CString::new("key").unwrap();
            let mut put_err = S3ErrorInfo::default();
            let ok = s3_put_fd(
                client,
                bucket.as_ptr(),
                object_key.as_ptr(),
                -1,
                0,
                10,
                ptr::null(),
                &mut put_err,
            );
            assert!(!ok);
            assert_eq!(put_err.code, S3ErrorCode::InvalidArg);

            s3_client_delete(client);
        }
    }

    #[test]
    fn list_result_free_is_safe_on_zeroed_result() {
        let mut result = S3ListResult {
            objects: ptr::null_mut(),
            count: 0,
            is_truncated: false,
            next_continuation_token: ptr::null_mut(),
            allocator: S3Allocator::none(),
        };
        unsafe {
            s3_list_result_free(&mut result);
        }
        assert!(result.objects.is_null());
    }

    #[test]
    fn list_objects_round_trips_strings_through_a_custom_allocator() {
        use std::alloc::{alloc as sys_alloc, dealloc as sys_dealloc, Layout};
        use std::collections::HashMap;
        use std::sync::Mutex;

        static LIVE: Mutex<Option<HashMap<usize, usize>>> = Mutex::new(None);

        unsafe extern "C" fn test_alloc(_ctx: *mut c_void, size: usize) -> *mut c_void {
            let layout = Layout::from_size_align(size, 1).unwrap();
            let p = sys_alloc(layout);
            LIVE.lock()
                .unwrap()
                .get_or_insert_with(HashMap::new)
                .insert(p as usize, size);
            p as *mut c_void
        }

        unsafe extern "C" fn test_free(_ctx: *mut c_void, ptr: *mut c_void) {
            let size = LIVE
                .lock()
                .unwrap()
                .as_mut()
                .unwrap()
                .remove(&(ptr as usize))
                .expect("freed a pointer this allocator never allocated");
            let layout = Layout::from_size_align(size, 1).unwrap();
            sys_dealloc(ptr as *mut u8, layout);
        }

        let allocator = S3Allocator {
            alloc: Some(test_alloc),
            realloc: None,
            free: Some(test_free),
            ctx: ptr::null_mut(),
        };

        let result = xml::ListResult {
            objects: vec![xml::ObjectInfo {
                key: "a".to_string(),
                size: 1,
                etag: "etag".to_string(),
                last_modified: "2020-01-01T00:00:00Z".to_string(),
                storage_class: "STANDARD".to_string(),
            }],
            is_truncated: false,
            next_continuation_token: Some("tok".to_string()),
        };

        unsafe {
            let mut exported = export_list_result(result, Some(&allocator)).unwrap();
            assert!(LIVE.lock().unwrap().as_ref().unwrap().len() > 0);
            s3_list_result_free(&mut exported);
            assert_eq!(LIVE.lock().unwrap().as_ref().unwrap().len(), 0);
        }
    }
}
