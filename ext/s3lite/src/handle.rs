//! Easy-handle factory and streaming I/O callbacks.
//!
//! One `build_*` constructor per operation (PutObject, GetObject,
//! CreateBucket, ListObjectsV2, DeleteObjects), sharing a common pipeline:
//! allocate a `curl_easy` handle, wire up `read_io`/`write_io`, build the
//! URL, apply the timeouts/TLS/proxy options every request needs, apply
//! per-method options, apply authentication, attach headers. Any builder
//! failure drops the partially-built `EasyHandle` before returning — `Drop`
//! releases the curl handle and header list automatically rather than
//! needing a manual `goto fail`-style release chain.

use std::ffi::{c_char, c_void, CString};
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::sys::uio::{pread, pwrite};
use nix::unistd::dup;

use crate::auth::{self, AuthPlan};
use crate::config::ClientConfig;
use crate::curl_sys::{self, Curl, CurlSlist};
use crate::error::{S3Error, S3ErrorKind};
use crate::membuf::MemBuf;
use crate::proxy::ProxyAuthType;
use crate::url;

/// `CURL_READFUNC_ABORT`: returned by a read callback to abort the transfer.
const CURL_READFUNC_ABORT: usize = 0x1000_0000;

#[derive(Debug)]
pub enum ReadSource {
    None,
    Fd {
        // Owns the `dup`'d descriptor so the handle's own fd outlives (and
        // never aliases the lifetime of) whatever fd the caller passed in.
        fd: OwnedFd,
        base_offset: i64,
        size_limit: Option<u64>,
    },
    Mem(Vec<u8>),
}

#[derive(Debug)]
pub enum WriteDest {
    None,
    Fd {
        fd: OwnedFd,
        base_offset: i64,
        size_limit: Option<u64>,
    },
    Mem(MemBuf),
}

struct ReadCtx {
    source: ReadSource,
    position: u64,
}

struct WriteCtx {
    dest: WriteDest,
    position: u64,
}

/// Read up to `buf.len()` bytes at `offset`, retrying on `EINTR`.
fn pread_retrying(fd: &OwnedFd, buf: &mut [u8], offset: i64) -> nix::Result<usize> {
    loop {
        match pread(fd.as_fd(), buf, offset) {
            Err(Errno::EINTR) => continue,
            other => return other,
        }
    }
}

fn pwrite_retrying(fd: &OwnedFd, buf: &[u8], offset: i64) -> nix::Result<usize> {
    loop {
        match pwrite(fd.as_fd(), buf, offset) {
            Err(Errno::EINTR) => continue,
            other => return other,
        }
    }
}

unsafe extern "C" fn read_trampoline(
    ptr: *mut c_char,
    size: usize,
    nmemb: usize,
    userdata: *mut c_void,
) -> usize {
    let ctx = &mut *(userdata as *mut ReadCtx);
    let want = size.saturating_mul(nmemb);
    let out = std::slice::from_raw_parts_mut(ptr as *mut u8, want);

    match &mut ctx.source {
        ReadSource::None => 0,
        ReadSource::Fd {
            fd,
            base_offset,
            size_limit,
        } => {
            let clamped = match size_limit {
                Some(limit) if ctx.position >= *limit => return 0,
                Some(limit) => want.min((*limit - ctx.position) as usize),
                None => want,
            };
            if clamped == 0 {
                return 0;
            }
            match pread_retrying(fd, &mut out[..clamped], *base_offset + ctx.position as i64) {
                Ok(n) => {
                    ctx.position += n as u64;
                    n
                }
                Err(_) => CURL_READFUNC_ABORT,
            }
        }
        ReadSource::Mem(data) => {
            let remaining = data.len().saturating_sub(ctx.position as usize);
            let n = remaining.min(want);
            if n == 0 {
                return 0;
            }
            out[..n].copy_from_slice(&data[ctx.position as usize..ctx.position as usize + n]);
            ctx.position += n as u64;
            n
        }
    }
}

unsafe extern "C" fn write_trampoline(
    ptr: *mut c_char,
    size: usize,
    nmemb: usize,
    userdata: *mut c_void,
) -> usize {
    let ctx = &mut *(userdata as *mut WriteCtx);
    let len = size.saturating_mul(nmemb);
    let data = std::slice::from_raw_parts(ptr as *const u8, len);

    match &mut ctx.dest {
        WriteDest::None => len,
        WriteDest::Fd {
            fd,
            base_offset,
            size_limit,
        } => {
            let clamped = match size_limit {
                Some(limit) if ctx.position >= *limit => return 0,
                Some(limit) => len.min((*limit - ctx.position) as usize),
                None => len,
            };
            if clamped == 0 {
                return 0;
            }
            match pwrite_retrying(fd, &data[..clamped], *base_offset + ctx.position as i64) {
                Ok(n) => {
                    ctx.position += n as u64;
                    n
                }
                Err(_) => 0,
            }
        }
        WriteDest::Mem(buf) => {
            buf.append(data);
            ctx.position += len as u64;
            len
        }
    }
}

/// One HTTP transaction: URL, header list, read/write IO, and the curl
/// options needed to execute and map its result. Owns every heap allocation
/// a backend needs to keep alive until the transfer completes; `Drop`
/// releases all of it, including the curl handle itself.
pub struct EasyHandle {
    pub(crate) curl: *mut Curl,
    headers: *mut CurlSlist,
    _url: CString,
    read_ctx: Option<Box<ReadCtx>>,
    write_ctx: Option<Box<WriteCtx>>,
    _auth: Option<AuthPlan>,
    error_buf: Box<[u8; 256]>,
    pub response_body: Option<MemBuf>,
    // CStrings backing CURLOPT_CAINFO/CAPATH/PROXY/CUSTOMREQUEST, kept
    // alive for the handle's lifetime since libcurl only stores the
    // pointer, not a copy.
    _opt_strings: Vec<CString>,
}

// An `EasyHandle` is only ever touched by the thread that currently owns
// it (the calling thread for the serial backend, the driver thread once
// submitted to the multiplexed backend) — never concurrently.
unsafe impl Send for EasyHandle {}

impl EasyHandle {
    fn new(url_str: &str) -> Result<Self, S3Error> {
        let curl = unsafe { curl_sys::curl_easy_init() };
        if curl.is_null() {
            return Err(S3Error::init("curl_easy_init returned NULL"));
        }
        let url = CString::new(url_str)
            .map_err(|_| S3Error::invalid_arg("url must not contain NUL bytes"))?;
        let mut error_buf = Box::new([0u8; 256]);
        unsafe {
            curl_sys::curl_easy_setopt(curl, curl_sys::CURLOPT_URL, url.as_ptr());
            curl_sys::curl_easy_setopt(
                curl,
                curl_sys::CURLOPT_ERRORBUFFER,
                error_buf.as_mut_ptr(),
            );
        }
        Ok(Self {
            curl,
            headers: std::ptr::null_mut(),
            _url: url,
            read_ctx: None,
            write_ctx: None,
            _auth: None,
            error_buf,
            response_body: None,
            _opt_strings: Vec::new(),
        })
    }

    fn apply_common_options(&mut self, cfg: &ClientConfig) {
        unsafe {
            curl_sys::curl_easy_setopt(
                self.curl,
                curl_sys::CURLOPT_CONNECTTIMEOUT_MS,
                cfg.connect_timeout_ms as std::ffi::c_long,
            );
            curl_sys::curl_easy_setopt(
                self.curl,
                curl_sys::CURLOPT_TIMEOUT_MS,
                cfg.request_timeout_ms as std::ffi::c_long,
            );
            curl_sys::curl_easy_setopt(
                self.curl,
                curl_sys::CURLOPT_SSL_VERIFYPEER,
                cfg.verify_peer as std::ffi::c_long,
            );
            curl_sys::curl_easy_setopt(
                self.curl,
                curl_sys::CURLOPT_SSL_VERIFYHOST,
                if cfg.verify_host { 2 } else { 0 } as std::ffi::c_long,
            );
            curl_sys::curl_easy_setopt(self.curl, curl_sys::CURLOPT_NOSIGNAL, 1 as std::ffi::c_long);
        }
        if let Some(ca_file) = &cfg.ca_file {
            if let Ok(c) = CString::new(ca_file.as_str()) {
                unsafe {
                    curl_sys::curl_easy_setopt(self.curl, curl_sys::CURLOPT_CAINFO, c.as_ptr());
                }
                self._opt_strings.push(c);
            }
        }
        if let Some(ca_path) = &cfg.ca_path {
            if let Ok(c) = CString::new(ca_path.as_str()) {
                unsafe {
                    curl_sys::curl_easy_setopt(self.curl, curl_sys::CURLOPT_CAPATH, c.as_ptr());
                }
                self._opt_strings.push(c);
            }
        }
        if let Some(proxy) = &cfg.proxy {
            if let Ok(c) = CString::new(proxy.url()) {
                unsafe {
                    curl_sys::curl_easy_setopt(self.curl, curl_sys::CURLOPT_PROXY, c.as_ptr());
                }
                self._opt_strings.push(c);
            }
            if proxy.auth_type == ProxyAuthType::Basic {
                if let (Some(user), Some(pass)) = (&proxy.auth_username, &proxy.auth_password) {
                    if let Ok(c) = CString::new(format!("{user}:{pass}")) {
                        unsafe {
                            curl_sys::curl_easy_setopt(
                                self.curl,
                                curl_sys::CURLOPT_PROXYUSERPWD,
                                c.as_ptr(),
                            );
                        }
                        self._opt_strings.push(c);
                    }
                }
            }
        }
    }

    fn apply_auth(&mut self, cfg: &ClientConfig) -> Result<(), S3Error> {
        let credentials = cfg.credentials();
        let plan = auth::plan(&cfg.region, &credentials, cfg.require_sigv4)?;
        unsafe {
            auth::apply(self.curl, &plan);
        }
        if let Some(header) = plan.security_token_header.clone() {
            self.add_header(&header)?;
        }
        self._auth = Some(plan);
        Ok(())
    }

    fn add_header(&mut self, header: &str) -> Result<(), S3Error> {
        let c = CString::new(header)
            .map_err(|_| S3Error::invalid_arg("header must not contain NUL bytes"))?;
        let list = unsafe { curl_sys::curl_slist_append(self.headers, c.as_ptr()) };
        if list.is_null() {
            return Err(S3Error::init("curl_slist_append failed"));
        }
        self.headers = list;
        Ok(())
    }

    fn attach_headers(&mut self) {
        if !self.headers.is_null() {
            unsafe {
                curl_sys::curl_easy_setopt(
                    self.curl,
                    curl_sys::CURLOPT_HTTPHEADER,
                    self.headers,
                );
            }
        }
    }

    fn set_read_io(&mut self, source: ReadSource, content_length: Option<u64>) {
        let ctx = Box::new(ReadCtx { source, position: 0 });
        let ptr = Box::into_raw(ctx);
        unsafe {
            curl_sys::curl_easy_setopt(self.curl, curl_sys::CURLOPT_UPLOAD, 1 as std::ffi::c_long);
            curl_sys::curl_easy_setopt(
                self.curl,
                curl_sys::CURLOPT_READFUNCTION,
                read_trampoline as curl_sys::CurlIoCallback,
            );
            curl_sys::curl_easy_setopt(self.curl, curl_sys::CURLOPT_READDATA, ptr);
            if let Some(len) = content_length {
                curl_sys::curl_easy_setopt(
                    self.curl,
                    curl_sys::CURLOPT_INFILESIZE_LARGE,
                    len as i64,
                );
            }
        }
        self.read_ctx = Some(unsafe { Box::from_raw(ptr) });
    }

    fn set_write_io(&mut self, dest: WriteDest) {
        let ctx = Box::new(WriteCtx { dest, position: 0 });
        let ptr = Box::into_raw(ctx);
        unsafe {
            curl_sys::curl_easy_setopt(
                self.curl,
                curl_sys::CURLOPT_WRITEFUNCTION,
                write_trampoline as curl_sys::CurlIoCallback,
            );
            curl_sys::curl_easy_setopt(self.curl, curl_sys::CURLOPT_WRITEDATA, ptr);
        }
        self.write_ctx = Some(unsafe { Box::from_raw(ptr) });
    }

    /// Take the collected in-memory response, if `write_io` was a `Mem`
    /// destination. Leaves `None` in its place.
    pub fn take_response_mem(&mut self) -> Option<MemBuf> {
        match self.write_ctx.as_mut().map(|c| &mut c.dest) {
            Some(WriteDest::Mem(buf)) => Some(std::mem::replace(buf, MemBuf::new())),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        let end = self.error_buf.iter().position(|&b| b == 0).unwrap_or(0);
        if end == 0 {
            None
        } else {
            Some(String::from_utf8_lossy(&self.error_buf[..end]).into_owned())
        }
    }

    pub fn response_status(&self) -> u32 {
        let mut code: std::ffi::c_long = 0;
        unsafe {
            curl_sys::curl_easy_getinfo(
                self.curl,
                curl_sys::CURLINFO_RESPONSE_CODE,
                &mut code as *mut std::ffi::c_long,
            );
        }
        code as u32
    }
}

impl Drop for EasyHandle {
    fn drop(&mut self) {
        unsafe {
            curl_sys::curl_easy_cleanup(self.curl);
            if !self.headers.is_null() {
                curl_sys::curl_slist_free_all(self.headers);
            }
        }
    }
}

pub fn build_put_fd(
    cfg: &ClientConfig,
    bucket: &str,
    key: &str,
    fd: RawFd,
    base_offset: i64,
    size: u64,
    content_type: Option<&str>,
) -> Result<EasyHandle, S3Error> {
    if bucket.is_empty() || key.is_empty() {
        return Err(S3Error::invalid_arg("bucket and key are required"));
    }
    if size == 0 {
        return Err(S3Error::invalid_arg("size must be > 0"));
    }
    let fd = dup(fd).map_err(|e| S3Error::from_errno(e as i32, "failed to dup fd"))?;
    let url = url::build_object_url(&cfg.endpoint, bucket, key);
    let mut handle = EasyHandle::new(&url)?;
    handle.apply_common_options(cfg);
    handle.set_read_io(
        ReadSource::Fd {
            fd,
            base_offset,
            size_limit: Some(size),
        },
        Some(size),
    );
    if let Some(content_type) = content_type {
        handle.add_header(&format!("Content-Type: {content_type}"))?;
    }
    handle.apply_auth(cfg)?;
    handle.attach_headers();
    Ok(handle)
}

pub fn build_get_fd(
    cfg: &ClientConfig,
    bucket: &str,
    key: &str,
    fd: RawFd,
    base_offset: i64,
    max_size: Option<u64>,
    range: Option<&str>,
) -> Result<EasyHandle, S3Error> {
    if bucket.is_empty() || key.is_empty() {
        return Err(S3Error::invalid_arg("bucket and key are required"));
    }
    let fd = dup(fd).map_err(|e| S3Error::from_errno(e as i32, "failed to dup fd"))?;
    let url = url::build_object_url(&cfg.endpoint, bucket, key);
    let mut handle = EasyHandle::new(&url)?;
    handle.apply_common_options(cfg);
    unsafe {
        curl_sys::curl_easy_setopt(handle.curl, curl_sys::CURLOPT_HTTPGET, 1 as std::ffi::c_long);
    }
    // A 0 max_size means "no cap": size_limit of None (not Some(0)) disables
    // clamping entirely.
    let size_limit = max_size.filter(|&n| n > 0);
    handle.set_write_io(WriteDest::Fd {
        fd,
        base_offset,
        size_limit,
    });
    if let Some(range) = range {
        if let Ok(c) = CString::new(range) {
            unsafe {
                curl_sys::curl_easy_setopt(handle.curl, curl_sys::CURLOPT_RANGE, c.as_ptr());
            }
            handle._opt_strings.push(c);
        }
    }
    handle.apply_auth(cfg)?;
    handle.attach_headers();
    Ok(handle)
}

pub fn build_create_bucket(cfg: &ClientConfig, bucket: &str) -> Result<EasyHandle, S3Error> {
    if bucket.is_empty() {
        return Err(S3Error::invalid_arg("bucket is required"));
    }
    let url = url::build_bucket_url(&cfg.endpoint, bucket);
    let mut handle = EasyHandle::new(&url)?;
    handle.apply_common_options(cfg);
    let put = CString::new("PUT").unwrap();
    unsafe {
        curl_sys::curl_easy_setopt(handle.curl, curl_sys::CURLOPT_CUSTOMREQUEST, put.as_ptr());
    }
    handle._opt_strings.push(put);
    handle.set_write_io(WriteDest::Mem(MemBuf::new()));
    handle.apply_auth(cfg)?;
    handle.attach_headers();
    Ok(handle)
}

pub fn build_list_objects(
    cfg: &ClientConfig,
    bucket: &str,
    prefix: Option<&str>,
    continuation_token: Option<&str>,
    max_keys: Option<u32>,
) -> Result<EasyHandle, S3Error> {
    if bucket.is_empty() {
        return Err(S3Error::invalid_arg("bucket is required"));
    }
    let url = url::build_list_url(&cfg.endpoint, bucket, prefix, continuation_token, max_keys);
    let mut handle = EasyHandle::new(&url)?;
    handle.apply_common_options(cfg);
    unsafe {
        curl_sys::curl_easy_setopt(handle.curl, curl_sys::CURLOPT_HTTPGET, 1 as std::ffi::c_long);
    }
    handle.set_write_io(WriteDest::Mem(MemBuf::new()));
    handle.apply_auth(cfg)?;
    handle.attach_headers();
    Ok(handle)
}

pub fn build_delete_objects(
    cfg: &ClientConfig,
    bucket: &str,
    keys: &[String],
    quiet: bool,
) -> Result<EasyHandle, S3Error> {
    if bucket.is_empty() {
        return Err(S3Error::invalid_arg("bucket is required"));
    }
    let body = url::build_delete_body(keys, quiet)?;
    let content_md5 = url::content_md5(body.as_bytes());
    let url = url::build_delete_url(&cfg.endpoint, bucket);
    let mut handle = EasyHandle::new(&url)?;
    handle.apply_common_options(cfg);
    let post = CString::new("POST").unwrap();
    unsafe {
        curl_sys::curl_easy_setopt(handle.curl, curl_sys::CURLOPT_CUSTOMREQUEST, post.as_ptr());
        curl_sys::curl_easy_setopt(
            handle.curl,
            curl_sys::CURLOPT_POSTFIELDSIZE_LARGE,
            body.len() as i64,
        );
    }
    handle._opt_strings.push(post);
    handle.set_read_io(ReadSource::Mem(body.clone().into_bytes()), Some(body.len() as u64));
    handle.set_write_io(WriteDest::Mem(MemBuf::new()));
    handle.apply_auth(cfg)?;
    handle.add_header(&format!("Content-MD5: {content_md5}"))?;
    handle.add_header("Content-Type: application/xml")?;
    handle.attach_headers();
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom, Write};
    use std::os::fd::AsRawFd;

    fn ctx_from_file(file: &std::fs::File, offset: i64, limit: Option<u64>) -> ReadCtx {
        ReadCtx {
            source: ReadSource::Fd {
                fd: file.try_clone().unwrap().into(),
                base_offset: offset,
                size_limit: limit,
            },
            position: 0,
        }
    }

    #[test]
    fn read_trampoline_reads_fd_contents() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"hello world").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let mut ctx = ctx_from_file(&file, 0, Some(11));
        let mut out = [0u8; 5];
        let n = unsafe {
            read_trampoline(
                out.as_mut_ptr() as *mut c_char,
                1,
                out.len(),
                &mut ctx as *mut ReadCtx as *mut c_void,
            )
        };
        assert_eq!(n, 5);
        assert_eq!(&out, b"hello");
        assert_eq!(ctx.position, 5);
    }

    #[test]
    fn read_trampoline_respects_size_limit() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"0123456789").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let mut ctx = ctx_from_file(&file, 0, Some(4));
        let mut out = [0u8; 10];
        let n = unsafe {
            read_trampoline(
                out.as_mut_ptr() as *mut c_char,
                1,
                out.len(),
                &mut ctx as *mut ReadCtx as *mut c_void,
            )
        };
        assert_eq!(n, 4);
        let n2 = unsafe {
            read_trampoline(
                out.as_mut_ptr() as *mut c_char,
                1,
                out.len(),
                &mut ctx as *mut ReadCtx as *mut c_void,
            )
        };
        assert_eq!(n2, 0);
    }

    #[test]
    fn read_trampoline_reads_from_mem_source() {
        let mut ctx = ReadCtx {
            source: ReadSource::Mem(b"abcdef".to_vec()),
            position: 0,
        };
        let mut out = [0u8; 3];
        let n = unsafe {
            read_trampoline(
                out.as_mut_ptr() as *mut c_char,
                1,
                out.len(),
                &mut ctx as *mut ReadCtx as *mut c_void,
            )
        };
        assert_eq!(n, 3);
        assert_eq!(&out, b"abc");
    }

    #[test]
    fn write_trampoline_writes_fd_contents() {
        let file = tempfile::tempfile().unwrap();
        let mut ctx = WriteCtx {
            dest: WriteDest::Fd {
                fd: file.try_clone().unwrap().into(),
                base_offset: 0,
                size_limit: None,
            },
            position: 0,
        };
        let data = b"streamed";
        let n = unsafe {
            write_trampoline(
                data.as_ptr() as *mut c_char,
                1,
                data.len(),
                &mut ctx as *mut WriteCtx as *mut c_void,
            )
        };
        assert_eq!(n, data.len());

        let mut contents = Vec::new();
        let mut f2 = file;
        f2.seek(SeekFrom::Start(0)).unwrap();
        f2.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, data);
    }

    #[test]
    fn write_trampoline_appends_to_mem_dest() {
        let mut ctx = WriteCtx {
            dest: WriteDest::Mem(MemBuf::new()),
            position: 0,
        };
        let data = b"chunk-one";
        unsafe {
            write_trampoline(
                data.as_ptr() as *mut c_char,
                1,
                data.len(),
                &mut ctx as *mut WriteCtx as *mut c_void,
            );
        }
        match &ctx.dest {
            WriteDest::Mem(buf) => assert_eq!(buf.as_slice(), data),
            _ => panic!("expected mem dest"),
        }
    }

    fn base_config() -> ClientConfig {
        ClientConfig {
            endpoint: "https://s3.example.com".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: "ak".to_string(),
            secret_access_key: "sk".to_string(),
            require_sigv4: true,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn build_put_fd_rejects_zero_size() {
        let file = tempfile::tempfile().unwrap();
        let err = build_put_fd(&base_config(), "bucket", "key", file.as_raw_fd(), 0, 0, None)
            .unwrap_err();
        assert_eq!(err.kind, S3ErrorKind::InvalidArg);
    }

    #[test]
    fn build_put_fd_sets_content_type_header() {
        let file = tempfile::tempfile().unwrap();
        let handle = build_put_fd(
            &base_config(),
            "bucket",
            "key",
            file.as_raw_fd(),
            0,
            4,
            Some("application/json"),
        )
        .unwrap();
        assert!(!handle.headers.is_null());
    }

    #[test]
    fn build_get_fd_zero_max_size_means_uncapped() {
        let file = tempfile::tempfile().unwrap();
        let handle = build_get_fd(&base_config(), "bucket", "key", file.as_raw_fd(), 0, Some(0), None)
            .unwrap();
        match handle.write_ctx.as_ref().map(|c| &c.dest) {
            Some(WriteDest::Fd { size_limit, .. }) => assert_eq!(*size_limit, None),
            other => panic!("expected Fd write dest, got {other:?}"),
        }
    }

    #[test]
    fn build_get_fd_nonzero_max_size_caps_write() {
        let file = tempfile::tempfile().unwrap();
        let handle = build_get_fd(
            &base_config(),
            "bucket",
            "key",
            file.as_raw_fd(),
            0,
            Some(1024),
            None,
        )
        .unwrap();
        match handle.write_ctx.as_ref().map(|c| &c.dest) {
            Some(WriteDest::Fd { size_limit, .. }) => assert_eq!(*size_limit, Some(1024)),
            other => panic!("expected Fd write dest, got {other:?}"),
        }
    }

    #[test]
    fn build_get_fd_with_range_does_not_error() {
        let file = tempfile::tempfile().unwrap();
        let handle = build_get_fd(
            &base_config(),
            "bucket",
            "key",
            file.as_raw_fd(),
            0,
            None,
            Some("bytes=0-99"),
        )
        .unwrap();
        assert!(!handle._opt_strings.is_empty());
    }

    #[test]
    fn build_delete_objects_rejects_empty_bucket() {
        let cfg = ClientConfig {
            endpoint: "https://s3.example.com".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: "ak".to_string(),
            secret_access_key: "sk".to_string(),
            require_sigv4: true,
            ..ClientConfig::default()
        };
        let err = build_delete_objects(&cfg, "", &["a".to_string()], false).unwrap_err();
        assert_eq!(err.kind, S3ErrorKind::InvalidArg);
    }
}
