//! Hand-rolled FFI bindings to libcurl's easy and multi interfaces.
//!
//! libcurl does not ship machine-readable headers we can bind with a build
//! script the way `bindgen` would against a vendored C header, so the
//! option/info enums below are transcribed by hand, field-for-field, from
//! `curl/curl.h` and `curl/multi.h`. Only the options this crate actually
//! sets are listed; the full `CURLoption` enum has a great many more.

use std::ffi::{c_char, c_int, c_long, c_void};

pub type CURLcode = c_int;
pub type CURLMcode = c_int;
pub type CURLoption = c_int;
pub type CURLINFO = c_int;
pub type CURLMoption = c_int;

pub const CURLE_OK: CURLcode = 0;
pub const CURLE_COULDNT_RESOLVE_PROXY: CURLcode = 5;
pub const CURLE_COULDNT_RESOLVE_HOST: CURLcode = 6;
pub const CURLE_COULDNT_CONNECT: CURLcode = 7;
pub const CURLE_OPERATION_TIMEDOUT: CURLcode = 28;
pub const CURLE_SEND_ERROR: CURLcode = 55;
pub const CURLE_RECV_ERROR: CURLcode = 56;

// CURLoption values. libcurl encodes the expected argument type into the
// numeric value: +0 long, +10000 pointer/string, +20000 function pointer,
// +30000 off_t.
pub const CURLOPT_WRITEDATA: CURLoption = 10001;
pub const CURLOPT_URL: CURLoption = 10002;
pub const CURLOPT_PROXY: CURLoption = 10004;
pub const CURLOPT_USERPWD: CURLoption = 10005;
pub const CURLOPT_PROXYUSERPWD: CURLoption = 10006;
pub const CURLOPT_RANGE: CURLoption = 10007;
pub const CURLOPT_ERRORBUFFER: CURLoption = 10010;
pub const CURLOPT_READDATA: CURLoption = 10009;
pub const CURLOPT_POSTFIELDS: CURLoption = 10015;
pub const CURLOPT_HTTPHEADER: CURLoption = 10023;
pub const CURLOPT_CUSTOMREQUEST: CURLoption = 10036;
pub const CURLOPT_CAINFO: CURLoption = 10065;
pub const CURLOPT_CAPATH: CURLoption = 10097;
pub const CURLOPT_PRIVATE: CURLoption = 10103;
pub const CURLOPT_AWS_SIGV4: CURLoption = 10305;

pub const CURLOPT_WRITEFUNCTION: CURLoption = 20011;
pub const CURLOPT_READFUNCTION: CURLoption = 20012;

pub const CURLOPT_TIMEOUT: CURLoption = 13;
pub const CURLOPT_INFILESIZE: CURLoption = 14;
pub const CURLOPT_SSL_VERIFYPEER: CURLoption = 64;
pub const CURLOPT_MAXCONNECTS: CURLoption = 71;
pub const CURLOPT_HTTPGET: CURLoption = 80;
pub const CURLOPT_SSL_VERIFYHOST: CURLoption = 81;
pub const CURLOPT_NOSIGNAL: CURLoption = 99;
pub const CURLOPT_HTTPAUTH: CURLoption = 107;
pub const CURLOPT_FOLLOWLOCATION: CURLoption = 52;
pub const CURLOPT_POST: CURLoption = 47;
pub const CURLOPT_UPLOAD: CURLoption = 46;
pub const CURLOPT_CONNECTTIMEOUT_MS: CURLoption = 156;
pub const CURLOPT_TIMEOUT_MS: CURLoption = 155;

pub const CURLOPT_POSTFIELDSIZE_LARGE: CURLoption = 30120;
pub const CURLOPT_INFILESIZE_LARGE: CURLoption = 30115;

pub const CURLAUTH_BASIC: c_long = 1 << 0;

/// `CURLINFO_LONG` values are the base (0x200000) plus a small index;
/// `CURLINFO_STRING` (really "pointer-sized", despite the name) values are
/// 0x100000 plus a small index. `CURLINFO_PRIVATE` reads back whatever
/// pointer `CURLOPT_PRIVATE` most recently stored, untouched by libcurl.
const CURLINFO_LONG: CURLINFO = 0x20_0000;
const CURLINFO_STRING: CURLINFO = 0x10_0000;
pub const CURLINFO_RESPONSE_CODE: CURLINFO = CURLINFO_LONG | 2;
pub const CURLINFO_PRIVATE: CURLINFO = CURLINFO_STRING | 21;

pub const CURLMOPT_MAX_HOST_CONNECTIONS: CURLMoption = 7;
pub const CURLMOPT_MAXCONNECTS: CURLMoption = 6;
pub const CURLMOPT_MAX_TOTAL_CONNECTIONS: CURLMoption = 13;

pub const CURLMSG_DONE: c_int = 1;

/// Returned by `curl_multi_perform`/`curl_multi_socket*` on libcurl versions
/// old enough to need a second immediate call; modern libcurl never returns
/// it, but looping on it is harmless and keeps this code correct against
/// older linked versions too.
pub const CURLM_CALL_MULTI_PERFORM: CURLMcode = -1;

pub const CURL_GLOBAL_DEFAULT: c_long = 3;

#[repr(C)]
pub struct Curl {
    _opaque: [u8; 0],
}

#[repr(C)]
pub struct CurlM {
    _opaque: [u8; 0],
}

#[repr(C)]
pub struct CurlSlist {
    _opaque: [u8; 0],
}

/// Signature libcurl expects for `CURLOPT_READFUNCTION`/`CURLOPT_WRITEFUNCTION`.
pub type CurlIoCallback =
    unsafe extern "C" fn(*mut c_char, usize, usize, *mut c_void) -> usize;

/// Mirrors `struct CURLMsg` from curl/multi.h. `data` is a union; we only
/// ever read the `result` (`CURLcode`) arm after checking `msg == CURLMSG_DONE`.
#[repr(C)]
pub struct CurlMsg {
    pub msg: c_int,
    pub easy_handle: *mut Curl,
    pub data_result: CURLcode,
}

extern "C" {
    pub fn curl_global_init(flags: c_long) -> CURLcode;
    pub fn curl_global_cleanup();

    pub fn curl_easy_init() -> *mut Curl;
    pub fn curl_easy_cleanup(handle: *mut Curl);
    pub fn curl_easy_perform(handle: *mut Curl) -> CURLcode;
    pub fn curl_easy_strerror(code: CURLcode) -> *const c_char;
    pub fn curl_easy_reset(handle: *mut Curl);

    // CURLOPT_* takes a long, a pointer, or a function pointer depending on
    // the option; declaring three thin variadic-free wrappers via distinct
    // symbol names is not possible in Rust's FFI, so every call site casts
    // its argument to the type the specific option expects and we declare
    // curl_easy_setopt/getinfo as C-variadic, matching libcurl's own
    // variadic prototype.
    pub fn curl_easy_setopt(handle: *mut Curl, option: CURLoption, ...) -> CURLcode;
    pub fn curl_easy_getinfo(handle: *mut Curl, info: CURLINFO, ...) -> CURLcode;

    pub fn curl_slist_append(list: *mut CurlSlist, value: *const c_char) -> *mut CurlSlist;
    pub fn curl_slist_free_all(list: *mut CurlSlist);

    pub fn curl_multi_init() -> *mut CurlM;
    pub fn curl_multi_cleanup(multi: *mut CurlM) -> CURLMcode;
    pub fn curl_multi_add_handle(multi: *mut CurlM, easy: *mut Curl) -> CURLMcode;
    pub fn curl_multi_remove_handle(multi: *mut CurlM, easy: *mut Curl) -> CURLMcode;
    pub fn curl_multi_perform(multi: *mut CurlM, running_handles: *mut c_int) -> CURLMcode;
    pub fn curl_multi_info_read(multi: *mut CurlM, msgs_in_queue: *mut c_int) -> *mut CurlMsg;
    pub fn curl_multi_poll(
        multi: *mut CurlM,
        extra_fds: *mut c_void,
        extra_nfds: c_int,
        timeout_ms: c_int,
        numfds: *mut c_int,
    ) -> CURLMcode;
    pub fn curl_multi_setopt(multi: *mut CurlM, option: CURLMoption, ...) -> CURLMcode;
    pub fn curl_multi_strerror(code: CURLMcode) -> *const c_char;
}

/// Read a libcurl `CURLcode`/`CURLMcode` human-readable string.
pub fn strerror(code: CURLcode) -> std::ffi::CString {
    unsafe {
        let ptr = curl_easy_strerror(code);
        if ptr.is_null() {
            std::ffi::CString::new("unknown curl error").unwrap()
        } else {
            std::ffi::CStr::from_ptr(ptr).to_owned()
        }
    }
}
