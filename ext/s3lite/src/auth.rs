//! Authentication: selects Basic auth or libcurl's native SigV4 support and
//! applies it to an already-built easy handle.
//!
//! libcurl 7.75+ implements AWS SigV4 signing internally behind
//! `CURLOPT_AWS_SIGV4`, taking a string of the form `"aws:amz:<region>:s3"`
//! and deriving the canonical request straight from the options already set
//! on the handle (method, URL, headers, body). The actual HMAC-SHA256
//! canonical-request math is delegated to the underlying transport library
//! rather than hand-rolled here.

use std::ffi::CString;

use crate::curl_sys::{self, Curl};
use crate::error::S3Error;

const MAX_REGION_LEN: usize = 120;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// The strings and header needed to wire auth onto an easy handle, computed
/// without touching libcurl so the selection logic is independently
/// testable. Kept alive by the caller for the lifetime of the request.
pub struct AuthPlan {
    userpwd: CString,
    sigv4_param: Option<CString>,
    pub security_token_header: Option<String>,
}

/// Validate credentials/region and build the auth strings. Performs no FFI.
pub fn plan(
    region: &str,
    credentials: &Credentials,
    require_sigv4: bool,
) -> Result<AuthPlan, S3Error> {
    if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
        return Err(S3Error::invalid_arg(
            "access_key_id and secret_access_key are required",
        ));
    }

    let userpwd = CString::new(format!(
        "{}:{}",
        credentials.access_key_id, credentials.secret_access_key
    ))
    .map_err(|_| S3Error::invalid_arg("credentials must not contain NUL bytes"))?;

    let sigv4_param = if require_sigv4 {
        if region.is_empty() || region.len() > MAX_REGION_LEN {
            return Err(S3Error::invalid_arg("region must be 1..=120 bytes for SigV4"));
        }
        let param = CString::new(format!("aws:amz:{region}:s3"))
            .map_err(|_| S3Error::internal("region produced an invalid SigV4 parameter"))?;
        Some(param)
    } else {
        None
    };

    let security_token_header = credentials
        .session_token
        .as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| format!("x-amz-security-token: {t}"));

    Ok(AuthPlan {
        userpwd,
        sigv4_param,
        security_token_header,
    })
}

/// Apply a previously-built plan onto `curl` via `curl_easy_setopt`.
///
/// # Safety
/// `curl` must be a live handle returned by `curl_easy_init`.
pub unsafe fn apply(curl: *mut Curl, auth: &AuthPlan) {
    curl_sys::curl_easy_setopt(curl, curl_sys::CURLOPT_USERPWD, auth.userpwd.as_ptr());
    match &auth.sigv4_param {
        Some(param) => {
            curl_sys::curl_easy_setopt(curl, curl_sys::CURLOPT_AWS_SIGV4, param.as_ptr());
        }
        None => {
            curl_sys::curl_easy_setopt(curl, curl_sys::CURLOPT_HTTPAUTH, curl_sys::CURLAUTH_BASIC);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
        }
    }

    #[test]
    fn rejects_missing_credentials() {
        let c = Credentials {
            access_key_id: String::new(),
            secret_access_key: "x".to_string(),
            session_token: None,
        };
        assert!(plan("us-east-1", &c, false).is_err());
    }

    #[test]
    fn rejects_empty_region_for_sigv4() {
        let err = plan("", &creds(), true).unwrap_err();
        assert_eq!(err.kind, crate::error::S3ErrorKind::InvalidArg);
    }

    #[test]
    fn rejects_overlong_region_for_sigv4() {
        let region = "a".repeat(200);
        let err = plan(&region, &creds(), true).unwrap_err();
        assert_eq!(err.kind, crate::error::S3ErrorKind::InvalidArg);
    }

    #[test]
    fn basic_mode_has_no_sigv4_param() {
        let auth = plan("us-east-1", &creds(), false).unwrap();
        assert!(auth.sigv4_param.is_none());
    }

    #[test]
    fn sigv4_mode_builds_region_scoped_param() {
        let auth = plan("us-east-1", &creds(), true).unwrap();
        assert_eq!(
            auth.sigv4_param.unwrap().to_str().unwrap(),
            "aws:amz:us-east-1:s3"
        );
    }

    #[test]
    fn session_token_becomes_security_token_header() {
        let mut c = creds();
        c.session_token = Some("tok".to_string());
        let auth = plan("us-east-1", &c, true).unwrap();
        assert_eq!(
            auth.security_token_header.as_deref(),
            Some("x-amz-security-token: tok")
        );
    }

    #[test]
    fn empty_session_token_produces_no_header() {
        let mut c = creds();
        c.session_token = Some(String::new());
        let auth = plan("us-east-1", &c, true).unwrap();
        assert!(auth.security_token_header.is_none());
    }
}
