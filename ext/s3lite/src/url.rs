//! URL and request-body builders shared by every operation.
//!
//! Percent-encoding follows RFC 3986's unreserved set (`A-Z a-z 0-9 - _ . ~`)
//! exactly; everything else is escaped as `%XX` uppercase hex. Object keys
//! are deliberately NOT percent-encoded when building the path — S3 keys
//! may themselves contain characters (`/`, `+`, spaces encoded as `+` by
//! some clients) that a naive encoder would mangle, and callers are expected
//! to pass an already-wire-correct key. This mirrors an explicit decision
//! carried over from the source system this was modeled on, not an
//! oversight.

use crate::error::S3Error;

/// Percent-encode `s` per RFC 3986's unreserved character set.
pub fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{:02X}", b));
            }
        }
    }
    out
}

/// Escape the four XML special characters (`& < > "`) for use in element
/// text/attributes. Applied to object keys and version ids, so the escape
/// set must match byte-for-byte — an apostrophe is left unescaped.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn strip_trailing_slash(endpoint: &str) -> &str {
    endpoint.strip_suffix('/').unwrap_or(endpoint)
}

/// `https://<endpoint>/<bucket>/<key>` — key is not percent-encoded.
pub fn build_object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", strip_trailing_slash(endpoint), bucket, key)
}

/// `https://<endpoint>/<bucket>` — used by CreateBucket and as the base for
/// ListObjectsV2 and DeleteObjects.
pub fn build_bucket_url(endpoint: &str, bucket: &str) -> String {
    format!("{}/{}", strip_trailing_slash(endpoint), bucket)
}

/// `?list-type=2` plus optional `prefix`/`max-keys`/`continuation-token`, in
/// that order, each percent-encoded via [`encode`].
pub fn build_list_url(
    endpoint: &str,
    bucket: &str,
    prefix: Option<&str>,
    continuation_token: Option<&str>,
    max_keys: Option<u32>,
) -> String {
    let mut url = format!("{}?list-type=2", build_bucket_url(endpoint, bucket));
    if let Some(p) = prefix {
        url.push_str("&prefix=");
        url.push_str(&encode(p));
    }
    if let Some(n) = max_keys {
        url.push_str(&format!("&max-keys={n}"));
    }
    if let Some(t) = continuation_token {
        url.push_str("&continuation-token=");
        url.push_str(&encode(t));
    }
    url
}

/// `https://<endpoint>/<bucket>?delete`
pub fn build_delete_url(endpoint: &str, bucket: &str) -> String {
    format!("{}?delete", build_bucket_url(endpoint, bucket))
}

/// Build the exact DeleteObjects XML body: a `<Delete>` root, an optional
/// `<Quiet>true</Quiet>` right after it, then one
/// `<Object><Key>...</Key></Object>` per key, in order. `keys` must be
/// non-empty and none may be empty — both are caller-validated invariants
/// enforced by `handle::build_delete_objects` before this is called, so a
/// partial body is never emitted.
pub fn build_delete_body(keys: &[String], quiet: bool) -> Result<String, S3Error> {
    if keys.is_empty() {
        return Err(S3Error::invalid_arg("delete_objects requires at least one key"));
    }
    if keys.iter().any(|k| k.is_empty()) {
        return Err(S3Error::invalid_arg("delete_objects keys must not be empty"));
    }

    let mut body = String::from("<Delete xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">");
    if quiet {
        body.push_str("<Quiet>true</Quiet>");
    }
    for key in keys {
        body.push_str("<Object><Key>");
        body.push_str(&xml_escape(key));
        body.push_str("</Key></Object>");
    }
    body.push_str("</Delete>");
    Ok(body)
}

/// Content-MD5 header value: base64(MD5(body)).
pub fn content_md5(body: &[u8]) -> String {
    use base64::Engine;
    let digest = md5::compute(body);
    base64::engine::general_purpose::STANDARD.encode(digest.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_preserves_unreserved_set() {
        let unreserved = "ABCabc012-_.~";
        assert_eq!(encode(unreserved), unreserved);
    }

    #[test]
    fn encode_escapes_reserved_bytes() {
        assert_eq!(encode("a b/c"), "a%20b%2Fc");
        assert_eq!(encode("100%"), "100%25");
    }

    #[test]
    fn xml_escape_covers_the_four_special_characters() {
        assert_eq!(xml_escape("<a>&'\"b\""), "&lt;a&gt;&amp;'&quot;b&quot;");
    }

    #[test]
    fn object_url_does_not_encode_key() {
        let url = build_object_url("https://s3.example.com", "bucket", "a/b+c");
        assert_eq!(url, "https://s3.example.com/bucket/a/b+c");
    }

    #[test]
    fn object_url_strips_trailing_slash_on_endpoint() {
        let url = build_object_url("https://s3.example.com/", "bucket", "key");
        assert_eq!(url, "https://s3.example.com/bucket/key");
    }

    #[test]
    fn list_url_encodes_query_params() {
        let url = build_list_url(
            "https://s3.example.com",
            "bucket",
            Some("a b"),
            Some("tok en"),
            Some(100),
        );
        assert_eq!(
            url,
            "https://s3.example.com/bucket?list-type=2&prefix=a%20b&max-keys=100&continuation-token=tok%20en"
        );
    }

    #[test]
    fn delete_body_rejects_empty_key_list() {
        assert!(build_delete_body(&[], false).is_err());
    }

    #[test]
    fn delete_body_rejects_empty_key() {
        assert!(build_delete_body(&["".to_string()], false).is_err());
    }

    #[test]
    fn delete_body_exact_layout() {
        let body = build_delete_body(&["a".to_string(), "b&c".to_string()], false).unwrap();
        assert_eq!(
            body,
            "<Delete xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><Object><Key>a</Key></Object><Object><Key>b&amp;c</Key></Object></Delete>"
        );
    }

    #[test]
    fn delete_body_quiet_flag_emits_quiet_element() {
        let body = build_delete_body(&["a".to_string()], true).unwrap();
        assert_eq!(
            body,
            "<Delete xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><Quiet>true</Quiet><Object><Key>a</Key></Object></Delete>"
        );
    }

    #[test]
    fn content_md5_known_vector() {
        // MD5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }
}
