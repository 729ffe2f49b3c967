//! ListObjectsV2 response parsing.
//!
//! Walks the response body as a flat stream of `quick_xml` events rather
//! than deriving a `serde` struct: a missing tag should leave its field at
//! the default instead of failing the parse, which reads more naturally as
//! an explicit loop than as a derive with a pile of `#[serde(default)]`
//! attributes.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::S3Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    /// Stored with surrounding quotes stripped — S3 emits `"<etag>"`.
    pub etag: String,
    pub last_modified: String,
    pub storage_class: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListResult {
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
    pub objects: Vec<ObjectInfo>,
}

fn unquote(s: &str) -> String {
    s.trim_matches('"').to_string()
}

pub fn parse_list_objects_v2(body: &[u8]) -> Result<ListResult, S3Error> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut result = ListResult {
        is_truncated: false,
        next_continuation_token: None,
        objects: Vec::with_capacity(16),
    };

    let mut buf = Vec::new();
    let mut tag_stack: Vec<String> = Vec::new();
    let mut current: Option<ObjectInfo> = None;
    let mut text = String::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| S3Error::internal(format!("malformed ListObjectsV2 XML: {e}")))?
        {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "Contents" {
                    current = Some(ObjectInfo::default());
                }
                tag_stack.push(name);
                text.clear();
            }
            Event::Text(e) => {
                text.push_str(
                    &e.unescape()
                        .map_err(|e| S3Error::internal(format!("malformed ListObjectsV2 XML: {e}")))?,
                );
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "Contents" => {
                        if let Some(obj) = current.take() {
                            result.objects.push(obj);
                        }
                    }
                    "IsTruncated" => {
                        let trimmed = text.trim();
                        result.is_truncated = trimmed == "true" || trimmed == "True";
                    }
                    "NextContinuationToken" => {
                        if !text.is_empty() {
                            result.next_continuation_token = Some(text.clone());
                        }
                    }
                    "Key" if current.is_some() => {
                        current.as_mut().unwrap().key = text.clone();
                    }
                    "Size" if current.is_some() => {
                        current.as_mut().unwrap().size = text.trim().parse().unwrap_or(0);
                    }
                    "ETag" if current.is_some() => {
                        current.as_mut().unwrap().etag = unquote(&text);
                    }
                    "LastModified" if current.is_some() => {
                        current.as_mut().unwrap().last_modified = text.clone();
                    }
                    "StorageClass" if current.is_some() => {
                        current.as_mut().unwrap().storage_class = text.clone();
                    }
                    _ => {}
                }
                tag_stack.pop();
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>tok123</NextContinuationToken>
  <Contents>
    <Key>a.txt</Key>
    <Size>42</Size>
    <ETag>"abc123"</ETag>
    <LastModified>2026-01-01T00:00:00.000Z</LastModified>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
  <Contents>
    <Key>dir/b.bin</Key>
    <Size>0</Size>
    <ETag>"def456"</ETag>
    <LastModified>2026-01-02T00:00:00.000Z</LastModified>
    <StorageClass>STANDARD_IA</StorageClass>
  </Contents>
</ListBucketResult>"#;

    #[test]
    fn parses_truncated_page_with_two_objects() {
        let result = parse_list_objects_v2(SAMPLE.as_bytes()).unwrap();
        assert!(result.is_truncated);
        assert_eq!(result.next_continuation_token.as_deref(), Some("tok123"));
        assert_eq!(result.objects.len(), 2);
        assert_eq!(result.objects[0].key, "a.txt");
        assert_eq!(result.objects[0].size, 42);
        assert_eq!(result.objects[0].etag, "abc123");
        assert_eq!(result.objects[1].key, "dir/b.bin");
    }

    #[test]
    fn missing_optional_fields_default() {
        let body = b"<ListBucketResult><IsTruncated>false</IsTruncated></ListBucketResult>";
        let result = parse_list_objects_v2(body).unwrap();
        assert!(!result.is_truncated);
        assert_eq!(result.next_continuation_token, None);
        assert!(result.objects.is_empty());
    }

    #[test]
    fn etag_quotes_are_stripped() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("abc"), "abc");
    }
}
