//! Upstream URL construction.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::routing::ProxyTarget;

/// Characters escaped in the forwarded path. `/` stays literal so nested API paths survive.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escape unsafe raw characters, copying valid `%XX` escapes through untouched.
///
/// Existing escapes are never rewritten, so `%FF` and `%2F` reach the device
/// byte-for-byte and nothing is encoded twice. A `%` not followed by two hex
/// digits is escaped as `%25`.
pub fn encode_path(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if is_escape(&bytes[i..]) {
            out.extend(utf8_percent_encode(&raw[start..i], PATH));
            out.push_str(&raw[i..i + 3]);
            i += 3;
            start = i;
        } else {
            i += 1;
        }
    }
    out.extend(utf8_percent_encode(&raw[start..], PATH));
    out
}

/// `%` followed by two hex digits.
fn is_escape(bytes: &[u8]) -> bool {
    matches!(bytes, [b'%', hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
}

/// Build `http://<host>/<rest>[?query]` for a target.
pub fn upstream_url(target: &ProxyTarget) -> String {
    let mut url = format!("http://{}/{}", target.host, encode_path(&target.path));
    if let Some(query) = target.query.as_deref().filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}
