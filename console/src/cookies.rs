// Copyright 2024 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cookie jar for the login handshake.
//!
//! Holds cookies as plain values keyed by origin, owned by a single
//! operation call and never shared. Only the parts of RFC 6265 the console
//! handshake needs are implemented: name, value and path, with the
//! default-path fallback for missing or non-absolute paths.

use std::collections::HashMap;

use http::header::SET_COOKIE;
use http::HeaderMap;
use url::Url;

/// A single stored cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
}

/// In-memory cookie store for one operation against one endpoint.
#[derive(Debug, Default)]
pub struct CookieJar {
    entries: HashMap<String, Vec<Cookie>>,
}

impl CookieJar {
    pub fn new() -> CookieJar {
        CookieJar { entries: HashMap::new() }
    }

    /// Store a cookie for the URL's origin, replacing any cookie of the
    /// same name. A path that does not begin with `/` is replaced by the
    /// URL's default path (RFC 6265 section 5.1.4).
    pub fn add(&mut self, url: &Url, mut cookie: Cookie) {
        match cookie.path {
            Some(ref path) if path.starts_with('/') => {}
            _ => cookie.path = Some(default_path(url)),
        }
        let bucket = self.entries.entry(origin(url)).or_default();
        if let Some(existing) = bucket.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            bucket.push(cookie);
        }
    }

    /// Store every `Set-Cookie` header of a response issued for `url`.
    pub fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) {
        for header in headers.get_all(SET_COOKIE) {
            let Ok(header) = header.to_str() else { continue };
            if let Some(cookie) = parse_set_cookie(header) {
                self.add(url, cookie);
            }
        }
    }

    /// All cookies the jar would present to `url`, in insertion order.
    pub fn cookies(&self, url: &Url) -> Vec<Cookie> {
        let Some(bucket) = self.entries.get(&origin(url)) else { return Vec::new() };
        bucket
            .iter()
            .filter(|c| c.path.as_deref().map_or(true, |p| path_matches(url.path(), p)))
            .cloned()
            .collect()
    }

    /// `Cookie:` header value for a request to `url`, or `None` when the
    /// jar holds nothing that matches.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Directory of the URL path: "/a/b" -> "/a", "/a" -> "/".
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// RFC 6265 path-match between a request path and a cookie path.
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path.as_bytes().get(cookie_path.len()) == Some(&b'/'))
}

/// Parse a `Set-Cookie` header down to name, value and path. All other
/// attributes are skipped.
fn parse_set_cookie(header: &str) -> Option<Cookie> {
    let mut parts = header.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let mut cookie = Cookie { name: name.to_string(), value: value.trim().to_string(), path: None };
    for attribute in parts {
        if let Some((key, val)) = attribute.split_once('=') {
            if key.trim().eq_ignore_ascii_case("path") {
                cookie.path = Some(val.trim().to_string());
            }
        }
    }
    Some(cookie)
}
