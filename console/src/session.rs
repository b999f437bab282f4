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

//! Form-based login handshake against the web console.
//!
//! The console issues its session cookie only after a pre-flight GET has
//! seeded the jar, and rejects the credential POST without those cookies,
//! so all three requests of one login must share one jar. Every call
//! creates its own jar and client; concurrent calls are independent.

use http::header::COOKIE;
use reqwest::redirect;
use reqwest::StatusCode;
use url::Url;

use crate::cookies::{Cookie, CookieJar};
use crate::error::{Error, Result};

/// Application root every operation path is resolved under.
pub const APP_ROOT: &str = "drools-wb";

/// Name of the cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// Session id and key. They are cookie values proving an authenticated
/// identity, valid only for the endpoint that issued them. Presented
/// unmodified on logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub key: String,
}

/// Client for the handshake. Redirects are disabled: every step requires a
/// plain 200 and every response's `Set-Cookie` headers must reach the jar.
fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .map_err(Error::Transport)
}

/// Login to the console endpoint with username and password.
///
/// A failure at any step aborts the whole call; no partial session is ever
/// returned.
pub async fn login(endpoint: &str, username: &str, password: &str) -> Result<Session> {
    let base = Url::parse(endpoint)?;
    let mut jar = CookieJar::new();
    let client = http_client()?;

    // Pre-flight GET seeds the jar with any anti-CSRF or affinity cookies.
    let app_url = base.join(APP_ROOT)?;
    let response = client.get(app_url.clone()).send().await?;
    if response.status() != StatusCode::OK {
        return Err(Error::UnexpectedStatus(response.status().as_u16()));
    }
    jar.store_response_cookies(&app_url, response.headers());

    // Credential POST; must carry the pre-flight cookies.
    let check_url = base.join(&format!("{APP_ROOT}/j_security_check"))?;
    let mut request = client
        .post(check_url.clone())
        .form(&[("j_username", username), ("j_password", password)]);
    if let Some(header) = jar.cookie_header(&check_url) {
        request = request.header(COOKIE, header);
    }
    let response = request.send().await?;
    if response.status() != StatusCode::OK {
        return Err(Error::UnexpectedStatus(response.status().as_u16()));
    }
    jar.store_response_cookies(&check_url, response.headers());

    let cookies = jar.cookies(&app_url);
    if cookies.is_empty() {
        return Err(Error::NoCookies);
    }
    for cookie in cookies {
        if cookie.name == SESSION_COOKIE {
            return Ok(Session { id: cookie.value, key: cookie.name });
        }
    }
    Err(Error::SessionNotFound)
}

/// Logout the console session.
///
/// Presents exactly the session's cookie. Not idempotent: a second logout
/// with the same session is the remote service's business.
pub async fn logout(endpoint: &str, session: &Session) -> Result<()> {
    let base = Url::parse(endpoint)?;
    let app_url = base.join(APP_ROOT)?;

    // A jar holding exactly the session cookie. The path is the bare
    // application root, as issued; the jar's default-path fallback keeps
    // the cookie presentable under that root.
    let mut jar = CookieJar::new();
    jar.add(
        &app_url,
        Cookie {
            name: session.key.clone(),
            value: session.id.clone(),
            path: Some(APP_ROOT.to_string()),
        },
    );

    let logout_url = base.join(&format!("{APP_ROOT}/logout.jsp"))?;
    let client = http_client()?;
    let mut request = client.get(logout_url.clone());
    if let Some(header) = jar.cookie_header(&logout_url) {
        request = request.header(COOKIE, header);
    }
    let response = request.send().await?;
    if response.status() != StatusCode::OK {
        return Err(Error::UnexpectedStatus(response.status().as_u16()));
    }
    Ok(())
}
