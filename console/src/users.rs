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

//! User provisioning against the console's REST API.
//!
//! Plain single-request CRUD calls with admin basic auth; no cookies and no
//! session involved.

use http::header::CONTENT_TYPE;
use reqwest::StatusCode;
use url::Url;

use crate::error::{Error, Result};
use crate::session::APP_ROOT;

/// User credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: String,
}

/// Create a console user, grant it `roles` and set its password.
///
/// Three REST calls, each expecting 204 No Content, authenticated as
/// `rest_user`.
pub async fn create_user(
    endpoint: &str,
    new_user: &User,
    roles: &[&str],
    rest_user: &User,
) -> Result<()> {
    let base = Url::parse(endpoint)?;
    let client = reqwest::Client::new();

    // Create the user; the API takes the bare username as the body.
    let create_url = base.join(&format!("{APP_ROOT}/rest/user"))?;
    let response = client
        .post(create_url)
        .basic_auth(&rest_user.username, Some(&rest_user.password))
        .header(CONTENT_TYPE, "application/json")
        .body(new_user.username.clone())
        .send()
        .await?;
    if response.status() != StatusCode::NO_CONTENT {
        return Err(Error::UnexpectedStatus(response.status().as_u16()));
    }

    // Role assignment, body is a JSON array of role names.
    let roles_url =
        base.join(&format!("{APP_ROOT}/rest/user/roles/{}", new_user.username))?;
    let response = client
        .put(roles_url)
        .basic_auth(&rest_user.username, Some(&rest_user.password))
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::json!(roles).to_string())
        .send()
        .await?;
    if response.status() != StatusCode::NO_CONTENT {
        return Err(Error::UnexpectedStatus(response.status().as_u16()));
    }

    // Password goes in the query string, not the body.
    let mut password_url =
        base.join(&format!("{APP_ROOT}/rest/user/password/{}", new_user.username))?;
    password_url.query_pairs_mut().append_pair("password", &new_user.password);
    let response = client
        .put(password_url)
        .basic_auth(&rest_user.username, Some(&rest_user.password))
        .send()
        .await?;
    if response.status() != StatusCode::NO_CONTENT {
        return Err(Error::UnexpectedStatus(response.status().as_u16()));
    }

    Ok(())
}
