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

//! # wb-console
//!
//! Session handshake and raw tunneling for a servlet-container web console.
//!
//! [`login`] drives the form-based login flow against the console's
//! application root: a pre-flight GET to seed cookies, a credential POST to
//! `j_security_check`, then extraction of the `JSESSIONID` cookie as a
//! [`Session`]. [`logout`] presents that session's cookie to the console's
//! logout page.
//!
//! The [`tunnel`] module is independent of sessions: it accepts HTTP
//! connections, dials one fixed backend per connection, replays the inbound
//! request verbatim and then splices bytes in both directions. After the
//! replay the relay is opaque, so upgraded protocols such as WebSocket pass
//! through untouched.
//!
//! [`create_user`] is ordinary REST glue for the console's user-provisioning
//! API, kept alongside because the console's admin workflows need all three.

pub mod args;
mod cookies;
mod error;
mod session;
pub mod tunnel;
mod users;

pub use cookies::{Cookie, CookieJar};
pub use error::{Error, Result};
pub use session::{login, logout, Session, APP_ROOT, SESSION_COOKIE};
pub use users::{create_user, User};
