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

//! This module defines the console error types.

use std::fmt;
use std::io;

/// An enumeration of possible errors.
#[derive(Debug)]
pub enum Error {
    /// The endpoint string could not be parsed as a base URL.
    InvalidEndpoint(url::ParseError),
    /// The HTTP client failed before a status code was available.
    Transport(reqwest::Error),
    /// Network I/O failed while dialing or relaying.
    Io(io::Error),
    /// A response carried a status other than the one required.
    UnexpectedStatus(u16),
    /// The login handshake completed without the server setting cookies.
    NoCookies,
    /// Cookies were set but none carried the session identifier.
    SessionNotFound,
    /// The accepted transport cannot surrender its raw byte stream.
    HijackUnsupported,
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidEndpoint(err) => write!(f, "invalid endpoint: {}", err),
            Error::Transport(err) => write!(f, "transport error: {}", err),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::UnexpectedStatus(code) => write!(f, "unexpected status code {}", code),
            Error::NoCookies => write!(f, "no cookies for endpoint"),
            Error::SessionNotFound => write!(f, "session not found"),
            Error::HijackUnsupported => write!(f, "connection does not support hijacking"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidEndpoint(err)
    }
}
