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

//! Response writing for the tunnel's micro HTTP layer.
//!
//! The tunnel only answers for itself before a backend connection exists
//! (dial or hijack failures), so a plain status-line writer covers it.

use http::{HeaderValue, Response};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Serialize `response` onto `writer`.
pub async fn write_response<W>(response: &Response<Vec<u8>>, writer: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let reason = match response.status().as_u16() {
        101 => "Switching Protocols",
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown Reason",
    };
    let mut buffer =
        format!("HTTP/1.1 {} {}\r\n", response.status().as_str(), reason).into_bytes();
    for (name, value) in response.headers() {
        buffer.extend_from_slice(name.as_str().as_bytes());
        buffer.extend_from_slice(b": ");
        buffer.extend_from_slice(value.as_bytes());
        buffer.extend_from_slice(b"\r\n");
    }
    buffer.extend_from_slice(b"\r\n");
    buffer.extend_from_slice(response.body());
    writer.write_all(&buffer).await?;
    writer.flush().await
}

/// Write a plain-text error reply.
pub async fn write_error_response<W>(
    writer: &mut W,
    error_code: u16,
    error_message: &str,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = error_message.as_bytes().to_vec();
    let response = Response::builder()
        .status(error_code)
        .header("Content-Type", HeaderValue::from_static("text/plain"))
        .header("Content-Length", body.len())
        .body(body)
        .unwrap();
    write_response(&response, writer).await
}
