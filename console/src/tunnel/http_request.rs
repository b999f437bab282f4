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

//! Request parsing for the tunnel's micro HTTP layer.
//!
//! This module implements the basic parts of the HTTP/1.1 message format:
//! request line, single-line header fields and a `Content-Length` body.
//! That is enough to capture the handshake of every request the tunnel
//! relays, including protocol upgrades; everything past the head stays
//! opaque. In particular it does not implement:
//! * header field body with multiple lines
//! * chunked transfer encoding of the initial request
//! * limits on the lengths of the header section or header field

use http::{Request, Version};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Parse one HTTP request head and its `Content-Length` body from `reader`.
pub async fn parse_http_request<R>(reader: &mut R) -> Result<Request<Vec<u8>>, String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await.map_err(|e| format!("Failed to read request line: {e}"))?;
    let mut parts = line.split_whitespace();
    let method = parts.next().ok_or("Invalid request line, missing method")?;
    let uri = parts.next().ok_or("Invalid request line, missing uri")?;
    let version_str = parts.next().ok_or("Invalid request line, missing version")?;
    let version = match version_str {
        "HTTP/0.9" => Version::HTTP_09,
        "HTTP/1.0" => Version::HTTP_10,
        "HTTP/1.1" => Version::HTTP_11,
        "HTTP/2.0" => Version::HTTP_2,
        "HTTP/3.0" => Version::HTTP_3,
        _ => return Err("Invalid HTTP version".to_string()),
    };

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).await.map_err(|e| format!("Failed to parse headers: {e}"))?;
        let line = line.trim_end_matches(['\r', '\n']);
        if read == 0 || line.is_empty() {
            // empty line marks the end of headers
            break;
        }
        match line.split_once(':') {
            Some((name, value)) => headers.push((name.to_string(), value.trim().to_string())),
            // no colon in a header line
            None => return Err(format!("Invalid header line: {line}")),
        }
    }

    let mut builder = Request::builder().method(method).uri(uri).version(version);
    let mut body_length: Option<usize> = None;
    for (key, value) in headers {
        builder = builder.header(key.clone(), value.clone());
        if key.eq_ignore_ascii_case("Content-Length") {
            body_length = match value.parse() {
                Ok(size) => Some(size),
                Err(err) => return Err(format!("{err:?}")),
            }
        }
    }
    let mut body = Vec::new();
    if let Some(len) = body_length {
        body.resize(len, 0);
        reader.read_exact(&mut body).await.map_err(|e| format!("Failed to read body: {e}"))?;
    }
    match builder.body(body) {
        Ok(request) => Ok(request),
        Err(err) => Err(format!("{err:?}")),
    }
}

/// Serialize `request` onto `writer` as it arrived: request line, headers
/// in original order, then the body. Replayed verbatim so the backend sees
/// the same handshake the client sent.
pub async fn write_http_request<W>(
    request: &Request<Vec<u8>>,
    writer: &mut W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buffer =
        format!("{} {} {}\r\n", request.method(), request.uri(), version_str(request.version()))
            .into_bytes();
    for (name, value) in request.headers() {
        buffer.extend_from_slice(name.as_str().as_bytes());
        buffer.extend_from_slice(b": ");
        buffer.extend_from_slice(value.as_bytes());
        buffer.extend_from_slice(b"\r\n");
    }
    buffer.extend_from_slice(b"\r\n");
    buffer.extend_from_slice(request.body());
    writer.write_all(&buffer).await?;
    writer.flush().await
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_parse() {
        let request = concat!(
            "GET /index.html HTTP/1.1\r\n",
            "Host: console\r\nContent-Length: 13\r\n\r\n",
            "Hello World\r\n"
        );
        let mut reader = BufReader::new(request.as_bytes());
        let http_request = parse_http_request(&mut reader).await.unwrap();
        assert_eq!(http_request.method(), "GET");
        assert_eq!(http_request.uri().to_string(), "/index.html");
        assert_eq!(http_request.version(), Version::HTTP_11);
        let mut headers = http::HeaderMap::new();
        headers.insert("Host", http::HeaderValue::from_static("console"));
        headers.insert("Content-Length", http::HeaderValue::from_static("13"));
        assert_eq!(http_request.headers().to_owned(), headers);
        assert_eq!(http_request.body().to_owned(), b"Hello World\r\n".to_vec());
    }

    #[tokio::test]
    async fn test_parse_without_body() {
        let request = concat!("GET /index.html HTTP/1.1\r\n", "Host: console\r\n\r\n");
        let mut reader = BufReader::new(request.as_bytes());
        let http_request = parse_http_request(&mut reader).await.unwrap();
        assert_eq!(http_request.method(), "GET");
        assert_eq!(http_request.uri().to_string(), "/index.html");
        assert_eq!(http_request.version(), Version::HTTP_11);
        let mut headers = http::HeaderMap::new();
        headers.insert("Host", http::HeaderValue::from_static("console"));
        assert_eq!(http_request.headers().to_owned(), headers);
        assert_eq!(http_request.body().to_owned(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_parse_without_content_length() {
        let request =
            concat!("GET /index.html HTTP/1.1\r\n", "Host: console\r\n\r\n", "Hello World\r\n");
        let mut reader = BufReader::new(request.as_bytes());
        let http_request = parse_http_request(&mut reader).await.unwrap();
        assert_eq!(http_request.method(), "GET");
        assert_eq!(http_request.uri(), "/index.html");
        assert_eq!(http_request.version(), Version::HTTP_11);
        // the trailing bytes stay in the reader for the relay
        assert_eq!(http_request.body().to_owned(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_parse_rejects_garbage() {
        let mut reader = BufReader::new("not an http request\r\n\r\n".as_bytes());
        assert!(parse_http_request(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn test_write_replays_request() {
        // Header names come back lowercased; everything else is byte-exact.
        let inbound = concat!(
            "POST /drools-wb/rest/user HTTP/1.1\r\n",
            "host: console\r\n",
            "upgrade: websocket\r\n",
            "content-length: 6\r\n\r\n",
            "walter"
        );
        let mut reader = BufReader::new(inbound.as_bytes());
        let request = parse_http_request(&mut reader).await.unwrap();

        let mut replayed = Vec::new();
        write_http_request(&request, &mut replayed).await.unwrap();
        assert_eq!(String::from_utf8(replayed).unwrap(), inbound);
    }
}
