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

//! HTTP-to-raw-TCP tunnel.
//!
//! Every accepted connection is handled the same way: dial the fixed
//! backend, take the raw socket away from the HTTP layer, replay the
//! inbound request onto the backend verbatim, then splice the two sockets
//! until either side closes. After the replay the relay is byte-exact and
//! protocol-agnostic, so upgraded protocols such as WebSocket pass
//! through untouched. There is no routing, rewriting or per-request state.

mod http_request;
mod http_response;

pub use http_request::{parse_http_request, write_http_request};
pub use http_response::{write_error_response, write_response};

use log::{error, info, warn};
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// A transport that can surrender exclusive ownership of its raw duplex
/// stream, detaching it from the HTTP layer. On failure the transport is
/// handed back so an error reply can still be written on it.
pub trait Hijack: AsyncRead + AsyncWrite + Unpin + Send + Sized {
    type Raw: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn hijack(self) -> std::result::Result<Self::Raw, (Self, Error)>;
}

impl Hijack for TcpStream {
    type Raw = TcpStream;

    fn hijack(self) -> std::result::Result<TcpStream, (Self, Error)> {
        Ok(self)
    }
}

/// Bind `listen_addr` and splice every accepted connection to
/// `backend_addr`.
pub async fn run(listen_addr: &str, backend_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!("tunnel is listening on {listen_addr}, backend is {backend_addr}");
    serve(listener, backend_addr.to_string()).await
}

/// Accept loop. One task per connection; connections share nothing.
pub async fn serve(listener: TcpListener, backend_addr: String) -> Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let backend_addr = backend_addr.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, &backend_addr).await {
                warn!("tunnel connection from {peer_addr}: {err}");
            }
        });
    }
}

/// Handle one accepted connection end to end: parse the request, dial the
/// backend, hijack the client socket, replay, relay. Both sockets are
/// released on every exit path; dial and hijack failures answer the client
/// with a 500 before abandoning it.
pub async fn handle_connection<C: Hijack>(conn: C, backend_addr: &str) -> Result<()> {
    let mut reader = BufReader::new(conn);
    let request = match parse_http_request(&mut reader).await {
        Ok(request) => request,
        Err(err) => {
            write_error_response(&mut reader, 400, "malformed request").await?;
            return Err(Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)));
        }
    };

    let mut backend = match TcpStream::connect(backend_addr).await {
        Ok(stream) => stream,
        Err(err) => {
            error!("error dialing backend {backend_addr}: {err}");
            write_error_response(&mut reader, 500, "error contacting backend server").await?;
            return Err(Error::Io(err));
        }
    };

    // Bytes the parser buffered past the request head belong to the backend.
    let leftover = reader.buffer().to_vec();
    let raw = match reader.into_inner().hijack() {
        Ok(raw) => raw,
        Err((mut conn, err)) => {
            error!("hijack error: {err}");
            write_error_response(&mut conn, 500, "connection does not support hijacking")
                .await?;
            return Err(err);
        }
    };

    // Replay the handshake so the backend sees exactly what the client sent.
    write_http_request(&request, &mut backend).await?;
    if !leftover.is_empty() {
        backend.write_all(&leftover).await?;
    }

    relay(raw, backend).await;
    Ok(())
}

/// Copy bytes both ways until either direction reports end-of-stream or an
/// error, then drop both streams, which terminates the surviving copy loop
/// by side effect. The completion channel holds two slots so the second
/// loop's result never blocks cleanup.
pub async fn relay<A, B>(client: A, backend: B)
where
    A: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    B: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<io::Result<u64>>(2);
    let (mut client_reader, mut client_writer) = io::split(client);
    let (mut backend_reader, mut backend_writer) = io::split(backend);

    let tx_up = tx.clone();
    let upstream = tokio::spawn(async move {
        let result = io::copy(&mut client_reader, &mut backend_writer).await;
        let _ = tx_up.send(result).await;
    });
    let downstream = tokio::spawn(async move {
        let result = io::copy(&mut backend_reader, &mut client_writer).await;
        let _ = tx.send(result).await;
    });

    // The first direction to finish tears the tunnel down.
    if let Some(Err(err)) = rx.recv().await {
        warn!("relay ended: {err}");
    }
    upstream.abort();
    downstream.abort();
    let _ = upstream.await;
    let _ = downstream.await;
}
