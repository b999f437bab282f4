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

//! End-to-end tunnel tests over real sockets.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::{timeout, Duration};

use wb_console::tunnel;

async fn start_tunnel(backend_addr: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = tunnel::serve(listener, backend_addr).await;
    });
    addr
}

/// Backend that discards the replayed request head and echoes everything
/// after it.
async fn start_echo_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            tokio::spawn(async move {
                let mut reader = BufReader::new(stream);
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => return,
                        Ok(_) if line == "\r\n" => break,
                        Ok(_) => continue,
                    }
                }
                let mut buf = [0u8; 1024];
                loop {
                    match reader.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(read) => {
                            if reader.get_mut().write_all(&buf[..read]).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            });
        }
    });
    addr
}

#[tokio::test]
async fn tunnel_echoes_bytes_after_handshake() {
    let backend_addr = start_echo_backend().await;
    let tunnel_addr = start_tunnel(backend_addr).await;

    let mut client = TcpStream::connect(&tunnel_addr).await.unwrap();
    client
        .write_all(b"GET /chat HTTP/1.1\r\nhost: console\r\nupgrade: websocket\r\n\r\n")
        .await
        .unwrap();

    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    client.write_all(&payload).await.unwrap();

    let mut echoed = vec![0u8; payload.len()];
    timeout(Duration::from_secs(5), client.read_exact(&mut echoed)).await.unwrap().unwrap();
    assert_eq!(echoed, payload);
}

#[tokio::test]
async fn tunnel_dial_failure_returns_500() {
    // Grab a port nothing listens on.
    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = unused.local_addr().unwrap().to_string();
    drop(unused);

    let tunnel_addr = start_tunnel(backend_addr).await;
    let mut client = TcpStream::connect(&tunnel_addr).await.unwrap();
    client.write_all(b"GET / HTTP/1.1\r\nhost: console\r\n\r\n").await.unwrap();

    let mut response = String::new();
    timeout(Duration::from_secs(5), client.read_to_string(&mut response)).await.unwrap().unwrap();
    assert!(
        response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"),
        "unexpected response: {response}"
    );
}

#[tokio::test]
async fn tunnel_replays_request_verbatim() {
    // Backend that records everything it receives until the peer closes.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = listener.local_addr().unwrap().to_string();
    let (received_tx, received_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(read) => received.extend_from_slice(&buf[..read]),
            }
        }
        let _ = received_tx.send(received);
    });

    let tunnel_addr = start_tunnel(backend_addr).await;
    let mut client = TcpStream::connect(&tunnel_addr).await.unwrap();
    let request = concat!(
        "POST /drools-wb/rest/user HTTP/1.1\r\n",
        "host: console\r\n",
        "content-length: 6\r\n\r\n",
        "walter"
    );
    client.write_all(request.as_bytes()).await.unwrap();
    client.shutdown().await.unwrap();

    let received = timeout(Duration::from_secs(5), received_rx).await.unwrap().unwrap();
    assert_eq!(String::from_utf8(received).unwrap(), request);
}

#[tokio::test]
async fn tunnel_relays_backend_response_and_close() {
    // Backend that answers once and closes.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(stream);
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => return,
                Ok(_) if line == "\r\n" => break,
                Ok(_) => continue,
            }
        }
        let _ = reader
            .get_mut()
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok")
            .await;
        // Dropping the stream closes the backend side of the relay.
    });

    let tunnel_addr = start_tunnel(backend_addr).await;
    let mut client = TcpStream::connect(&tunnel_addr).await.unwrap();
    client.write_all(b"GET / HTTP/1.1\r\nhost: console\r\n\r\n").await.unwrap();

    // The client sees the backend's bytes, then end-of-stream once the
    // relay tears down.
    let mut response = String::new();
    timeout(Duration::from_secs(5), client.read_to_string(&mut response)).await.unwrap().unwrap();
    assert_eq!(response, "HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok");
}

#[tokio::test]
async fn tunnel_teardown_on_client_close() {
    // Backend that signals when its read loop observes end-of-stream.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = listener.local_addr().unwrap().to_string();
    let (closed_tx, closed_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(());
    });

    let tunnel_addr = start_tunnel(backend_addr).await;
    let mut client = TcpStream::connect(&tunnel_addr).await.unwrap();
    client.write_all(b"GET / HTTP/1.1\r\nhost: console\r\n\r\n").await.unwrap();
    drop(client);

    // Closing the client ends the backend's copy loop within bounded time.
    timeout(Duration::from_secs(5), closed_rx).await.unwrap().unwrap();
}
