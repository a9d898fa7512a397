//! Reload Hub
//!
//! Server side of the reload channel: accepts WebSocket clients on
//! `/__reload` and broadcasts signal tokens to all of them.
//!
//! ```text
//! acceptor thread --handshake--> clients (Arc<Mutex<Vec<WebSocket>>>)
//!                                   ^
//! broadcast(Signal) ----------------+ (failed sends drop the client)
//! ```

use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message;

use super::connection::RELOAD_PATH;
use super::signal::Signal;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Acceptor poll interval
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Upper bound on a blocking handshake read or broadcast write
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

pub struct ReloadHub {
    port: u16,
    clients: Clients,
    stop: Arc<AtomicBool>,
    acceptor: Option<JoinHandle<()>>,
}

impl ReloadHub {
    /// Bind `interface:base_port`, moving to the next port while busy.
    pub fn start(interface: IpAddr, base_port: u16) -> Result<Self> {
        let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
        listener.set_nonblocking(true)?;

        let clients: Clients = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let acceptor = {
            let clients = Arc::clone(&clients);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || accept_loop(&listener, &clients, &stop))
        };

        Ok(Self {
            port,
            clients,
            stop,
            acceptor: Some(acceptor),
        })
    }

    /// Port actually bound
    pub const fn port(&self) -> u16 {
        self.port
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send `signal` to every client. Returns how many received it.
    pub fn broadcast(&self, signal: Signal) -> usize {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("hub"; "no clients connected");
            return 0;
        }

        let msg = Message::Text(signal.as_token().to_string().into());
        clients.retain_mut(|ws| match ws.send(msg.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("hub"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("hub"; "sent `{}` to {} client(s)", signal, clients.len());
        clients.len()
    }
}

impl Drop for ReloadHub {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
    }
}

fn accept_loop(listener: &TcpListener, clients: &Clients, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => {
                // Handshake and sends are blocking
                let _ = stream.set_nonblocking(false);
                let _ = stream.set_read_timeout(Some(WRITE_TIMEOUT));
                if let Some(ws) = handshake(stream, addr) {
                    let mut clients = clients.lock();
                    clients.push(ws);
                    crate::debug!("hub"; "client connected (total: {})", clients.len());
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                crate::log!("hub"; "accept error: {}", e);
                std::thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

fn handshake(stream: TcpStream, addr: SocketAddr) -> Option<WebSocket<TcpStream>> {
    let only_reload_path = |req: &Request, resp: Response| {
        if req.uri().path() == RELOAD_PATH {
            Ok(resp)
        } else {
            let mut err = ErrorResponse::new(Some(format!("no endpoint at {}", req.uri().path())));
            *err.status_mut() = StatusCode::NOT_FOUND;
            Err(err)
        }
    };

    match tungstenite::accept_hdr(stream, only_reload_path) {
        Ok(ws) => {
            let _ = ws.get_ref().set_write_timeout(Some(WRITE_TIMEOUT));
            Some(ws)
        }
        Err(e) => {
            crate::debug!("hub"; "handshake with {} failed: {}", addr, e);
            None
        }
    }
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
            }
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind reload hub after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::connection::{self, Event};
    use std::net::Ipv4Addr;
    use tokio::sync::mpsc;
    use url::Url;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn endpoint(port: u16, path: &str) -> Url {
        Url::parse(&format!("ws://127.0.0.1:{port}{path}")).unwrap()
    }

    async fn wait_for_clients(hub: &ReloadHub, n: usize) {
        for _ in 0..100 {
            if hub.client_count() == n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("expected {n} client(s), have {}", hub.client_count());
    }

    #[test]
    fn test_busy_port_moves_on() {
        let taken = TcpListener::bind((LOCALHOST, 0)).unwrap();
        let busy = taken.local_addr().unwrap().port();

        let (_, port) = try_bind_port(LOCALHOST, busy, MAX_PORT_RETRIES).unwrap();
        assert_ne!(port, busy);
    }

    #[test]
    fn test_broadcast_without_clients() {
        let hub = ReloadHub::start(LOCALHOST, 0).unwrap();
        assert_eq!(hub.broadcast(Signal::Full), 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_connection() {
        let hub = ReloadHub::start(LOCALHOST, 0).unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        let reader = connection::open(endpoint(hub.port(), RELOAD_PATH), tx);
        wait_for_clients(&hub, 1).await;

        assert_eq!(hub.broadcast(Signal::Patch), 1);
        assert_eq!(rx.recv().await, Some(Event::Signal("reload".into())));

        drop(hub);
        assert!(matches!(rx.recv().await, Some(Event::Closed(_))));
        reader.join().unwrap();
    }

    #[tokio::test]
    async fn test_other_paths_rejected() {
        let hub = ReloadHub::start(LOCALHOST, 0).unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        connection::open(endpoint(hub.port(), "/socket"), tx);

        let Some(Event::Closed(reason)) = rx.recv().await else {
            panic!("expected the handshake to fail");
        };
        assert!(reason.contains("handshake"), "{reason}");
        assert_eq!(hub.client_count(), 0);
    }
}
