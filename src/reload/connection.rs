//! Connection Manager
//!
//! One WebSocket per page load. The reader runs on its own thread with
//! blocking I/O and forwards every text frame to the session verbatim:
//!
//! ```text
//! dev server --text--> reader thread --Event::Signal--> session
//!            --close-->               --Event::Closed-->
//! ```
//!
//! The connection is never resumed. Losing it ends the page session, and the
//! reload that follows opens a fresh one.

use std::io::ErrorKind;
use std::net::TcpStream;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc;
use tungstenite::protocol::Message;
use tungstenite::{Error as WsError, WebSocket};
use url::Url;

/// Endpoint path of the reload channel.
pub const RELOAD_PATH: &str = "/__reload";

/// Port the dev server broadcasts on when none is configured.
pub const DEFAULT_SOCKET_PORT: u16 = 3001;

/// How often the reader wakes up to see whether its session is gone.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// What the reader thread reports to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A text frame, untouched
    Signal(String),
    /// The channel is gone (close frame, read error, or never connected)
    Closed(String),
}

/// `ws://<page host>:3001/__reload`
pub fn default_endpoint(page: &Url) -> Result<Url> {
    let host = page
        .host_str()
        .ok_or_else(|| anyhow!("page url `{}` has no host", page))?;
    let endpoint = format!("ws://{host}:{DEFAULT_SOCKET_PORT}{RELOAD_PATH}");
    Url::parse(&endpoint).with_context(|| format!("invalid socket url `{endpoint}`"))
}

/// Open the reload channel on a background thread.
///
/// Exactly one `Event::Closed` is sent when the channel ends, including when
/// the connection could not be established at all.
pub fn open(endpoint: Url, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let reason = match connect(&endpoint) {
            Ok(ws) => {
                crate::debug!("ws"; "connected to {}", endpoint);
                read_loop(ws, &tx)
            }
            Err(e) => format!("{e:#}"),
        };
        crate::debug!("ws"; "channel closed: {}", reason);
        let _ = tx.blocking_send(Event::Closed(reason));
    })
}

fn connect(endpoint: &Url) -> Result<WebSocket<TcpStream>> {
    let addrs = endpoint
        .socket_addrs(|| Some(DEFAULT_SOCKET_PORT))
        .with_context(|| format!("cannot resolve {endpoint}"))?;
    let stream =
        TcpStream::connect(&*addrs).with_context(|| format!("cannot connect to {endpoint}"))?;

    let (ws, _) = tungstenite::client(endpoint.as_str(), stream)
        .map_err(|e| anyhow!("handshake with {endpoint} failed: {e}"))?;
    ws.get_ref().set_read_timeout(Some(READ_TIMEOUT))?;
    Ok(ws)
}

/// Forward frames until the channel ends. Returns why it ended.
fn read_loop(mut ws: WebSocket<TcpStream>, tx: &mpsc::Sender<Event>) -> String {
    loop {
        // Session gone: nobody will act on further messages
        if tx.is_closed() {
            let _ = ws.close(None);
            let _ = ws.flush();
            return "session ended".into();
        }

        match ws.read() {
            Ok(Message::Text(text)) => {
                if tx.blocking_send(Event::Signal(text.as_str().to_owned())).is_err() {
                    let _ = ws.close(None);
                    return "session ended".into();
                }
            }
            Ok(Message::Close(frame)) => {
                return match frame {
                    Some(frame) if !frame.reason.is_empty() => {
                        format!("server closed: {}", frame.reason.as_str())
                    }
                    _ => "server closed".into(),
                };
            }
            Ok(_) => {}
            Err(WsError::Io(e)) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => return e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_uses_page_host() {
        let page = Url::parse("http://localhost:3000/docs/intro").unwrap();
        assert_eq!(
            default_endpoint(&page).unwrap().as_str(),
            "ws://localhost:3001/__reload"
        );

        let page = Url::parse("https://192.168.1.20/").unwrap();
        assert_eq!(
            default_endpoint(&page).unwrap().as_str(),
            "ws://192.168.1.20:3001/__reload"
        );
    }

    #[test]
    fn test_default_endpoint_needs_host() {
        let page = Url::parse("data:text/html,hello").unwrap();
        assert!(default_endpoint(&page).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_closed() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let endpoint = Url::parse(&format!("ws://127.0.0.1:{port}{RELOAD_PATH}")).unwrap();
        let (tx, mut rx) = mpsc::channel(4);

        let handle = open(endpoint, tx);

        assert!(matches!(rx.recv().await, Some(Event::Closed(_))));
        assert_eq!(rx.recv().await, None);
        handle.join().unwrap();
    }
}
