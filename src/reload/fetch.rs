//! Page fetching.
//!
//! [`Fetch`] is the seam the orchestrator pulls pages through. The real
//! implementation, [`HttpFetcher`], issues a blocking GET with `ureq` on
//! tokio's blocking pool so the session loop keeps running.

use std::time::Duration;

use url::Url;

use super::error::FetchError;

/// Retrieve the HTML of a page.
// Only driven on the current-thread runtime, so the futures need not be Send
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// One attempt. Retrying is the caller's business.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// HTTP fetcher backed by a shared `ureq` agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || get_html(&agent, &url))
            .await
            .map_err(|e| FetchError::Task(e.to_string()))?
    }
}

fn get_html(agent: &ureq::Agent, url: &str) -> Result<String, FetchError> {
    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
        Err(ureq::Error::Transport(e)) => return Err(FetchError::Network(e.to_string())),
    };

    let content_type = response.content_type().to_string();
    if !content_type.eq_ignore_ascii_case("text/html") {
        return Err(FetchError::NotHtml(content_type));
    }

    response
        .into_string()
        .map_err(|e| FetchError::Network(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tiny_http::{Header, Response, Server};

    /// Serve `pages` in order, repeating the last one.
    fn serve(pages: Vec<(u16, &'static str, &'static str)>) -> (Url, Arc<AtomicUsize>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, content_type, body) = pages[n.min(pages.len() - 1)];
                let header = Header::from_bytes("Content-Type", content_type).unwrap();
                let response = Response::from_data(body.as_bytes().to_vec())
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        (Url::parse(&format!("http://{addr}/docs")).unwrap(), hits)
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let (url, _) = serve(vec![(200, "text/html; charset=utf-8", "<body>ok</body>")]);
        let fetcher = HttpFetcher::new(Duration::from_secs(2));

        assert_eq!(fetcher.fetch(&url).await.unwrap(), "<body>ok</body>");
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_retryable() {
        let (url, _) = serve(vec![(503, "text/plain", "restarting")]);
        let fetcher = HttpFetcher::new(Duration::from_secs(2));

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(err, FetchError::Status(503));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_non_html_is_not_retryable() {
        let (url, _) = serve(vec![(200, "application/json", "{}")]);
        let fetcher = HttpFetcher::new(Duration::from_secs(2));

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(err, FetchError::NotHtml("application/json".into()));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_refused_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let fetcher = HttpFetcher::new(Duration::from_secs(2));

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
