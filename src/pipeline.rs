//! Request lifecycle shared by the CLI and the GUI
//!
//! The interactive surface never awaits a request itself: `dispatch` spawns the
//! work on a runtime and delivers a `RequestEvent` through a channel that the
//! caller drains from its own loop.

use std::sync::mpsc::Sender;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::NetworkError;
use crate::executor::{ExecuteOptions, execute};
use crate::interpret::{Report, interpret};
use crate::request::Request;

#[derive(Debug, Clone)]
pub enum RequestState {
    Idle,
    Requesting { started: Instant },
    Success(Box<Report>),
    Failed(NetworkError),
}

/// Completion message for a dispatched request
#[derive(Debug)]
pub enum RequestEvent {
    Finished(Result<Report, NetworkError>),
}

/// `Idle -> Requesting -> Success | Failed -> Idle`, one request at a time
#[derive(Debug)]
pub struct RequestCycle {
    state: RequestState,
}

impl Default for RequestCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestCycle {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_requesting(&self) -> bool {
        matches!(self.state, RequestState::Requesting { .. })
    }

    /// Enter `Requesting`. Returns false, changing nothing, if a request is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_requesting() {
            debug!("request already in flight, ignoring trigger");
            return false;
        }
        self.state = RequestState::Requesting {
            started: Instant::now(),
        };
        true
    }

    /// Record the result of the in-flight request
    pub fn finish(&mut self, result: Result<Report, NetworkError>) {
        if !self.is_requesting() {
            warn!("request result arrived with no request in flight, dropping it");
            return;
        }
        self.state = match result {
            Ok(report) => RequestState::Success(Box::new(report)),
            Err(err) => RequestState::Failed(err),
        };
    }

    /// Back to `Idle`; ignored while a request is in flight
    pub fn reset(&mut self) {
        if !self.is_requesting() {
            self.state = RequestState::Idle;
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match &self.state {
            RequestState::Success(report) => Some(report.as_ref()),
            _ => None,
        }
    }
}

/// Execute `request` and interpret the response
pub async fn run(request: Request, options: &ExecuteOptions, field: &str) -> Result<Report, NetworkError> {
    let outcome = execute(request, options).await?;
    Ok(interpret(&outcome, field))
}

/// Run `request` on `handle`, then send the result on `sender` and call `notify`
pub fn dispatch<F>(
    handle: &Handle,
    request: Request,
    options: ExecuteOptions,
    field: String,
    sender: Sender<RequestEvent>,
    notify: F,
) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    handle.spawn(async move {
        let result = run(request, &options, &field).await;
        if sender.send(RequestEvent::Finished(result)).is_err() {
            warn!("request finished after its receiver was dropped");
        }
        notify();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::constants::keys;
    use crate::interpret::tests::outcome;
    use crate::request::{Endpoint, build};
    use std::sync::mpsc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn report() -> Report {
        interpret(&outcome(200, r#"{"container_name":"Deals"}"#), "container_name")
    }

    #[test]
    fn test_cycle_success_path() {
        let mut cycle = RequestCycle::new();
        assert!(matches!(cycle.state(), RequestState::Idle));

        assert!(cycle.begin());
        assert!(cycle.is_requesting());
        cycle.finish(Ok(report()));
        assert_eq!(cycle.report().unwrap().extracted_items, vec!["Deals"]);

        cycle.reset();
        assert!(matches!(cycle.state(), RequestState::Idle));
    }

    #[test]
    fn test_cycle_ignores_second_trigger() {
        let mut cycle = RequestCycle::new();
        assert!(cycle.begin());
        assert!(!cycle.begin());
        cycle.reset();
        assert!(cycle.is_requesting());
    }

    #[test]
    fn test_cycle_failure_path() {
        let mut cycle = RequestCycle::new();
        cycle.begin();
        cycle.finish(Err(NetworkError::Timeout(Duration::from_secs(30))));
        assert!(matches!(cycle.state(), RequestState::Failed(NetworkError::Timeout(_))));
        assert!(cycle.report().is_none());
        // a new trigger is allowed once settled
        assert!(cycle.begin());
    }

    #[test]
    fn test_cycle_drops_stray_result() {
        let mut cycle = RequestCycle::new();
        cycle.finish(Ok(report()));
        assert!(matches!(cycle.state(), RequestState::Idle));
    }

    #[test]
    fn test_dispatch_delivers_event_and_notifies() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();

        let addr = rt.block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let body = r#"{"container_name":"Deals"}"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.ok();
            });
            addr
        });

        let mut config = Configuration::new();
        config.set(keys::API_HOST, format!("http://{addr}"));
        config.set(keys::AUTHORIZATION_TOKEN, "token");
        let request = build(&config, Endpoint::RealtimeRecommendation).unwrap();

        let (tx, rx) = mpsc::channel();
        let (notify_tx, notify_rx) = mpsc::channel();
        dispatch(
            rt.handle(),
            request,
            ExecuteOptions::default(),
            "container_name".to_string(),
            tx,
            move || {
                let _ = notify_tx.send(());
            },
        );

        let RequestEvent::Finished(result) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(result.unwrap().extracted_items, vec!["Deals"]);
        assert!(notify_rx.recv_timeout(Duration::from_secs(10)).is_ok());
    }
}
