//! Single-attempt HTTP execution
//!
//! Any HTTP status is a successful `Outcome`; only transport faults
//! (timeout, refused connection, unreachable proxy) are `NetworkError`s.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::Configuration;
use crate::constants::{http, keys, proxy};
use crate::error::NetworkError;
use crate::request::{Method, Request};

/// Interception proxy address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
}

impl ProxySettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOptions {
    pub timeout: Duration,
    pub proxy: Option<ProxySettings>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(http::DEFAULT_TIMEOUT_SECS),
            proxy: None,
        }
    }
}

impl ExecuteOptions {
    /// Options for `config`; the proxy is only used when `USE_PROXY` is set
    pub fn from_config(config: &Configuration, timeout: Duration) -> Result<Self, NetworkError> {
        if !config.flag(keys::USE_PROXY) {
            return Ok(Self { timeout, proxy: None });
        }

        let host = match config.value(keys::PROXY_HOST).trim() {
            "" => proxy::DEFAULT_HOST,
            host => host,
        };
        let port = match config.value(keys::PROXY_PORT).trim() {
            "" => proxy::DEFAULT_PORT,
            port => port,
        };
        let port: u16 = port
            .parse()
            .map_err(|_| NetworkError::InvalidProxy(format!("{host}:{port}")))?;

        Ok(Self {
            timeout,
            proxy: Some(ProxySettings {
                host: host.to_string(),
                port,
            }),
        })
    }
}

/// Captured response
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub elapsed: Duration,
    pub size_bytes: usize,
    pub method: Method,
    pub url: String,
    pub received_at: DateTime<Local>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Fail fast when the interception proxy is not listening
async fn check_proxy(settings: &ProxySettings, timeout: Duration) -> Result<(), NetworkError> {
    let addr = settings.addr();
    match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(_)) => {
            debug!(proxy = %addr, "proxy reachable");
            Ok(())
        }
        Ok(Err(e)) => {
            warn!(proxy = %addr, error = %e, "proxy not reachable");
            Err(NetworkError::ProxyUnreachable { addr })
        }
        Err(_) => {
            warn!(proxy = %addr, "proxy check timed out");
            Err(NetworkError::ProxyUnreachable { addr })
        }
    }
}

fn build_client(options: &ExecuteOptions, timeout: Duration) -> Result<reqwest::Client, NetworkError> {
    let builder = reqwest::Client::builder().timeout(timeout);
    let builder = match &options.proxy {
        Some(settings) => {
            let proxy = reqwest::Proxy::all(settings.url())
                .map_err(|_| NetworkError::InvalidProxy(settings.addr()))?;
            // Interception proxies re-sign TLS with their own CA
            builder.proxy(proxy).danger_accept_invalid_certs(true)
        }
        None => builder.no_proxy(),
    };
    builder
        .build()
        .map_err(|e| NetworkError::Transport(error_chain(&e)))
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn classify(err: reqwest::Error, timeout: Duration) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout(timeout)
    } else if err.is_connect() {
        NetworkError::Connect(error_chain(&err))
    } else {
        NetworkError::Transport(error_chain(&err))
    }
}

/// Time left for the exchange once `spent` has gone on the proxy check
fn remaining_budget(timeout: Duration, spent: Duration) -> Result<Duration, NetworkError> {
    let remaining = timeout.saturating_sub(spent);
    if remaining.is_zero() {
        warn!(timeout_secs = timeout.as_secs_f64(), "proxy check used the whole timeout");
        return Err(NetworkError::Timeout(timeout));
    }
    Ok(remaining)
}

/// Send `request` once and capture the response.
///
/// `options.timeout` bounds the whole call, proxy check included.
pub async fn execute(request: Request, options: &ExecuteOptions) -> Result<Outcome, NetworkError> {
    let call_started = Instant::now();
    if let Some(settings) = &options.proxy {
        check_proxy(settings, options.timeout).await?;
    }
    let remaining = remaining_budget(options.timeout, call_started.elapsed())?;

    let client = build_client(options, remaining)?;
    let url = request.full_url();
    let method = match request.method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
    };

    let mut builder = client.request(method, &url);
    for (name, value) in &request.headers {
        // reqwest derives Host from the URL
        if name.eq_ignore_ascii_case("host") {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }

    debug!(method = %request.method, url = %url, "sending request");
    let started = Instant::now();

    let exchange = async {
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, headers, body.to_vec()))
    };

    let (status, headers, body) = match tokio::time::timeout(remaining, exchange).await {
        Ok(Ok(parts)) => parts,
        Ok(Err(e)) => {
            let err = classify(e, options.timeout);
            warn!(error = %err, "request failed");
            return Err(err);
        }
        Err(_) => {
            warn!(timeout_secs = options.timeout.as_secs_f64(), "request timed out");
            return Err(NetworkError::Timeout(options.timeout));
        }
    };

    let elapsed = started.elapsed();
    let outcome = Outcome {
        status,
        headers,
        size_bytes: body.len(),
        body,
        elapsed,
        method: request.method,
        url,
        received_at: Local::now(),
    };

    if outcome.is_success() {
        info!(
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = outcome.size_bytes,
            "response received"
        );
    } else {
        warn!(
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = outcome.size_bytes,
            "non-success status received"
        );
    }
    Ok(outcome)
}
