//! Request construction from a configuration snapshot
//!
//! `build` is pure: the returned `Request` owns all of its data, so edits made
//! to the configuration afterwards never reach a request already built.

pub mod curl;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::config::Configuration;
use crate::config::token::mask_token;
use crate::constants::{config::NULL_SENTINEL, display, http, keys};
use crate::error::BuildError;

pub use curl::{TokenDisplay, render_curl};

static LEGACY_CURSOR: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"cursor=([^&\s]+)"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported API endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endpoint {
    #[default]
    RealtimeRecommendation,
    Homepage,
    FeedMe,
    Experiments,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::RealtimeRecommendation,
        Endpoint::Homepage,
        Endpoint::FeedMe,
        Endpoint::Experiments,
    ];

    /// Name used in config files and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::RealtimeRecommendation => "realtime_recommendation",
            Endpoint::Homepage => "homepage",
            Endpoint::FeedMe => "feed_me",
            Endpoint::Experiments => "experiments",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::RealtimeRecommendation => "/cx/v3/feed/realtime_recommendation",
            Endpoint::Homepage => "/v3/feed/homepage",
            Endpoint::FeedMe => "/v3/feed/me",
            Endpoint::Experiments => "/v1/experiments/",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Experiments => Method::Post,
            _ => Method::Get,
        }
    }

    /// Endpoint served at `path`, ignoring a trailing slash or query string
    pub fn from_path(path: &str) -> Option<Endpoint> {
        let path = path.trim();
        let path = path.split_once('?').map_or(path, |(head, _)| head);
        let path = path.trim_end_matches('/');
        Endpoint::ALL
            .into_iter()
            .find(|e| e.path().trim_end_matches('/') == path)
    }

    /// Consumer BFF endpoints expect the facet feature headers
    fn wants_bff_headers(&self) -> bool {
        matches!(self, Endpoint::Homepage | Endpoint::FeedMe)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Endpoint::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Endpoint::ALL.iter().map(Endpoint::name).collect();
                format!("unknown endpoint '{s}': expected one of {}", names.join(", "))
            })
    }
}

/// Fully built HTTP request. Query and headers keep their emission order.
#[derive(Clone, PartialEq, Eq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub method: Method,
    /// Scheme, host and path without the query string
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    /// URL with the percent-encoded query string appended
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.url, query.join("&"))
    }

    /// First header named `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, String)> = self
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), display_header_value(k, v)))
            .collect();
        f.debug_struct("Request")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query)
            .field("headers", &headers)
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .finish()
    }
}

/// Header value safe to show a human: the token is always masked
pub fn display_header_value(name: &str, value: &str) -> String {
    if name.eq_ignore_ascii_case("authorization") {
        mask_authorization(value)
    } else {
        value.to_string()
    }
}

pub fn mask_authorization(value: &str) -> String {
    match value.strip_prefix(http::AUTH_SCHEME) {
        Some("") => format!("{}(empty)", http::AUTH_SCHEME),
        Some(token) => format!("{}{}", http::AUTH_SCHEME, mask_token(token)),
        None => mask_token(value),
    }
}

/// Split `API_HOST` into (scheme, bare host)
fn split_host(raw: &str) -> (&'static str, String) {
    let raw = raw.trim();
    let (scheme, rest) = if let Some(rest) = raw.strip_prefix("https://") {
        ("https://", rest)
    } else if let Some(rest) = raw.strip_prefix("http://") {
        ("http://", rest)
    } else {
        (http::DEFAULT_SCHEME, raw)
    };
    (scheme, rest.trim_end_matches('/').to_string())
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Join multi-line values (pretty JSON, wrapped cookies) onto one line
fn single_line(value: &str) -> String {
    if !value.contains(['\r', '\n']) {
        return value.to_string();
    }
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bytes an HTTP header value may carry: visible text, space, tab
fn is_valid_header_value(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (b >= b' ' && b != 0x7f))
}

/// Cursor to send, if any. An explicit `CURSOR` wins and `null` disables
/// the cursor outright; only an empty `CURSOR` falls back to a legacy
/// `cursor=...` token inside the realtime events value.
fn effective_cursor(config: &Configuration) -> Option<String> {
    let cursor = config.value(keys::CURSOR).trim();
    if cursor.eq_ignore_ascii_case(NULL_SENTINEL) {
        return None;
    }
    if !cursor.is_empty() {
        return Some(cursor.to_string());
    }

    let events = config.value(keys::REALTIME_EVENTS);
    if !events.contains(http::LEGACY_CURSOR_MARKER) {
        return None;
    }
    let re = LEGACY_CURSOR.as_ref().ok()?;
    re.captures(events)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Realtime events header value without any trailing legacy cursor
fn events_header(config: &Configuration) -> &str {
    let events = config.value(keys::REALTIME_EVENTS);
    let marker = format!(" {}", http::LEGACY_CURSOR_MARKER);
    match events.split_once(marker.as_str()) {
        Some((head, _)) => head,
        None => events,
    }
}

fn query_for(config: &Configuration, endpoint: Endpoint) -> Vec<(String, String)> {
    let params: &[(&str, &str)] = match endpoint {
        Endpoint::RealtimeRecommendation => &[
            ("common_fields.lat", keys::LATITUDE),
            ("common_fields.lng", keys::LONGITUDE),
            ("common_fields.submarket_id", keys::SUBMARKET_ID),
            ("common_fields.district_id", keys::DISTRICT_ID),
        ],
        Endpoint::Homepage | Endpoint::FeedMe => &[("lat", keys::LATITUDE), ("lng", keys::LONGITUDE)],
        Endpoint::Experiments => return Vec::new(),
    };

    let mut query: Vec<(String, String)> = params
        .iter()
        .filter_map(|(name, key)| non_empty(config.value(key)).map(|v| (name.to_string(), v.to_string())))
        .collect();
    if let Some(cursor) = effective_cursor(config) {
        query.push(("cursor".to_string(), cursor));
    }
    query
}

const BFF_HEADERS: &[(&str, &str)] = &[
    ("x-facets-feature-item-carousel", "true"),
    ("x-facets-feature-backend-driven-badges", "true"),
    ("x-facets-feature-no-tile", "true"),
    ("x-facets-feature-item-steppers", "true"),
    ("x-facets-feature-quick-add-stepper-variant", "true"),
    ("x-facets-feature-store-carousel-redesign-round-1", "treatmentVariant2"),
    ("x-facets-feature-store-cell-redesign-round-3", "treatmentVariant3"),
    ("x-gifting-intent", "false"),
    ("traceparent", "00-0779dd623e69dfc82a93b7b553698d95-525a785c689917fe-00"),
    ("baggage", "dd-instrumentation.priority=1.0"),
];

fn experiments_body(config: &Configuration) -> String {
    let submarket = non_empty(config.value(keys::SUBMARKET_ID)).unwrap_or("1");
    let body = json!({
        "namespaces": [],
        "legacy_namespaces": [],
        "application": "consumer",
        "app_version": "16.0.0-prod-debug",
        "exposures_enabled": true,
        "os": "Android",
        "os_version": "16",
        "context": {
            "device_id": "78158b794698adba",
            "device_region": "US",
            "device_manufacturer": "Google",
            "device_model": "sdk_gphone64_arm64",
            "os_version": "36",
            "language": "en",
            "language_tag": "en-US",
            "saved_info_user_id": "196174870",
            "consumer_id": "195442085",
            "submarket_id": submarket,
            "country_code": "US",
            "is_guest": "false",
            "team_id": "eef7656a-b0e1-4f34-a35e-4c3cc3f4a640",
            "user_id": "196174870"
        },
        "dv_names": [
            "mobile-feature-client-side-default",
            "mobile-feature-multifeature-holdout",
            "mobile-dv-telemetry-timeout-flag",
            "mobile-feature-fetch-by-dv-list",
            "android_async_dv_refresh_cutoff_time"
        ],
        "evaluation_options": {
            "reference_exposure_enabled": true,
            "client_side_default_enabled": false
        }
    });
    serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
}

/// Build the request for `endpoint` from `config`.
///
/// Empty query parameters and headers are left out entirely; `authorization`
/// is always present as `JWT <token>`.
pub fn build(config: &Configuration, endpoint: Endpoint) -> Result<Request, BuildError> {
    let (scheme, host) = split_host(config.value(keys::API_HOST));
    if host.is_empty() {
        return Err(BuildError::MissingHost);
    }

    let token = config.token();
    let authorization = format!("{}{}", http::AUTH_SCHEME, token.usable().unwrap_or(""));

    let candidates: [(&str, &'static str, &str); 18] = [
        ("Host", keys::API_HOST, host.as_str()),
        ("Cookie", keys::COOKIE, config.value(keys::COOKIE)),
        ("x-facets-version", keys::FACETS_VERSION, config.value(keys::FACETS_VERSION)),
        ("x-facets-feature-store", keys::FACETS_FEATURE_STORE, config.value(keys::FACETS_FEATURE_STORE)),
        ("x-realtime-recommendation-events", keys::REALTIME_EVENTS, events_header(config)),
        ("authorization", keys::AUTHORIZATION_TOKEN, authorization.as_str()),
        ("accept-language", keys::ACCEPT_LANGUAGE, config.value(keys::ACCEPT_LANGUAGE)),
        ("x-session-id", keys::SESSION_ID, config.value(keys::SESSION_ID)),
        ("x-client-request-id", keys::CLIENT_REQUEST_ID, config.value(keys::CLIENT_REQUEST_ID)),
        ("x-correlation-id", keys::CORRELATION_ID, config.value(keys::CORRELATION_ID)),
        ("client-version", keys::CLIENT_VERSION, config.value(keys::CLIENT_VERSION)),
        ("user-agent", keys::USER_AGENT, config.value(keys::USER_AGENT)),
        ("x-experience-id", keys::EXPERIENCE_ID, config.value(keys::EXPERIENCE_ID)),
        (
            "x-support-partner-dashpass",
            keys::SUPPORT_PARTNER_DASHPASS,
            config.value(keys::SUPPORT_PARTNER_DASHPASS),
        ),
        ("dd-ids", keys::DD_IDS, config.value(keys::DD_IDS)),
        ("dd-user-locale", keys::USER_LOCALE, config.value(keys::USER_LOCALE)),
        ("x-bff-error-format", keys::BFF_ERROR_FORMAT, config.value(keys::BFF_ERROR_FORMAT)),
        ("dd-location-context", keys::DD_LOCATION_CONTEXT, config.value(keys::DD_LOCATION_CONTEXT)),
    ];

    let mut headers = Vec::with_capacity(candidates.len());
    for (name, key, value) in candidates {
        let value = match name {
            // Sent verbatim, the scheme tag keeps its trailing space
            "authorization" => value.to_string(),
            _ => match non_empty(value) {
                Some(value) => single_line(value),
                None => continue,
            },
        };
        if !is_valid_header_value(&value) {
            return Err(BuildError::InvalidHeaderValue { key });
        }
        headers.push((name.to_string(), value));
    }

    if endpoint.wants_bff_headers() {
        headers.extend(BFF_HEADERS.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    }

    let body = match endpoint.method() {
        Method::Post => {
            headers.push(("content-type".to_string(), http::JSON_CONTENT_TYPE.to_string()));
            Some(experiments_body(config))
        }
        Method::Get => None,
    };

    Ok(Request {
        endpoint,
        method: endpoint.method(),
        url: format!("{scheme}{host}{}", endpoint.path()),
        query: query_for(config, endpoint),
        headers,
        body,
    })
}

/// Human-readable description of `request` with the token masked
pub fn render_request_details(request: &Request) -> String {
    let rule = "=".repeat(display::RULE_WIDTH);
    let mut out = format!("API REQUEST DETAILS\n{rule}\n\n");
    out.push_str(&format!("Request URL:\n{}\n\n", request.full_url()));
    out.push_str(&format!("Base URL: {}\n", request.url));
    out.push_str(&format!("Endpoint: {}\n\n", request.endpoint));

    out.push_str("Query parameters:\n");
    if request.query.is_empty() {
        out.push_str("  (No query parameters)\n");
    }
    for (key, value) in &request.query {
        out.push_str(&format!("  - {key}: {value}\n"));
    }

    out.push_str("\nRequest headers:\n");
    for (key, value) in &request.headers {
        let value = truncate(&display_header_value(key, value), display::HEADER_PREVIEW_CHARS);
        out.push_str(&format!("  - {key}: {value}\n"));
    }

    out.push_str(&format!("\nMethod: {}\n", request.method));
    match &request.body {
        Some(body) => out.push_str(&format!("Body:\n{body}\n")),
        None => out.push_str("Body: (none)\n"),
    }
    out.push_str(&format!("{rule}\n"));
    out
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let head: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}
