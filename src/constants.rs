//! Application-wide constants
//!
//! This module contains the magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Configuration file location and format
pub mod config {
    /// Directory name under the user's config dir
    pub const APP_DIR: &str = "feedprobe";

    /// Config file name (shell-sourceable KEY='value' lines)
    pub const FILENAME: &str = "config.env";

    /// Suffix appended to the config path for the pre-save backup copy
    pub const BACKUP_SUFFIX: &str = ".backup";

    /// Environment variable that overrides the config path
    pub const PATH_ENV: &str = "FEEDPROBE_CONFIG";

    /// Literal written for (and read as) "no token configured"
    pub const NULL_SENTINEL: &str = "null";
}

/// Configuration parameter names
pub mod keys {
    pub const API_HOST: &str = "API_HOST";
    pub const API_ENDPOINT: &str = "API_ENDPOINT";
    pub const AUTHORIZATION_TOKEN: &str = "AUTHORIZATION_TOKEN";
    pub const EXPERIENCE_ID: &str = "EXPERIENCE_ID";
    pub const USER_AGENT: &str = "USER_AGENT";
    pub const CLIENT_VERSION: &str = "CLIENT_VERSION";

    pub const COOKIE: &str = "COOKIE";
    pub const SESSION_ID: &str = "SESSION_ID";
    pub const CLIENT_REQUEST_ID: &str = "CLIENT_REQUEST_ID";
    pub const CORRELATION_ID: &str = "CORRELATION_ID";
    pub const FACETS_VERSION: &str = "FACETS_VERSION";
    pub const FACETS_FEATURE_STORE: &str = "FACETS_FEATURE_STORE";
    pub const ACCEPT_LANGUAGE: &str = "ACCEPT_LANGUAGE";
    pub const USER_LOCALE: &str = "USER_LOCALE";

    pub const LATITUDE: &str = "LATITUDE";
    pub const LONGITUDE: &str = "LONGITUDE";
    pub const SUBMARKET_ID: &str = "SUBMARKET_ID";
    pub const DISTRICT_ID: &str = "DISTRICT_ID";
    pub const DD_IDS: &str = "DD_IDS";
    pub const DD_LOCATION_CONTEXT: &str = "DD_LOCATION_CONTEXT";

    pub const REALTIME_EVENTS: &str = "REALTIME_EVENTS";
    pub const BFF_ERROR_FORMAT: &str = "BFF_ERROR_FORMAT";
    pub const SUPPORT_PARTNER_DASHPASS: &str = "SUPPORT_PARTNER_DASHPASS";
    pub const CURSOR: &str = "CURSOR";
    pub const EXTRACT_FIELD: &str = "EXTRACT_FIELD";
    pub const DEFAULT_VERBOSE: &str = "DEFAULT_VERBOSE";
    pub const MAX_VERBOSE_LINES: &str = "MAX_VERBOSE_LINES";

    pub const USE_PROXY: &str = "USE_PROXY";
    pub const PROXY_HOST: &str = "PROXY_HOST";
    pub const PROXY_PORT: &str = "PROXY_PORT";

    /// Older files name the host and endpoint differently
    pub mod legacy {
        /// Host with scheme, e.g. `https://unified-gateway.example.com`
        pub const API_BASE_URL: &str = "API_BASE_URL";
        /// Endpoint path, e.g. `/v3/feed/me`
        pub const API_ENDPOINT_PATH: &str = "API_ENDPOINT_PATH";
    }
}

/// Outbound HTTP details
pub mod http {
    /// Authorization scheme tag, prefixed verbatim to the token
    pub const AUTH_SCHEME: &str = "JWT ";

    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Scheme used when API_HOST carries none
    pub const DEFAULT_SCHEME: &str = "https://";

    pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

    /// Legacy cursor marker embedded in REALTIME_EVENTS
    pub const LEGACY_CURSOR_MARKER: &str = "cursor=";
}

/// Proxy defaults for the interception workflow
pub mod proxy {
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const DEFAULT_PORT: &str = "8888";
}

/// Response interpretation
pub mod interpret {
    /// Field collected by the extraction pass when none is configured
    pub const DEFAULT_EXTRACT_FIELD: &str = "container_name";

    /// Store carousel component identification
    pub const CAROUSEL_ID_PREFIX: &str = "carousel.standard:store_carousel";
    pub const CAROUSEL_COMPONENT_ID: &str = "carousel.standard";
    pub const CAROUSEL_COMPONENT_CATEGORY: &str = "carousel";

    /// Top-level keys listed in the summary
    pub const SUMMARY_MAX_KEYS: usize = 10;
}

/// Display limits
pub mod display {
    /// Raw body lines printed when MAX_VERBOSE_LINES is unset or invalid
    pub const DEFAULT_MAX_LINES: usize = 100;

    /// Header values longer than this are truncated in request details
    pub const HEADER_PREVIEW_CHARS: usize = 100;

    /// Leading token characters kept when masking
    pub const TOKEN_VISIBLE_CHARS: usize = 6;

    /// Width of the `=` rules in rendered reports
    pub const RULE_WIDTH: usize = 50;
}
