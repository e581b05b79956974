//! Catalog of known configuration parameters
//!
//! Drives file section layout on save and the GUI editor tabs. Keys that are not
//! listed here are still loaded, edited and saved, just without metadata.

use crate::constants::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Api,
    Session,
    Location,
    Advanced,
    Proxy,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Api,
        Category::Session,
        Category::Location,
        Category::Advanced,
        Category::Proxy,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Category::Api => "API Settings",
            Category::Session => "Session & Headers",
            Category::Location => "Location & Context",
            Category::Advanced => "Events & Advanced",
            Category::Proxy => "Proxy",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    pub key: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub description: &'static str,
    /// Masked in the editor and never logged
    pub sensitive: bool,
}

const fn param(
    key: &'static str,
    label: &'static str,
    category: Category,
    description: &'static str,
) -> Parameter {
    Parameter {
        key,
        label,
        category,
        description,
        sensitive: false,
    }
}

pub const PARAMETERS: &[Parameter] = &[
    param(keys::API_HOST, "API Host", Category::Api, "Host name, optionally with scheme"),
    param(
        keys::API_ENDPOINT,
        "Endpoint",
        Category::Api,
        "realtime_recommendation, homepage, feed_me or experiments",
    ),
    param(keys::EXPERIENCE_ID, "Experience ID", Category::Api, "e.g. doordash"),
    Parameter {
        key: keys::AUTHORIZATION_TOKEN,
        label: "Authorization Token",
        category: Category::Api,
        description: "JWT without the scheme prefix; null when unset",
        sensitive: true,
    },
    param(keys::USER_AGENT, "User Agent", Category::Api, ""),
    param(keys::CLIENT_VERSION, "Client Version", Category::Api, ""),
    param(keys::COOKIE, "Cookie", Category::Session, "Raw cookie header"),
    param(keys::SESSION_ID, "Session ID", Category::Session, ""),
    param(keys::CLIENT_REQUEST_ID, "Client Request ID", Category::Session, ""),
    param(keys::CORRELATION_ID, "Correlation ID", Category::Session, ""),
    param(keys::FACETS_VERSION, "Facets Version", Category::Session, "e.g. 4.0.0"),
    param(keys::FACETS_FEATURE_STORE, "Feature Store", Category::Session, "e.g. treatmentVariant3"),
    param(keys::ACCEPT_LANGUAGE, "Accept Language", Category::Session, "e.g. en-US"),
    param(keys::USER_LOCALE, "User Locale", Category::Session, "e.g. en-US"),
    param(keys::LATITUDE, "Latitude", Category::Location, ""),
    param(keys::LONGITUDE, "Longitude", Category::Location, ""),
    param(keys::SUBMARKET_ID, "Submarket ID", Category::Location, ""),
    param(keys::DISTRICT_ID, "District ID", Category::Location, ""),
    param(keys::DD_IDS, "Device IDs", Category::Location, "JSON blob sent as dd-ids"),
    param(
        keys::DD_LOCATION_CONTEXT,
        "Location Context",
        Category::Location,
        "Base64 blob sent as dd-location-context",
    ),
    param(keys::REALTIME_EVENTS, "Realtime Events", Category::Advanced, "JSON event list"),
    param(keys::BFF_ERROR_FORMAT, "BFF Error Format", Category::Advanced, "e.g. v2"),
    param(
        keys::SUPPORT_PARTNER_DASHPASS,
        "Partner Dashpass",
        Category::Advanced,
        "true or false",
    ),
    param(keys::CURSOR, "Cursor", Category::Advanced, "Omitted from the request when empty"),
    param(
        keys::EXTRACT_FIELD,
        "Extract Field",
        Category::Advanced,
        "Response field listed in the Extracted view",
    ),
    param(keys::DEFAULT_VERBOSE, "Default Verbose", Category::Advanced, "true or false"),
    param(keys::MAX_VERBOSE_LINES, "Max Verbose Lines", Category::Advanced, "Raw lines printed by the CLI"),
    param(keys::USE_PROXY, "Use Proxy", Category::Proxy, "true routes requests through the proxy"),
    param(keys::PROXY_HOST, "Proxy Host", Category::Proxy, "default 127.0.0.1"),
    param(keys::PROXY_PORT, "Proxy Port", Category::Proxy, "default 8888"),
];

pub fn lookup(key: &str) -> Option<&'static Parameter> {
    PARAMETERS.iter().find(|p| p.key == key)
}

pub fn in_category(category: Category) -> impl Iterator<Item = &'static Parameter> {
    PARAMETERS.iter().filter(move |p| p.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let mut seen = HashSet::new();
        for p in PARAMETERS {
            assert!(seen.insert(p.key), "duplicate key {}", p.key);
        }
    }

    #[test]
    fn test_every_category_has_parameters() {
        for category in Category::ALL {
            assert!(in_category(category).next().is_some(), "{category:?} is empty");
        }
    }

    #[test]
    fn test_only_token_is_sensitive() {
        let sensitive: Vec<_> = PARAMETERS.iter().filter(|p| p.sensitive).map(|p| p.key).collect();
        assert_eq!(sensitive, vec![keys::AUTHORIZATION_TOKEN]);
    }
}
