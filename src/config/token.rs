//! Authorization token state and resolution

use tracing::info;

use super::Configuration;
use crate::constants::{config::NULL_SENTINEL, http::AUTH_SCHEME, keys};
use crate::error::TokenError;

/// Token as configured. `Null` is the sentinel for "no token configured",
/// `Empty` an explicitly empty assignment. Neither can be sent.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthToken {
    Null,
    Empty,
    Value(String),
}

impl AuthToken {
    /// Interpret a raw config value; a missing key is the sentinel
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => AuthToken::Null,
            Some(value) if value.trim().eq_ignore_ascii_case(NULL_SENTINEL) => AuthToken::Null,
            Some(value) => {
                let token = normalize(value);
                if token.is_empty() {
                    AuthToken::Empty
                } else {
                    AuthToken::Value(token)
                }
            }
        }
    }

    /// The token if it can be sent
    pub fn usable(&self) -> Option<&str> {
        match self {
            AuthToken::Value(token) => Some(token),
            AuthToken::Null | AuthToken::Empty => None,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.usable().is_some()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthToken::Null => f.write_str("Null"),
            AuthToken::Empty => f.write_str("Empty"),
            AuthToken::Value(token) => write!(f, "Value({})", mask_token(token)),
        }
    }
}

/// Strip whitespace and a pasted `JWT ` scheme prefix
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == AUTH_SCHEME.trim_end() {
        return String::new();
    }
    trimmed
        .strip_prefix(AUTH_SCHEME)
        .map(str::trim)
        .unwrap_or(trimmed)
        .to_string()
}

/// Short, non-reversible rendering for logs and displays
pub fn mask_token(token: &str) -> String {
    let visible = crate::constants::display::TOKEN_VISIBLE_CHARS;
    let count = token.chars().count();
    if count <= visible {
        return format!("*** ({count} chars)");
    }
    let head: String = token.chars().take(visible).collect();
    format!("{head}... ({count} chars)")
}

/// Make sure `config` carries a usable token before any request is attempted.
///
/// Order: non-empty `cli_override`, then the configured token, then `prompt`
/// (only when running interactively). Fails with `TokenError::Missing` when all
/// of them come up empty.
pub fn resolve(
    mut config: Configuration,
    cli_override: Option<&str>,
    prompt: Option<&mut dyn FnMut() -> Option<String>>,
) -> Result<Configuration, TokenError> {
    if let Some(token) = cli_override.map(normalize).filter(|t| !t.is_empty()) {
        info!("using authorization token from command line");
        config.set(keys::AUTHORIZATION_TOKEN, token);
        return Ok(config);
    }

    if config.token().is_usable() {
        return Ok(config);
    }

    let Some(prompt) = prompt else {
        return Err(TokenError::Missing);
    };

    match prompt().map(|t| normalize(&t)).filter(|t| !t.is_empty()) {
        Some(token) => {
            config.set(keys::AUTHORIZATION_TOKEN, token);
            Ok(config)
        }
        None => Err(TokenError::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_token(raw: Option<&str>) -> Configuration {
        let mut config = Configuration::new();
        config.set(keys::API_HOST, "api.example.com");
        if let Some(raw) = raw {
            config.set(keys::AUTHORIZATION_TOKEN, raw);
        }
        config
    }

    #[test]
    fn test_from_raw_distinguishes_sentinel_and_empty() {
        assert_eq!(AuthToken::from_raw(None), AuthToken::Null);
        assert_eq!(AuthToken::from_raw(Some("null")), AuthToken::Null);
        assert_eq!(AuthToken::from_raw(Some("NULL")), AuthToken::Null);
        assert_eq!(AuthToken::from_raw(Some("")), AuthToken::Empty);
        assert_eq!(AuthToken::from_raw(Some("   ")), AuthToken::Empty);
        assert_eq!(AuthToken::from_raw(Some("JWT ")), AuthToken::Empty);
        assert_eq!(
            AuthToken::from_raw(Some("JWT eyJabc")),
            AuthToken::Value("eyJabc".to_string())
        );
    }

    #[test]
    fn test_debug_masks_value() {
        let token = AuthToken::Value("eyJhbGciOiJIUzI1NiJ9.secret".to_string());
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.starts_with("Value(eyJhbG..."));
    }

    #[test]
    fn test_mask_token_short_value() {
        assert_eq!(mask_token("abc"), "*** (3 chars)");
    }

    #[test]
    fn test_resolve_null_token_non_interactive_fails() {
        let config = config_with_token(Some("null"));
        assert_eq!(resolve(config, None, None).unwrap_err(), TokenError::Missing);
    }

    #[test]
    fn test_resolve_missing_key_non_interactive_fails() {
        let config = config_with_token(None);
        assert_eq!(resolve(config, None, None).unwrap_err(), TokenError::Missing);
    }

    #[test]
    fn test_resolve_cli_override_wins() {
        let config = config_with_token(Some("from-file"));
        let resolved = resolve(config, Some("JWT from-cli"), None).unwrap();
        assert_eq!(resolved.token(), AuthToken::Value("from-cli".to_string()));
    }

    #[test]
    fn test_resolve_blank_override_falls_back_to_config() {
        let config = config_with_token(Some("from-file"));
        let resolved = resolve(config, Some("  "), None).unwrap();
        assert_eq!(resolved.token(), AuthToken::Value("from-file".to_string()));
    }

    #[test]
    fn test_resolve_prompts_when_empty() {
        let config = config_with_token(Some(""));
        let mut asked = 0;
        let mut prompt = || {
            asked += 1;
            Some("typed-token\n".to_string())
        };
        let resolved = resolve(config, None, Some(&mut prompt)).unwrap();
        assert_eq!(asked, 1);
        assert_eq!(resolved.token(), AuthToken::Value("typed-token".to_string()));
    }

    #[test]
    fn test_resolve_prompt_left_empty_fails() {
        let config = config_with_token(Some("null"));
        let mut prompt = || Some(String::new());
        assert_eq!(
            resolve(config, None, Some(&mut prompt)).unwrap_err(),
            TokenError::Missing
        );
    }

    #[test]
    fn test_resolve_does_not_prompt_when_configured() {
        let config = config_with_token(Some("configured"));
        let mut prompt = || -> Option<String> { panic!("prompt must not be called") };
        assert!(resolve(config, None, Some(&mut prompt)).is_ok());
    }
}
