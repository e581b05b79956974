//! Command-line driver: load, build, send, print

use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use crate::config::{Configuration, token};
use crate::constants::{http::DEFAULT_TIMEOUT_SECS, keys};
use crate::error::NetworkError;
use crate::executor::ExecuteOptions;
use crate::interpret::{self, Report};
use crate::pipeline;
use crate::request::{self, Endpoint, Request, TokenDisplay};

/// Send one request to the recommendation API and print what came back
#[derive(Debug, Parser)]
#[command(name = "feedprobe", version, about = "Realtime recommendation API probe")]
pub struct Cli {
    /// Show request details, the full response body and extra summary fields
    #[arg(short, long)]
    pub verbose: bool,

    /// Authorization token, without the JWT prefix (overrides AUTHORIZATION_TOKEN)
    #[arg(short, long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Config file (default: $FEEDPROBE_CONFIG, ./config.env, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Endpoint: realtime_recommendation, homepage, feed_me or experiments
    #[arg(long, value_name = "NAME")]
    pub endpoint: Option<Endpoint>,

    /// Response field to list (overrides EXTRACT_FIELD)
    #[arg(long, value_name = "NAME")]
    pub field: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Print the equivalent curl command instead of sending the request
    #[arg(long)]
    pub curl: bool,

    /// Show the real token in --curl output
    #[arg(long, requires = "curl")]
    pub unmasked: bool,

    /// Print the response report as JSON
    #[arg(long, conflicts_with = "curl")]
    pub json: bool,

    /// Open the desktop editor instead of sending a request
    #[arg(long, conflicts_with_all = ["curl", "json"])]
    pub gui: bool,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        Configuration::resolve_path(self.config.as_deref())
    }
}

/// Ask for a token on the terminal; `None` when nothing usable was entered
fn prompt_for_token() -> Option<String> {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "No authorization token configured.");
    let _ = write!(stderr, "Enter authorization token (without 'JWT '): ");
    let _ = stderr.flush();

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok()?;
    Some(line)
}

/// Load the configuration and build the request, prompting for a token if allowed.
///
/// Every error returned here is fatal for the CLI.
pub fn prepare(
    cli: &Cli,
    prompt: Option<&mut dyn FnMut() -> Option<String>>,
) -> Result<(Configuration, Request)> {
    let path = cli.config_path();
    let mut config = Configuration::load(&path)?;

    if let Some(endpoint) = cli.endpoint {
        config.set(keys::API_ENDPOINT, endpoint.name());
    }
    if let Some(field) = cli.field.as_deref().filter(|f| !f.trim().is_empty()) {
        config.set(keys::EXTRACT_FIELD, field.trim());
    }

    let config = token::resolve(config, cli.token.as_deref(), prompt)?;
    for warning in config.warnings() {
        warn!("{warning}");
    }

    let endpoint = config.endpoint();
    let request = request::build(&config, endpoint)?;
    info!(
        endpoint = %endpoint,
        method = %request.method,
        host = request.header("Host").unwrap_or_default(),
        "request built"
    );
    Ok((config, request))
}

/// Text printed for a completed request
pub fn render_report(report: &Report, verbose: bool, max_lines: usize) -> String {
    let mut out = interpret::render_summary(report, verbose);
    out.push('\n');
    out.push_str(&interpret::render_extracted(report));

    if !report.carousels.is_empty() {
        out.push('\n');
        out.push_str(&interpret::render_carousels(report));
    }
    if report.experiments.is_some() {
        out.push('\n');
        out.push_str(&interpret::render_experiments(report));
    }
    if verbose {
        out.push_str("\nRAW RESPONSE\n");
        out.push_str(&interpret::render_raw(report, Some(max_lines)));
        out.push('\n');
    } else if !report.is_success() {
        // Error bodies are short and are the only useful signal
        out.push_str("\nResponse body:\n");
        out.push_str(&interpret::render_raw(report, Some(max_lines)));
        out.push('\n');
    }
    out
}

fn report_network_error(err: &NetworkError) {
    warn!(error = %err, "request failed");
    eprintln!("Error: {err}");
}

/// Run the CLI. Returns `Err` only for failures that should exit non-zero.
pub fn run(cli: &Cli) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let mut prompt = prompt_for_token;
    let (config, request) = prepare(
        cli,
        if interactive {
            Some(&mut prompt as &mut dyn FnMut() -> Option<String>)
        } else {
            None
        },
    )?;

    if cli.curl {
        let display = if cli.unmasked {
            TokenDisplay::Full
        } else {
            TokenDisplay::Masked
        };
        println!("{}", request::render_curl(&request, display));
        return Ok(());
    }

    let verbose = cli.verbose || config.flag(keys::DEFAULT_VERBOSE);
    if verbose && !cli.json {
        println!("{}", request::render_request_details(&request));
    }

    let options = match ExecuteOptions::from_config(&config, Duration::from_secs(cli.timeout)) {
        Ok(options) => options,
        Err(err) => {
            report_network_error(&err);
            return Ok(());
        }
    };
    if let Some(proxy) = &options.proxy {
        info!(proxy = %proxy.addr(), "routing through proxy");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let field = config.extract_field().to_string();
    match runtime.block_on(pipeline::run(request, &options, &field)) {
        Ok(report) if cli.json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{json}");
        }
        Ok(report) => print!("{}", render_report(&report, verbose, config.max_verbose_lines())),
        Err(err) => report_network_error(&err),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthToken;
    use crate::error::{BuildError, ConfigError, TokenError};
    use crate::interpret::tests::outcome;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["feedprobe"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn write_config(dir: &TempDir, contents: &str) -> String {
        let path = dir.path().join("config.env");
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_token_flag_forms() {
        assert_eq!(cli(&["--token=abc"]).token.as_deref(), Some("abc"));
        assert_eq!(cli(&["-t", "abc"]).token.as_deref(), Some("abc"));
        assert_eq!(cli(&[]).timeout, 30);
    }

    #[test]
    fn test_endpoint_flag_parses() {
        assert_eq!(cli(&["--endpoint", "feed_me"]).endpoint, Some(Endpoint::FeedMe));
        assert!(Cli::try_parse_from(["feedprobe", "--endpoint", "nope"]).is_err());
        assert!(Cli::try_parse_from(["feedprobe", "--unmasked"]).is_err());
    }

    #[test]
    fn test_prepare_missing_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.env");
        let args = cli(&["--config", missing.to_str().unwrap()]);

        let err = prepare(&args, None).unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_prepare_null_token_non_interactive_is_token_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "API_HOST='api.example.com'\nAUTHORIZATION_TOKEN=null\n");

        let err = prepare(&cli(&["--config", path.as_str()]), None).unwrap_err();
        assert_eq!(err.downcast_ref::<TokenError>(), Some(&TokenError::Missing));
    }

    #[test]
    fn test_prepare_token_flag_and_overrides() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "API_HOST='api.example.com'\nAUTHORIZATION_TOKEN=null\nLATITUDE='37.7897'\n",
        );

        let (config, request) = prepare(
            &cli(&["--config", path.as_str(), "-t", "JWT flag-token", "--endpoint", "homepage", "--field", "title"]),
            None,
        )
        .unwrap();

        assert_eq!(config.token(), AuthToken::Value("flag-token".to_string()));
        assert_eq!(config.extract_field(), "title");
        assert_eq!(request.endpoint, Endpoint::Homepage);
        assert_eq!(request.header("authorization"), Some("JWT flag-token"));
    }

    #[test]
    fn test_prepare_missing_host_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "AUTHORIZATION_TOKEN='abc'\n");

        let err = prepare(&cli(&["--config", path.as_str()]), None).unwrap_err();
        assert_eq!(err.downcast_ref::<BuildError>(), Some(&BuildError::MissingHost));
    }

    #[test]
    fn test_render_report_sections() {
        let body = r#"{"data":[{"container_name":"Deals"},{"container_name":"Popular"}]}"#;
        let report = interpret::interpret(&outcome(200, body), "container_name");

        let terse = render_report(&report, false, 100);
        assert!(terse.contains("  1. Deals\n  2. Popular"));
        assert!(!terse.contains("RAW RESPONSE"));

        let verbose = render_report(&report, true, 100);
        assert!(verbose.contains("RAW RESPONSE\n{\n  \"data\""));
    }

    #[test]
    fn test_render_report_shows_error_body() {
        let report = interpret::interpret(&outcome(401, r#"{"error":"unauthorized"}"#), "container_name");
        let text = render_report(&report, false, 100);
        assert!(text.contains("FAILED (HTTP 401)"));
        assert!(text.contains("\"error\": \"unauthorized\""));
    }
}
