//! Shell command rendering for "copy as cURL"

use super::{Method, Request, mask_authorization};

/// How the authorization header appears in the rendered command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDisplay {
    Masked,
    /// Real token, for the clipboard only
    Full,
}

/// Escape for a POSIX double-quoted string
fn escape_double(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render `request` as an equivalent curl invocation.
/// Output depends only on `request` and `token`.
pub fn render_curl(request: &Request, token: TokenDisplay) -> String {
    let mut lines = vec![format!(
        "curl -X {} \"{}\"",
        request.method,
        escape_double(&request.full_url())
    )];

    for (name, value) in &request.headers {
        let value = match token {
            TokenDisplay::Masked if name.eq_ignore_ascii_case("authorization") => mask_authorization(value),
            _ => value.clone(),
        };
        lines.push(format!("  -H \"{}: {}\"", escape_double(name), escape_double(&value)));
    }

    if let (Method::Post, Some(body)) = (request.method, &request.body) {
        lines.push(format!("  -d '{}'", body.replace('\'', r"'\''")));
    }
    lines.push("  --compressed".to_string());
    lines.join(" \\\n")
}
