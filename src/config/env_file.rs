//! Reader and writer for shell-sourceable `KEY='value'` files
//!
//! Supports `#` comments, an optional `export ` prefix, single quotes (literal),
//! double quotes (backslash escapes for `"`, `\`, `$` and backtick), bare words
//! with backslash escapes, and quoted values spanning several lines.

use tracing::warn;

/// Parse file contents into `(key, value)` pairs in file order.
/// Malformed lines are skipped with a warning.
pub fn parse(contents: &str) -> Vec<(String, String)> {
    let mut lexer = Lexer::new(contents);
    let mut entries = Vec::new();

    while let Some(entry) = lexer.next_assignment() {
        entries.push(entry);
    }
    entries
}

/// Quote a value so that `parse` (and a POSIX shell) reads it back verbatim
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Whether `key` is a valid shell variable name
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn new(contents: &str) -> Self {
        Self {
            chars: contents.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_to_eol(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_inline_space(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
    }

    /// Rest of the current line is blank or a comment
    fn rest_of_line_is_trailer(&self) -> bool {
        self.chars[self.pos..]
            .iter()
            .take_while(|c| **c != '\n')
            .find(|c| !c.is_whitespace())
            .is_none_or(|c| *c == '#')
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            word.push(c);
            self.bump();
        }
        word
    }

    fn next_assignment(&mut self) -> Option<(String, String)> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            let c = self.peek()?;
            if c == '#' {
                self.skip_to_eol();
                continue;
            }

            let line = self.line;
            let mut key = self.read_word();
            if key == "export" && matches!(self.peek(), Some(' ' | '\t')) {
                self.skip_inline_space();
                key = self.read_word();
            }

            if self.peek() != Some('=') || !is_valid_key(&key) {
                warn!(line, key = %key, "skipping malformed config line");
                self.skip_to_eol();
                continue;
            }
            self.bump();
            self.skip_inline_space();

            let value = self.read_value();
            return Some((key, value));
        }
    }

    fn read_value(&mut self) -> String {
        let mut value = String::new();

        while let Some(c) = self.peek() {
            match c {
                '\n' => break,
                '\'' => {
                    self.bump();
                    while let Some(inner) = self.bump() {
                        if inner == '\'' {
                            break;
                        }
                        value.push(inner);
                    }
                }
                '"' => {
                    self.bump();
                    while let Some(inner) = self.bump() {
                        match inner {
                            '"' => break,
                            '\\' => match self.peek() {
                                Some(next @ ('"' | '\\' | '$' | '`')) => {
                                    self.bump();
                                    value.push(next);
                                }
                                Some('\n') => {
                                    self.bump();
                                }
                                _ => value.push('\\'),
                            },
                            other => value.push(other),
                        }
                    }
                }
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some('\n') | None => {}
                        Some(escaped) => value.push(escaped),
                    }
                }
                c if c.is_whitespace() => {
                    if self.rest_of_line_is_trailer() {
                        self.skip_to_eol();
                        break;
                    }
                    // Unquoted spaces are kept for files written by hand
                    value.push(c);
                    self.bump();
                }
                other => {
                    value.push(other);
                    self.bump();
                }
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(contents: &str) -> Vec<(String, String)> {
        parse(contents)
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_parse_quoting_styles() {
        let contents = "\
# comment line
API_HOST='unified-gateway.example.com'
LATITUDE=37.7897
USER_AGENT=\"DoorDashConsumer/Android 16.0.0\"
export LOCALE=en-US
";
        assert_eq!(
            parsed(contents),
            vec![
                pair("API_HOST", "unified-gateway.example.com"),
                pair("LATITUDE", "37.7897"),
                pair("USER_AGENT", "DoorDashConsumer/Android 16.0.0"),
                pair("LOCALE", "en-US"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_and_null_values() {
        let contents = "CURSOR=\nAUTHORIZATION_TOKEN=null\nCOOKIE=''\n";
        assert_eq!(
            parsed(contents),
            vec![
                pair("CURSOR", ""),
                pair("AUTHORIZATION_TOKEN", "null"),
                pair("COOKIE", ""),
            ]
        );
    }

    #[test]
    fn test_parse_trailing_comment_after_value() {
        let contents = "SUBMARKET_ID='1'   # San Francisco\nDISTRICT_ID=14 # mission\n";
        assert_eq!(
            parsed(contents),
            vec![pair("SUBMARKET_ID", "1"), pair("DISTRICT_ID", "14")]
        );
    }

    #[test]
    fn test_parse_hash_inside_quotes_is_value() {
        let contents = "COOKIE='a=1; b=#2'\n";
        assert_eq!(parsed(contents), vec![pair("COOKIE", "a=1; b=#2")]);
    }

    #[test]
    fn test_parse_unquoted_spaces_kept() {
        let contents = "USER_AGENT=Mozilla/5.0 (X11; Linux)\n";
        assert_eq!(parsed(contents), vec![pair("USER_AGENT", "Mozilla/5.0 (X11; Linux)")]);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let contents = "not an assignment\n1BAD=x\nGOOD=yes\n";
        assert_eq!(parsed(contents), vec![pair("GOOD", "yes")]);
    }

    #[test]
    fn test_parse_multiline_single_quoted_value() {
        let contents = "REALTIME_EVENTS='[\n  {\"a\": 1}\n]'\nNEXT=2\n";
        assert_eq!(
            parsed(contents),
            vec![pair("REALTIME_EVENTS", "[\n  {\"a\": 1}\n]"), pair("NEXT", "2")]
        );
    }

    #[test]
    fn test_quote_survives_parse() {
        let tricky = [
            "plain",
            "",
            "it's quoted",
            r#"{"dd_device_id":"abc","x":'y'}"#,
            "$HOME and `cmd` and \\backslash",
            "trailing space ",
            "# not a comment",
            "línea ✓",
        ];
        for value in tricky {
            let line = format!("KEY={}\n", quote(value));
            assert_eq!(parsed(&line), vec![pair("KEY", value)], "value: {value:?}");
        }
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("API_HOST"));
        assert!(is_valid_key("_private"));
        assert!(!is_valid_key("9LIVES"));
        assert!(!is_valid_key("with-dash"));
        assert!(!is_valid_key(""));
    }
}
