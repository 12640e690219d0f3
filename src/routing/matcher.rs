//! Path pattern matching.
//!
//! # Responsibilities
//! - Translate route patterns (`/users/:id`, `/files/*rest`) into `matchit` syntax
//! - Match a request path against a single compiled pattern
//! - Return percent-decoded named captures
//!
//! # Design Decisions
//! - One `matchit` tree per route, so the dispatcher keeps declaration-order
//!   scanning and overlapping patterns never conflict at insert time
//! - Path matching is case-sensitive
//! - Braces in a pattern are literal characters

use matchit::Router;
use percent_encoding::percent_decode_str;

use crate::http::request::PathParams;
use crate::routing::error::RouterError;

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    tree: Router<()>,
}

impl PathMatcher {
    /// Compile `pattern`. An empty pattern matches the root path.
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let route = to_matchit(pattern)?;
        let mut tree = Router::new();
        tree.insert(route, ())?;

        Ok(Self {
            pattern: pattern.to_string(),
            tree,
        })
    }

    /// The pattern this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match `path`, returning its captures on success.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let matched = self.tree.at(path).ok()?;

        let mut params = PathParams::new();
        for (name, value) in matched.params.iter() {
            params.insert(name, percent_decode_str(value).decode_utf8_lossy());
        }
        Some(params)
    }
}

/// Translate `:name` / `*name` segments into `{name}` / `{*name}`.
fn to_matchit(pattern: &str) -> Result<String, RouterError> {
    let route = if pattern.is_empty() { "/" } else { pattern };
    if !route.starts_with('/') {
        return Err(invalid(pattern, "must start with '/'"));
    }

    let mut out = String::with_capacity(route.len() + 8);
    let mut chars = route.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            ':' | '*' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(invalid(pattern, "parameter is missing a name"));
                }

                if ch == '*' {
                    if chars.peek().is_some() {
                        return Err(invalid(pattern, "catch-all must end the pattern"));
                    }
                    out.push_str("{*");
                } else {
                    out.push('{');
                }
                out.push_str(&name);
                out.push('}');
            }
            '{' => out.push_str("{{"),
            '}' => out.push_str("}}"),
            c => out.push(c),
        }
    }

    Ok(out)
}

fn invalid(pattern: &str, reason: &'static str) -> RouterError {
    RouterError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    }
}
