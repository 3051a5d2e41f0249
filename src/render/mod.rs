pub mod comment;

pub use comment::{build_lookup_query, build_set_statement, lookup_query, render_set_statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

#[derive(Debug, Clone)]
pub struct RenderedSql {
    pub safety: Safety,
    pub sql: String,
}

impl RenderedSql {
    pub fn new(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.safety == Safety::Destructive
    }
}

/// Quote an identifier. PostgreSQL identifiers cannot contain NUL, so
/// anything after one is dropped rather than passed to the server.
pub fn quote_ident(ident: &str) -> String {
    let ident = ident.split('\0').next().unwrap_or_default();
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a string literal. Backslashes switch to the `E'...'` form so the
/// result means the same thing whatever `standard_conforming_strings` is.
pub fn escape_string(s: &str) -> String {
    let escaped = s.replace('\'', "''");
    if escaped.contains('\\') {
        format!("E'{}'", escaped.replace('\\', "\\\\"))
    } else {
        format!("'{}'", escaped)
    }
}
