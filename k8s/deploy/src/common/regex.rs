use crate::common::error::{RegexCompile, Result};
use regex::Regex as BackendRegex;
use snafu::ResultExt;
use std::borrow::Cow;

/// This is a wrapper around regex::Regex.
pub(crate) struct Regex {
    inner: BackendRegex,
}

impl Regex {
    /// This is a wrapper around regex::Regex::new(). It maps the compile error to the crate's
    /// error type, so callers can use '?'.
    pub(crate) fn new(expr: &str) -> Result<Regex> {
        let regex = BackendRegex::new(expr).context(RegexCompile {
            expression: expr.to_string(),
        })?;

        Ok(Self { inner: regex })
    }

    /// This is a wrapper around regex::Regex::replace_all(). The replacement is taken literally,
    /// i.e. '$' in it is not expanded to a capture group.
    pub(crate) fn replace_all_literal<'h>(
        &self,
        haystack: &'h str,
        replacement: &str,
    ) -> Cow<'h, str> {
        self.inner.replace_all(haystack, regex::NoExpand(replacement))
    }
}
