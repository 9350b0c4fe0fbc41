use once_cell::sync::Lazy;
use regex::Regex;

/// License banner markers: a run of ten or more dashes, an SPDX identifier,
/// a copyright year range, or a LICENSE file pointer.
pub(crate) static BANNER: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"-{10,}|SPDX-License-Identifier:|© \d{4}-\d{4}|See LICENSE file")
		.expect("valid banner pattern")
});

/// A `:param name: description` field line.
pub(crate) static PARAM_FIELD: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^\s*:param\s+([^:]+):\s*(.*)").expect("valid param field pattern"));

/// An already-aligned `name :` parameter line.
pub(crate) static PARAM_ALIGNED: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^\s*([a-zA-Z0-9_]+)\s*:").expect("valid aligned param pattern"));

/// A function declaration line.
pub(crate) static FUNCTION_DECL: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^\s*function\s+").expect("valid function decl pattern"));

/// A run of five or more dashes, scrubbed from one-line descriptions.
pub(crate) static DASH_RUN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"-{5,}").expect("valid dash run pattern"));

/// Build the whole-word call-site matcher for a function identifier: the
/// name followed by optional whitespace and an opening parenthesis,
/// case-insensitive.
pub(crate) fn call_site(name: &str) -> Result<Regex, regex::Error> {
	Regex::new(&format!(r"(?i)\b{}\s*\(", regex::escape(name)))
}
