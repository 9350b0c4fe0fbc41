//! `m2rst_core` post-processes extracted MATLAB comment blocks for a
//! documentation build: it strips license banners and rewrites each block
//! into a fixed M2HTML-style section layout (PURPOSE, SYNOPSIS, DESCRIPTION,
//! parameters, CROSS-REFERENCE INFORMATION) rendered as reStructuredText.
//! An optional static-analysis pass scans a source directory for textual
//! call-pattern matches and feeds the cross-reference section.
//!
//! ## Processing pipeline
//!
//! ```text
//! Extracted comment block (one documentable unit)
//!   → purpose extraction (first non-blank, non-banner line)
//!   → license stripping (banner lines + up to 4 trailing blank/banner lines)
//!   → signature derivation (declaration line or synthesized `function <name>`)
//!   → call-graph lookup (lazy, once per filter)
//!   → section classification (parameters vs. description)
//!   → reassembly into the fixed section layout, in place
//! ```
//!
//! ## Key types
//!
//! - [`DocFilter`] — the per-build context: owns the configuration, the
//!   lazily built call graph, and the description cache. Its
//!   [`process_docstring`](DocFilter::process_docstring) method is the
//!   per-unit hook.
//! - [`CallGraph`] — heuristic caller/callee maps derived from a whole-word
//!   textual scan of the source directory.
//! - [`M2rstConfig`] — configuration loaded from `m2rst.toml`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use m2rst_core::{DocFilter, M2rstConfig, UnitKind};
//! use std::path::Path;
//!
//! let config = M2rstConfig::load_or_default(Path::new(".")).unwrap();
//! let mut filter = DocFilter::new(config, ".");
//!
//! let mut lines = vec![
//! 	"GRADIENT computes the mimetic gradient operator".to_string(),
//! 	"".to_string(),
//! 	"Parameters:".to_string(),
//! 	":param k: order of accuracy".to_string(),
//! ];
//! filter.process_docstring(UnitKind::Function, "ops.gradient", &mut lines);
//! assert_eq!(lines[0], "PURPOSE");
//! ```

pub use callgraph::*;
pub use config::*;
pub use error::*;
pub use filter::*;
pub use source_scanner::*;

mod callgraph;
pub mod config;
mod error;
mod filter;
pub(crate) mod patterns;
mod reformat;
pub mod source_scanner;

#[cfg(test)]
mod __tests;
