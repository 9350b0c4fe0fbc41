use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use tracing::warn;

use crate::M2rstError;
use crate::M2rstResult;
use crate::patterns;

/// Build a `GlobSet` from a list of glob pattern strings. Invalid patterns
/// are skipped.
pub fn build_exclude_set(patterns: &[String]) -> GlobSet {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		if let Ok(glob) = Glob::new(pattern) {
			builder.add(glob);
		}
	}
	builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Enumerate the source files directly inside `dir` whose extension is one of
/// `extensions` and whose file name matches no exclude pattern. The listing
/// is sorted for deterministic ordering.
pub fn list_source_files(
	dir: &Path,
	extensions: &[String],
	exclude: &GlobSet,
) -> M2rstResult<Vec<PathBuf>> {
	let entries = std::fs::read_dir(dir).map_err(|e| {
		M2rstError::SourceScan {
			path: dir.display().to_string(),
			reason: e.to_string(),
		}
	})?;

	let mut files = Vec::new();

	for entry in entries {
		let entry = entry.map_err(|e| {
			M2rstError::SourceScan {
				path: dir.display().to_string(),
				reason: e.to_string(),
			}
		})?;
		let path = entry.path();

		if !path.is_file() || !has_known_extension(&path, extensions) {
			continue;
		}

		if let Some(name) = path.file_name() {
			if !exclude.is_empty() && exclude.is_match(name) {
				continue;
			}
		}

		files.push(path);
	}

	files.sort();
	Ok(files)
}

/// Check whether a path carries one of the recognized source extensions
/// (compared case-insensitively).
fn has_known_extension(path: &Path, extensions: &[String]) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.is_some_and(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// The function identifier a source file defines: its base name without the
/// extension.
pub fn function_name(path: &Path) -> Option<&str> {
	path.file_stem().and_then(|stem| stem.to_str())
}

/// Locate the source file defining `name` inside `dir`, trying
/// `<name>.<ext>` for each recognized extension first and falling back to a
/// case-insensitive scan of the directory listing.
pub fn find_source_file(dir: &Path, name: &str, extensions: &[String]) -> Option<PathBuf> {
	for ext in extensions {
		let candidate = dir.join(format!("{name}.{ext}"));
		if candidate.is_file() {
			return Some(candidate);
		}
	}

	let files = list_source_files(dir, extensions, &GlobSet::empty()).ok()?;
	files.into_iter().find(|path| {
		function_name(path).is_some_and(|stem| stem.eq_ignore_ascii_case(name))
	})
}

/// Check whether a source file defines a function: its first non-blank line
/// is a `function ...` declaration.
pub fn is_function_source(content: &str) -> bool {
	content
		.lines()
		.find(|line| !line.trim().is_empty())
		.is_some_and(|line| patterns::FUNCTION_DECL.is_match(line))
}

/// Extract a source file's leading comment block: an optional `function ...`
/// declaration line and blank lines are skipped, then consecutive lines
/// starting with the comment prefix are collected with the prefix (and at
/// most one following space) removed.
pub fn extract_comment_block(content: &str, comment_prefix: &str) -> Vec<String> {
	let mut block = Vec::new();
	let mut seen_declaration = false;

	for line in content.lines() {
		let trimmed = line.trim_start();

		if let Some(rest) = trimmed.strip_prefix(comment_prefix) {
			block.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
			continue;
		}

		if !block.is_empty() {
			break;
		}

		if trimmed.is_empty() {
			continue;
		}

		if !seen_declaration && patterns::FUNCTION_DECL.is_match(line) {
			seen_declaration = true;
			continue;
		}

		// Reached code before any comment line: no leading block.
		break;
	}

	block
}

/// Read the first comment line of a source file as a one-line description.
/// With `scrub_dashes`, runs of five or more dashes are removed before
/// trimming. Unreadable files and files without a comment line yield `None`.
pub fn first_comment_line(path: &Path, comment_prefix: &str, scrub_dashes: bool) -> Option<String> {
	let content = match std::fs::read_to_string(path) {
		Ok(content) => content,
		Err(e) => {
			warn!(file = %path.display(), error = %e, "failed to read source file for description");
			return None;
		}
	};

	for line in content.lines() {
		let trimmed = line.trim();
		if let Some(rest) = trimmed.strip_prefix(comment_prefix) {
			let description = if scrub_dashes {
				patterns::DASH_RUN.replace_all(rest, "").trim().to_string()
			} else {
				rest.trim().to_string()
			};
			return Some(description);
		}
	}

	None
}
