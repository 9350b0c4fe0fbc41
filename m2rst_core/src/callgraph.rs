use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::Path;

use globset::GlobSet;
use regex::Regex;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::M2rstError;
use crate::M2rstResult;
use crate::patterns;
use crate::source_scanner::function_name;
use crate::source_scanner::list_source_files;

/// A heuristic bidirectional function call graph derived from source text.
///
/// Function identifiers are the base names of the scanned files,
/// case-preserved as keys and matched case-insensitively. Detection is a
/// whole-word textual scan for `name(`-shaped occurrences: matches inside
/// comments or strings count, indirect calls are missed. Every discovered
/// function appears in both maps, possibly with empty neighbor sets, and no
/// function lists itself.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallGraph {
	/// Function name to the set of functions it calls.
	pub calls: BTreeMap<String, BTreeSet<String>>,
	/// Function name to the set of functions that call it.
	pub called_by: BTreeMap<String, BTreeSet<String>>,
}

impl CallGraph {
	/// Scan `dir` and build the call graph from every source file with a
	/// recognized extension. Files that fail to read are skipped with a
	/// warning; a missing or unreadable directory is an error.
	pub fn build(dir: &Path, extensions: &[String], exclude: &GlobSet) -> M2rstResult<Self> {
		if !dir.is_dir() {
			return Err(M2rstError::MissingSourceDir(dir.display().to_string()));
		}

		let files = list_source_files(dir, extensions, exclude)?;
		let mut graph = CallGraph::default();

		// First pass: collect identifiers, seed both maps with empty sets,
		// and remember the original casing for each lowercase name.
		let mut case_map: HashMap<String, String> = HashMap::new();
		for file in &files {
			let Some(name) = function_name(file) else {
				continue;
			};
			case_map.insert(name.to_lowercase(), name.to_string());
			graph.calls.entry(name.to_string()).or_default();
			graph.called_by.entry(name.to_string()).or_default();
		}

		// One compiled matcher per identifier, reused across every file.
		let mut matchers: Vec<(String, String, Regex)> = Vec::with_capacity(case_map.len());
		for (lower, original) in &case_map {
			match patterns::call_site(lower) {
				Ok(re) => matchers.push((lower.clone(), original.clone(), re)),
				Err(e) => {
					warn!(name = %original, error = %e, "skipping unmatchable function name");
				}
			}
		}

		// Second pass: test every file against every other identifier.
		let mut detected = 0usize;
		for file in &files {
			let Some(owner) = function_name(file) else {
				continue;
			};
			let content = match std::fs::read_to_string(file) {
				Ok(content) => content,
				Err(e) => {
					warn!(file = %file.display(), error = %e, "skipping unreadable source file");
					continue;
				}
			};

			let owner_lower = owner.to_lowercase();
			for (lower, original, matcher) in &matchers {
				// Self-references are excluded.
				if *lower == owner_lower {
					continue;
				}
				if matcher.is_match(&content) {
					graph
						.calls
						.entry(owner.to_string())
						.or_default()
						.insert(original.clone());
					graph
						.called_by
						.entry(original.clone())
						.or_default()
						.insert(owner.to_string());
					detected += 1;
				}
			}
		}

		debug!(
			files = files.len(),
			calls = detected,
			dir = %dir.display(),
			"analyzed source directory"
		);

		Ok(graph)
	}

	/// Functions called by `name`, matched case-insensitively against the
	/// graph keys. Unknown names yield an empty list.
	pub fn callees(&self, name: &str) -> Vec<String> {
		lookup(&self.calls, name)
	}

	/// Functions that call `name`, matched case-insensitively against the
	/// graph keys. Unknown names yield an empty list.
	pub fn callers(&self, name: &str) -> Vec<String> {
		lookup(&self.called_by, name)
	}

	/// Number of functions in the graph.
	pub fn len(&self) -> usize {
		self.calls.len()
	}

	/// True when no functions were discovered.
	pub fn is_empty(&self) -> bool {
		self.calls.is_empty()
	}
}

fn lookup(map: &BTreeMap<String, BTreeSet<String>>, name: &str) -> Vec<String> {
	map.iter()
		.find(|(key, _)| key.eq_ignore_ascii_case(name))
		.map(|(_, neighbors)| neighbors.iter().cloned().collect())
		.unwrap_or_default()
}
