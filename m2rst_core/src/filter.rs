use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobSet;
use tracing::warn;

use crate::CallGraph;
use crate::M2rstConfig;
use crate::reformat;
use crate::reformat::XrefEntry;
use crate::source_scanner::build_exclude_set;
use crate::source_scanner::find_source_file;
use crate::source_scanner::first_comment_line;

/// Kind tag of a documentable unit, as reported by the host documentation
/// generator. Unknown tags map to [`UnitKind::Script`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
	Function,
	Script,
	Class,
}

impl UnitKind {
	/// Parse a host kind tag, case-insensitively.
	pub fn from_tag(tag: &str) -> Self {
		if tag.eq_ignore_ascii_case("function") {
			UnitKind::Function
		} else if tag.eq_ignore_ascii_case("class") || tag.eq_ignore_ascii_case("classdef") {
			UnitKind::Class
		} else {
			UnitKind::Script
		}
	}
}

/// The docstring reformatter with its owned per-run state: configuration,
/// the lazily built [`CallGraph`], and the memoized one-line description
/// cache. Construct one per documentation build; the host's per-unit hook
/// calls [`process_docstring`](DocFilter::process_docstring) once per
/// documentable unit.
///
/// All state is owned, with no process-wide globals, so tests and repeated
/// builds each get an isolated instance.
#[derive(Debug)]
pub struct DocFilter {
	config: M2rstConfig,
	root: PathBuf,
	exclude: GlobSet,
	graph: Option<CallGraph>,
	analyzed: bool,
	descriptions: HashMap<String, Option<String>>,
}

impl DocFilter {
	/// Create a filter for a project rooted at `root`.
	pub fn new(config: M2rstConfig, root: impl Into<PathBuf>) -> Self {
		let exclude = build_exclude_set(&config.exclude.patterns);
		Self {
			config,
			root: root.into(),
			exclude,
			graph: None,
			analyzed: false,
			descriptions: HashMap::new(),
		}
	}

	/// The active configuration.
	pub fn config(&self) -> &M2rstConfig {
		&self.config
	}

	/// The per-unit documentation hook: rewrite one extracted comment block
	/// into the fixed section layout, in place.
	///
	/// Never fails: missing descriptions, absent graph entries, and
	/// unreadable source files all degrade to empty or placeholder content.
	/// Running the hook on its own output is not idempotent: the fixed
	/// section titles reclassify as description text on a second pass.
	pub fn process_docstring(&mut self, kind: UnitKind, name: &str, lines: &mut Vec<String>) {
		if lines.is_empty() {
			return;
		}

		// The purpose is captured before license stripping so a block that
		// is banner-only still yields its first real line, if any.
		let purpose = reformat::find_purpose(lines);

		if self.config.filter.remove_license {
			reformat::strip_license(lines);
		}

		if !self.config.filter.m2html_style || lines.is_empty() {
			return;
		}

		let signature = reformat::derive_signature(kind, name, lines);

		let base_name = name.rsplit('.').next().unwrap_or(name);
		let (callees, callers) = self.cross_references(base_name);

		let split = reformat::classify_sections(lines, &self.config.filter);
		let new_lines = reformat::reassemble(
			&purpose,
			&signature,
			&split,
			&callees,
			&callers,
			&self.config.filter,
		);

		*lines = new_lines;
	}

	/// The call graph for the configured source directory, building it on
	/// first use. `None` when no source directory is configured or the
	/// build failed.
	pub fn call_graph(&mut self) -> Option<&CallGraph> {
		self.ensure_analyzed();
		self.graph.as_ref()
	}

	/// Look up the one-line description of a function, reading its source
	/// file on first access. Results are memoized for the lifetime of the
	/// filter, including misses.
	pub fn description_of(&mut self, name: &str) -> Option<String> {
		if let Some(cached) = self.descriptions.get(name) {
			return cached.clone();
		}

		let description = self.load_description(name);
		self.descriptions
			.insert(name.to_string(), description.clone());
		description
	}

	fn load_description(&self, name: &str) -> Option<String> {
		let dir = self.config.resolved_source_dir(&self.root)?;
		let path = find_source_file(&dir, name, &self.config.extensions)?;
		first_comment_line(&path, &self.config.comment_prefix, self.config.filter.format_fixes)
			.filter(|description| !description.is_empty())
	}

	/// Resolve the callee and caller lists for a unit's base name, with
	/// descriptions attached.
	fn cross_references(&mut self, base_name: &str) -> (Vec<XrefEntry>, Vec<XrefEntry>) {
		self.ensure_analyzed();

		let (callee_names, caller_names) = match &self.graph {
			Some(graph) => (graph.callees(base_name), graph.callers(base_name)),
			None => (Vec::new(), Vec::new()),
		};

		let callees = self.resolve_entries(callee_names);
		let callers = self.resolve_entries(caller_names);
		(callees, callers)
	}

	fn resolve_entries(&mut self, names: Vec<String>) -> Vec<XrefEntry> {
		names
			.into_iter()
			.map(|name| {
				let description = self.description_of(&name);
				XrefEntry { name, description }
			})
			.collect()
	}

	/// Build the call graph at most once per filter. A failed build is
	/// memoized too, so the scan never runs twice and no error reaches the
	/// documentation build.
	fn ensure_analyzed(&mut self) {
		if self.analyzed {
			return;
		}
		self.analyzed = true;

		let Some(dir) = self.config.resolved_source_dir(&self.root) else {
			return;
		};

		match CallGraph::build(&dir, &self.config.extensions, &self.exclude) {
			Ok(graph) => self.graph = Some(graph),
			Err(e) => {
				warn!(dir = %dir.display(), error = %e, "call graph analysis failed");
			}
		}
	}
}

/// Convenience constructor: load `m2rst.toml` from `root` (or defaults) and
/// build a filter for it.
pub fn filter_for_project(root: &Path) -> crate::M2rstResult<DocFilter> {
	let config = M2rstConfig::load_or_default(root)?;
	Ok(DocFilter::new(config, root))
}
