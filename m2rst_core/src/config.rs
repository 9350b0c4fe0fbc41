use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::M2rstError;
use crate::M2rstResult;

/// Default source file extensions recognized during scanning.
pub const DEFAULT_EXTENSIONS: &[&str] = &["m"];

/// Default line comment marker for source files.
pub const DEFAULT_COMMENT_PREFIX: &str = "%";

/// Default output directory for rendered `.rst` fragments.
pub const DEFAULT_OUTPUT_DIR: &str = "doc/api";

/// Configuration loaded from an `m2rst.toml` file.
///
/// ```toml
/// source_dir = "src/matlab"
/// output_dir = "doc/api"
/// extensions = ["m"]
///
/// [exclude]
/// patterns = ["Contents.m", "test_*"]
///
/// [filter]
/// remove_license = true
/// m2html_style = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct M2rstConfig {
	/// Directory containing the source files to scan for the call graph and
	/// one-line descriptions. When absent, the cross-reference section always
	/// renders the no-information sentence.
	#[serde(default)]
	pub source_dir: Option<PathBuf>,
	/// Directory where the `format` command writes rendered `.rst` files.
	#[serde(default = "default_output_dir")]
	pub output_dir: PathBuf,
	/// Source file extensions recognized during scanning.
	#[serde(default = "default_extensions")]
	pub extensions: Vec<String>,
	/// Line comment marker used by the source language.
	#[serde(default = "default_comment_prefix")]
	pub comment_prefix: String,
	/// Exclusion configuration.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Reformatting switches.
	#[serde(default)]
	pub filter: FilterOptions,
}

fn default_output_dir() -> PathBuf {
	PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_extensions() -> Vec<String> {
	DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

fn default_comment_prefix() -> String {
	DEFAULT_COMMENT_PREFIX.to_string()
}

/// Configuration for excluding source files from scanning.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Glob patterns for file names to skip during source scans.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Boolean switches controlling the docstring reformatter. All default to
/// `true`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FilterOptions {
	/// Strip license banner blocks from comment text.
	pub remove_license: bool,
	/// Rewrite comment blocks into the fixed M2HTML section layout. When
	/// disabled, only license stripping is applied.
	pub m2html_style: bool,
	/// Apply cosmetic normalizations: trim description lines before
	/// indenting and scrub long dash runs from fetched descriptions.
	pub format_fixes: bool,
	/// Substitute a placeholder for parameters documented without a
	/// description.
	pub param_placeholders: bool,
}

impl Default for FilterOptions {
	fn default() -> Self {
		Self {
			remove_license: true,
			m2html_style: true,
			format_fixes: true,
			param_placeholders: true,
		}
	}
}

impl Default for M2rstConfig {
	fn default() -> Self {
		Self {
			source_dir: None,
			output_dir: default_output_dir(),
			extensions: default_extensions(),
			comment_prefix: default_comment_prefix(),
			exclude: ExcludeConfig::default(),
			filter: FilterOptions::default(),
		}
	}
}

impl M2rstConfig {
	/// Load the config from `m2rst.toml` at the given root directory.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> M2rstResult<Option<M2rstConfig>> {
		let config_path = root.join("m2rst.toml");

		if !config_path.exists() {
			return Ok(None);
		}

		let content = std::fs::read_to_string(&config_path)?;
		let config: M2rstConfig =
			toml::from_str(&content).map_err(|e| M2rstError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// Load the config from `m2rst.toml`, falling back to defaults when the
	/// file does not exist.
	pub fn load_or_default(root: &Path) -> M2rstResult<M2rstConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	/// The configured source directory resolved against the project root.
	/// Absolute paths are kept as-is.
	pub fn resolved_source_dir(&self, root: &Path) -> Option<PathBuf> {
		self.source_dir.as_ref().map(|dir| {
			if dir.is_absolute() {
				dir.clone()
			} else {
				root.join(dir)
			}
		})
	}

	/// The output directory resolved against the project root. Absolute
	/// paths are kept as-is.
	pub fn resolved_output_dir(&self, root: &Path) -> PathBuf {
		if self.output_dir.is_absolute() {
			self.output_dir.clone()
		} else {
			root.join(&self.output_dir)
		}
	}
}
