use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum M2rstError {
	#[error(transparent)]
	#[diagnostic(code(m2rst::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(m2rst::config_parse),
		help("check that m2rst.toml is valid TOML with [filter] and/or [exclude] sections")
	)]
	ConfigParse(String),

	#[error("source directory not found: `{0}`")]
	#[diagnostic(
		code(m2rst::missing_source_dir),
		help("set `source_dir` in m2rst.toml to the directory containing your source files")
	)]
	MissingSourceDir(String),

	#[error("failed to read source directory `{path}`: {reason}")]
	#[diagnostic(code(m2rst::source_scan))]
	SourceScan { path: String, reason: String },

	#[error("no source directory configured")]
	#[diagnostic(
		code(m2rst::no_source_dir),
		help("add `source_dir = \"...\"` to m2rst.toml")
	)]
	NoSourceDir,
}

pub type M2rstResult<T> = Result<T, M2rstError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
