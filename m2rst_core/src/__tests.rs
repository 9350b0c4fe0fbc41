use std::path::Path;
use std::path::PathBuf;

use globset::GlobSet;
use rstest::rstest;
use similar_asserts::assert_eq;

use super::*;
use crate::config::FilterOptions;
use crate::reformat;

fn config_with_source(dir: &Path) -> M2rstConfig {
	M2rstConfig {
		source_dir: Some(dir.to_path_buf()),
		..M2rstConfig::default()
	}
}

fn strings(lines: &[&str]) -> Vec<String> {
	lines.iter().map(ToString::to_string).collect()
}

// --- License stripping ---

#[test]
fn license_banner_block_is_fully_removed() {
	let mut lines = strings(&[
		"----------",
		"",
		"SPDX-License-Identifier: GPL-3.0",
		"",
		"DIV computes the divergence",
	]);
	reformat::strip_license(&mut lines);

	assert_eq!(lines, strings(&["DIV computes the divergence"]));
	assert!(lines.iter().all(|line| !reformat::is_banner(line)));
}

#[test]
fn banner_takes_at_most_four_following_lines() {
	let mut lines = strings(&["------------", "", "", "", "", "", "kept"]);
	reformat::strip_license(&mut lines);

	assert_eq!(lines, strings(&["", "kept"]));
}

#[rstest]
#[case::dashes("-----------")]
#[case::spdx("SPDX-License-Identifier: MIT")]
#[case::copyright("© 2008-2024 Example Authors")]
#[case::license_file("See LICENSE file for details")]
fn banner_markers_match(#[case] line: &str) {
	assert!(reformat::is_banner(line));
}

#[rstest]
#[case::short_dashes("---------")]
#[case::caret_underline("^^^^^^^^^^^^")]
#[case::prose("GRAD computes the gradient")]
fn non_banner_lines_do_not_match(#[case] line: &str) {
	assert!(!reformat::is_banner(line));
}

// --- Purpose extraction ---

#[rstest]
#[case::banner_first(
	vec!["----------", "", "GRAD computes the gradient", "more"],
	"GRAD computes the gradient"
)]
#[case::leading_blank(vec!["", "  padded purpose  "], "padded purpose")]
#[case::all_banner(vec!["----------", "© 2008-2024 Authors"], "")]
fn purpose_is_first_non_banner_line(#[case] input: Vec<&str>, #[case] expected: &str) {
	let lines = strings(&input);
	assert_eq!(reformat::find_purpose(&lines), expected);
}

// --- Signature derivation ---

#[rstest]
#[case::declaration_first_line(vec!["function y = grad(k)"], "function y = grad(k)")]
#[case::indented_declaration(vec!["  function y = grad(k)  "], "function y = grad(k)")]
#[case::synthesized(vec!["GRAD computes the gradient"], "function ops.grad")]
fn function_signature(#[case] input: Vec<&str>, #[case] expected: &str) {
	let lines = strings(&input);
	assert_eq!(
		reformat::derive_signature(UnitKind::Function, "ops.grad", &lines),
		expected
	);
}

#[test]
fn non_function_units_have_no_signature() {
	let lines = strings(&["SCRIPT does things"]);
	assert_eq!(
		reformat::derive_signature(UnitKind::Script, "script", &lines),
		""
	);
}

// --- Section classification ---

#[rstest]
#[case::with_description(":param x: does a thing", "               x : does a thing")]
#[case::missing_description(
	":param k:",
	"               k : Parameter description not provided"
)]
fn param_field_lines_are_right_aligned(#[case] input: &str, #[case] expected: &str) {
	let lines = strings(&["PURPOSE LINE", "Parameters:", input]);
	let split = reformat::classify_sections(&lines, &FilterOptions::default());

	assert_eq!(split.parameters, strings(&["Parameters:", expected]));
	assert!(split.description.is_empty());
}

#[test]
fn missing_description_without_placeholders_stays_empty() {
	let options = FilterOptions {
		param_placeholders: false,
		..FilterOptions::default()
	};
	let lines = strings(&["PURPOSE LINE", "Parameters:", ":param k:"]);
	let split = reformat::classify_sections(&lines, &options);

	assert_eq!(split.parameters, strings(&["Parameters:", "               k :"]));
}

#[test]
fn aligned_param_without_description_gets_placeholder() {
	let lines = strings(&["PURPOSE LINE", "Parameters:", "   tol :"]);
	let split = reformat::classify_sections(&lines, &FilterOptions::default());

	assert_eq!(
		split.parameters,
		strings(&[
			"Parameters:",
			"             tol : Parameter description not provided"
		])
	);
}

#[test]
fn aligned_param_with_description_is_kept_verbatim() {
	let lines = strings(&["PURPOSE LINE", "Parameters:", "   tol : solver tolerance"]);
	let split = reformat::classify_sections(&lines, &FilterOptions::default());

	assert_eq!(
		split.parameters,
		strings(&["Parameters:", "   tol : solver tolerance"])
	);
}

#[test]
fn unindented_line_ends_parameter_section() {
	let lines = strings(&[
		"PURPOSE LINE",
		"Parameters:",
		":param x: a thing",
		"  indented detail",
		"Back to prose.",
	]);
	let split = reformat::classify_sections(&lines, &FilterOptions::default());

	assert_eq!(
		split.parameters,
		strings(&[
			"Parameters:",
			"               x : a thing",
			"  indented detail"
		])
	);
	assert_eq!(split.description, strings(&["Back to prose."]));
}

#[test]
fn cross_reference_intros_are_never_reemitted() {
	let lines = strings(&[
		"PURPOSE LINE",
		"Some prose.",
		"This function calls:",
		"This function is called by:",
		"More prose.",
	]);
	let split = reformat::classify_sections(&lines, &FilterOptions::default());

	assert_eq!(split.description, strings(&["Some prose.", "More prose."]));
	assert!(split.parameters.is_empty());
}

// --- Call graph ---

#[test]
fn call_graph_records_direction() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("a.m"),
		"function a(x)\n% A wrapper\ny = b(x);\n",
	)?;
	std::fs::write(tmp.path().join("b.m"), "function b(x)\n% B base\ny = x;\n")?;

	let graph = CallGraph::build(tmp.path(), &["m".to_string()], &GlobSet::empty())?;

	assert_eq!(graph.callees("a"), vec!["b".to_string()]);
	assert_eq!(graph.callers("b"), vec!["a".to_string()]);
	assert!(graph.callees("b").is_empty());
	assert!(graph.callers("a").is_empty());

	// Every discovered function is a key in both maps.
	assert_eq!(graph.calls.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	assert_eq!(graph.called_by.keys().collect::<Vec<_>>(), vec!["a", "b"]);

	Ok(())
}

#[test]
fn call_graph_matches_case_insensitively() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("Gradient.m"),
		"function G = Gradient(k)\nG = k;\n",
	)?;
	std::fs::write(tmp.path().join("solver.m"), "g = GRADIENT(2);\n")?;

	let graph = CallGraph::build(tmp.path(), &["m".to_string()], &GlobSet::empty())?;

	// Keys preserve the original casing; lookups are case-insensitive.
	assert_eq!(graph.callees("SOLVER"), vec!["Gradient".to_string()]);
	assert_eq!(graph.callers("gradient"), vec!["solver".to_string()]);

	Ok(())
}

#[test]
fn call_graph_excludes_self_references() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("fib.m"),
		"function y = fib(n)\ny = fib(n - 1) + fib(n - 2);\n",
	)?;

	let graph = CallGraph::build(tmp.path(), &["m".to_string()], &GlobSet::empty())?;

	assert!(graph.callees("fib").is_empty());
	assert!(graph.callers("fib").is_empty());

	Ok(())
}

#[test]
fn call_graph_skips_excluded_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.m"), "b(1);\n")?;
	std::fs::write(tmp.path().join("Contents.m"), "% listing\na(1);\n")?;
	std::fs::write(tmp.path().join("b.m"), "y = 1;\n")?;

	let exclude = source_scanner::build_exclude_set(&["Contents.m".to_string()]);
	let graph = CallGraph::build(tmp.path(), &["m".to_string()], &exclude)?;

	assert_eq!(graph.calls.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	assert!(graph.callers("a").is_empty());

	Ok(())
}

#[test]
fn call_graph_requires_the_directory() {
	let result = CallGraph::build(
		Path::new("/nonexistent/m2rst-source"),
		&["m".to_string()],
		&GlobSet::empty(),
	);
	assert!(result.is_err());
}

// --- Source scanning ---

#[rstest]
#[case::function_file(
	"function y = f(x)\n% F purpose line\n% more detail\ny = x;\n",
	vec!["F purpose line", "more detail"]
)]
#[case::script_file("% SCRIPT purpose\n% detail\nx = 1;\n", vec!["SCRIPT purpose", "detail"])]
#[case::code_first("x = 1;\n% trailing comment\n", vec![])]
#[case::empty("", vec![])]
fn extracts_leading_comment_block(#[case] content: &str, #[case] expected: Vec<&str>) {
	assert_eq!(extract_comment_block(content, "%"), strings(&expected));
}

#[rstest]
#[case::function_file("function y = f(x)\ny = x;\n", true)]
#[case::blank_then_function("\n\nfunction y = f(x)\n", true)]
#[case::script("x = 1;\n", false)]
fn detects_function_sources(#[case] content: &str, #[case] expected: bool) {
	assert_eq!(is_function_source(content), expected);
}

#[test]
fn first_comment_line_scrubs_dash_runs() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("div.m");
	std::fs::write(&path, "% ----- DIV computes divergence -----\n")?;

	assert_eq!(
		first_comment_line(&path, "%", true),
		Some("DIV computes divergence".to_string())
	);
	assert_eq!(
		first_comment_line(&path, "%", false),
		Some("----- DIV computes divergence -----".to_string())
	);

	Ok(())
}

#[test]
fn source_files_are_found_case_insensitively() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("Gradient.m"), "% GRADIENT\n")?;

	let found = find_source_file(tmp.path(), "gradient", &["m".to_string()])
		.ok_or("file should be found")?;
	assert!(
		found
			.file_name()
			.and_then(|name| name.to_str())
			.is_some_and(|name| name.eq_ignore_ascii_case("gradient.m"))
	);

	Ok(())
}

// --- DocFilter ---

#[test]
fn empty_blocks_are_left_untouched() {
	let mut filter = DocFilter::new(M2rstConfig::default(), ".");
	let mut lines: Vec<String> = Vec::new();
	filter.process_docstring(UnitKind::Function, "noop", &mut lines);
	assert!(lines.is_empty());
}

#[test]
fn no_cross_reference_renders_fixed_sentence() {
	let mut filter = DocFilter::new(M2rstConfig::default(), ".");
	let mut lines = strings(&["ADD adds two numbers"]);
	filter.process_docstring(UnitKind::Function, "add", &mut lines);

	let joined = lines.join("\n");
	assert!(joined.contains(reformat::NO_CROSS_REFERENCE_TEXT));
}

#[test]
fn disabled_m2html_style_only_strips_license() {
	let config = M2rstConfig {
		filter: FilterOptions {
			m2html_style: false,
			..FilterOptions::default()
		},
		..M2rstConfig::default()
	};
	let mut filter = DocFilter::new(config, ".");
	let mut lines = strings(&["------------", "ADD adds two numbers", "More detail."]);
	filter.process_docstring(UnitKind::Function, "add", &mut lines);

	assert_eq!(lines, strings(&["ADD adds two numbers", "More detail."]));
}

#[test]
fn reformats_block_with_call_graph_and_descriptions() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("gradient.m"),
		"function G = gradient(k, m, dx)\n% GRADIENT computes the mimetic gradient operator\n%\n% \
		 Additional notes about accuracy.\nG = interpol(k, m) * dx;\n",
	)?;
	std::fs::write(
		tmp.path().join("interpol.m"),
		"function I = interpol(k, m)\n% INTERPOL interpolates staggered values\nI = k + m;\n",
	)?;

	let mut filter = DocFilter::new(config_with_source(tmp.path()), ".");
	let mut lines = strings(&[
		"----------------------------------------",
		"© 2008-2024 Example Authors",
		"See LICENSE file for details",
		"",
		"GRADIENT computes the mimetic gradient operator",
		"",
		"Additional notes about accuracy.",
		"Parameters:",
		":param k: order of accuracy",
		":param m: number of cells",
	]);
	filter.process_docstring(UnitKind::Function, "ops.gradient", &mut lines);

	let expected = strings(&[
		"PURPOSE",
		"^^^^^^^",
		"GRADIENT computes the mimetic gradient operator",
		"",
		"SYNOPSIS",
		"^^^^^^^^",
		".. code-block:: matlab",
		"",
		"    function ops.gradient",
		"",
		"DESCRIPTION",
		"^^^^^^^^^^^",
		"",
		".. code-block:: text",
		"",
		"    ",
		"    Additional notes about accuracy.",
		"",
		"",
		".. code-block:: text",
		"",
		"    Parameters:",
		"                   k : order of accuracy",
		"                   m : number of cells",
		"",
		"",
		"CROSS-REFERENCE INFORMATION",
		"^^^^^^^^^^^^^^^^^^^^^^^^^^^",
		"This function calls:",
		"",
		":mat:func:`interpol` INTERPOL interpolates staggered values",
		"",
	]);
	assert_eq!(lines, expected);

	Ok(())
}

#[test]
fn callers_section_lists_detected_callers() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("laplacian.m"),
		"function L = laplacian(k)\n% LAPLACIAN assembles the mimetic laplacian\nL = \
		 divergence(k) * gradient(k);\n",
	)?;
	std::fs::write(
		tmp.path().join("gradient.m"),
		"function G = gradient(k)\n% GRADIENT computes the mimetic gradient operator\nG = k;\n",
	)?;
	std::fs::write(
		tmp.path().join("divergence.m"),
		"function D = divergence(k)\n% DIVERGENCE computes the mimetic divergence operator\nD = \
		 k;\n",
	)?;

	let mut filter = DocFilter::new(config_with_source(tmp.path()), ".");
	let mut lines = strings(&["GRADIENT computes the mimetic gradient operator"]);
	filter.process_docstring(UnitKind::Function, "gradient", &mut lines);

	let joined = lines.join("\n");
	assert!(joined.contains("This function is called by:"));
	assert!(joined.contains(":mat:func:`laplacian` LAPLACIAN assembles the mimetic laplacian"));
	assert!(!joined.contains("This function calls:"));

	Ok(())
}

#[test]
fn description_cache_memoizes_misses() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let mut filter = DocFilter::new(config_with_source(tmp.path()), ".");

	assert_eq!(filter.description_of("ghost"), None);

	// The miss is already cached; a file created afterwards is not seen.
	std::fs::write(tmp.path().join("ghost.m"), "% GHOST haunts the mesh\n")?;
	assert_eq!(filter.description_of("ghost"), None);

	Ok(())
}

#[test]
fn description_cache_memoizes_hits() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("interp.m");
	std::fs::write(&path, "% INTERP interpolates\n")?;

	let mut filter = DocFilter::new(config_with_source(tmp.path()), ".");
	assert_eq!(
		filter.description_of("interp"),
		Some("INTERP interpolates".to_string())
	);

	std::fs::remove_file(&path)?;
	assert_eq!(
		filter.description_of("interp"),
		Some("INTERP interpolates".to_string())
	);

	Ok(())
}

#[test]
fn failed_graph_build_is_memoized() {
	let config = M2rstConfig {
		source_dir: Some(PathBuf::from("/nonexistent/m2rst-source")),
		..M2rstConfig::default()
	};
	let mut filter = DocFilter::new(config, ".");

	assert!(filter.call_graph().is_none());
	assert!(filter.call_graph().is_none());
}

#[test]
fn reformatting_twice_is_not_idempotent() {
	let mut filter = DocFilter::new(M2rstConfig::default(), ".");
	let mut lines = strings(&["SUM adds two operands"]);
	filter.process_docstring(UnitKind::Function, "sum", &mut lines);
	let first_pass = lines.clone();

	filter.process_docstring(UnitKind::Function, "sum", &mut lines);
	assert_ne!(lines, first_pass);
}

// --- UnitKind ---

#[rstest]
#[case::function("function", UnitKind::Function)]
#[case::function_mixed_case("Function", UnitKind::Function)]
#[case::class("class", UnitKind::Class)]
#[case::classdef("classdef", UnitKind::Class)]
#[case::script("script", UnitKind::Script)]
#[case::unknown("module", UnitKind::Script)]
fn unit_kinds_parse_from_tags(#[case] tag: &str, #[case] expected: UnitKind) {
	assert_eq!(UnitKind::from_tag(tag), expected);
}

// --- Config ---

#[test]
fn config_defaults() {
	let config = M2rstConfig::default();
	assert_eq!(config.extensions, vec!["m".to_string()]);
	assert_eq!(config.comment_prefix, "%");
	assert_eq!(config.output_dir, PathBuf::from("doc/api"));
	assert!(config.source_dir.is_none());
	assert!(config.filter.remove_license);
	assert!(config.filter.m2html_style);
	assert!(config.filter.format_fixes);
	assert!(config.filter.param_placeholders);
}

#[test]
fn config_loads_from_toml() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("m2rst.toml"),
		"source_dir = \"src/matlab\"\n\n[filter]\nremove_license = false\n",
	)?;

	let config = M2rstConfig::load(tmp.path())?.ok_or("config should exist")?;
	assert_eq!(config.source_dir, Some(PathBuf::from("src/matlab")));
	assert!(!config.filter.remove_license);
	assert!(config.filter.m2html_style);

	Ok(())
}

#[test]
fn missing_config_loads_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	assert!(M2rstConfig::load(tmp.path())?.is_none());

	let config = M2rstConfig::load_or_default(tmp.path())?;
	assert!(config.source_dir.is_none());

	Ok(())
}
