use std::collections::BTreeSet;

use crate::config::FilterOptions;
use crate::filter::UnitKind;
use crate::patterns;

/// Placeholder used for parameters documented without a description.
pub(crate) const PARAM_PLACEHOLDER: &str = "Parameter description not provided";

/// Fixed sentence rendered when a function has no detected callers or
/// callees.
pub(crate) const NO_CROSS_REFERENCE_TEXT: &str = "No cross-reference information found. This \
                                                 typically means this function neither calls nor \
                                                 is called by other functions in the codebase.";

/// Right-alignment width for parameter names.
const PARAM_NAME_WIDTH: usize = 16;

/// Check whether a line matches the license banner pattern.
pub(crate) fn is_banner(line: &str) -> bool {
	patterns::BANNER.is_match(line)
}

/// The one-line purpose: the first line whose trimmed text is non-empty and
/// not a banner, verbatim after trimming. Empty when no such line exists.
pub(crate) fn find_purpose(lines: &[String]) -> String {
	lines
		.iter()
		.find(|line| !line.trim().is_empty() && !is_banner(line))
		.map(|line| line.trim().to_string())
		.unwrap_or_default()
}

/// Delete license banner blocks: every banner-matching line plus up to four
/// immediately following lines that are further banner matches or blank.
/// Deletion is applied back-to-front by index so earlier removals don't
/// shift later ones.
pub(crate) fn strip_license(lines: &mut Vec<String>) {
	let mut marked = BTreeSet::new();

	for i in 0..lines.len() {
		if !is_banner(&lines[i]) {
			continue;
		}
		marked.insert(i);
		let mut j = i + 1;
		while j < lines.len() && j - i < 5 && (is_banner(&lines[j]) || lines[j].trim().is_empty()) {
			marked.insert(j);
			j += 1;
		}
	}

	for idx in marked.into_iter().rev() {
		lines.remove(idx);
	}
}

/// Derive the synopsis signature. Functions use the first line when it is a
/// declaration, otherwise a `function <name>` form is synthesized. Other
/// unit kinds have no signature.
pub(crate) fn derive_signature(kind: UnitKind, name: &str, lines: &[String]) -> String {
	if kind != UnitKind::Function || name.is_empty() {
		return String::new();
	}

	match lines.first() {
		Some(first) if patterns::FUNCTION_DECL.is_match(first) => first.trim().to_string(),
		_ => format!("function {name}"),
	}
}

/// Description and parameter lines separated out of a comment block.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SectionSplit {
	pub description: Vec<String>,
	pub parameters: Vec<String>,
}

/// Classify every line after the purpose line as parameter-section content
/// or description content. Lines that introduce a calls/called-by section
/// are dropped; that information is regenerated from the call graph.
pub(crate) fn classify_sections(lines: &[String], options: &FilterOptions) -> SectionSplit {
	let mut split = SectionSplit::default();
	let mut in_params = false;

	for line in lines.iter().skip(1) {
		let trimmed = line.trim();

		if trimmed.starts_with("Parameters:") {
			in_params = true;
			split.parameters.push(trimmed.to_string());
			continue;
		}

		if in_params {
			if let Some(caps) = patterns::PARAM_FIELD.captures(line) {
				let name = caps[1].trim();
				let desc = match caps[2].trim() {
					"" if options.param_placeholders => PARAM_PLACEHOLDER,
					desc => desc,
				};
				let formatted = format!("{name:>width$} : {desc}", width = PARAM_NAME_WIDTH);
				split.parameters.push(formatted.trim_end().to_string());
			} else if let Some(caps) = patterns::PARAM_ALIGNED.captures(line) {
				let rest = line.split_once(':').map(|(_, rest)| rest).unwrap_or("");
				if rest.trim().is_empty() && options.param_placeholders {
					let name = &caps[1];
					split.parameters.push(format!(
						"{name:>width$} : {PARAM_PLACEHOLDER}",
						width = PARAM_NAME_WIDTH
					));
				} else {
					split.parameters.push(line.clone());
				}
			} else if trimmed.is_empty() {
				split.parameters.push(line.clone());
			} else if !line.starts_with([' ', '\t']) {
				// An unindented non-parameter line ends the section.
				in_params = false;
				if !is_cross_reference_intro(line) {
					split.description.push(line.clone());
				}
			} else {
				// Indented free text stays in the parameter block.
				split.parameters.push(line.clone());
			}
		} else if !is_cross_reference_intro(line) {
			split.description.push(line.clone());
		}
	}

	split
}

fn is_cross_reference_intro(line: &str) -> bool {
	let lower = line.to_lowercase();
	lower.contains("this function calls") || lower.contains("this function is called by")
}

/// A cross-reference list entry: a function name with its lazily fetched
/// one-line description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XrefEntry {
	pub name: String,
	pub description: Option<String>,
}

/// Emit the fixed M2HTML section layout.
pub(crate) fn reassemble(
	purpose: &str,
	signature: &str,
	split: &SectionSplit,
	callees: &[XrefEntry],
	callers: &[XrefEntry],
	options: &FilterOptions,
) -> Vec<String> {
	let mut out = Vec::new();

	push_title(&mut out, "PURPOSE");
	out.push(purpose.to_string());
	out.push(String::new());

	push_title(&mut out, "SYNOPSIS");
	out.push(".. code-block:: matlab".to_string());
	out.push(String::new());
	out.push(format!("    {signature}"));
	out.push(String::new());

	push_title(&mut out, "DESCRIPTION");
	if !split.description.is_empty() {
		out.push(String::new());
		out.push(".. code-block:: text".to_string());
		out.push(String::new());
		for line in &split.description {
			let content = if options.format_fixes {
				line.trim()
			} else {
				line.as_str()
			};
			if content.is_empty() {
				out.push("    ".to_string());
			} else {
				out.push(format!("    {content}"));
			}
		}
		out.push(String::new());
	}

	if !split.parameters.is_empty() {
		out.push(String::new());
		out.push(".. code-block:: text".to_string());
		out.push(String::new());
		for line in &split.parameters {
			out.push(format!("    {line}"));
		}
		out.push(String::new());
	}

	out.push(String::new());
	push_title(&mut out, "CROSS-REFERENCE INFORMATION");

	if callees.is_empty() && callers.is_empty() {
		out.push(NO_CROSS_REFERENCE_TEXT.to_string());
		return out;
	}

	if !callees.is_empty() {
		out.push("This function calls:".to_string());
		out.push(String::new());
		push_entries(&mut out, callees);
		out.push(String::new());
	}

	if !callers.is_empty() {
		out.push("This function is called by:".to_string());
		out.push(String::new());
		push_entries(&mut out, callers);
	}

	out
}

/// A section title with its caret underline, matching the title's character
/// length exactly.
fn push_title(out: &mut Vec<String>, title: &str) {
	out.push(title.to_string());
	out.push("^".repeat(title.chars().count()));
}

fn push_entries(out: &mut Vec<String>, entries: &[XrefEntry]) {
	for (i, entry) in entries.iter().enumerate() {
		let link = format!(":mat:func:`{}`", entry.name);
		match &entry.description {
			Some(desc) if !desc.is_empty() => out.push(format!("{link} {desc}")),
			_ => out.push(link),
		}
		// Paragraph break between entries.
		if i + 1 < entries.len() {
			out.push(String::new());
		}
	}
}
