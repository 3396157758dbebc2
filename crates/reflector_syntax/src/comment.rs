//! Doc-comment normalisation.
//!
//! Turns the raw comment that led a declaration into the text stored as its
//! `ToolTip` metadata: markers removed, javadoc gutters stripped, uniform
//! indentation removed, separator lines dropped.

const SPACES_PER_TAB: usize = 8;

/// Formats a raw comment for use as a tooltip.
///
/// Returns an empty string when the comment has no alphanumeric content.
/// `/*~ ... */` and `//~ ...` sections are treated as private notes and
/// removed before anything else.
#[must_use]
pub fn format_comment_for_tooltip(input: &str) -> String {
    if !input.chars().any(|c| c.is_alphanumeric() || u32::from(c) > 0xFF) {
        return String::new();
    }

    let mut result = strip_ignored_sections(input);

    let javadoc = result.contains("/**");
    let c_style = result.contains("/*");
    let cpp_style = result.starts_with("//");

    if javadoc || c_style {
        result = result.replace("/**", "").replace("/*", "").replace("*/", "");
    }
    if cpp_style {
        result = result
            .replace("///", "//")
            .replace("//", "")
            .replace("(cpptext)", "");
    }
    result = result.replace('\r', "");
    result = convert_tabs_to_spaces(&result);

    let lines: Vec<String> = result
        .split('\n')
        .map(|line| {
            let line = line.trim_end();
            if javadoc {
                strip_javadoc_gutter(line).to_string()
            } else {
                line.to_string()
            }
        })
        .collect();

    let is_meaningful = |line: &String| {
        let trimmed = line.trim_start();
        !trimmed.is_empty() && !is_line_separator(trimmed)
    };
    let first = lines
        .iter()
        .position(is_meaningful)
        .unwrap_or(lines.len());
    let mut last = lines.len();
    while last != first && !is_meaningful(&lines[last - 1]) {
        last -= 1;
    }

    let mut out = String::new();
    if first != last {
        let max_indent = lines[first]
            .chars()
            .take_while(|c| c.is_whitespace())
            .count();
        for (index, line) in lines.iter().enumerate().take(last).skip(first) {
            let mut allowed = max_indent;
            if index > 0 && line.starts_with('\t') {
                allowed += 1;
            }
            let cut: usize = line
                .chars()
                .take(allowed)
                .take_while(|c| c.is_whitespace())
                .map(char::len_utf8)
                .sum();
            let line = &line[cut..];

            if index > 0 {
                out.push('\n');
            }
            if !line.is_empty() && !line.chars().all(|c| c == '=') {
                out.push_str(line);
            }
        }
    }

    if out.starts_with('\n') {
        out.remove(0);
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn strip_ignored_sections(input: &str) -> String {
    let mut result = input.to_string();
    while let Some(start) = result.find("/*~") {
        match result[start..].find("*/") {
            Some(rel) => result.replace_range(start..start + rel + 2, ""),
            None => break,
        }
    }
    while let Some(start) = result.find("//~") {
        if let Some(rel) = result[start..].find('\n') {
            result.replace_range(start..=start + rel, "");
        } else {
            result.truncate(start);
            break;
        }
    }
    result
}

/// Removes a leading `*` (and one following space) from a javadoc line.
fn strip_javadoc_gutter(line: &str) -> &str {
    let body = line.trim_start();
    match body.strip_prefix('*') {
        Some(after) => after
            .strip_prefix(|c: char| c.is_whitespace())
            .unwrap_or(after),
        None => line,
    }
}

fn is_line_separator(line: &str) -> bool {
    ['-', '=', '*']
        .iter()
        .any(|&sep| line.chars().all(|c| c == sep))
}

/// Expands tabs to the next multiple of eight columns on each line.
fn convert_tabs_to_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for c in text.chars() {
        match c {
            '\t' => {
                let spaces = SPACES_PER_TAB - (column % SPACES_PER_TAB);
                out.extend(std::iter::repeat_n(' ', spaces));
                column += spaces;
            }
            '\n' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_javadoc() {
        assert_eq!(
            format_comment_for_tooltip("/** Health of the actor */"),
            "Health of the actor"
        );
    }

    #[test]
    fn multi_line_javadoc_loses_gutter() {
        let raw = "/**\n * Line one\n * Line two\n */";
        assert_eq!(format_comment_for_tooltip(raw), "Line one\nLine two");
    }

    #[test]
    fn line_comments() {
        assert_eq!(format_comment_for_tooltip("// Simple"), "Simple");
        assert_eq!(
            format_comment_for_tooltip("/// First\n/// Second"),
            "First\nSecond"
        );
    }

    #[test]
    fn no_alphanumerics_is_empty() {
        assert_eq!(format_comment_for_tooltip("/** */"), "");
        assert_eq!(format_comment_for_tooltip("// ------"), "");
    }

    #[test]
    fn separator_lines_are_trimmed() {
        let raw = "/**\n * =====\n * Body\n * -----\n */";
        assert_eq!(format_comment_for_tooltip(raw), "Body");
    }

    #[test]
    fn ignored_sections_are_removed() {
        assert_eq!(format_comment_for_tooltip("//~ private\n// kept"), "kept");
        assert_eq!(
            format_comment_for_tooltip("/** Visible /*~ hidden */ text */"),
            "Visible  text"
        );
    }

    #[test]
    fn uniform_indentation_is_removed() {
        let raw = "/*\n    Indented\n      More\n*/";
        assert_eq!(format_comment_for_tooltip(raw), "Indented\n  More");
    }

    #[test]
    fn tabs_expand_to_eight_columns() {
        assert_eq!(convert_tabs_to_spaces("a\tb"), "a       b");
        assert_eq!(convert_tabs_to_spaces("\tx\n\ty"), "        x\n        y");
    }
}
