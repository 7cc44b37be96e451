//! INI parsing for the per-package-root configuration file.
use anyhow::{Context as _, Result, bail};
use std::path::Path;

/// A parsed section: raw header (case preserved) plus key-value entries
/// in file order.
///
/// # Examples
///
/// ```
/// use lnsync::config::ini::Section;
///
/// let section = Section {
///     header: "path etc/app".to_string(),
///     entries: vec![("mode".to_string(), "0640".to_string())],
/// };
/// assert_eq!(section.header, "path etc/app");
/// assert_eq!(section.entries.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// The raw section header (e.g. `"global"` or `"path etc/app"`).
    pub header: String,
    /// Key-value entries within this section.
    pub entries: Vec<(String, String)>,
}

/// Parse an INI file into sections.
///
/// A missing file parses as no sections, so every option falls back to
/// its default.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains a syntax error.
pub fn parse(path: &Path) -> Result<Vec<Section>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Parse INI content from a string.
///
/// Format:
/// ```ini
/// [global]
/// src_ignore =
///     \.git
///     \.swp$
/// remove_broken_dest_links = yes  # inline comment stripped
/// ```
///
/// Lines that begin with whitespace continue the value of the preceding
/// option; the continuation is joined with a newline, which is how
/// multi-line pattern lists are expressed.
///
/// # Examples
///
/// ```
/// use lnsync::config::ini::parse_str;
///
/// let sections = parse_str("[global]\nsrc_ignore =\n \\.git\n").unwrap();
/// assert_eq!(sections[0].header, "global");
/// assert_eq!(sections[0].entries[0], ("src_ignore".to_string(), "\n\\.git".to_string()));
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - A key-value pair is malformed (missing `=` or an empty key)
/// - An option appears outside of a section header
/// - A continuation line has no preceding option
pub fn parse_str(content: &str) -> Result<Vec<Section>> {
    let mut sections: Vec<Section> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Indented lines continue the previous option's value.
        if raw.starts_with([' ', '\t']) {
            let Some((_, value)) = sections
                .last_mut()
                .and_then(|section| section.entries.last_mut())
            else {
                bail!("continuation without a preceding option at line {line_num}: {trimmed}");
            };
            value.push('\n');
            value.push_str(strip_inline_comment(trimmed));
            continue;
        }

        if let Some(header) = parse_header(trimmed) {
            sections.push(Section {
                header,
                entries: Vec::new(),
            });
        } else if let Some((key, value)) = parse_kv_line(trimmed) {
            let Some(section) = sections.last_mut() else {
                bail!("option outside of section at line {line_num}: {trimmed}");
            };
            section.entries.push((key, value));
        } else {
            bail!("invalid line {line_num}: {trimmed}");
        }
    }

    Ok(sections)
}

/// Parse a `[header]` line preserving original case.
fn parse_header(line: &str) -> Option<String> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() {
        return None;
    }
    Some(inner.to_string())
}

/// Parse a `key = value` line, stripping inline comments from the value.
fn parse_kv_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((
        key.to_string(),
        strip_inline_comment(value.trim()).to_string(),
    ))
}

/// Strip inline comments (`#` preceded by whitespace) from a value.
fn strip_inline_comment(value: &str) -> &str {
    value
        .find(" #")
        .or_else(|| value.find("\t#"))
        .map_or(value, |idx| value.get(..idx).unwrap_or(value).trim_end())
}
