//! Line-oriented parser for the ini dialect used by installation configs,
//! credentials files and unit-file templates.
//!
//! Accepted input: `[section]` headers, `key = value` / `key: value`
//! options, bare keys (no delimiter at all), `#` or `;` comment lines and
//! blank lines. Values keep `$` references untouched; resolution happens at
//! read time in [`ConfigDocument`]. Duplicate sections or options within a
//! single document are rejected so a typo cannot silently shadow an earlier
//! line; overriding belongs to the layering step, not to one file.

use std::fs;
use std::path::Path;

use crate::config::ConfigDocument;
use crate::error::{InstallError, Result};

const COMPONENT: &str = "CONFIG";

/// Reads and parses one document from disk.
pub fn parse_file(path: &Path) -> Result<ConfigDocument> {
    let text = fs::read_to_string(path).map_err(|err| {
        InstallError::configuration(
            COMPONENT,
            format!("cannot read configuration file {}: {err}", path.display()),
        )
    })?;
    parse_str(&text).map_err(|err| {
        InstallError::configuration(
            COMPONENT,
            format!("cannot parse {}: {}", path.display(), err.message()),
        )
    })
}

/// Parses one document from text.
pub fn parse_str(text: &str) -> Result<ConfigDocument> {
    let mut document = ConfigDocument::new();
    let mut current_section: Option<String> = None;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.strip_suffix(']').ok_or_else(|| {
                InstallError::configuration(
                    COMPONENT,
                    format!("line {line_number}: unterminated section header '{trimmed}'"),
                )
            })?;
            if document.has_section(name) {
                return Err(InstallError::configuration(
                    COMPONENT,
                    format!("line {line_number}: duplicate section [{name}]"),
                ));
            }
            document.ensure_section(name);
            current_section = Some(name.to_string());
            continue;
        }

        let section = current_section.as_deref().ok_or_else(|| {
            InstallError::configuration(
                COMPONENT,
                format!("line {line_number}: option '{trimmed}' appears before any section header"),
            )
        })?;

        let (option, value) = split_option(trimmed);
        if option.is_empty() {
            return Err(InstallError::configuration(
                COMPONENT,
                format!("line {line_number}: option line '{trimmed}' has an empty key"),
            ));
        }
        if document.has_option(section, option) {
            return Err(InstallError::configuration(
                COMPONENT,
                format!("line {line_number}: duplicate option '{option}' in section [{section}]"),
            ));
        }
        document.put(section, option, value.map(str::to_string));
    }

    Ok(document)
}

/// Splits an option line at the first `=` or `:`. A line without either
/// delimiter is a bare key.
fn split_option(line: &str) -> (&str, Option<&str>) {
    match line.find(['=', ':']) {
        Some(at) => {
            let option = line[..at].trim_end();
            let value = line[at + 1..].trim_start();
            (option, Some(value))
        }
        None => (line, None),
    }
}
