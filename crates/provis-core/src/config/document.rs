//! Ordered, case-sensitive model of an ini-style document.
//!
//! A [`ConfigDocument`] is built by overlaying one or more parsed documents:
//! later layers override earlier ones at the (section, option) granularity
//! and untouched options keep their prior values. Values may reference other
//! options with `${option}` (same section) or `${section:option}`; the
//! references are resolved lazily every time the value is read, never at
//! parse time, so a template can carry `$` text that no reader touches.

use std::path::Path;

use crate::config::parser;
use crate::error::{InstallError, Result};

const COMPONENT: &str = "CONFIG";

/// Interpolation chains longer than this are treated as circular.
const MAX_INTERPOLATION_DEPTH: usize = 10;

#[derive(Debug, Clone)]
struct Section {
    name: String,
    options: Vec<(String, Option<String>)>,
}

impl Section {
    fn raw_value(&self, option: &str) -> Option<&Option<String>> {
        self.options
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, value)| value)
    }
}

/// An ordered overlay of named key/value sections.
///
/// Section and option names are case-preserving and case-sensitive. An
/// option may carry no value at all (a bare key); reading one yields the
/// empty string. Module list sections rely on bare keys.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    sections: Vec<Section>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every path in order and overlays the results, later paths
    /// overriding earlier ones option by option.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut document = Self::new();
        for path in paths {
            let layer = parser::parse_file(path.as_ref())?;
            document.merge_from(layer);
        }
        Ok(document)
    }

    /// Overlays `other` onto this document option by option.
    pub fn merge_from(&mut self, other: ConfigDocument) {
        for section in other.sections {
            self.ensure_section(&section.name);
            for (option, value) in section.options {
                self.put(&section.name, &option, value);
            }
        }
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.find_section(section).is_some()
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.find_section(section)
            .is_some_and(|s| s.raw_value(option).is_some())
    }

    /// Option names of a section, in document order.
    pub fn options(&self, section: &str) -> Result<Vec<String>> {
        let found = self
            .find_section(section)
            .ok_or_else(|| self.no_section(section))?;
        Ok(found.options.iter().map(|(name, _)| name.clone()).collect())
    }

    /// Reads one option with interpolation applied.
    ///
    /// A missing section and a missing option are distinct errors; a bare
    /// key reads as the empty string.
    pub fn get(&self, section: &str, option: &str) -> Result<String> {
        let found = self
            .find_section(section)
            .ok_or_else(|| self.no_section(section))?;
        let value = found.raw_value(option).ok_or_else(|| {
            InstallError::configuration(
                COMPONENT,
                format!("no option '{option}' in section [{section}]"),
            )
        })?;
        match value {
            Some(raw) => self.expand(section, raw, 0),
            None => Ok(String::new()),
        }
    }

    /// Like [`get`](Self::get) but absence yields `fallback` instead of an
    /// error. Interpolation failures of a present value still propagate.
    pub fn get_or(&self, section: &str, option: &str, fallback: &str) -> Result<String> {
        if !self.has_option(section, option) {
            return Ok(fallback.to_string());
        }
        self.get(section, option)
    }

    /// Writes a value, creating the section if needed. Used to cache
    /// derived values back into the document so repeated reads are stable.
    pub fn set(&mut self, section: &str, option: &str, value: impl Into<String>) {
        self.put(section, option, Some(value.into()));
    }

    /// Serializes the document. The process supervisor consuming generated
    /// unit files requires `key=value` without padding; everything else is
    /// written in the conventional padded form.
    pub fn to_ini_string(&self, space_around_delimiters: bool) -> String {
        let delimiter = if space_around_delimiters { " = " } else { "=" };
        let mut out = String::new();
        for section in &self.sections {
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for (option, value) in &section.options {
                match value {
                    Some(value) => {
                        out.push_str(option);
                        out.push_str(delimiter);
                        out.push_str(value);
                        out.push('\n');
                    }
                    None => {
                        out.push_str(option);
                        out.push('\n');
                    }
                }
            }
            out.push('\n');
        }
        out
    }

    pub(crate) fn ensure_section(&mut self, section: &str) {
        if !self.has_section(section) {
            self.sections.push(Section {
                name: section.to_string(),
                options: Vec::new(),
            });
        }
    }

    pub(crate) fn put(&mut self, section: &str, option: &str, value: Option<String>) {
        if let Some(target) = self.sections.iter_mut().find(|s| s.name == section) {
            match target.options.iter_mut().find(|(name, _)| name == option) {
                Some((_, existing)) => *existing = value,
                None => target.options.push((option.to_string(), value)),
            }
            return;
        }
        self.sections.push(Section {
            name: section.to_string(),
            options: vec![(option.to_string(), value)],
        });
    }

    fn find_section(&self, section: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == section)
    }

    fn no_section(&self, section: &str) -> InstallError {
        InstallError::configuration(COMPONENT, format!("no section [{section}]"))
    }

    /// Resolves `${option}` and `${section:option}` references in `raw`.
    /// `$$` escapes a literal dollar. The depth cap turns circular
    /// reference chains into errors instead of unbounded recursion.
    fn expand(&self, section: &str, raw: &str, depth: usize) -> Result<String> {
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(InstallError::configuration(
                COMPONENT,
                format!(
                    "interpolation in section [{section}] exceeds {MAX_INTERPOLATION_DEPTH} levels, circular reference suspected"
                ),
            ));
        }

        let mut resolved = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(at) = rest.find('$') {
            resolved.push_str(&rest[..at]);
            let tail = &rest[at + 1..];
            if let Some(tail) = tail.strip_prefix('$') {
                resolved.push('$');
                rest = tail;
            } else if let Some(tail) = tail.strip_prefix('{') {
                let close = tail.find('}').ok_or_else(|| {
                    InstallError::configuration(
                        COMPONENT,
                        format!("unterminated interpolation reference in section [{section}]: ${{{tail}"),
                    )
                })?;
                let reference = &tail[..close];
                let (ref_section, ref_option) = match reference.split_once(':') {
                    Some((_, second)) if second.contains(':') => {
                        return Err(InstallError::configuration(
                            COMPONENT,
                            format!("malformed interpolation reference ${{{reference}}}: more than one ':'"),
                        ));
                    }
                    Some((ref_section, ref_option)) => (ref_section, ref_option),
                    None => (section, reference),
                };
                let value = self
                    .find_section(ref_section)
                    .and_then(|s| s.raw_value(ref_option))
                    .ok_or_else(|| {
                        InstallError::configuration(
                            COMPONENT,
                            format!(
                                "interpolation reference ${{{reference}}} in section [{section}] does not resolve"
                            ),
                        )
                    })?;
                match value {
                    Some(nested) => {
                        let expanded = self.expand(ref_section, nested, depth + 1)?;
                        resolved.push_str(&expanded);
                    }
                    None => {}
                }
                rest = &tail[close + 1..];
            } else {
                return Err(InstallError::configuration(
                    COMPONENT,
                    format!("stray '$' in section [{section}]: follow it with '$' or '{{'"),
                ));
            }
        }
        resolved.push_str(rest);
        Ok(resolved)
    }
}
