//! Typed lookup over the per-package-root configuration.
//!
//! The INI file is parsed eagerly at load time into a [`ConfigStore`]:
//! the `[global]` section plus a table of `[path <rel>]` sections keyed
//! by normalized relative path.  Section identity is resolved once here,
//! never re-derived from header strings during lookups.
pub mod ini;

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use regex::Regex;

use crate::error::ConfigError;
use crate::logging::Log;

/// File name of the configuration, relative to the package root.
pub const CONFIG_FILE: &str = "lnsync.ini";

/// One section's options with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Options {
    section: String,
    values: BTreeMap<String, String>,
}

impl Options {
    fn new(section: &str) -> Self {
        Self {
            section: section.to_string(),
            values: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: String, value: String) {
        self.values.insert(key, value);
    }

    /// Look up a raw string value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a raw string value, failing when the option is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] if the option is not set.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey {
            section: self.section.clone(),
            key: key.to_string(),
        })
    }

    /// Parse an option as a boolean (`1/yes/true/on` or `0/no/false/off`,
    /// case-insensitive), returning `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the value is present but
    /// not a recognized boolean.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(true),
            "0" | "no" | "false" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                section: self.section.clone(),
                key: key.to_string(),
                value: value.to_string(),
                expected: "boolean",
            }),
        }
    }

    /// Parse an option as an integer with legacy-compatible base
    /// detection: `0` followed immediately by another digit is octal
    /// (`0640`), then `0x`/`0o` prefixes, else decimal.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] if the option is not set and
    /// [`ConfigError::InvalidValue`] if it does not parse.
    pub fn get_int(&self, key: &str) -> Result<i64, ConfigError> {
        let value = self.require(key)?;
        parse_int(value).ok_or_else(|| ConfigError::InvalidValue {
            section: self.section.clone(),
            key: key.to_string(),
            value: value.to_string(),
            expected: "integer",
        })
    }
}

/// Detect the numeric base of `value` and parse it.
///
/// `0<digit>…` is parsed in base 8 for compatibility with permission
/// masks written in the traditional `0640` style; otherwise standard
/// prefix detection applies (`0x` hex, `0o` octal, else decimal).
fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (radix, digits) = if let Some(rest) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, rest)
    } else if let Some(rest) = digits
        .strip_prefix("0o")
        .or_else(|| digits.strip_prefix("0O"))
    {
        (8, rest)
    } else if digits.len() > 1
        && digits.starts_with('0')
        && digits.bytes().nth(1).is_some_and(|b| b.is_ascii_digit())
    {
        (8, digits.strip_prefix('0').unwrap_or(digits))
    } else {
        (10, digits)
    };
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// A `[path <rel>]` section.
#[derive(Debug, Clone)]
pub struct PathSection {
    /// The relative path exactly as written in the section header.
    pub rel: PathBuf,
    /// The section's options.
    pub options: Options,
}

/// Parsed configuration for one run: `[global]` options plus the ordered
/// `[path <rel>]` table.  Immutable after loading.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    global: Options,
    paths: Vec<PathSection>,
    index: BTreeMap<PathBuf, usize>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            global: Options::new("global"),
            paths: Vec::new(),
            index: BTreeMap::new(),
        }
    }
}

impl ConfigStore {
    /// Load the configuration file at `path`.  A missing file yields an
    /// empty store, so every option falls back to its default.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path, log: &dyn Log) -> Result<Self> {
        Self::from_sections(ini::parse(path)?, log)
    }

    /// Build a store from INI content (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be parsed.
    pub fn parse(content: &str, log: &dyn Log) -> Result<Self> {
        Self::from_sections(ini::parse_str(content)?, log)
    }

    fn from_sections(sections: Vec<ini::Section>, log: &dyn Log) -> Result<Self> {
        let mut store = Self::default();
        for section in sections {
            if section.header == "global" {
                for (key, value) in section.entries {
                    store.global.insert(key, value);
                }
            } else if let Some(rel) = section.header.strip_prefix("path ") {
                let rel = rel.trim();
                if rel.is_empty() {
                    log.warn("ignoring [path] section with an empty path");
                    continue;
                }
                store.insert_path_section(&section.header, rel, section.entries);
            } else {
                log.warn(&format!(
                    "ignoring unrecognized config section [{}]",
                    section.header
                ));
            }
        }
        Ok(store)
    }

    /// Merge entries into the table, reusing the slot when the same
    /// normalized path appears in more than one section header.
    fn insert_path_section(&mut self, header: &str, rel: &str, entries: Vec<(String, String)>) {
        let rel_path = PathBuf::from(rel);
        let key = normalized(&rel_path);
        let idx = if let Some(&existing) = self.index.get(&key) {
            existing
        } else {
            self.paths.push(PathSection {
                rel: rel_path,
                options: Options::new(header),
            });
            let idx = self.paths.len() - 1;
            self.index.insert(key, idx);
            idx
        };
        if let Some(section) = self.paths.get_mut(idx) {
            for (k, v) in entries {
                section.options.insert(k, v);
            }
        }
    }

    /// The `[global]` section (empty when the file had none).
    #[must_use]
    pub const fn global(&self) -> &Options {
        &self.global
    }

    /// All `[path <rel>]` sections in file order.
    #[must_use]
    pub fn path_sections(&self) -> &[PathSection] {
        &self.paths
    }

    /// Options of the `[path <rel>]` section matching `rel`, if any.
    #[must_use]
    pub fn path_options(&self, rel: &Path) -> Option<&Options> {
        self.index
            .get(&normalized(rel))
            .and_then(|&idx| self.paths.get(idx))
            .map(|section| &section.options)
    }

    /// Whether `rel` is configured to be linked as a single unit instead
    /// of mirrored recursively.  Defaults to `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the option is present but not a boolean.
    pub fn symlink_dir(&self, rel: &Path) -> Result<bool, ConfigError> {
        self.path_options(rel)
            .map_or(Ok(false), |options| options.get_bool("symlink_dir", false))
    }

    /// Compile the multi-line ignore-pattern list stored under `key` in
    /// the `[global]` section: one pattern per line, trimmed, blanks
    /// discarded, compiled in file order.  An absent option yields no
    /// rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for a line that does not
    /// compile as a regular expression.
    pub fn ignore_rules(&self, key: &str) -> Result<Vec<Regex>, ConfigError> {
        let Some(raw) = self.global.get(key) else {
            return Ok(Vec::new());
        };
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                Regex::new(line).map_err(|source| ConfigError::InvalidPattern {
                    pattern: line.to_string(),
                    source,
                })
            })
            .collect()
    }
}

/// Canonical form used as the path-table key: components collected with
/// `.` dropped, so `./etc/app/` and `etc/app` address the same section.
fn normalized(rel: &Path) -> PathBuf {
    rel.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
