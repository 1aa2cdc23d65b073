//! Pinned dependency manifests.
//!
//! One requirement per line in the form `name==version`, optionally with
//! extras (`name[extra]==version`), an environment marker after `;`, or a
//! trailing ` # comment`. Lines starting with `#` are comments and blank
//! lines are ignored. Package names are compared after PEP 503
//! normalization, so `Azure_Functions` and `azure-functions` collide.

use crate::utils::error::{AppError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

fn requirement_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<name>[A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<op>===|==|~=|!=|<=|>=|<|>)?\s*(?P<version>.*)$",
        )
        .expect("requirement pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub version: String,
    pub marker: Option<String>,
    /// 1-based line number in the manifest.
    pub line: usize,
}

impl Requirement {
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        write!(f, "=={}", self.version)?;
        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    MalformedLine,
    NotPinned { operator: Option<String> },
    InvalidName,
    InvalidVersion { reason: &'static str },
    DuplicatePackage { first_line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIssue {
    pub line: usize,
    pub text: String,
    pub kind: IssueKind,
}

impl fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            IssueKind::MalformedLine => write!(f, "cannot parse '{}'", self.text),
            IssueKind::NotPinned { operator: None } => {
                write!(f, "'{}' has no version pin (expected name==version)", self.text)
            }
            IssueKind::NotPinned {
                operator: Some(op),
            } => write!(f, "'{}' uses '{}' instead of an exact '==' pin", self.text, op),
            IssueKind::InvalidName => write!(f, "invalid package name in '{}'", self.text),
            IssueKind::InvalidVersion { reason } => {
                write!(f, "invalid version in '{}': {}", self.text, reason)
            }
            IssueKind::DuplicatePackage { first_line } => write!(
                f,
                "'{}' duplicates the package pinned on line {}",
                self.text, first_line
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    Blank,
    Comment(String),
    Pin(Requirement),
    Invalid(ManifestIssue),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    lines: Vec<ManifestLine>,
}

impl Manifest {
    /// Parses every line. Never fails: problems are kept as `Invalid` lines.
    pub fn parse(content: &str) -> Self {
        let lines = content
            .lines()
            .enumerate()
            .map(|(idx, raw)| parse_line(idx + 1, raw))
            .collect();
        Self { lines }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parses and fails when any line is invalid or a package repeats.
    pub fn check(content: &str) -> Result<Self> {
        let manifest = Self::parse(content);
        let issues = manifest.validate();
        if issues.is_empty() {
            return Ok(manifest);
        }
        let summary: Vec<String> = issues.iter().map(ToString::to_string).collect();
        Err(AppError::ManifestError {
            message: summary.join("; "),
        })
    }

    pub fn lines(&self) -> &[ManifestLine] {
        &self.lines
    }

    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.lines.iter().filter_map(|line| match line {
            ManifestLine::Pin(req) => Some(req),
            _ => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            ManifestLine::Comment(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        let wanted = normalize_name(name);
        self.requirements().find(|req| req.normalized_name() == wanted)
    }

    /// Line issues followed by duplicate-package issues, in line order.
    pub fn validate(&self) -> Vec<ManifestIssue> {
        let mut issues: Vec<ManifestIssue> = self
            .lines
            .iter()
            .filter_map(|line| match line {
                ManifestLine::Invalid(issue) => Some(issue.clone()),
                _ => None,
            })
            .collect();

        let mut seen: HashMap<String, usize> = HashMap::new();
        for req in self.requirements() {
            match seen.get(&req.normalized_name()) {
                Some(&first_line) => issues.push(ManifestIssue {
                    line: req.line,
                    text: req.to_string(),
                    kind: IssueKind::DuplicatePackage { first_line },
                }),
                None => {
                    seen.insert(req.normalized_name(), req.line);
                }
            }
        }

        issues.sort_by_key(|issue| issue.line);
        issues
    }
}

/// PEP 503: lowercase, runs of `-`, `_` and `.` collapse to one `-`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
            }
            in_separator = true;
        } else {
            normalized.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    normalized
}

fn strip_inline_comment(line: &str) -> &str {
    let mut previous_is_space = false;
    for (idx, c) in line.char_indices() {
        if c == '#' && previous_is_space {
            return line[..idx].trim_end();
        }
        previous_is_space = c.is_whitespace();
    }
    line
}

fn parse_line(number: usize, raw: &str) -> ManifestLine {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ManifestLine::Blank;
    }
    if let Some(comment) = trimmed.strip_prefix('#') {
        return ManifestLine::Comment(comment.trim().to_string());
    }

    let body = strip_inline_comment(trimmed);
    let invalid = |kind| {
        ManifestLine::Invalid(ManifestIssue {
            line: number,
            text: body.to_string(),
            kind,
        })
    };

    let (requirement, marker) = match body.split_once(';') {
        Some((requirement, marker)) => (requirement.trim(), Some(marker.trim().to_string())),
        None => (body, None),
    };

    let Some(caps) = requirement_pattern().captures(requirement) else {
        return invalid(IssueKind::MalformedLine);
    };

    let name = &caps["name"];
    if !name.ends_with(|c: char| c.is_ascii_alphanumeric()) {
        return invalid(IssueKind::InvalidName);
    }

    let version = caps["version"].trim();
    match caps.name("op").map(|m| m.as_str()) {
        Some("==") => {}
        None if version.is_empty() => return invalid(IssueKind::NotPinned { operator: None }),
        None => return invalid(IssueKind::MalformedLine),
        Some(op) => {
            return invalid(IssueKind::NotPinned {
                operator: Some(op.to_string()),
            })
        }
    }

    if version.is_empty() {
        return invalid(IssueKind::InvalidVersion {
            reason: "version is empty",
        });
    }
    if version.contains('*') {
        return invalid(IssueKind::InvalidVersion {
            reason: "wildcards are not exact pins",
        });
    }
    if !version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '!' | '-' | '_'))
    {
        return invalid(IssueKind::InvalidVersion {
            reason: "unexpected character",
        });
    }

    let extras = caps
        .name("extras")
        .map(|m| {
            m.as_str()
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ManifestLine::Pin(Requirement {
        name: name.to_string(),
        extras,
        version: version.to_string(),
        marker: marker.filter(|m| !m.is_empty()),
        line: number,
    })
}
