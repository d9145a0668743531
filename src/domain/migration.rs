//! Migration file domain types
//!
//! Naming convention, path resolution against the migration root,
//! and the ordered set of migration files present on disk.

use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Component, Path};
use std::sync::OnceLock;

/// `V`, one or more digits, then a double underscore
const MIGRATION_FILE_PATTERN: &str = r"^V(\d+)__";

fn migration_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MIGRATION_FILE_PATTERN).expect("static pattern is valid"))
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Whether the base name of `path` follows the `V<digits>__` convention.
///
/// The directory part is ignored.
pub fn is_migration_file(path: &str) -> bool {
    migration_file_regex().is_match(base_name(path))
}

/// Version number embedded in the base name, without leading zeros.
///
/// Kept as a digit string so arbitrarily long versions compare correctly.
pub fn migration_version(path: &str) -> Option<&str> {
    let caps = migration_file_regex().captures(base_name(path))?;
    let digits = caps.get(1)?.as_str();
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed })
}

/// Why a path could not be expressed relative to the migration root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolutionError {
    /// One of the two paths is absolute and the other is not
    MixedAbsolute,
    /// The root walks up through `..` past what the path can match
    UnresolvableParent,
}

impl std::fmt::Display for PathResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MixedAbsolute => write!(f, "cannot mix absolute and relative paths"),
            Self::UnresolvableParent => write!(f, "cannot resolve '..' in migration root"),
        }
    }
}

/// Lexically clean a path into its components.
///
/// `.` is dropped and `name/..` pairs are collapsed. Leading `..` on a
/// relative path is kept; on an absolute path it is dropped.
fn clean_components(path: &Path) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => match out.last() {
                Some(last) if last != ".." => {
                    out.pop();
                }
                _ if path.is_absolute() => {}
                _ => out.push("..".to_string()),
            },
            Component::Normal(name) => out.push(name.to_string_lossy().into_owned()),
        }
    }
    out
}

/// Express `path` relative to `root`, using `/` as separator.
///
/// Purely lexical: nothing is read from disk. A path outside the root
/// resolves to a `../`-prefixed path. An empty result is `.`.
pub fn relative_to(root: &Path, path: &Path) -> Result<String, PathResolutionError> {
    if root.is_absolute() != path.is_absolute() {
        return Err(PathResolutionError::MixedAbsolute);
    }

    let root = clean_components(root);
    let target = clean_components(path);

    let common = root
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if root[common..].iter().any(|c| c == "..") {
        return Err(PathResolutionError::UnresolvableParent);
    }

    let mut parts: Vec<&str> = vec![".."; root.len() - common];
    parts.extend(target[common..].iter().map(String::as_str));

    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

/// How migration files are ordered when deciding which one is last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingMode {
    /// Byte-wise comparison of the relative path (`V10__` sorts before `V9__`)
    #[default]
    Lexical,
    /// Numeric comparison of the `V<digits>` version, ties broken lexically
    Version,
}

impl OrderingMode {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lexical" | "alphabetical" | "string" => Some(Self::Lexical),
            "version" | "numeric" => Some(Self::Version),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Version => "version",
        }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexical => a.cmp(b),
            Self::Version => {
                let va = migration_version(a).unwrap_or("0");
                let vb = migration_version(b).unwrap_or("0");
                va.len()
                    .cmp(&vb.len())
                    .then_with(|| va.cmp(vb))
                    .then_with(|| a.cmp(b))
            }
        }
    }
}

/// Migration files present under the migration root, relative to it.
///
/// Entries are deduplicated; iteration is in byte-wise order.
#[derive(Debug, Clone, Default)]
pub struct MigrationFileSet {
    files: BTreeSet<String>,
    ordering: OrderingMode,
}

impl MigrationFileSet {
    pub fn new(ordering: OrderingMode) -> Self {
        Self {
            files: BTreeSet::new(),
            ordering,
        }
    }

    /// Build from relative paths, keeping only migration files.
    pub fn from_paths<I, S>(paths: I, ordering: OrderingMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(ordering);
        for path in paths {
            set.insert(path);
        }
        set
    }

    /// Insert a relative path. Returns false for non-migration files
    /// and for paths already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if !is_migration_file(&path) {
            return false;
        }
        self.files.insert(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// The last migration file under the configured ordering
    pub fn last(&self) -> Option<&str> {
        match self.ordering {
            OrderingMode::Lexical => self.files.last().map(String::as_str),
            OrderingMode::Version => self
                .iter()
                .max_by(|a, b| self.ordering.compare(a, b)),
        }
    }

    /// Whether `path` is present and ordered last.
    pub fn is_last(&self, path: &str) -> bool {
        self.last() == Some(path)
    }
}
