use crate::domain::constants::LATEST_TOKEN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

fn default_retries() -> u32 {
    1
}

/// Contents of `<root>/modelzoo.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ZooConfig {
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub validate: ValidateConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MirrorConfig {
    /// Commit and push after every publish.
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub primary_remote: Option<String>,
    #[serde(default)]
    pub secondary_remote: Option<String>,
    /// Extra attempts per remote after the first push fails.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            push: false,
            primary_remote: None,
            secondary_remote: None,
            retries: default_retries(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidateConfig {
    #[serde(default)]
    pub strict: bool,
}

/// Which version of a model a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    Number(u32),
}

impl FromStr for VersionSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == LATEST_TOKEN {
            return Ok(VersionSelector::Latest);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 && !s.starts_with('+') => Ok(VersionSelector::Number(n)),
            _ => Err(format!(
                "version must be '{}' or a positive integer, got '{}'",
                LATEST_TOKEN, s
            )),
        }
    }
}

impl From<u32> for VersionSelector {
    fn from(n: u32) -> Self {
        VersionSelector::Number(n)
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Latest => f.write_str(LATEST_TOKEN),
            VersionSelector::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDescriptor {
    pub model: String,
    pub version: u32,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Layout,
    Schema,
    VersionMismatch,
    IndexInconsistency,
    Load,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationKind::Layout => "layout",
            ViolationKind::Schema => "schema",
            ViolationKind::VersionMismatch => "version_mismatch",
            ViolationKind::IndexInconsistency => "index_inconsistency",
            ViolationKind::Load => "load",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub model: Option<String>,
    pub version: Option<u32>,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR [{}] ", self.kind)?;
        match (&self.model, self.version) {
            (Some(m), Some(v)) => write!(f, "{}/v{}: ", m, v)?,
            (Some(m), None) => write!(f, "{}: ", m)?,
            _ => {}
        }
        write!(f, "{} ({})", self.message, self.path.display())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub strict: bool,
    pub models_checked: usize,
    pub versions_checked: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }

    pub fn of_kind(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.kind == kind).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(
                f,
                "OK: modelzoo validation passed ({} models, {} versions)",
                self.models_checked, self.versions_checked
            );
        }
        for v in &self.violations {
            writeln!(f, "{}", v)?;
        }
        write!(
            f,
            "FAILED: {} violations in {} models, {} versions",
            self.violations.len(),
            self.models_checked,
            self.versions_checked
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ModelListing {
    pub name: String,
    pub versions: Vec<u32>,
    pub latest: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PublishReport {
    pub model: String,
    pub version: u32,
    pub path: PathBuf,
    pub latest: u32,
    pub sha256: String,
    pub mirror: Option<MirrorReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushOutcome {
    pub remote: String,
    pub ok: bool,
    pub attempts: u32,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MirrorReport {
    pub enabled: bool,
    pub committed: bool,
    pub pushes: Vec<PushOutcome>,
}
