//! Document kind detection
//!
//! Classification order: exact file-name suffix, then directory convention,
//! then file-name heuristics for templates and references. A recognized
//! suffix always wins over the directory a file lives in.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rules_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Decision,
    Brief,
    Signal,
    Vision,
    Charter,
    Rules,
    Workflow,
    Methodology,
    Registry,
    Template,
    Reference,
    Analysis,
    Paradigm,
    Principle,
    Unknown,
}

/// Descriptive metadata about a document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentKindInfo {
    pub name: &'static str,
    pub file_pattern: &'static str,
    pub path_hint: Option<&'static str>,
    pub description: &'static str,
}

const SUFFIXES: &[(&str, DocumentKind)] = &[
    (".decision.md", DocumentKind::Decision),
    (".brief.md", DocumentKind::Brief),
    (".signal.md", DocumentKind::Signal),
    (".vision.md", DocumentKind::Vision),
    (".charter.md", DocumentKind::Charter),
    (".rules.md", DocumentKind::Rules),
    (".workflow.md", DocumentKind::Workflow),
    (".methodology.md", DocumentKind::Methodology),
    (".registry.md", DocumentKind::Registry),
    ("-template.md", DocumentKind::Template),
    (".reference.md", DocumentKind::Reference),
    (".analysis.md", DocumentKind::Analysis),
    (".paradigm.md", DocumentKind::Paradigm),
    (".principle.md", DocumentKind::Principle),
];

const PATH_FRAGMENTS: &[(&str, DocumentKind)] = &[
    ("/decisions/", DocumentKind::Decision),
    ("/briefs/", DocumentKind::Brief),
    ("/signals/", DocumentKind::Signal),
    ("/charters/", DocumentKind::Charter),
    ("/rules/", DocumentKind::Rules),
    ("/processes/", DocumentKind::Workflow),
    ("/workflows/", DocumentKind::Workflow),
    ("/methodologies/", DocumentKind::Methodology),
    ("/registries/", DocumentKind::Registry),
    ("/registry/", DocumentKind::Registry),
];

impl DocumentKind {
    pub const ALL: [DocumentKind; 15] = [
        Self::Decision,
        Self::Brief,
        Self::Signal,
        Self::Vision,
        Self::Charter,
        Self::Rules,
        Self::Workflow,
        Self::Methodology,
        Self::Registry,
        Self::Template,
        Self::Reference,
        Self::Analysis,
        Self::Paradigm,
        Self::Principle,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        self.info().name
    }

    pub fn info(&self) -> DocumentKindInfo {
        let (name, file_pattern, path_hint, description) = match self {
            Self::Decision => ("decision", "*.decision.md", Some("decisions/"), "Architecture or business decision record"),
            Self::Brief => ("brief", "*.brief.md", Some("briefs/"), "Opportunity brief"),
            Self::Signal => ("signal", "*.signal.md", Some("signals/"), "Market or user signal"),
            Self::Vision => ("vision", "*.vision.md", None, "Strategic vision statement"),
            Self::Charter => ("charter", "*.charter.md", Some("charters/"), "Domain charter"),
            Self::Rules => ("rules", "*.rules.md", Some("rules/"), "Machine-readable rule set"),
            Self::Workflow => ("workflow", "*.workflow.md", Some("workflows/"), "Process workflow"),
            Self::Methodology => ("methodology", "*.methodology.md", Some("methodologies/"), "Working methodology"),
            Self::Registry => ("registry", "*.registry.md", Some("registries/"), "Registry of tracked items"),
            Self::Template => ("template", "*-template.md", None, "Document template"),
            Self::Reference => ("reference", "*.reference.md", None, "Reference material"),
            Self::Analysis => ("analysis", "*.analysis.md", None, "Analysis document"),
            Self::Paradigm => ("paradigm", "*.paradigm.md", None, "Guiding paradigm"),
            Self::Principle => ("principle", "*.principle.md", None, "Guiding principle"),
            Self::Unknown => ("unknown", "*.md", None, "Unclassified document"),
        };
        DocumentKindInfo {
            name,
            file_pattern,
            path_hint,
            description,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == lowered)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "document kind",
                value: s.to_string(),
            })
    }
}

/// Classifies candidate files into a [`DocumentKind`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentTypeDetector;

impl DocumentTypeDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, path: impl AsRef<Path>) -> DocumentKind {
        let normalized = NormalizedPath::new(path.as_ref());
        let file_name = normalized.file_name().unwrap_or("").to_lowercase();

        if let Some((_, kind)) = SUFFIXES.iter().find(|(suffix, _)| file_name.ends_with(suffix)) {
            return *kind;
        }

        let rooted = normalized.rooted_lowercase();
        if let Some((_, kind)) = PATH_FRAGMENTS.iter().find(|(fragment, _)| rooted.contains(fragment)) {
            return *kind;
        }

        if file_name.ends_with(".md") {
            if file_name.contains("template") {
                return DocumentKind::Template;
            }
            if file_name.contains("reference") {
                return DocumentKind::Reference;
            }
        }

        DocumentKind::Unknown
    }
}
