//! NF-009: Drift detection — compare a fresh evaluation to a saved snapshot.
//!
//! Drift here means the descriptor now declares something different from what
//! was snapshotted. Live cloud state is never consulted.

use crate::core::error::Result;
use crate::core::state::GraphSnapshot;
use crate::core::types::DesiredStateGraph;
use crate::tripwire::hasher;
use std::fmt;

/// What changed for one resource or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftKind {
    Changed,
    Added,
    Removed,
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed => write!(f, "CHANGED"),
            Self::Added => write!(f, "ADDED"),
            Self::Removed => write!(f, "REMOVED"),
        }
    }
}

/// A single drift finding.
#[derive(Debug, Clone)]
pub struct DriftFinding {
    pub subject: String,
    pub kind: DriftKind,
    pub expected: String,
    pub actual: String,
}

/// Compare a snapshot against a freshly evaluated graph.
pub fn detect_drift(snapshot: &GraphSnapshot, graph: &DesiredStateGraph) -> Result<Vec<DriftFinding>> {
    let mut findings = Vec::new();

    let actual_fingerprint = hasher::fingerprint(graph)?;
    if snapshot.fingerprint == actual_fingerprint && snapshot.stack == graph.name {
        return Ok(findings);
    }

    if snapshot.stack != graph.name {
        findings.push(DriftFinding {
            subject: "stack".to_string(),
            kind: DriftKind::Changed,
            expected: snapshot.stack.clone(),
            actual: graph.name.clone(),
        });
    }

    for (name, args) in &graph.resources {
        let actual = hasher::hash_declaration(args)?;
        match snapshot.resources.get(name) {
            Some(entry) if entry.hash == actual => {}
            Some(entry) => findings.push(DriftFinding {
                subject: name.clone(),
                kind: DriftKind::Changed,
                expected: entry.hash.clone(),
                actual,
            }),
            None => findings.push(DriftFinding {
                subject: name.clone(),
                kind: DriftKind::Added,
                expected: "MISSING".to_string(),
                actual,
            }),
        }
    }

    for (name, entry) in &snapshot.resources {
        if !graph.resources.contains_key(name) {
            findings.push(DriftFinding {
                subject: name.clone(),
                kind: DriftKind::Removed,
                expected: entry.hash.clone(),
                actual: "MISSING".to_string(),
            });
        }
    }

    for (name, value) in &graph.outputs {
        match snapshot.outputs.get(name) {
            Some(old) if old == value => {}
            Some(old) => findings.push(DriftFinding {
                subject: format!("output {}", name),
                kind: DriftKind::Changed,
                expected: old.to_string(),
                actual: value.to_string(),
            }),
            None => findings.push(DriftFinding {
                subject: format!("output {}", name),
                kind: DriftKind::Added,
                expected: "MISSING".to_string(),
                actual: value.to_string(),
            }),
        }
    }
    for (name, old) in &snapshot.outputs {
        if !graph.outputs.contains_key(name) {
            findings.push(DriftFinding {
                subject: format!("output {}", name),
                kind: DriftKind::Removed,
                expected: old.to_string(),
                actual: "MISSING".to_string(),
            });
        }
    }

    // Snapshot edited by hand: items agree but the recorded fingerprint doesn't.
    if findings.is_empty() {
        findings.push(DriftFinding {
            subject: "fingerprint".to_string(),
            kind: DriftKind::Changed,
            expected: snapshot.fingerprint.clone(),
            actual: actual_fingerprint,
        });
    }

    Ok(findings)
}
