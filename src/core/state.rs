//! NF-006: Snapshot files — load, save (atomic), path derivation.
//!
//! A snapshot records the fingerprint of an evaluation so later evaluations
//! can be checked against it. It never describes live infrastructure.

use super::error::{Result, TopologyError};
use super::params::check_stack_name;
use super::render::write_atomic;
use super::types::{DesiredStateGraph, OutputRef, ResourceKind};
use crate::tripwire::hasher;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-stack snapshot of an evaluated graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Schema version
    pub schema: String,

    /// Stack name
    pub stack: String,

    /// Generator version
    pub generator: String,

    /// Composite hash of the whole graph
    pub fingerprint: String,

    /// Per-resource declaration hashes, in declaration order
    pub resources: IndexMap<String, ResourceEntry>,

    /// Exported outputs
    #[serde(default)]
    pub outputs: IndexMap<String, OutputRef>,
}

/// One resource entry in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub hash: String,
}

/// Derive the snapshot path for a stack within the state directory.
pub fn snapshot_path(state_dir: &Path, stack: &str) -> PathBuf {
    state_dir.join(stack).join("graph.snapshot.yaml")
}

/// Build a snapshot from an evaluated graph.
pub fn snapshot_of(graph: &DesiredStateGraph) -> Result<GraphSnapshot> {
    let mut resources = IndexMap::new();
    for (name, args) in &graph.resources {
        resources.insert(
            name.clone(),
            ResourceEntry {
                kind: args.kind(),
                hash: hasher::hash_declaration(args)?,
            },
        );
    }
    Ok(GraphSnapshot {
        schema: "1.0".to_string(),
        stack: graph.name.clone(),
        generator: format!("netforge {}", env!("CARGO_PKG_VERSION")),
        fingerprint: hasher::fingerprint(graph)?,
        resources,
        outputs: graph.outputs.clone(),
    })
}

/// Load a stack's snapshot. Returns None if the file doesn't exist.
pub fn load_snapshot(state_dir: &Path, stack: &str) -> Result<Option<GraphSnapshot>> {
    check_stack_name(stack)?;
    let path = snapshot_path(state_dir, stack);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path).map_err(|source| TopologyError::Read {
        path: path.clone(),
        source,
    })?;
    let snapshot: GraphSnapshot = serde_yaml_ng::from_str(&content)?;
    Ok(Some(snapshot))
}

/// Save a snapshot atomically. Returns the path written.
pub fn save_snapshot(state_dir: &Path, snapshot: &GraphSnapshot) -> Result<PathBuf> {
    check_stack_name(&snapshot.stack)?;
    let path = snapshot_path(state_dir, &snapshot.stack);
    let yaml = serde_yaml_ng::to_string(snapshot)?;
    write_atomic(&path, &yaml)?;
    tracing::debug!(path = %path.display(), "snapshot saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::TopologyParams;
    use crate::core::topology::evaluate;

    fn make_snapshot() -> GraphSnapshot {
        snapshot_of(&evaluate(&TopologyParams::default()).unwrap()).unwrap()
    }

    #[test]
    fn test_nf006_snapshot_path() {
        let p = snapshot_path(Path::new("/state"), "web-topology");
        assert_eq!(p, PathBuf::from("/state/web-topology/graph.snapshot.yaml"));
    }

    #[test]
    fn test_nf006_snapshot_of() {
        let snap = make_snapshot();
        assert_eq!(snap.stack, "web-topology");
        assert_eq!(snap.resources.len(), 9);
        assert_eq!(snap.resources["instance-1"].kind, ResourceKind::Instance);
        assert!(snap.fingerprint.starts_with("blake3:"));
        assert_eq!(snap.outputs.len(), 3);
    }

    #[test]
    fn test_nf006_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let snap = make_snapshot();
        let path = save_snapshot(dir.path(), &snap).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("yaml.tmp").exists());

        let loaded = load_snapshot(dir.path(), "web-topology").unwrap().unwrap();
        assert_eq!(loaded, snap);
        let keys: Vec<_> = loaded.resources.keys().take(2).collect();
        assert_eq!(keys, vec!["my-vpc", "my-igw"]);
    }

    #[test]
    fn test_nf006_load_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot(dir.path(), "ghost").unwrap().is_none());
    }

    #[test]
    fn test_nf006_stack_name_stays_inside_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("state");
        let mut snap = make_snapshot();
        snap.stack = "../escaped".to_string();
        assert!(matches!(
            save_snapshot(&state_dir, &snap),
            Err(TopologyError::Config(_))
        ));
        assert!(!dir.path().join("escaped").exists());
        assert!(load_snapshot(&state_dir, "..").is_err());
    }

    #[test]
    fn test_nf006_load_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), "bad");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "schema: [unterminated").unwrap();
        assert!(load_snapshot(dir.path(), "bad").is_err());
    }
}
