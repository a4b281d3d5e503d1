//! NF-008: BLAKE3 fingerprints for declarations and whole graphs.

use crate::core::error::Result;
use crate::core::types::{DesiredStateGraph, ResourceArgs};

/// Hash a string. Returns `"blake3:{hex}"`.
pub fn hash_string(s: &str) -> String {
    format!("blake3:{}", blake3::hash(s.as_bytes()).to_hex())
}

/// Compute a composite hash from multiple component hashes.
pub fn composite_hash(components: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in components {
        hasher.update(c.as_bytes());
        hasher.update(b"\0");
    }
    format!("blake3:{}", hasher.finalize().to_hex())
}

/// Hash one declaration over its canonical JSON form.
pub fn hash_declaration(args: &ResourceArgs) -> Result<String> {
    let canonical = serde_json::to_string(args)?;
    Ok(hash_string(&canonical))
}

/// Fingerprint a whole graph: stack name, then each resource name with its
/// declaration hash, then each output name with its reference, all in order.
pub fn fingerprint(graph: &DesiredStateGraph) -> Result<String> {
    let mut parts: Vec<String> = Vec::with_capacity(1 + 2 * graph.resources.len());
    parts.push(graph.name.clone());
    for (name, args) in &graph.resources {
        parts.push(name.clone());
        parts.push(hash_declaration(args)?);
    }
    for (name, value) in &graph.outputs {
        parts.push(format!("{}={}", name, value));
    }
    let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
    Ok(composite_hash(&refs))
}
