//! NF-005: Render a desired-state graph as YAML or JSON.

use super::error::{Result, TopologyError};
use super::types::DesiredStateGraph;
use std::path::Path;

/// Output format for rendered graphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

/// Render a graph to a string.
pub fn render(graph: &DesiredStateGraph, format: Format) -> Result<String> {
    match format {
        Format::Yaml => Ok(serde_yaml_ng::to_string(graph)?),
        Format::Json => {
            let mut s = serde_json::to_string_pretty(graph)?;
            s.push('\n');
            Ok(s)
        }
    }
}

/// Write rendered content atomically (write to temp, then rename).
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| TopologyError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, content).map_err(|source| TopologyError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| TopologyError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
