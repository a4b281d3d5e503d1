//! NF-007: Error type shared by the library and the CLI.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("duplicate resource name '{0}'")]
    DuplicateResource(String),

    #[error("duplicate output name '{0}'")]
    DuplicateOutput(String),

    #[error("'{owner}' references undeclared resource '{target}'")]
    UnresolvedReference { owner: String, target: String },

    #[error("'{owner}' references attribute '{attribute}', which {kind} '{target}' does not produce")]
    UnknownAttribute {
        owner: String,
        target: String,
        kind: String,
        attribute: String,
    },

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("{0} drift finding(s)")]
    Drift(usize),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
