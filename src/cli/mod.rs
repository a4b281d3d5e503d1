//! NF-010: CLI subcommands — init, validate, render, outputs, snapshot, verify, schema, completion.

use crate::core::error::{Result, TopologyError};
use crate::core::render::{self, Format};
use crate::core::{params, state, topology, types};
use crate::tripwire::drift;
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new topology project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Evaluate the topology without rendering it
    Validate {
        /// Path to topology.yaml (default: built-in parameters)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Render the desired-state graph
    Render {
        /// Path to topology.yaml (default: built-in parameters)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List exported outputs
    Outputs {
        /// Path to topology.yaml (default: built-in parameters)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Record the current evaluation's fingerprint
    Snapshot {
        /// Path to topology.yaml (default: built-in parameters)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// State directory
        #[arg(long, default_value = "state")]
        state_dir: PathBuf,
    },

    /// Compare the current evaluation against the snapshot
    Verify {
        /// Path to topology.yaml (default: built-in parameters)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// State directory
        #[arg(long, default_value = "state")]
        state_dir: PathBuf,

        /// Exit non-zero on any drift (for CI)
        #[arg(long)]
        tripwire: bool,
    },

    /// Print the JSON schema for topology.yaml
    Schema,

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(file.as_deref()),
        Commands::Render { file, format, out } => {
            cmd_render(file.as_deref(), format, out.as_deref())
        }
        Commands::Outputs { file } => cmd_outputs(file.as_deref()),
        Commands::Snapshot { file, state_dir } => cmd_snapshot(file.as_deref(), &state_dir),
        Commands::Verify {
            file,
            state_dir,
            tripwire,
        } => cmd_verify(file.as_deref(), &state_dir, tripwire),
        Commands::Schema => cmd_schema(),
        Commands::Completion { shell } => {
            cmd_completion(shell);
            Ok(())
        }
    }
}

/// Load parameters and evaluate the descriptor.
fn load_graph(file: Option<&Path>) -> Result<types::DesiredStateGraph> {
    let params = params::load_or_default(file)?;
    topology::evaluate(&params)
}

fn cmd_init(path: &Path) -> Result<()> {
    let config_path = path.join("topology.yaml");
    if config_path.exists() {
        return Err(TopologyError::AlreadyExists(config_path));
    }

    let state_dir = path.join("state");
    std::fs::create_dir_all(&state_dir).map_err(|source| TopologyError::Write {
        path: state_dir.clone(),
        source,
    })?;

    let yaml = params::to_yaml(&params::TopologyParams::default())?;
    std::fs::write(&config_path, yaml).map_err(|source| TopologyError::Write {
        path: config_path.clone(),
        source,
    })?;

    println!("Initialized netforge project at {}", path.display());
    println!("  Created: {}", config_path.display());
    println!("  Created: {}/", state_dir.display());
    Ok(())
}

fn cmd_validate(file: Option<&Path>) -> Result<()> {
    let graph = load_graph(file)?;
    println!(
        "OK: {} ({} resources, {} outputs)",
        graph.name,
        graph.resources.len(),
        graph.outputs.len()
    );
    Ok(())
}

fn cmd_render(file: Option<&Path>, format: Format, out: Option<&Path>) -> Result<()> {
    let graph = load_graph(file)?;
    let rendered = render::render(&graph, format)?;
    match out {
        Some(path) => {
            render::write_atomic(path, &rendered)?;
            tracing::info!(path = %path.display(), "rendered graph written");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn cmd_outputs(file: Option<&Path>) -> Result<()> {
    let graph = load_graph(file)?;
    print!("{}", format_outputs(&graph));
    Ok(())
}

/// Exported outputs as an aligned table.
fn format_outputs(graph: &types::DesiredStateGraph) -> String {
    let mut out = format!("Outputs: {} ({})\n", graph.name, graph.outputs.len());
    let width = graph.outputs.keys().map(String::len).max().unwrap_or(0);
    for (name, value) in &graph.outputs {
        out.push_str(&format!("  {:<width$}  {}\n", name, value, width = width));
    }
    out
}

fn cmd_snapshot(file: Option<&Path>, state_dir: &Path) -> Result<()> {
    let graph = load_graph(file)?;
    let snapshot = state::snapshot_of(&graph)?;
    let path = state::save_snapshot(state_dir, &snapshot)?;
    println!(
        "Snapshot: {} ({} resources) {}",
        snapshot.stack,
        snapshot.resources.len(),
        snapshot.fingerprint
    );
    println!("  Saved: {}", path.display());
    Ok(())
}

fn cmd_verify(file: Option<&Path>, state_dir: &Path, tripwire_mode: bool) -> Result<()> {
    let graph = load_graph(file)?;
    let Some(snapshot) = state::load_snapshot(state_dir, &graph.name)? else {
        println!("No snapshot found for {}. Run `netforge snapshot` first.", graph.name);
        return Ok(());
    };

    println!(
        "Checking {} ({} resources)...",
        graph.name,
        graph.resources.len()
    );
    let findings = drift::detect_drift(&snapshot, &graph)?;

    if findings.is_empty() {
        println!("No drift detected.");
        return Ok(());
    }

    for f in &findings {
        println!("  {}: {}", f.kind, f.subject);
        println!("    Expected: {}", f.expected);
        println!("    Actual:   {}", f.actual);
    }
    println!();
    println!("Drift detected: {} finding(s)", findings.len());
    if tripwire_mode {
        return Err(TopologyError::Drift(findings.len()));
    }
    Ok(())
}

fn cmd_schema() -> Result<()> {
    println!("{}", params::schema_json()?);
    Ok(())
}

fn cmd_completion(shell: clap_complete::Shell) {
    print!("{}", completion_script(shell));
}

fn completion_script(shell: clap_complete::Shell) -> String {
    let mut cmd = Commands::augment_subcommands(clap::Command::new("netforge"));
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "netforge", &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nf010_init() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("test-project");
        std::fs::create_dir_all(&sub).unwrap();
        cmd_init(&sub).unwrap();
        assert!(sub.join("topology.yaml").exists());
        assert!(sub.join("state").is_dir());

        let p = params::load_params(&sub.join("topology.yaml")).unwrap();
        assert_eq!(p, params::TopologyParams::default());
    }

    #[test]
    fn test_nf010_init_already_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("topology.yaml"), "exists").unwrap();
        let result = cmd_init(dir.path());
        assert!(matches!(result, Err(TopologyError::AlreadyExists(_))));
    }

    #[test]
    fn test_nf010_validate_defaults() {
        cmd_validate(None).unwrap();
    }

    #[test]
    fn test_nf010_validate_bad_version() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("topology.yaml");
        std::fs::write(&file, "version: \"2.0\"\n").unwrap();
        assert!(cmd_validate(Some(&file)).is_err());
    }

    #[test]
    fn test_nf010_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("graph.json");
        cmd_render(None, Format::Json, Some(&out)).unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        let graph: types::DesiredStateGraph = serde_json::from_str(&content).unwrap();
        assert_eq!(graph.resources.len(), 9);
    }

    #[test]
    fn test_nf010_outputs() {
        let graph = load_graph(None).unwrap();
        let text = format_outputs(&graph);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Outputs: web-topology (3)");
        assert!(lines[1].trim_start().starts_with("vpc_id"));
        assert!(lines[1].ends_with("my-vpc.id"));
        assert!(lines[3].contains("instance2_public_ip"));
        assert!(lines[3].ends_with("instance-2.public_ip"));
    }

    #[test]
    fn test_nf010_snapshot_then_verify_clean() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("state");
        cmd_snapshot(None, &state_dir).unwrap();
        assert!(state_dir
            .join("web-topology")
            .join("graph.snapshot.yaml")
            .exists());
        cmd_verify(None, &state_dir, true).unwrap();
    }

    #[test]
    fn test_nf010_verify_tripwire_on_drift() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("state");
        cmd_snapshot(None, &state_dir).unwrap();

        let file = dir.path().join("topology.yaml");
        std::fs::write(&file, "instance_type: t3.large\n").unwrap();

        // report-only mode succeeds
        cmd_verify(Some(&file), &state_dir, false).unwrap();

        let result = cmd_verify(Some(&file), &state_dir, true);
        assert!(matches!(result, Err(TopologyError::Drift(2))));
    }

    #[test]
    fn test_nf010_verify_without_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        cmd_verify(None, dir.path(), true).unwrap();
    }

    #[test]
    fn test_nf010_completion_bash() {
        let script = completion_script(clap_complete::Shell::Bash);
        assert!(script.contains("netforge"));
        assert!(script.contains("render"));
        assert!(script.contains("verify"));
    }

    #[test]
    fn test_nf010_dispatch_validate() {
        dispatch(Commands::Validate { file: None }).unwrap();
    }
}
