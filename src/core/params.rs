//! NF-003: Topology parameters and `topology.yaml` loading.
//!
//! Every field has a default, so an empty or null document (or no file at all)
//! yields the stock topology. Only the schema version and the stack name are
//! checked here; the stack name keys the state directory. Resource values are
//! judged by the provisioning runtime at apply time.

use super::error::{Result, TopologyError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SCHEMA_VERSION: &str = "1.0";

const DEFAULT_ZONE: &str = "ap-southeast-1a";
const DEFAULT_PUBLIC_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQDuXwFAfiNb2wHcffLKnaouDcn+wksQrJSeb5uAildqN5CyN1nz7hrIbPcK3++XQxMLXJ7Hg9Ynb0P5krSBjwsK9ng2Odl3QvTBkM2nVS8OtKh3InGzqNZmucyXxiLRK9jcR+VZNQZELYZmJ5ZsfxVqWOMk6EdL0p+ffEkLiHb7KfRFg5PrrhlVY9FhyMyM1vxvAisH6RC/yE7wjhku8cptkOyw2WF82dNKJsx2JOA+oDXRqqxZY5hQXwQl4kESLh2kpyCEg5XAt5qvX5oJU1bDrgAYmeotvvTCDfmI0bAOFL1/tj1saTr3dA4pbhnGszMH3SF5lh5fE1K1K2PVOX7p codespace@codespaces-a4c1aa";

/// Inputs to the topology descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TopologyParams {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Stack name
    pub name: String,

    /// VPC address range
    pub vpc_cidr: String,

    /// Public subnet address range
    pub subnet_cidr: String,

    /// Availability zone of the public subnet
    pub availability_zone: String,

    /// TCP ports opened for ingress
    pub ingress_ports: Vec<u16>,

    /// Source range for ingress rules (egress is always open)
    pub ingress_cidr: String,

    /// EC2 instance type
    pub instance_type: String,

    /// Machine image id
    pub ami: String,

    /// SSH public key material for the key pair
    pub public_key: String,

    /// Instances to launch, in order
    pub instances: Vec<InstanceSpec>,
}

/// One instance placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InstanceSpec {
    pub name: String,
    pub availability_zone: String,
}

impl InstanceSpec {
    pub fn new(name: &str, availability_zone: &str) -> Self {
        Self {
            name: name.to_string(),
            availability_zone: availability_zone.to_string(),
        }
    }
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            name: "web-topology".to_string(),
            vpc_cidr: "10.0.0.0/16".to_string(),
            subnet_cidr: "10.0.1.0/24".to_string(),
            availability_zone: DEFAULT_ZONE.to_string(),
            ingress_ports: vec![80, 22],
            ingress_cidr: "0.0.0.0/0".to_string(),
            instance_type: "t3.small".to_string(),
            ami: "ami-01938df366ac2d954".to_string(),
            public_key: DEFAULT_PUBLIC_KEY.to_string(),
            // Both instances share one zone.
            instances: vec![
                InstanceSpec::new("instance-1", DEFAULT_ZONE),
                InstanceSpec::new("instance-2", DEFAULT_ZONE),
            ],
        }
    }
}

/// Parse a topology.yaml file from disk.
pub fn load_params(path: &Path) -> Result<TopologyParams> {
    let content = std::fs::read_to_string(path).map_err(|source| TopologyError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_params(&content)
}

/// Parse topology parameters from a YAML string.
pub fn parse_params(yaml: &str) -> Result<TopologyParams> {
    let params = if yaml.trim().is_empty() {
        TopologyParams::default()
    } else {
        serde_yaml_ng::from_str::<Option<TopologyParams>>(yaml)?.unwrap_or_default()
    };
    if params.version != SCHEMA_VERSION {
        return Err(TopologyError::Config(format!(
            "version must be \"{}\", got \"{}\"",
            SCHEMA_VERSION, params.version
        )));
    }
    check_stack_name(&params.name)?;
    Ok(params)
}

/// The stack name becomes a directory under the state dir, so it must be a
/// single plain path component.
pub fn check_stack_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(TopologyError::Config(format!(
            "stack name must be a single path component, got \"{}\"",
            name
        )));
    }
    Ok(())
}

/// Load from a file when given, otherwise use the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<TopologyParams> {
    match path {
        Some(p) => load_params(p),
        None => Ok(TopologyParams::default()),
    }
}

/// Serialize parameters as a commented `topology.yaml`.
pub fn to_yaml(params: &TopologyParams) -> Result<String> {
    let body = serde_yaml_ng::to_string(params)?;
    Ok(format!("# netforge topology parameters\n{}", body))
}

/// JSON schema for `topology.yaml`.
pub fn schema_json() -> Result<String> {
    let schema = schemars::schema_for!(TopologyParams);
    Ok(serde_json::to_string_pretty(&schema)?)
}
