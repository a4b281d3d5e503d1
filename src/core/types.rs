//! NF-001: Declaration types for the network topology.
//!
//! Every resource is a plain configuration record. Cross-resource links are
//! [`OutputRef`]s (resource name + attribute) that the provisioning runtime
//! resolves. All types derive Serialize/Deserialize for YAML and JSON rendering.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Resource tags. Sorted so rendering is deterministic.
pub type Tags = BTreeMap<String, String>;

/// Build the conventional `Name` tag.
pub fn name_tag(name: &str) -> Tags {
    Tags::from([("Name".to_string(), name.to_string())])
}

// ============================================================================
// Output references
// ============================================================================

/// An output attribute produced by a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Id,
    KeyName,
    PublicIp,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::KeyName => write!(f, "key_name"),
            Self::PublicIp => write!(f, "public_ip"),
        }
    }
}

/// Reference to an output of another declaration, resolved by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    pub resource: String,
    pub attribute: Attribute,
}

impl OutputRef {
    pub fn new(resource: &str, attribute: Attribute) -> Self {
        Self {
            resource: resource.to_string(),
            attribute,
        }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.attribute)
    }
}

// ============================================================================
// Resource kinds
// ============================================================================

/// Resource kind enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vpc,
    InternetGateway,
    Subnet,
    RouteTable,
    RouteTableAssociation,
    SecurityGroup,
    KeyPair,
    Instance,
}

impl ResourceKind {
    /// Whether resources of this kind produce the given output attribute.
    pub fn produces(self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Id => true,
            Attribute::KeyName => self == Self::KeyPair,
            Attribute::PublicIp => self == Self::Instance,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vpc => write!(f, "vpc"),
            Self::InternetGateway => write!(f, "internet_gateway"),
            Self::Subnet => write!(f, "subnet"),
            Self::RouteTable => write!(f, "route_table"),
            Self::RouteTableAssociation => write!(f, "route_table_association"),
            Self::SecurityGroup => write!(f, "security_group"),
            Self::KeyPair => write!(f, "key_pair"),
            Self::Instance => write!(f, "instance"),
        }
    }
}

// ============================================================================
// Resource argument records
// ============================================================================

/// Virtual private cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcArgs {
    pub cidr_block: String,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
    #[serde(default)]
    pub tags: Tags,
}

/// Internet gateway attached to a VPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetGatewayArgs {
    pub vpc_id: OutputRef,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetArgs {
    pub vpc_id: OutputRef,
    pub cidr_block: String,
    pub availability_zone: String,
    pub map_public_ip_on_launch: bool,
    #[serde(default)]
    pub tags: Tags,
}

/// A single route inside a route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub cidr_block: String,
    pub gateway_id: OutputRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableArgs {
    pub vpc_id: OutputRef,
    pub routes: Vec<Route>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableAssociationArgs {
    pub subnet_id: OutputRef,
    pub route_table_id: OutputRef,
}

/// Ingress or egress rule. Protocol `-1` with ports 0–0 means all traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRule {
    pub protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr_blocks: Vec<String>,
}

impl SecurityRule {
    /// Single-port TCP rule.
    pub fn tcp(port: u16, cidr: &str) -> Self {
        Self {
            protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr_blocks: vec![cidr.to_string()],
        }
    }

    /// All protocols, all ports.
    pub fn allow_all(cidr: &str) -> Self {
        Self {
            protocol: "-1".to_string(),
            from_port: 0,
            to_port: 0,
            cidr_blocks: vec![cidr.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupArgs {
    pub description: String,
    pub vpc_id: OutputRef,
    pub ingress: Vec<SecurityRule>,
    pub egress: Vec<SecurityRule>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairArgs {
    pub public_key: String,
}

/// EC2 instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceArgs {
    pub instance_type: String,
    pub ami: String,
    pub subnet_id: OutputRef,
    pub associate_public_ip_address: bool,
    pub vpc_security_group_ids: Vec<OutputRef>,
    pub availability_zone: String,
    pub key_name: OutputRef,
    #[serde(default)]
    pub tags: Tags,
}

/// Any declarable resource, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceArgs {
    Vpc(VpcArgs),
    InternetGateway(InternetGatewayArgs),
    Subnet(SubnetArgs),
    RouteTable(RouteTableArgs),
    RouteTableAssociation(RouteTableAssociationArgs),
    SecurityGroup(SecurityGroupArgs),
    KeyPair(KeyPairArgs),
    Instance(InstanceArgs),
}

impl ResourceArgs {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Vpc(_) => ResourceKind::Vpc,
            Self::InternetGateway(_) => ResourceKind::InternetGateway,
            Self::Subnet(_) => ResourceKind::Subnet,
            Self::RouteTable(_) => ResourceKind::RouteTable,
            Self::RouteTableAssociation(_) => ResourceKind::RouteTableAssociation,
            Self::SecurityGroup(_) => ResourceKind::SecurityGroup,
            Self::KeyPair(_) => ResourceKind::KeyPair,
            Self::Instance(_) => ResourceKind::Instance,
        }
    }

    /// All output references this declaration consumes, in field order.
    pub fn references(&self) -> Vec<&OutputRef> {
        match self {
            Self::Vpc(_) | Self::KeyPair(_) => vec![],
            Self::InternetGateway(a) => vec![&a.vpc_id],
            Self::Subnet(a) => vec![&a.vpc_id],
            Self::RouteTable(a) => {
                let mut refs = vec![&a.vpc_id];
                refs.extend(a.routes.iter().map(|r| &r.gateway_id));
                refs
            }
            Self::RouteTableAssociation(a) => vec![&a.subnet_id, &a.route_table_id],
            Self::SecurityGroup(a) => vec![&a.vpc_id],
            Self::Instance(a) => {
                let mut refs = vec![&a.subnet_id];
                refs.extend(a.vpc_security_group_ids.iter());
                refs.push(&a.key_name);
                refs
            }
        }
    }
}

/// Links an argument record to its [`ResourceKind`] and enum variant.
pub trait Declare: Into<ResourceArgs> {
    const KIND: ResourceKind;
}

macro_rules! declarable {
    ($($args:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$args> for ResourceArgs {
                fn from(args: $args) -> Self {
                    Self::$variant(args)
                }
            }

            impl Declare for $args {
                const KIND: ResourceKind = ResourceKind::$variant;
            }
        )*
    };
}

declarable!(
    VpcArgs => Vpc,
    InternetGatewayArgs => InternetGateway,
    SubnetArgs => Subnet,
    RouteTableArgs => RouteTable,
    RouteTableAssociationArgs => RouteTableAssociation,
    SecurityGroupArgs => SecurityGroup,
    KeyPairArgs => KeyPair,
    InstanceArgs => Instance,
);

// ============================================================================
// Desired-state graph
// ============================================================================

/// The full set of declarations and exports from one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredStateGraph {
    /// Stack name
    pub name: String,

    /// Declarations in the order they were issued
    pub resources: IndexMap<String, ResourceArgs>,

    /// Named outputs
    #[serde(default)]
    pub outputs: IndexMap<String, OutputRef>,
}

impl DesiredStateGraph {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Declarations of one kind, in declaration order.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = (&str, &ResourceArgs)> {
        self.resources
            .iter()
            .filter(move |(_, args)| args.kind() == kind)
            .map(|(name, args)| (name.as_str(), args))
    }

    /// Instance declarations, in declaration order.
    pub fn instances(&self) -> Vec<(&str, &InstanceArgs)> {
        self.resources
            .iter()
            .filter_map(|(name, args)| match args {
                ResourceArgs::Instance(i) => Some((name.as_str(), i)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vpc() -> VpcArgs {
        VpcArgs {
            cidr_block: "10.0.0.0/16".to_string(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
            tags: name_tag("my-vpc"),
        }
    }

    #[test]
    fn test_nf001_attribute_display() {
        assert_eq!(Attribute::Id.to_string(), "id");
        assert_eq!(Attribute::KeyName.to_string(), "key_name");
        assert_eq!(Attribute::PublicIp.to_string(), "public_ip");
    }

    #[test]
    fn test_nf001_output_ref_display() {
        let r = OutputRef::new("my-vpc", Attribute::Id);
        assert_eq!(r.to_string(), "my-vpc.id");
    }

    #[test]
    fn test_nf001_kind_produces() {
        assert!(ResourceKind::Vpc.produces(Attribute::Id));
        assert!(!ResourceKind::Vpc.produces(Attribute::PublicIp));
        assert!(ResourceKind::KeyPair.produces(Attribute::KeyName));
        assert!(!ResourceKind::Instance.produces(Attribute::KeyName));
        assert!(ResourceKind::Instance.produces(Attribute::PublicIp));
    }

    #[test]
    fn test_nf001_kind_display() {
        assert_eq!(ResourceKind::InternetGateway.to_string(), "internet_gateway");
        assert_eq!(
            ResourceKind::RouteTableAssociation.to_string(),
            "route_table_association"
        );
    }

    #[test]
    fn test_nf001_tagged_yaml() {
        let args: ResourceArgs = vpc().into();
        let yaml = serde_yaml_ng::to_string(&args).unwrap();
        assert!(yaml.contains("type: vpc"));
        assert!(yaml.contains("cidr_block: 10.0.0.0/16"));
        assert!(yaml.contains("Name: my-vpc"));
    }

    #[test]
    fn test_nf001_security_rule_helpers() {
        let http = SecurityRule::tcp(80, "0.0.0.0/0");
        assert_eq!(http.protocol, "tcp");
        assert_eq!((http.from_port, http.to_port), (80, 80));

        let all = SecurityRule::allow_all("0.0.0.0/0");
        assert_eq!(all.protocol, "-1");
        assert_eq!((all.from_port, all.to_port), (0, 0));
    }

    #[test]
    fn test_nf001_references_instance() {
        let inst = ResourceArgs::Instance(InstanceArgs {
            instance_type: "t3.small".to_string(),
            ami: "ami-x".to_string(),
            subnet_id: OutputRef::new("public-subnet", Attribute::Id),
            associate_public_ip_address: true,
            vpc_security_group_ids: vec![OutputRef::new("web-sg", Attribute::Id)],
            availability_zone: "ap-southeast-1a".to_string(),
            key_name: OutputRef::new("my-key-pair", Attribute::KeyName),
            tags: name_tag("instance-1"),
        });
        let refs: Vec<String> = inst.references().iter().map(|r| r.to_string()).collect();
        assert_eq!(
            refs,
            vec!["public-subnet.id", "web-sg.id", "my-key-pair.key_name"]
        );
        assert!(ResourceArgs::from(vpc()).references().is_empty());
    }

    #[test]
    fn test_nf001_declare_kind() {
        assert_eq!(VpcArgs::KIND, ResourceKind::Vpc);
        assert_eq!(InstanceArgs::KIND, ResourceKind::Instance);
        assert_eq!(ResourceArgs::from(vpc()).kind(), VpcArgs::KIND);
    }

    #[test]
    fn test_nf001_graph_of_kind() {
        let mut g = DesiredStateGraph::new("t");
        g.resources.insert("my-vpc".to_string(), vpc().into());
        g.resources.insert(
            "k".to_string(),
            KeyPairArgs {
                public_key: "ssh-rsa AAA".to_string(),
            }
            .into(),
        );
        assert_eq!(g.of_kind(ResourceKind::Vpc).count(), 1);
        assert_eq!(g.of_kind(ResourceKind::Instance).count(), 0);
        assert!(g.instances().is_empty());
    }
}
