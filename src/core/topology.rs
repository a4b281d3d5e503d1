//! NF-004: The topology descriptor.
//!
//! Declares, in dependency order: VPC → internet gateway → public subnet →
//! route table → association → security group → key pair → instances, then
//! exports the VPC id and each instance's public address.

use super::error::Result;
use super::params::TopologyParams;
use super::runtime::{GraphRecorder, Handle, ProvisioningRuntime, Stack};
use super::types::*;

/// Handles to the resources every instance is wired to.
pub struct InstanceLinks {
    pub subnet: Handle<SubnetArgs>,
    pub security_group: Handle<SecurityGroupArgs>,
    pub key_pair: Handle<KeyPairArgs>,
}

/// Named outputs of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyOutputs {
    pub vpc_id: OutputRef,
    pub instance_public_ips: Vec<OutputRef>,
}

/// Output name for the n-th instance (1-based).
pub fn instance_output_name(n: usize) -> String {
    format!("instance{}_public_ip", n)
}

/// Build the declaration for one EC2 instance.
pub fn ec2_instance(
    name: &str,
    availability_zone: &str,
    links: &InstanceLinks,
    params: &TopologyParams,
) -> InstanceArgs {
    InstanceArgs {
        instance_type: params.instance_type.clone(),
        ami: params.ami.clone(),
        subnet_id: links.subnet.id(),
        associate_public_ip_address: true,
        vpc_security_group_ids: vec![links.security_group.id()],
        availability_zone: availability_zone.to_string(),
        key_name: links.key_pair.key_name(),
        tags: name_tag(name),
    }
}

/// Issue the full topology against a runtime.
pub fn declare_topology<R: ProvisioningRuntime>(
    runtime: &mut R,
    params: &TopologyParams,
) -> Result<TopologyOutputs> {
    let mut stack = Stack::new(runtime);

    let vpc = stack.declare(
        "my-vpc",
        VpcArgs {
            cidr_block: params.vpc_cidr.clone(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
            tags: name_tag("my-vpc"),
        },
    )?;

    let internet_gateway = stack.declare(
        "my-igw",
        InternetGatewayArgs {
            vpc_id: vpc.id(),
            tags: name_tag("my-igw"),
        },
    )?;

    let public_subnet = stack.declare(
        "public-subnet",
        SubnetArgs {
            vpc_id: vpc.id(),
            cidr_block: params.subnet_cidr.clone(),
            availability_zone: params.availability_zone.clone(),
            map_public_ip_on_launch: true,
            tags: name_tag("public-subnet"),
        },
    )?;

    let route_table = stack.declare(
        "public-rt",
        RouteTableArgs {
            vpc_id: vpc.id(),
            routes: vec![Route {
                cidr_block: "0.0.0.0/0".to_string(),
                gateway_id: internet_gateway.id(),
            }],
            tags: name_tag("public-rt"),
        },
    )?;

    stack.declare(
        "public-rta",
        RouteTableAssociationArgs {
            subnet_id: public_subnet.id(),
            route_table_id: route_table.id(),
        },
    )?;

    let security_group = stack.declare(
        "web-sg",
        SecurityGroupArgs {
            description: "Allow inbound HTTP and SSH traffic".to_string(),
            vpc_id: vpc.id(),
            ingress: params
                .ingress_ports
                .iter()
                .map(|&port| SecurityRule::tcp(port, &params.ingress_cidr))
                .collect(),
            egress: vec![SecurityRule::allow_all("0.0.0.0/0")],
            tags: name_tag("web-sg"),
        },
    )?;

    let key_pair = stack.declare(
        "my-key-pair",
        KeyPairArgs {
            public_key: params.public_key.clone(),
        },
    )?;

    let links = InstanceLinks {
        subnet: public_subnet,
        security_group,
        key_pair,
    };

    let mut instances = Vec::with_capacity(params.instances.len());
    for placement in &params.instances {
        let args = ec2_instance(&placement.name, &placement.availability_zone, &links, params);
        instances.push(stack.declare(&placement.name, args)?);
    }

    stack.export("vpc_id", vpc.id())?;
    let mut instance_public_ips = Vec::with_capacity(instances.len());
    for (i, instance) in instances.iter().enumerate() {
        let ip = instance.public_ip();
        stack.export(&instance_output_name(i + 1), ip.clone())?;
        instance_public_ips.push(ip);
    }

    Ok(TopologyOutputs {
        vpc_id: vpc.id(),
        instance_public_ips,
    })
}

/// Evaluate the descriptor into a fresh recorder and return the graph.
pub fn evaluate(params: &TopologyParams) -> Result<DesiredStateGraph> {
    let mut recorder = GraphRecorder::new(&params.name);
    let outputs = declare_topology(&mut recorder, params)?;
    let graph = recorder.into_graph();
    tracing::info!(
        stack = %graph.name,
        resources = graph.resources.len(),
        outputs = 1 + outputs.instance_public_ips.len(),
        "evaluated topology"
    );
    Ok(graph)
}
