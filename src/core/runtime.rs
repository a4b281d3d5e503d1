//! NF-002: Provisioning runtime seam.
//!
//! The descriptor talks to a [`ProvisioningRuntime`] through a [`Stack`], which
//! hands back typed [`Handle`]s. Output references can only be taken from a
//! handle, and only for attributes its resource kind produces.
//!
//! [`GraphRecorder`] is the in-process runtime: it records every declaration
//! into a [`DesiredStateGraph`] instead of calling a cloud API.

use super::error::{Result, TopologyError};
use super::types::*;
use std::marker::PhantomData;

/// Receives declarations and exports from a descriptor.
pub trait ProvisioningRuntime {
    /// Register a named resource declaration.
    fn register(&mut self, name: &str, args: ResourceArgs) -> Result<()>;

    /// Publish a named output value.
    fn export(&mut self, name: &str, value: OutputRef) -> Result<()>;
}

/// Typed reference to a declared resource.
#[derive(Debug)]
pub struct Handle<A> {
    name: String,
    _args: PhantomData<fn() -> A>,
}

impl<A> Clone for Handle<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _args: PhantomData,
        }
    }
}

impl<A: Declare> Handle<A> {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            _args: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        A::KIND
    }

    /// Provider-assigned identifier.
    pub fn id(&self) -> OutputRef {
        OutputRef::new(&self.name, Attribute::Id)
    }
}

impl Handle<KeyPairArgs> {
    pub fn key_name(&self) -> OutputRef {
        OutputRef::new(&self.name, Attribute::KeyName)
    }
}

impl Handle<InstanceArgs> {
    /// Public address assigned at launch.
    pub fn public_ip(&self) -> OutputRef {
        OutputRef::new(&self.name, Attribute::PublicIp)
    }
}

/// Declaration facade over a runtime.
pub struct Stack<'r, R: ProvisioningRuntime> {
    runtime: &'r mut R,
}

impl<'r, R: ProvisioningRuntime> Stack<'r, R> {
    pub fn new(runtime: &'r mut R) -> Self {
        Self { runtime }
    }

    /// Declare a resource and get a handle for later references.
    pub fn declare<A: Declare>(&mut self, name: &str, args: A) -> Result<Handle<A>> {
        self.runtime.register(name, args.into())?;
        Ok(Handle::new(name))
    }

    pub fn export(&mut self, name: &str, value: OutputRef) -> Result<()> {
        self.runtime.export(name, value)
    }
}

/// Runtime that records declarations into a desired-state graph.
#[derive(Debug, Clone, Default)]
pub struct GraphRecorder {
    graph: DesiredStateGraph,
}

impl GraphRecorder {
    pub fn new(stack_name: &str) -> Self {
        Self {
            graph: DesiredStateGraph::new(stack_name),
        }
    }

    pub fn graph(&self) -> &DesiredStateGraph {
        &self.graph
    }

    pub fn into_graph(self) -> DesiredStateGraph {
        self.graph
    }

    /// A reference resolves when its target was declared earlier and
    /// produces the requested attribute.
    fn check_reference(&self, owner: &str, reference: &OutputRef) -> Result<()> {
        let target = self.graph.resources.get(&reference.resource).ok_or_else(|| {
            TopologyError::UnresolvedReference {
                owner: owner.to_string(),
                target: reference.resource.clone(),
            }
        })?;
        let kind = target.kind();
        if !kind.produces(reference.attribute) {
            return Err(TopologyError::UnknownAttribute {
                owner: owner.to_string(),
                target: reference.resource.clone(),
                kind: kind.to_string(),
                attribute: reference.attribute.to_string(),
            });
        }
        Ok(())
    }
}

impl ProvisioningRuntime for GraphRecorder {
    fn register(&mut self, name: &str, args: ResourceArgs) -> Result<()> {
        if self.graph.resources.contains_key(name) {
            return Err(TopologyError::DuplicateResource(name.to_string()));
        }
        for reference in args.references() {
            self.check_reference(name, reference)?;
        }
        tracing::debug!(resource = name, kind = %args.kind(), "declared");
        self.graph.resources.insert(name.to_string(), args);
        Ok(())
    }

    fn export(&mut self, name: &str, value: OutputRef) -> Result<()> {
        if self.graph.outputs.contains_key(name) {
            return Err(TopologyError::DuplicateOutput(name.to_string()));
        }
        self.check_reference(name, &value)?;
        tracing::debug!(output = name, value = %value, "exported");
        self.graph.outputs.insert(name.to_string(), value);
        Ok(())
    }
}
