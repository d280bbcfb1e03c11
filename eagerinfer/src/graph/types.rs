use std::collections::{BTreeMap, HashMap};
use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::normalize_domain;
use crate::tensor::{DType, TensorValue};

/// Attribute value attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(i64),
    Float(f32),
    Str(String),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
    DType(DType),
}

impl AttrValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "string",
            AttrValue::Ints(_) => "ints",
            AttrValue::Floats(_) => "floats",
            AttrValue::DType(_) => "dtype",
        }
    }
}

/// Named attributes of a node, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    items: BTreeMap<String, AttrValue>,
}

impl NodeAttributes {
    /// Build an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// # Example
    /// ```no_run
    /// # use eagerinfer::graph::{AttrValue, NodeAttributes};
    /// let attrs = NodeAttributes::new().with("perm", AttrValue::Ints(vec![1, 0]));
    /// assert_eq!(attrs.len(), 1);
    /// ```
    pub fn with(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) -> Option<AttrValue> {
        self.items.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.items.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Handle to an argument descriptor inside one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArgId(pub(crate) usize);

impl ArgId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Named input/output placeholder. Untyped until resolution infers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeArg {
    pub name: String,
    pub dtype: Option<DType>,
}

/// A single operation in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub index: usize,
    pub uuid: Uuid,
    pub name: String,
    pub op_type: String,
    pub domain: String,
    pub description: String,
    pub inputs: Vec<ArgId>,
    pub outputs: Vec<ArgId>,
    pub attrs: NodeAttributes,
    /// Provider the node is placed on; set before kernel lookup.
    pub execution_provider: Option<String>,
    /// Version of the schema the node resolved against, if one exists.
    pub since_version: Option<i32>,
    /// Type parameter bindings inferred during resolution.
    pub type_bindings: BTreeMap<String, DType>,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn set_execution_provider(&mut self, provider: impl Into<String>) {
        self.execution_provider = Some(provider.into());
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.domain.is_empty() {
            write!(f, "{} ({})", self.name, self.op_type)
        } else {
            write!(f, "{} ({}:{})", self.name, self.domain, self.op_type)
        }
    }
}

/// Graph of nodes over a shared descriptor arena.
///
/// Built for one call and dropped at its end. Initializers borrow the
/// caller's tensors.
#[derive(Debug, Clone)]
pub struct Graph<'a> {
    domain_versions: HashMap<String, i32>,
    pub(super) args: Vec<NodeArg>,
    arg_names: HashMap<String, ArgId>,
    pub(super) initializers: HashMap<String, &'a TensorValue>,
    pub(super) nodes: Vec<Node>,
}

impl<'a> Graph<'a> {
    /// Create an empty graph importing the given opset per domain.
    pub fn new(domain_versions: HashMap<String, i32>) -> Self {
        let domain_versions = domain_versions
            .into_iter()
            .map(|(domain, version)| (normalize_domain(&domain).to_string(), version))
            .collect();
        Self {
            domain_versions,
            args: Vec::new(),
            arg_names: HashMap::new(),
            initializers: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    /// Return the descriptor called `name`, creating it if needed.
    ///
    /// A typed request against an existing descriptor of another type fails.
    pub fn get_or_create_node_arg(&mut self, name: &str, dtype: Option<DType>) -> Result<ArgId> {
        if let Some(id) = self.arg_names.get(name).copied() {
            let arg = &mut self.args[id.0];
            match (arg.dtype, dtype) {
                (Some(existing), Some(requested)) if existing != requested => {
                    return Err(anyhow!(
                        "inconsistent types for {}: {} vs {}",
                        name,
                        existing,
                        requested
                    ));
                }
                (None, Some(requested)) => arg.dtype = Some(requested),
                _ => {}
            }
            return Ok(id);
        }
        let id = ArgId(self.args.len());
        self.args.push(NodeArg {
            name: name.to_string(),
            dtype,
        });
        self.arg_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn arg(&self, id: ArgId) -> &NodeArg {
        &self.args[id.0]
    }

    pub fn arg_by_name(&self, name: &str) -> Option<ArgId> {
        self.arg_names.get(name).copied()
    }

    pub fn args(&self) -> &[NodeArg] {
        &self.args
    }

    /// Bind a descriptor name to a caller-owned value.
    pub fn add_initializer(&mut self, name: &str, value: &'a TensorValue) -> Result<()> {
        if self.initializers.contains_key(name) {
            return Err(anyhow!("duplicate initializer name: {}", name));
        }
        self.initializers.insert(name.to_string(), value);
        Ok(())
    }

    pub fn initializer(&self, name: &str) -> Option<&'a TensorValue> {
        self.initializers.get(name).copied()
    }

    pub fn is_initializer(&self, id: ArgId) -> bool {
        self.initializers.contains_key(&self.args[id.0].name)
    }

    /// Append a node and return its index.
    #[allow(clippy::too_many_arguments)]
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        op_type: impl Into<String>,
        description: impl Into<String>,
        inputs: Vec<ArgId>,
        outputs: Vec<ArgId>,
        attrs: Option<&NodeAttributes>,
        domain: &str,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            index,
            uuid: Uuid::new_v4(),
            name: name.into(),
            op_type: op_type.into(),
            domain: normalize_domain(domain).to_string(),
            description: description.into(),
            inputs,
            outputs,
            attrs: attrs.cloned().unwrap_or_default(),
            execution_provider: None,
            since_version: None,
            type_bindings: BTreeMap::new(),
        });
        index
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Opset imported for `domain`, if the graph knows it.
    pub fn opset_for(&self, domain: &str) -> Option<i32> {
        self.domain_versions.get(normalize_domain(domain)).copied()
    }

    pub fn domain_versions(&self) -> &HashMap<String, i32> {
        &self.domain_versions
    }
}
