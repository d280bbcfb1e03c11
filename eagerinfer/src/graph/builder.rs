use std::collections::HashMap;

use anyhow::Result;

use crate::graph::{Graph, NodeAttributes};
use crate::tensor::TensorValue;

pub const EAGER_NODE_NAME: &str = "eager_node";
pub const EAGER_NODE_DESCRIPTION: &str = "eager mode node";

/// Build and resolve a graph holding a single `op_name` node.
///
/// Input `i` becomes initializer `I{i}` bound to `inputs[i]` and typed with
/// its dtype; output `i` becomes the untyped descriptor `O{i}`. Returns the
/// graph and the index of its node.
///
/// # Example
/// ```no_run
/// # use std::collections::HashMap;
/// # use eagerinfer::graph::build_eager_graph;
/// # use eagerinfer::{Tensor, TensorValue};
/// # fn main() -> anyhow::Result<()> {
/// let inputs = vec![
///     TensorValue::from(Tensor::from_vec(vec![1.0f32, 2.0])?),
///     TensorValue::from(Tensor::from_vec(vec![3.0f32, 4.0])?),
/// ];
/// let versions = HashMap::from([(String::new(), 14)]);
/// let (graph, node) = build_eager_graph("Add", "", &inputs, 1, None, versions)?;
/// assert_eq!(graph.nodes()[node].op_type, "Add");
/// # Ok(()) }
/// ```
pub fn build_eager_graph<'a>(
    op_name: &str,
    domain: &str,
    inputs: &'a [TensorValue],
    output_count: usize,
    attrs: Option<&NodeAttributes>,
    domain_versions: HashMap<String, i32>,
) -> Result<(Graph<'a>, usize)> {
    let mut graph = Graph::new(domain_versions);

    let mut input_args = Vec::with_capacity(inputs.len());
    for (i, value) in inputs.iter().enumerate() {
        let name = format!("I{}", i);
        let id = graph.get_or_create_node_arg(&name, Some(value.dtype()))?;
        graph.add_initializer(&name, value)?;
        input_args.push(id);
    }

    let mut output_args = Vec::with_capacity(output_count);
    for i in 0..output_count {
        output_args.push(graph.get_or_create_node_arg(&format!("O{}", i), None)?);
    }

    let node = graph.add_node(
        EAGER_NODE_NAME,
        op_name,
        EAGER_NODE_DESCRIPTION,
        input_args,
        output_args,
        attrs,
        domain,
    );
    graph.resolve()?;
    Ok((graph, node))
}
