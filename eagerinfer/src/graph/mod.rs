mod builder;
mod resolve;
mod types;

pub use builder::{build_eager_graph, EAGER_NODE_DESCRIPTION, EAGER_NODE_NAME};
pub use types::{ArgId, AttrValue, Graph, Node, NodeArg, NodeAttributes};
