use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::backend::ExecutionProvider;
use crate::graph::{Graph, Node};
use crate::kernel::{hash as kernel_hash, KernelCreateInfo, KernelRegistry, OpKernel, OpKernelInfo};

/// How a registration is chosen for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelLookup {
    /// Match op, domain, provider, version and type bindings.
    Match,
    /// Resolve through a persisted identity hash. `None` takes the hash from
    /// the static table and falls back to [`KernelLookup::Match`] when the
    /// table has no entry.
    PersistedHash(Option<u64>),
}

/// Place `node` on `provider`.
pub fn assign_provider(node: &mut Node, provider: &dyn ExecutionProvider) {
    node.set_execution_provider(provider.provider_type());
}

/// Version a node is matched at: its schema version when it has one,
/// otherwise the opset its domain is imported at.
pub fn resolution_version(graph: &Graph<'_>, node: &Node) -> Option<i32> {
    node.since_version.or_else(|| graph.opset_for(&node.domain))
}

/// Find the registration for `node` in `registries`, searched in order.
pub fn resolve(
    node: &Node,
    version: i32,
    registries: &[Arc<KernelRegistry>],
    lookup: KernelLookup,
) -> Result<KernelCreateInfo> {
    let provider = node
        .execution_provider
        .as_deref()
        .ok_or_else(|| anyhow!("{} is not assigned to an execution provider", node))?;

    if let KernelLookup::PersistedHash(persisted) = lookup {
        let hash = match persisted {
            Some(hash) => Some(kernel_hash::remap(hash)),
            None => kernel_hash::lookup(&node.op_type, version).map(kernel_hash::remap),
        };
        match hash {
            Some(hash) => return resolve_by_hash(node, provider, hash, registries),
            None => crate::warning!(
                "no persisted hash for {} version {}, matching by definition",
                node.op_type,
                version
            ),
        }
    }

    registries
        .iter()
        .find_map(|registry| registry.find_for_node(node, version))
        .cloned()
        .ok_or_else(|| {
            let bindings = node
                .type_bindings
                .iter()
                .map(|(name, dtype)| format!("{}={}", name, dtype))
                .collect::<Vec<_>>()
                .join(",");
            anyhow!(
                "no registration for {} at version {} on {} with types [{}]",
                node.op_type,
                version,
                provider,
                bindings
            )
        })
}

fn resolve_by_hash(
    node: &Node,
    provider: &str,
    hash: u64,
    registries: &[Arc<KernelRegistry>],
) -> Result<KernelCreateInfo> {
    let info = registries
        .iter()
        .find_map(|registry| registry.find_by_hash(hash))
        .ok_or_else(|| anyhow!("no kernel registered with hash {:#018x}", hash))?;
    let def = &info.kernel_def;
    if def.op_name() != node.op_type || def.domain() != node.domain || def.provider() != provider {
        return Err(anyhow!(
            "kernel hash {:#018x} identifies {}, not {} on {}",
            hash,
            def.canonical_form(),
            node.op_type,
            provider
        ));
    }
    crate::trace!("kernel hash {:#018x} resolved to {}", hash, def.canonical_form());
    Ok(info.clone())
}

/// Build a kernel instance for `node` from its registration.
pub fn instantiate(
    create_info: &KernelCreateInfo,
    graph: &Graph<'_>,
    node: &Node,
    provider: &dyn ExecutionProvider,
) -> Result<Box<dyn OpKernel>> {
    let input_types = node
        .inputs
        .iter()
        .map(|id| {
            let arg = graph.arg(*id);
            arg.dtype
                .ok_or_else(|| anyhow!("input {} of {} has no type", arg.name, node))
        })
        .collect::<Result<Vec<_>>>()?;
    let output_types = node.outputs.iter().map(|id| graph.arg(*id).dtype).collect();
    let info = OpKernelInfo::new(
        node,
        &create_info.kernel_def,
        provider.provider_type(),
        input_types,
        output_types,
    );
    provider.create_kernel(create_info, &info)
}
