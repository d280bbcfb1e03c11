use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::graph::Node;
use crate::tensor::DType;

use super::{KernelDef, OpKernel, OpKernelInfo};

/// Factory building a kernel instance for one node.
pub type KernelCreateFn =
    Arc<dyn Fn(&OpKernelInfo<'_>) -> Result<Box<dyn OpKernel>> + Send + Sync>;

/// A registered kernel: its definition plus the factory that builds it.
#[derive(Clone)]
pub struct KernelCreateInfo {
    pub kernel_def: KernelDef,
    pub factory: KernelCreateFn,
}

impl fmt::Debug for KernelCreateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelCreateInfo")
            .field("kernel_def", &self.kernel_def)
            .finish_non_exhaustive()
    }
}

/// Flat table of kernel registrations, immutable once shared.
#[derive(Debug, Default, Clone)]
pub struct KernelRegistry {
    kernels: Vec<KernelCreateInfo>,
    by_hash: HashMap<u64, usize>,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration. Two definitions with the same identity hash fail.
    pub fn register<F>(&mut self, kernel_def: KernelDef, factory: F) -> Result<()>
    where
        F: Fn(&OpKernelInfo<'_>) -> Result<Box<dyn OpKernel>> + Send + Sync + 'static,
    {
        let hash = kernel_def.hash();
        if let Some(existing) = self.by_hash.get(&hash) {
            return Err(anyhow!(
                "kernel {} collides with registered {} (hash {:#018x})",
                kernel_def.canonical_form(),
                self.kernels[*existing].kernel_def.canonical_form(),
                hash
            ));
        }
        self.by_hash.insert(hash, self.kernels.len());
        self.kernels.push(KernelCreateInfo {
            kernel_def,
            factory: Arc::new(factory),
        });
        Ok(())
    }

    /// First registration matching op, domain, provider, version and types.
    pub fn find(
        &self,
        op_name: &str,
        domain: &str,
        version: i32,
        provider: &str,
        bindings: &BTreeMap<String, DType>,
    ) -> Option<&KernelCreateInfo> {
        self.kernels.iter().find(|info| {
            let def = &info.kernel_def;
            def.op_name() == op_name
                && def.domain() == domain
                && def.provider() == provider
                && def.matches_version(version)
                && def.matches_bindings(bindings)
        })
    }

    /// Match a resolved node that has been placed on a provider.
    pub fn find_for_node(&self, node: &Node, version: i32) -> Option<&KernelCreateInfo> {
        let provider = node.execution_provider.as_deref()?;
        self.find(
            &node.op_type,
            &node.domain,
            version,
            provider,
            &node.type_bindings,
        )
    }

    pub fn find_by_hash(&self, hash: u64) -> Option<&KernelCreateInfo> {
        self.by_hash.get(&hash).map(|index| &self.kernels[*index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &KernelCreateInfo> {
        self.kernels.iter()
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}
