use std::sync::Arc;

use crate::backend::ExecutionProvider;
use crate::config::InvokerConfig;
use crate::error::{InvokeError, OpIdent, Result};
use crate::graph::{build_eager_graph, NodeAttributes};
use crate::kernel::{KernelRegistry, OpKernelContext};
use crate::logging::Logger;
use crate::schema::normalize_domain;
use crate::tensor::TensorValue;

use super::frame::{ExecutionFrame, FrameInfo};
use super::layout::validate_input_layouts;
use super::resolver::{assign_provider, instantiate, resolution_version, resolve, KernelLookup};

/// Runs single operators on one execution provider.
///
/// The invoker is immutable after construction and may be shared between
/// threads; every call keeps its state on the calling stack.
#[derive(Debug, Clone)]
pub struct KernelInvoker {
    provider: Arc<dyn ExecutionProvider>,
    custom_registries: Vec<Arc<KernelRegistry>>,
    logger: Logger,
    config: InvokerConfig,
}

impl KernelInvoker {
    pub fn new(provider: Arc<dyn ExecutionProvider>) -> Self {
        Self::with_config(provider, InvokerConfig::default())
    }

    pub fn with_config(provider: Arc<dyn ExecutionProvider>, config: InvokerConfig) -> Self {
        Self {
            provider,
            custom_registries: Vec::new(),
            logger: Logger::default(),
            config,
        }
    }

    /// Search `registry` before the provider's own kernels.
    ///
    /// Registries added later are searched after earlier ones.
    pub fn with_custom_registry(mut self, registry: Arc<KernelRegistry>) -> Self {
        self.custom_registries.push(registry);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn provider(&self) -> &dyn ExecutionProvider {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Run `op_name` once on `inputs`.
    ///
    /// `outputs.len()` is the number of outputs requested. A `Some` entry is a
    /// pre-allocated buffer the kernel writes into when its dtype and shape
    /// match. On success every entry is `Some`; on failure `outputs` is left
    /// untouched.
    ///
    /// # Example
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use eagerinfer::{CpuExecutionProvider, KernelInvoker, Tensor, TensorValue};
    /// # fn main() -> anyhow::Result<()> {
    /// let invoker = KernelInvoker::new(Arc::new(CpuExecutionProvider::new()?));
    /// let inputs = vec![
    ///     TensorValue::from(Tensor::from_vec(vec![1.0f32, 2.0])?),
    ///     TensorValue::from(Tensor::from_vec(vec![10.0f32, 20.0])?),
    /// ];
    /// let mut outputs = vec![None];
    /// invoker.invoke("Add", &inputs, &mut outputs, None, "", 14)?;
    /// # Ok(()) }
    /// ```
    pub fn invoke(
        &self,
        op_name: &str,
        inputs: &[TensorValue],
        outputs: &mut [Option<TensorValue>],
        attrs: Option<&NodeAttributes>,
        domain: &str,
        version: i32,
    ) -> Result<()> {
        let lookup = if self.config.resolve_by_kernel_hash {
            KernelLookup::PersistedHash(None)
        } else {
            KernelLookup::Match
        };
        self.run(op_name, inputs, outputs, attrs, domain, version, lookup)
    }

    /// Like [`KernelInvoker::invoke`], but select the kernel by a persisted
    /// identity hash. Legacy hashes are remapped first.
    #[allow(clippy::too_many_arguments)]
    pub fn invoke_with_kernel_hash(
        &self,
        op_name: &str,
        inputs: &[TensorValue],
        outputs: &mut [Option<TensorValue>],
        attrs: Option<&NodeAttributes>,
        domain: &str,
        version: i32,
        kernel_hash: u64,
    ) -> Result<()> {
        let lookup = KernelLookup::PersistedHash(Some(kernel_hash));
        self.run(op_name, inputs, outputs, attrs, domain, version, lookup)
    }

    #[allow(clippy::too_many_arguments)]
    fn run(
        &self,
        op_name: &str,
        inputs: &[TensorValue],
        outputs: &mut [Option<TensorValue>],
        attrs: Option<&NodeAttributes>,
        domain: &str,
        version: i32,
        lookup: KernelLookup,
    ) -> Result<()> {
        let ident = OpIdent::new(op_name, normalize_domain(domain), version);
        let result = self.execute(&ident, inputs, outputs, attrs, lookup);
        if let Err(err) = &result {
            self.logger
                .error(format_args!("[{}] {}", err.stage(), err));
        }
        result
    }

    fn execute(
        &self,
        ident: &OpIdent,
        inputs: &[TensorValue],
        outputs: &mut [Option<TensorValue>],
        attrs: Option<&NodeAttributes>,
        lookup: KernelLookup,
    ) -> Result<()> {
        let graph_err = |err: anyhow::Error| InvokeError::GraphValidation {
            ident: ident.clone(),
            message: format!("{:#}", err),
        };
        let exec_err = |err: anyhow::Error| InvokeError::KernelExecution {
            ident: ident.clone(),
            message: format!("{:#}", err),
        };
        let provider = self.provider.as_ref();

        let versions = self.config.domain_versions_for(&ident.domain, ident.version);
        let (mut graph, node_index) = build_eager_graph(
            &ident.op,
            &ident.domain,
            inputs,
            outputs.len(),
            attrs,
            versions,
        )
        .map_err(graph_err)?;
        if let Some(node) = graph.node_mut(node_index) {
            assign_provider(node, provider);
        }
        let node = graph
            .node(node_index)
            .ok_or_else(|| graph_err(anyhow::anyhow!("graph has no node {}", node_index)))?;
        self.logger.trace(format_args!(
            "invoke {} ({}) on {}",
            ident,
            node.uuid,
            provider.provider_type()
        ));

        let resolve_version = resolution_version(&graph, node).ok_or_else(|| {
            graph_err(anyhow::anyhow!("unknown domain '{}'", node.domain))
        })?;
        let mut registries = self.custom_registries.clone();
        registries.push(provider.kernel_registry());
        let create_info = resolve(node, resolve_version, &registries, lookup).map_err(|err| {
            InvokeError::KernelNotFound {
                ident: ident.clone(),
                provider: provider.provider_type().to_string(),
                message: format!("{:#}", err),
            }
        })?;

        validate_input_layouts(inputs, &create_info.kernel_def).map_err(|index| {
            InvokeError::UnsupportedLayout {
                ident: ident.clone(),
                index,
            }
        })?;

        let kernel = instantiate(&create_info, &graph, node, provider).map_err(|err| {
            InvokeError::KernelConstruction {
                ident: ident.clone(),
                message: format!("{:#}", err),
            }
        })?;

        let info = FrameInfo::new(&graph, node);
        let fetch_indices = info.fetch_indices(node).map_err(exec_err)?;
        let mut frame = ExecutionFrame::new(&info, fetch_indices, outputs, provider).map_err(exec_err)?;
        {
            let mut ctx =
                OpKernelContext::new(&mut frame, node, &create_info.kernel_def, &self.logger);
            kernel.compute(&mut ctx).map_err(exec_err)?;
        }
        frame.get_outputs(outputs).map_err(exec_err)?;
        self.logger.trace(format_args!(
            "{} produced {} outputs via {}",
            ident,
            outputs.len(),
            create_info.kernel_def.canonical_form()
        ));
        Ok(())
    }
}
