use std::sync::Arc;

use anyhow::Result;
use eagerinfer::{
    DType, InvokeError, InvokerConfig, KernelDef, KernelRegistry, OpKernel, OpKernelContext,
    Tensor, VersionSource, CPU_EXECUTION_PROVIDER,
};

use crate::common::{self, output_vec, tensor};

/// Fills its output with a marker so tests can tell which kernel ran.
struct MarkerKernel(f32);

impl OpKernel for MarkerKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        let a = ctx.input_as::<f32>(0)?;
        let out = Tensor::with_shape(vec![self.0; a.numel()], a.shape())?;
        ctx.set_output(0, out.into())
    }
}

fn marker_registry(since: i32, end: Option<i32>, marker: f32) -> Result<Arc<KernelRegistry>> {
    let builder = KernelDef::builder("Add")
        .provider(CPU_EXECUTION_PROVIDER)
        .type_constraint("T", &[DType::F32]);
    let def = match end {
        Some(end) => builder.version_range(since, end),
        None => builder.since_version(since),
    }
    .build();
    let mut registry = KernelRegistry::new();
    registry.register(def, move |_| Ok(Box::new(MarkerKernel(marker)) as Box<dyn OpKernel>))?;
    Ok(Arc::new(registry))
}

fn add_inputs() -> Result<Vec<eagerinfer::TensorValue>> {
    Ok(vec![tensor(vec![1.0f32, 2.0], &[2])?, tensor(vec![3.0f32, 4.0], &[2])?])
}

#[test]
fn baseline_ignores_caller_version() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    // Relu on integers only exists from opset 14; the baseline is 14.
    let inputs = vec![tensor(vec![-1i32, 1], &[2])?];
    let mut outputs = vec![None];
    invoker.invoke("Relu", &inputs, &mut outputs, None, "", 6)?;
    assert_eq!(output_vec::<i32>(&outputs, 0)?, vec![0, 1]);
    Ok(())
}

#[test]
fn caller_version_selects_older_schema() -> Result<()> {
    let config = InvokerConfig::default().with_version_source(VersionSource::Caller);
    let invoker = common::cpu_invoker_with(config)?;
    let inputs = vec![tensor(vec![-1i32, 1], &[2])?];
    let mut outputs = vec![None];
    let err = invoker
        .invoke("Relu", &inputs, &mut outputs, None, "", 13)
        .unwrap_err();
    assert!(matches!(err, InvokeError::GraphValidation { .. }), "{err}");

    let inputs = vec![tensor(vec![-1.0f32, 1.0], &[2])?];
    let mut outputs = vec![None];
    invoker.invoke("Relu", &inputs, &mut outputs, None, "", 13)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![0.0, 1.0]);
    Ok(())
}

#[test]
fn caller_version_picks_matching_kernel_range() -> Result<()> {
    let registry = marker_registry(13, Some(13), 42.0)?;

    let baseline = common::cpu_invoker()?.with_custom_registry(Arc::clone(&registry));
    let mut outputs = vec![None];
    baseline.invoke("Add", &add_inputs()?, &mut outputs, None, "", 13)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![4.0, 6.0]);

    let config = InvokerConfig::default().with_version_source(VersionSource::Caller);
    let caller = common::cpu_invoker_with(config)?.with_custom_registry(registry);
    let mut outputs = vec![None];
    caller.invoke("Add", &add_inputs()?, &mut outputs, None, "", 13)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![42.0, 42.0]);

    let mut outputs = vec![None];
    caller.invoke("Add", &add_inputs()?, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![4.0, 6.0]);
    Ok(())
}

#[test]
fn custom_registries_are_searched_first() -> Result<()> {
    let invoker = common::cpu_invoker()?
        .with_custom_registry(marker_registry(14, None, 7.0)?)
        .with_custom_registry(marker_registry(7, None, 9.0)?);
    let mut outputs = vec![None];
    invoker.invoke("Add", &add_inputs()?, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![7.0, 7.0]);

    // Integer inputs fall outside the custom constraint and reach the provider.
    let inputs = vec![tensor(vec![1i32], &[1])?, tensor(vec![2i32], &[1])?];
    let mut outputs = vec![None];
    invoker.invoke("Add", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<i32>(&outputs, 0)?, vec![3]);
    Ok(())
}

#[test]
fn caller_version_never_adds_a_domain() -> Result<()> {
    let config = InvokerConfig::default().with_version_source(VersionSource::Caller);
    let invoker = common::cpu_invoker_with(config)?;
    let inputs = vec![tensor(vec![1.0f32], &[1])?];
    let mut outputs = vec![None];
    let err = invoker
        .invoke("Relu", &inputs, &mut outputs, None, "com.example", 3)
        .unwrap_err();
    assert!(matches!(err, InvokeError::GraphValidation { .. }), "{err}");
    Ok(())
}

#[test]
fn imported_domain_without_kernels_is_kernel_not_found() -> Result<()> {
    let config = InvokerConfig::default().with_domain("com.example", 1);
    let invoker = common::cpu_invoker_with(config)?;
    let inputs = vec![tensor(vec![1.0f32], &[1])?];
    let mut outputs = vec![None];
    let err = invoker
        .invoke("Relu", &inputs, &mut outputs, None, "com.example", 1)
        .unwrap_err();
    match err {
        InvokeError::KernelNotFound { ident, provider, .. } => {
            assert_eq!(ident.domain, "com.example");
            assert_eq!(ident.version, 1);
            assert_eq!(provider, CPU_EXECUTION_PROVIDER);
        }
        other => panic!("expected kernel lookup failure, got {other}"),
    }
    Ok(())
}
