use anyhow::Result;

use crate::kernel::{KernelDef, KernelRegistry, OpKernel};
use crate::schema::{MS_DOMAIN, ONNX_DOMAIN};
use crate::tensor::DType;

use super::arithmetic::{AbsKernel, BinaryKernel, BinaryOp, NegKernel};
use super::casting::CastKernel;
use super::movement::{IdentityKernel, SplitKernel, TransposeKernel};
use super::numerical::{GeluKernel, MatMulKernel, ReluKernel};

const NUMERIC_V7: &[DType] = &[DType::F32, DType::F64, DType::I32, DType::I64];
const NUMERIC: &[DType] = &[
    DType::I8,
    DType::U8,
    DType::I32,
    DType::I64,
    DType::F32,
    DType::F64,
];
const SIGNED: &[DType] = &[DType::I8, DType::I32, DType::I64, DType::F32, DType::F64];
const FLOATS: &[DType] = &[DType::F32, DType::F64];

fn boxed<K: OpKernel + 'static>(kernel: K) -> Result<Box<dyn OpKernel>> {
    Ok(Box::new(kernel))
}

/// Register every host kernel under `provider`.
pub fn register_cpu_kernels(registry: &mut KernelRegistry, provider: &str) -> Result<()> {
    let def = |op: &str| KernelDef::builder(op).domain(ONNX_DOMAIN).provider(provider);

    for op in BinaryOp::ALL {
        let name = op.as_str();
        registry.register(
            def(name).version_range(7, 12).type_constraint("T", NUMERIC_V7).build(),
            move |_| boxed(BinaryKernel::new(op)),
        )?;
        registry.register(
            def(name).version_range(13, 13).type_constraint("T", NUMERIC_V7).build(),
            move |_| boxed(BinaryKernel::new(op)),
        )?;
        registry.register(
            def(name).since_version(14).type_constraint("T", NUMERIC).build(),
            move |_| boxed(BinaryKernel::new(op)),
        )?;
    }

    registry.register(
        def("Abs").since_version(13).type_constraint("T", NUMERIC).build(),
        |_| boxed(AbsKernel),
    )?;
    registry.register(
        def("Neg").since_version(13).type_constraint("T", SIGNED).build(),
        |_| boxed(NegKernel),
    )?;
    registry.register(
        def("Relu").version_range(6, 13).type_constraint("T", FLOATS).build(),
        |_| boxed(ReluKernel),
    )?;
    registry.register(
        def("Relu").since_version(14).type_constraint("T", SIGNED).build(),
        |_| boxed(ReluKernel),
    )?;
    registry.register(
        def("MatMul").since_version(13).type_constraint("T", NUMERIC_V7).build(),
        |_| boxed(MatMulKernel),
    )?;

    registry.register(
        def("Transpose")
            .version_range(1, 12)
            .type_constraint("T", DType::ALL)
            .may_strided_input(0)
            .build(),
        |info| boxed(TransposeKernel::from_info(info)?),
    )?;
    registry.register(
        def("Transpose")
            .since_version(13)
            .type_constraint("T", DType::ALL)
            .may_strided_input(0)
            .build(),
        |info| boxed(TransposeKernel::from_info(info)?),
    )?;
    registry.register(
        def("Identity")
            .version_range(1, 13)
            .type_constraint("T", DType::ALL)
            .may_strided_input(0)
            .build(),
        |_| boxed(IdentityKernel),
    )?;
    registry.register(
        def("Identity")
            .since_version(14)
            .type_constraint("T", DType::ALL)
            .may_strided_input(0)
            .build(),
        |_| boxed(IdentityKernel),
    )?;

    registry.register(
        def("Split").since_version(13).type_constraint("T", DType::ALL).build(),
        |info| boxed(SplitKernel::from_info(info)?),
    )?;
    registry.register(
        def("Cast")
            .since_version(13)
            .type_constraint("T1", DType::ALL)
            .type_constraint("T2", DType::ALL)
            .build(),
        |info| boxed(CastKernel::from_info(info)?),
    )?;

    registry.register(
        KernelDef::builder("Gelu")
            .domain(MS_DOMAIN)
            .since_version(1)
            .provider(provider)
            .type_constraint("T", FLOATS)
            .build(),
        |_| boxed(GeluKernel),
    )?;
    Ok(())
}
