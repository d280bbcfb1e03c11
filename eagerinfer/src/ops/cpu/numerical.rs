use anyhow::{anyhow, Result};

use crate::kernel::{OpKernel, OpKernelContext};
use crate::ops::cpu::arithmetic::Arithmetic;
use crate::ops::cpu::elementwise::{logical_values, map_input};
use crate::tensor::{Tensor, TensorElement, TensorValue};

fn matmul_dims(a_shape: &[usize], b_shape: &[usize]) -> Result<(usize, usize, usize)> {
    if a_shape.len() != 2 || b_shape.len() != 2 {
        return Err(anyhow!(
            "MatMul expects 2-D inputs, got {:?} and {:?}",
            a_shape,
            b_shape
        ));
    }
    let (m, k) = (a_shape[0], a_shape[1]);
    let (k2, n) = (b_shape[0], b_shape[1]);
    if k != k2 {
        return Err(anyhow!(
            "MatMul inner dims must match, got {:?} and {:?}",
            a_shape,
            b_shape
        ));
    }
    Ok((m, k, n))
}

#[derive(Debug)]
pub struct MatMulKernel;

impl MatMulKernel {
    fn run<T: TensorElement + Arithmetic>(
        ctx: &mut OpKernelContext<'_, '_>,
        a: &Tensor<T>,
        b: &Tensor<T>,
    ) -> Result<()> {
        let (m, k, n) = matmul_dims(a.shape(), b.shape())?;
        let a = logical_values(a);
        let b = logical_values(b);
        let out = ctx.output_as::<T>(0, &[m, n])?;
        for row in 0..m {
            for col in 0..n {
                let mut acc = T::default();
                for inner in 0..k {
                    acc = acc.add(a[row * k + inner].mul(b[inner * n + col]));
                }
                out.data[row * n + col] = acc;
            }
        }
        Ok(())
    }
}

impl OpKernel for MatMulKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        let a = ctx.input(0)?;
        let b = ctx.input(1)?;
        match (a, b) {
            (TensorValue::I32(a), TensorValue::I32(b)) => Self::run(ctx, a, b),
            (TensorValue::I64(a), TensorValue::I64(b)) => Self::run(ctx, a, b),
            (TensorValue::F32(a), TensorValue::F32(b)) => Self::run(ctx, a, b),
            (TensorValue::F64(a), TensorValue::F64(b)) => Self::run(ctx, a, b),
            _ => Err(anyhow!(
                "MatMul does not support inputs {} and {}",
                a.dtype(),
                b.dtype()
            )),
        }
    }
}

#[derive(Debug)]
pub struct ReluKernel;

impl OpKernel for ReluKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        match ctx.input(0)? {
            TensorValue::I8(x) => map_input(ctx, x, |v| v.max(0)),
            TensorValue::I32(x) => map_input(ctx, x, |v| v.max(0)),
            TensorValue::I64(x) => map_input(ctx, x, |v| v.max(0)),
            TensorValue::F32(x) => map_input(ctx, x, |v| if v > 0.0 { v } else { 0.0 }),
            TensorValue::F64(x) => map_input(ctx, x, |v| if v > 0.0 { v } else { 0.0 }),
            other => Err(anyhow!("Relu does not support {}", other.dtype())),
        }
    }
}

/// Error function, Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

fn gelu(x: f64) -> f64 {
    0.5 * x * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

#[derive(Debug)]
pub struct GeluKernel;

impl OpKernel for GeluKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        match ctx.input(0)? {
            TensorValue::F32(x) => map_input(ctx, x, |v| gelu(v as f64) as f32),
            TensorValue::F64(x) => map_input(ctx, x, gelu),
            other => Err(anyhow!("Gelu does not support {}", other.dtype())),
        }
    }
}
