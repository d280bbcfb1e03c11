use anyhow::{anyhow, Result};

use crate::kernel::{OpKernel, OpKernelContext, OpKernelInfo};
use crate::tensor::{numel, Tensor, TensorElement, TensorValue};
use crate::with_tensor;

/// Reads input 0 through its strides, so a non-contiguous input is fine.
#[derive(Debug)]
pub struct TransposeKernel {
    perm: Option<Vec<usize>>,
}

impl TransposeKernel {
    pub fn from_info(info: &OpKernelInfo<'_>) -> Result<Self> {
        let perm = match info.attr_ints("perm")? {
            None => None,
            Some(values) => {
                let mut perm = Vec::with_capacity(values.len());
                for &axis in values {
                    if axis < 0 {
                        return Err(anyhow!("perm {:?} has negative axis {}", values, axis));
                    }
                    let axis = axis as usize;
                    if perm.contains(&axis) {
                        return Err(anyhow!("perm {:?} repeats axis {}", values, axis));
                    }
                    perm.push(axis);
                }
                Some(perm)
            }
        };
        Ok(Self { perm })
    }

    fn perm_for_rank(&self, rank: usize) -> Result<Vec<usize>> {
        match &self.perm {
            None => Ok((0..rank).rev().collect()),
            Some(perm) => {
                if perm.len() != rank || perm.iter().any(|&axis| axis >= rank) {
                    return Err(anyhow!("perm {:?} is invalid for rank {}", perm, rank));
                }
                Ok(perm.clone())
            }
        }
    }
}

impl OpKernel for TransposeKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        let input = ctx.input(0)?;
        let perm = self.perm_for_rank(input.shape().len())?;
        let output: TensorValue =
            with_tensor!(input, tensor => tensor.permuted(&perm)?.to_contiguous().into());
        ctx.set_output(0, output)
    }
}

#[derive(Debug)]
pub struct IdentityKernel;

impl OpKernel for IdentityKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        let input = ctx.input(0)?;
        ctx.set_output(0, input.to_contiguous())
    }
}

#[derive(Debug)]
pub struct SplitKernel {
    axis: i64,
}

impl SplitKernel {
    pub fn from_info(info: &OpKernelInfo<'_>) -> Result<Self> {
        Ok(Self {
            axis: info.attr_i64_or("axis", 0)?,
        })
    }

    fn sizes(&self, ctx: &OpKernelContext<'_, '_>, dim: usize, outputs: usize) -> Result<Vec<usize>> {
        match ctx.optional_input(1) {
            Some(split) => {
                let split = split.as_tensor::<i64>()?.to_vec();
                if split.len() != outputs || split.iter().any(|&size| size < 0) {
                    return Err(anyhow!(
                        "split sizes {:?} do not describe {} outputs",
                        split,
                        outputs
                    ));
                }
                let sizes: Vec<usize> = split.iter().map(|&size| size as usize).collect();
                let total = sizes
                    .iter()
                    .try_fold(0usize, |acc, &size| acc.checked_add(size))
                    .ok_or_else(|| anyhow!("split sizes {:?} overflow", sizes))?;
                if total != dim {
                    return Err(anyhow!("split sizes {:?} do not sum to {}", sizes, dim));
                }
                Ok(sizes)
            }
            None => {
                if dim % outputs != 0 {
                    return Err(anyhow!(
                        "axis of size {} cannot be split evenly into {} outputs",
                        dim,
                        outputs
                    ));
                }
                Ok(vec![dim / outputs; outputs])
            }
        }
    }
}

fn split_tensor<T: TensorElement>(
    tensor: &Tensor<T>,
    axis: usize,
    sizes: &[usize],
) -> Result<Vec<TensorValue>> {
    let shape = tensor.shape();
    let data = tensor.to_vec();
    let outer = numel(&shape[..axis]);
    let inner = numel(&shape[axis + 1..]);
    let dim = shape[axis];
    let mut start = 0;
    let mut parts = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let mut part = Vec::with_capacity(outer * size * inner);
        for o in 0..outer {
            let base = (o * dim + start) * inner;
            part.extend_from_slice(&data[base..base + size * inner]);
        }
        let mut part_shape = shape.to_vec();
        part_shape[axis] = size;
        parts.push(T::into_value(Tensor::with_shape(part, &part_shape)?));
        start += size;
    }
    Ok(parts)
}

impl OpKernel for SplitKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        let input = ctx.input(0)?;
        let rank = input.shape().len() as i64;
        let axis = if self.axis < 0 { self.axis + rank } else { self.axis };
        if axis < 0 || axis >= rank {
            return Err(anyhow!("axis {} is out of range for rank {}", self.axis, rank));
        }
        let axis = axis as usize;
        if ctx.output_count() == 0 {
            return Err(anyhow!("Split needs at least one output"));
        }
        let sizes = self.sizes(ctx, input.shape()[axis], ctx.output_count())?;
        let parts = with_tensor!(input, tensor => split_tensor(tensor, axis, &sizes)?);
        for (index, part) in parts.into_iter().enumerate() {
            ctx.set_output(index, part)?;
        }
        Ok(())
    }
}
