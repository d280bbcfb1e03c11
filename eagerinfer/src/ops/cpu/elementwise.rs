use std::borrow::Cow;

use anyhow::{anyhow, Result};

use crate::kernel::OpKernelContext;
use crate::ops::cpu::broadcast::{broadcast_shape, broadcast_strides, for_each_broadcast_index};
use crate::tensor::{Tensor, TensorElement};

/// Logical elements of `tensor`, borrowed when it is contiguous.
pub fn logical_values<T: Clone>(tensor: &Tensor<T>) -> Cow<'_, [T]> {
    match tensor.as_slice() {
        Some(slice) => Cow::Borrowed(slice),
        None => Cow::Owned(tensor.to_vec()),
    }
}

pub fn unary_map<T: Copy>(a: &Tensor<T>, out: &mut Tensor<T>, mut f: impl FnMut(T) -> T) -> Result<()> {
    if a.shape() != out.shape() {
        return Err(anyhow!(
            "output shape {:?} does not match input shape {:?}",
            out.shape(),
            a.shape()
        ));
    }
    for (slot, value) in out.data.iter_mut().zip(logical_values(a).iter()) {
        *slot = f(*value);
    }
    Ok(())
}

pub fn binary_broadcast<T: Copy>(
    a: &Tensor<T>,
    b: &Tensor<T>,
    out: &mut Tensor<T>,
    mut f: impl FnMut(T, T) -> T,
) -> Result<()> {
    let out_shape = broadcast_shape(a.shape(), b.shape())?;
    if out.shape() != out_shape.as_slice() {
        return Err(anyhow!(
            "output shape {:?} does not match broadcast shape {:?}",
            out.shape(),
            out_shape
        ));
    }
    let out_strides = out.strides().to_vec();
    let a_strides = broadcast_strides(a.shape(), a.strides(), out_shape.len());
    let b_strides = broadcast_strides(b.shape(), b.strides(), out_shape.len());
    for_each_broadcast_index(
        &out_shape,
        &out_strides,
        &a_strides,
        &b_strides,
        |out_offset, a_offset, b_offset| {
            out.data[out_offset] = f(a.data[a_offset], b.data[b_offset]);
        },
    );
    Ok(())
}

/// Apply `f` to input 0 and write output 0 with the same shape.
pub fn map_input<T: TensorElement + Copy>(
    ctx: &mut OpKernelContext<'_, '_>,
    input: &Tensor<T>,
    f: impl FnMut(T) -> T,
) -> Result<()> {
    let out = ctx.output_as::<T>(0, input.shape())?;
    unary_map(input, out, f)
}
