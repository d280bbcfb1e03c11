use anyhow::{anyhow, Result};

pub fn numel(shape: &[usize]) -> usize {
    shape.iter().copied().product::<usize>()
}

/// Row-major strides implied by `shape`.
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1usize;
    for (idx, dim) in shape.iter().rev().enumerate() {
        let i = shape.len() - 1 - idx;
        strides[i] = stride;
        stride = stride.saturating_mul(*dim);
    }
    strides
}

/// True when `strides` are exactly the row-major strides of `shape`.
///
/// Size-1 dims are ignored: their stride never contributes to an offset.
pub fn is_contiguous(shape: &[usize], strides: &[usize]) -> bool {
    if shape.len() != strides.len() {
        return false;
    }
    let expected = compute_strides(shape);
    shape
        .iter()
        .zip(strides.iter().zip(expected.iter()))
        .all(|(dim, (actual, expected))| *dim <= 1 || actual == expected)
}

/// Number of storage elements a strided layout touches.
pub(crate) fn storage_span(shape: &[usize], strides: &[usize]) -> usize {
    if numel(shape) == 0 {
        return 0;
    }
    let last = shape
        .iter()
        .zip(strides.iter())
        .map(|(dim, stride)| (dim - 1).saturating_mul(*stride))
        .sum::<usize>();
    last + 1
}

pub(crate) fn offset_for(shape: &[usize], strides: &[usize], indices: &[usize]) -> Result<usize> {
    if shape.len() != indices.len() {
        return Err(anyhow!(
            "expected {} indices, got {}",
            shape.len(),
            indices.len()
        ));
    }
    let mut offset = 0usize;
    for ((dim, stride), idx) in shape.iter().zip(strides.iter()).zip(indices.iter()) {
        if *idx >= *dim {
            return Err(anyhow!("index {} out of bounds for dim {}", idx, dim));
        }
        offset = offset.saturating_add(idx.saturating_mul(*stride));
    }
    Ok(offset)
}

/// Visit the storage offset of every logical element in row-major order.
pub(crate) fn for_each_offset(shape: &[usize], strides: &[usize], mut f: impl FnMut(usize)) {
    let total = numel(shape);
    if total == 0 {
        return;
    }
    if shape.is_empty() {
        f(0);
        return;
    }
    let mut index = vec![0usize; shape.len()];
    for _ in 0..total {
        let offset = index
            .iter()
            .zip(strides.iter())
            .map(|(i, s)| i.saturating_mul(*s))
            .sum();
        f(offset);
        for (axis, dim) in shape.iter().enumerate().rev() {
            index[axis] += 1;
            if index[axis] < *dim {
                break;
            }
            index[axis] = 0;
        }
    }
}
