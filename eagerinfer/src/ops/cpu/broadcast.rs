use anyhow::{anyhow, Result};

/// Numpy-style broadcast of two shapes.
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let out_rank = a.len().max(b.len());
    let mut out = vec![1usize; out_rank];
    for (i, slot) in out.iter_mut().enumerate() {
        let a_dim = dim_from_right(a, out_rank, i);
        let b_dim = dim_from_right(b, out_rank, i);
        if a_dim != b_dim && a_dim != 1 && b_dim != 1 {
            return Err(anyhow!(
                "shapes {:?} and {:?} are not broadcastable",
                a,
                b
            ));
        }
        *slot = if a_dim == 1 { b_dim } else { a_dim };
    }
    Ok(out)
}

/// Strides of `shape` viewed at `out_rank`, zeroed on broadcast axes.
pub fn broadcast_strides(shape: &[usize], strides: &[usize], out_rank: usize) -> Vec<usize> {
    let offset = out_rank.saturating_sub(shape.len());
    (0..out_rank)
        .map(|i| {
            if i < offset || shape[i - offset] == 1 {
                0
            } else {
                strides[i - offset]
            }
        })
        .collect()
}

/// Visit `(out, a, b)` storage offsets for every output element.
pub fn for_each_broadcast_index(
    out_shape: &[usize],
    out_strides: &[usize],
    a_strides: &[usize],
    b_strides: &[usize],
    mut f: impl FnMut(usize, usize, usize),
) {
    if out_shape.is_empty() {
        f(0, 0, 0);
        return;
    }
    let total = out_shape.iter().copied().product::<usize>();
    let mut index = vec![0usize; out_shape.len()];
    for _ in 0..total {
        f(
            linear_offset(&index, out_strides),
            linear_offset(&index, a_strides),
            linear_offset(&index, b_strides),
        );
        bump_index(&mut index, out_shape);
    }
}

fn dim_from_right(shape: &[usize], out_rank: usize, idx: usize) -> usize {
    let offset = out_rank.saturating_sub(shape.len());
    if idx < offset {
        1
    } else {
        shape[idx - offset]
    }
}

fn linear_offset(indices: &[usize], strides: &[usize]) -> usize {
    indices
        .iter()
        .zip(strides.iter())
        .map(|(i, s)| i.saturating_mul(*s))
        .sum()
}

fn bump_index(index: &mut [usize], shape: &[usize]) {
    for (i, dim) in shape.iter().enumerate().rev() {
        index[i] += 1;
        if index[i] < *dim {
            return;
        }
        index[i] = 0;
    }
}
