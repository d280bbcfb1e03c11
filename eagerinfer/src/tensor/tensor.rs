//! Typed tensor container.
//!
//! `Tensor<T>` owns flat storage with shape/stride metadata. Strides that
//! differ from the row-major strides of the shape describe a non-contiguous
//! (strided) layout over the same storage.
use anyhow::{anyhow, Result};

use super::shape::{compute_strides, for_each_offset, is_contiguous, numel, offset_for, storage_span};

/// Tensor construction options (shape/stride overrides).
#[derive(Debug, Clone, Default)]
pub struct TensorOptions {
    /// Optional explicit shape.
    pub shape: Option<Vec<usize>>,
    /// Optional explicit strides, in elements.
    pub strides: Option<Vec<usize>>,
}

/// Owned tensor container with shape and stride metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T> Tensor<T> {
    /// Build a 1-D tensor from a flat data vector.
    ///
    /// # Example
    /// ```no_run
    /// # use eagerinfer::Tensor;
    /// # fn main() -> anyhow::Result<()> {
    /// let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0])?;
    /// # Ok(()) }
    /// ```
    pub fn from_vec(data: Vec<T>) -> Result<Self> {
        Self::from_vec_with_opts(data, TensorOptions::default())
    }

    /// Build a contiguous tensor with the given shape.
    pub fn with_shape(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::from_vec_with_opts(
            data,
            TensorOptions {
                shape: Some(shape.to_vec()),
                ..TensorOptions::default()
            },
        )
    }

    /// Build a tensor with explicit options.
    ///
    /// Without strides the data length must equal the element count. With
    /// strides the data only has to cover every addressed element.
    ///
    /// # Example
    /// ```no_run
    /// # use eagerinfer::{Tensor, TensorOptions};
    /// # fn main() -> anyhow::Result<()> {
    /// // Column 0 and 2 of a 2x4 buffer, viewed as a 2x2 tensor.
    /// let t = Tensor::from_vec_with_opts(
    ///     vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
    ///     TensorOptions { shape: Some(vec![2, 2]), strides: Some(vec![4, 2]) },
    /// )?;
    /// assert!(!t.is_contiguous());
    /// # Ok(()) }
    /// ```
    pub fn from_vec_with_opts(data: Vec<T>, opts: TensorOptions) -> Result<Self> {
        let shape = match opts.shape {
            Some(shape) => shape,
            None => vec![data.len()],
        };
        let strides = match opts.strides {
            Some(strides) => {
                if strides.len() != shape.len() {
                    return Err(anyhow!(
                        "tensor strides length {} does not match shape length {}",
                        strides.len(),
                        shape.len()
                    ));
                }
                let span = storage_span(&shape, &strides);
                if span > data.len() {
                    return Err(anyhow!(
                        "tensor layout shape {:?} strides {:?} needs {} values, got {}",
                        shape,
                        strides,
                        span,
                        data.len()
                    ));
                }
                strides
            }
            None => {
                let expected = numel(&shape);
                if expected != data.len() {
                    return Err(anyhow!(
                        "tensor shape {:?} expects {} values, got {}",
                        shape,
                        expected,
                        data.len()
                    ));
                }
                compute_strides(&shape)
            }
        };
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Create a rank-0 tensor from a single value.
    pub fn from_scalar(value: T) -> Self {
        Self {
            data: vec![value],
            shape: Vec::new(),
            strides: Vec::new(),
        }
    }

    /// Return the tensor shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Return the tensor strides.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Return the logical element count.
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// True if the storage is laid out row-major with no gaps.
    pub fn is_contiguous(&self) -> bool {
        is_contiguous(&self.shape, &self.strides) && self.data.len() == self.numel()
    }

    /// Access a value by multidimensional indices.
    pub fn at(&self, indices: &[usize]) -> Result<&T> {
        let offset = offset_for(&self.shape, &self.strides, indices)?;
        self.data
            .get(offset)
            .ok_or_else(|| anyhow!("index {:?} is outside the tensor storage", indices))
    }

    /// Return the storage as a slice if the layout is contiguous.
    pub fn as_slice(&self) -> Option<&[T]> {
        if self.is_contiguous() {
            Some(&self.data)
        } else {
            None
        }
    }

    /// Reinterpret the same storage with permuted axes.
    ///
    /// The result is generally non-contiguous; no data is moved.
    pub fn permuted(&self, perm: &[usize]) -> Result<Self>
    where
        T: Clone,
    {
        if perm.len() != self.shape.len() {
            return Err(anyhow!(
                "permutation {:?} does not match rank {}",
                perm,
                self.shape.len()
            ));
        }
        let mut seen = vec![false; perm.len()];
        for &axis in perm {
            if axis >= perm.len() || seen[axis] {
                return Err(anyhow!("invalid permutation {:?}", perm));
            }
            seen[axis] = true;
        }
        Ok(Self {
            data: self.data.clone(),
            shape: perm.iter().map(|&axis| self.shape[axis]).collect(),
            strides: perm.iter().map(|&axis| self.strides[axis]).collect(),
        })
    }
}

impl<T: Clone> Tensor<T> {
    /// Collect the logical elements in row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        if let Some(slice) = self.as_slice() {
            return slice.to_vec();
        }
        let mut out = Vec::with_capacity(self.numel());
        for_each_offset(&self.shape, &self.strides, |offset| {
            out.push(self.data[offset].clone());
        });
        out
    }

    /// Materialize a contiguous copy of this tensor.
    pub fn to_contiguous(&self) -> Self {
        let shape = self.shape.clone();
        Self {
            data: self.to_vec(),
            strides: compute_strides(&shape),
            shape,
        }
    }
}

impl<T> From<Vec<T>> for Tensor<T> {
    fn from(value: Vec<T>) -> Self {
        let shape = vec![value.len()];
        Self {
            data: value,
            strides: compute_strides(&shape),
            shape,
        }
    }
}
