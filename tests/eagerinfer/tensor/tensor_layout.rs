use anyhow::Result;
use eagerinfer::{
    compute_strides, is_contiguous, numel, DType, ExecutionProvider, Tensor, TensorOptions,
    TensorValue,
};

use crate::common;

#[test]
fn default_strides_are_row_major() -> Result<()> {
    assert_eq!(compute_strides(&[2, 3, 4]), vec![12, 4, 1]);
    assert_eq!(compute_strides(&[]), Vec::<usize>::new());
    assert_eq!(numel(&[2, 3, 4]), 24);
    assert_eq!(numel(&[]), 1);

    let t = Tensor::with_shape(vec![0i32; 6], &[2, 3])?;
    assert_eq!(t.strides(), &[3, 1]);
    assert!(t.is_contiguous());
    Ok(())
}

#[test]
fn unit_dims_do_not_break_contiguity() {
    assert!(is_contiguous(&[1, 3], &[99, 1]));
    assert!(is_contiguous(&[3, 1], &[1, 7]));
    assert!(!is_contiguous(&[2, 3], &[1, 2]));
    assert!(!is_contiguous(&[2, 3], &[3]));
}

#[test]
fn permuted_view_is_strided() -> Result<()> {
    let t = Tensor::with_shape(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?;
    let view = t.permuted(&[1, 0])?;
    assert_eq!(view.shape(), &[3, 2]);
    assert_eq!(view.strides(), &[1, 3]);
    assert!(!view.is_contiguous());
    assert!(view.as_slice().is_none());
    assert_eq!(*view.at(&[2, 1])?, 6.0);
    assert!(view.at(&[3, 0]).is_err());
    assert!(view.at(&[0]).is_err());
    assert_eq!(view.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

    let packed = view.to_contiguous();
    assert!(packed.is_contiguous());
    assert_eq!(packed.strides(), &[2, 1]);
    assert_eq!(packed.as_slice(), Some(&[1.0f32, 4.0, 2.0, 5.0, 3.0, 6.0][..]));

    assert!(t.permuted(&[0, 0]).is_err());
    assert!(t.permuted(&[0]).is_err());
    Ok(())
}

#[test]
fn explicit_strides_must_fit_storage() -> Result<()> {
    let view = Tensor::from_vec_with_opts(
        vec![1u8, 2, 3, 4, 5, 6, 7, 8],
        TensorOptions {
            shape: Some(vec![2, 2]),
            strides: Some(vec![4, 2]),
        },
    )?;
    assert!(!view.is_contiguous());
    assert_eq!(view.to_vec(), vec![1, 3, 5, 7]);

    let err = Tensor::from_vec_with_opts(
        vec![1u8; 6],
        TensorOptions {
            shape: Some(vec![2, 2]),
            strides: Some(vec![4, 2]),
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("needs 7 values"), "{err}");

    assert!(Tensor::from_vec_with_opts(
        vec![1u8; 4],
        TensorOptions {
            shape: Some(vec![2, 2]),
            strides: Some(vec![1]),
        },
    )
    .is_err());
    assert!(Tensor::with_shape(vec![1u8; 5], &[2, 3]).is_err());
    Ok(())
}

#[test]
fn scalar_and_zeros() -> Result<()> {
    let scalar = Tensor::from_scalar(7i64);
    assert!(scalar.shape().is_empty());
    assert_eq!(scalar.numel(), 1);
    assert!(scalar.is_contiguous());

    let zeros = TensorValue::zeros(DType::I32, &[2, 2])?;
    assert_eq!(zeros.dtype(), DType::I32);
    assert_eq!(zeros.len(), 4);
    assert!(zeros.is_contiguous());
    assert_eq!(zeros.as_tensor::<i32>()?.to_vec(), vec![0; 4]);
    assert!(zeros.as_tensor::<f32>().is_err());

    let empty = TensorValue::zeros(DType::F32, &[0, 3])?;
    assert!(empty.is_empty());

    let err = TensorValue::zeros(DType::U8, &[usize::MAX, 2]).unwrap_err();
    assert!(err.to_string().contains("too large"), "{err}");
    Ok(())
}

#[test]
fn provider_allocation_reports_oversized_shapes() -> Result<()> {
    let provider = common::cpu_provider()?;
    let value = provider.alloc(DType::F64, &[2, 3])?;
    assert_eq!(value.shape(), &[2, 3]);
    assert!(provider.alloc(DType::F64, &[usize::MAX, usize::MAX]).is_err());
    Ok(())
}

#[test]
fn dtype_identifiers() -> Result<()> {
    for dtype in DType::ALL {
        assert_eq!(DType::from_ident(dtype.as_str())?, *dtype);
    }
    assert!(DType::from_ident("f16").is_err());
    assert!(DType::F64.is_float());
    assert!(DType::I8.is_signed_int());
    assert!(!DType::U8.is_signed_int());
    assert_eq!(DType::I64.size_in_bytes(), 8);
    Ok(())
}
