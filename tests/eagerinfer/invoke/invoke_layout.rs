use anyhow::Result;
use eagerinfer::eager::validate_input_layouts;
use eagerinfer::{InvokeError, KernelDef, Tensor, TensorOptions, TensorValue};

use crate::common::{self, output_shape, output_vec, tensor};

/// A 3x2 view over row-major 2x3 storage (the transpose, not materialized).
fn strided_3x2() -> Result<TensorValue> {
    let base = Tensor::with_shape(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?;
    let view = base.permuted(&[1, 0])?;
    assert!(!view.is_contiguous());
    Ok(view.into())
}

#[test]
fn strided_input_rejected_where_kernel_needs_contiguous() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![strided_3x2()?];
    let mut outputs = vec![None];
    let err = invoker
        .invoke("Abs", &inputs, &mut outputs, None, "", 14)
        .unwrap_err();
    match &err {
        InvokeError::UnsupportedLayout { index, ident } => {
            assert_eq!(*index, 0);
            assert_eq!(ident.op, "Abs");
        }
        other => panic!("expected layout error, got {other}"),
    }
    assert_eq!(err.stage(), "layout_validation");
    assert!(
        err.to_string()
            .contains("Abs's input 0 doesn't support non-contiguous tensor"),
        "{err}"
    );
    assert!(outputs[0].is_none());
    Ok(())
}

#[test]
fn layout_error_reports_offending_position() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![tensor(vec![0.0f32; 6], &[3, 2])?, strided_3x2()?];
    let mut outputs = vec![None];
    let err = invoker
        .invoke("Add", &inputs, &mut outputs, None, "", 14)
        .unwrap_err();
    assert!(
        matches!(err, InvokeError::UnsupportedLayout { index: 1, .. }),
        "{err}"
    );
    Ok(())
}

#[test]
fn contiguous_copy_of_the_same_data_succeeds() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let contiguous = strided_3x2()?.to_contiguous();
    assert!(contiguous.is_contiguous());
    let mut outputs = vec![None];
    invoker.invoke("Abs", &[contiguous], &mut outputs, None, "", 14)?;
    assert_eq!(
        output_vec::<f32>(&outputs, 0)?,
        vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]
    );
    Ok(())
}

#[test]
fn transpose_accepts_strided_input() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![strided_3x2()?];
    let mut outputs = vec![None];
    invoker.invoke("Transpose", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_shape(&outputs, 0)?, vec![2, 3]);
    assert_eq!(
        output_vec::<f32>(&outputs, 0)?,
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
    );
    Ok(())
}

#[test]
fn identity_materializes_strided_input() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![strided_3x2()?];
    let mut outputs = vec![None];
    invoker.invoke("Identity", &inputs, &mut outputs, None, "", 14)?;
    let out = outputs[0].as_ref().expect("identity output");
    assert!(out.is_contiguous());
    assert_eq!(
        output_vec::<f32>(&outputs, 0)?,
        vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]
    );
    Ok(())
}

#[test]
fn unit_dims_do_not_make_a_tensor_strided() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let input = Tensor::from_vec_with_opts(
        vec![-1.0f32, 2.0, -3.0],
        TensorOptions {
            shape: Some(vec![1, 3]),
            strides: Some(vec![100, 1]),
        },
    )?;
    assert!(input.is_contiguous());
    let mut outputs = vec![None];
    invoker.invoke("Abs", &[input.into()], &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![1.0, 2.0, 3.0]);
    Ok(())
}

#[test]
fn validator_checks_only_declared_positions() -> Result<()> {
    let def = KernelDef::builder("Concat")
        .since_version(1)
        .provider("TestProvider")
        .may_strided_input(1)
        .build();
    let contiguous = tensor(vec![0.0f32; 6], &[3, 2])?;
    assert_eq!(validate_input_layouts(&[contiguous.clone(), strided_3x2()?], &def), Ok(()));
    assert_eq!(validate_input_layouts(&[strided_3x2()?, contiguous.clone()], &def), Err(0));
    assert_eq!(
        validate_input_layouts(&[contiguous.clone(), contiguous, strided_3x2()?], &def),
        Err(2)
    );
    assert_eq!(validate_input_layouts(&[], &def), Ok(()));
    Ok(())
}
