use anyhow::Result;
use eagerinfer::{AttrValue, DType, NodeAttributes, Tensor, TensorValue};

use crate::common::{self, assert_close, output_shape, output_vec, tensor};

#[test]
fn add_broadcasts_row_vector() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![
        tensor(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?,
        tensor(vec![10.0f32, 20.0, 30.0], &[3])?,
    ];
    let mut outputs = vec![None];
    invoker.invoke("Add", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_shape(&outputs, 0)?, vec![2, 3]);
    assert_eq!(
        output_vec::<f32>(&outputs, 0)?,
        vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]
    );
    Ok(())
}

#[test]
fn add_scalar_to_vector() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![
        TensorValue::from(Tensor::from_scalar(2.0f64)),
        tensor(vec![1.0f64, 2.0, 3.0], &[3])?,
    ];
    let mut outputs = vec![None];
    invoker.invoke("Add", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<f64>(&outputs, 0)?, vec![3.0, 4.0, 5.0]);
    Ok(())
}

#[test]
fn integer_arithmetic_wraps_and_truncates() -> Result<()> {
    let invoker = common::cpu_invoker()?;

    let inputs = vec![tensor(vec![5i32, 7], &[2])?, tensor(vec![2i32, 10], &[2])?];
    let mut outputs = vec![None];
    invoker.invoke("Sub", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<i32>(&outputs, 0)?, vec![3, -3]);

    let inputs = vec![tensor(vec![i64::MAX], &[1])?, tensor(vec![2i64], &[1])?];
    let mut outputs = vec![None];
    invoker.invoke("Mul", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<i64>(&outputs, 0)?, vec![-2]);

    let inputs = vec![tensor(vec![7i32, -7], &[2])?, tensor(vec![2i32, 2], &[2])?];
    let mut outputs = vec![None];
    invoker.invoke("Div", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<i32>(&outputs, 0)?, vec![3, -3]);

    let inputs = vec![tensor(vec![127i8], &[1])?, tensor(vec![1i8], &[1])?];
    let mut outputs = vec![None];
    invoker.invoke("Add", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<i8>(&outputs, 0)?, vec![-128]);
    Ok(())
}

#[test]
fn matmul_two_by_three_times_three_by_two() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![
        tensor(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?,
        tensor(vec![7.0f32, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2])?,
    ];
    let mut outputs = vec![None];
    invoker.invoke("MatMul", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_shape(&outputs, 0)?, vec![2, 2]);
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![58.0, 64.0, 139.0, 154.0]);
    Ok(())
}

#[test]
fn unary_ops() -> Result<()> {
    let invoker = common::cpu_invoker()?;

    let mut outputs = vec![None];
    invoker.invoke("Abs", &[tensor(vec![-3i32, 4], &[2])?], &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<i32>(&outputs, 0)?, vec![3, 4]);

    let mut outputs = vec![None];
    invoker.invoke("Neg", &[tensor(vec![1.0f32, -2.0], &[2])?], &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![-1.0, 2.0]);

    let mut outputs = vec![None];
    let input = tensor(vec![-1.0f32, 0.0, 2.0], &[3])?;
    invoker.invoke("Relu", &[input], &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![0.0, 0.0, 2.0]);

    let mut outputs = vec![None];
    invoker.invoke("Relu", &[tensor(vec![-5i32, 5], &[2])?], &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<i32>(&outputs, 0)?, vec![0, 5]);
    Ok(())
}

#[test]
fn gelu_runs_in_vendor_domain() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![tensor(vec![0.0f32, 1.0, -1.0, 2.0], &[4])?];
    let mut outputs = vec![None];
    invoker.invoke("Gelu", &inputs, &mut outputs, None, "com.microsoft", 1)?;
    assert_close(
        &output_vec::<f32>(&outputs, 0)?,
        &[0.0, 0.841_344_7, -0.158_655_25, 1.954_499_7],
        1e-5,
    );
    Ok(())
}

#[test]
fn transpose_defaults_to_reversed_axes() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![tensor(vec![1i64, 2, 3, 4, 5, 6], &[2, 3])?];
    let mut outputs = vec![None];
    invoker.invoke("Transpose", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_shape(&outputs, 0)?, vec![3, 2]);
    assert_eq!(output_vec::<i64>(&outputs, 0)?, vec![1, 4, 2, 5, 3, 6]);
    Ok(())
}

#[test]
fn transpose_with_perm_attribute() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![tensor(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[1, 2, 3])?];
    let attrs = NodeAttributes::new().with("perm", AttrValue::Ints(vec![2, 0, 1]));
    let mut outputs = vec![None];
    invoker.invoke("Transpose", &inputs, &mut outputs, Some(&attrs), "", 14)?;
    assert_eq!(output_shape(&outputs, 0)?, vec![3, 1, 2]);
    assert_eq!(
        output_vec::<f32>(&outputs, 0)?,
        vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]
    );
    Ok(())
}

#[test]
fn identity_copies_bool_tensor() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![tensor(vec![true, false, true], &[3])?];
    let mut outputs = vec![None];
    invoker.invoke("Identity", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<bool>(&outputs, 0)?, vec![true, false, true]);
    Ok(())
}

#[test]
fn split_evenly_into_three() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![tensor(vec![1i64, 2, 3, 4, 5, 6], &[6])?];
    let mut outputs = vec![None, None, None];
    invoker.invoke("Split", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<i64>(&outputs, 0)?, vec![1, 2]);
    assert_eq!(output_vec::<i64>(&outputs, 1)?, vec![3, 4]);
    assert_eq!(output_vec::<i64>(&outputs, 2)?, vec![5, 6]);
    Ok(())
}

#[test]
fn split_with_sizes_along_axis_one() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![
        tensor(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?,
        tensor(vec![1i64, 2], &[2])?,
    ];
    let attrs = NodeAttributes::new().with("axis", AttrValue::Int(1));
    let mut outputs = vec![None, None];
    invoker.invoke("Split", &inputs, &mut outputs, Some(&attrs), "", 14)?;
    assert_eq!(output_shape(&outputs, 0)?, vec![2, 1]);
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![1.0, 4.0]);
    assert_eq!(output_shape(&outputs, 1)?, vec![2, 2]);
    assert_eq!(output_vec::<f32>(&outputs, 1)?, vec![2.0, 3.0, 5.0, 6.0]);
    Ok(())
}

#[test]
fn cast_between_dtypes() -> Result<()> {
    let invoker = common::cpu_invoker()?;

    let to_i32 = NodeAttributes::new().with("to", AttrValue::DType(DType::I32));
    let mut outputs = vec![None];
    let input = tensor(vec![1.7f32, -2.5, 300.0], &[3])?;
    invoker.invoke("Cast", &[input], &mut outputs, Some(&to_i32), "", 14)?;
    assert_eq!(output_vec::<i32>(&outputs, 0)?, vec![1, -2, 300]);

    let to_u8 = NodeAttributes::new().with("to", AttrValue::DType(DType::U8));
    let mut outputs = vec![None];
    let input = tensor(vec![300.0f32, -4.0], &[2])?;
    invoker.invoke("Cast", &[input], &mut outputs, Some(&to_u8), "", 14)?;
    assert_eq!(output_vec::<u8>(&outputs, 0)?, vec![255, 0]);

    let to_bool = NodeAttributes::new().with("to", AttrValue::DType(DType::Bool));
    let mut outputs = vec![None];
    let input = tensor(vec![0i32, 2], &[2])?;
    invoker.invoke("Cast", &[input], &mut outputs, Some(&to_bool), "", 14)?;
    assert_eq!(output_vec::<bool>(&outputs, 0)?, vec![false, true]);
    Ok(())
}

#[test]
fn preallocated_output_is_filled() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![tensor(vec![1.0f32, 2.0], &[2])?, tensor(vec![3.0f32, 4.0], &[2])?];
    let mut outputs = vec![Some(tensor(vec![0.0f32, 0.0], &[2])?)];
    invoker.invoke("Add", &inputs, &mut outputs, None, "", 14)?;
    assert_eq!(output_vec::<f32>(&outputs, 0)?, vec![4.0, 6.0]);
    Ok(())
}

#[test]
fn spelled_out_default_domain_is_accepted() -> Result<()> {
    let invoker = common::cpu_invoker()?;
    let inputs = vec![tensor(vec![1i32], &[1])?, tensor(vec![2i32], &[1])?];
    let mut outputs = vec![None];
    invoker.invoke("Mul", &inputs, &mut outputs, None, "ai.onnx", 14)?;
    assert_eq!(output_vec::<i32>(&outputs, 0)?, vec![2]);
    Ok(())
}
