use anyhow::{anyhow, Result};

use crate::graph::{AttrValue, Node};
use crate::tensor::DType;

use super::KernelDef;

/// Everything a kernel factory may inspect while building an instance.
#[derive(Debug, Clone)]
pub struct OpKernelInfo<'a> {
    node: &'a Node,
    kernel_def: &'a KernelDef,
    provider: &'a str,
    input_types: Vec<DType>,
    output_types: Vec<Option<DType>>,
}

impl<'a> OpKernelInfo<'a> {
    pub fn new(
        node: &'a Node,
        kernel_def: &'a KernelDef,
        provider: &'a str,
        input_types: Vec<DType>,
        output_types: Vec<Option<DType>>,
    ) -> Self {
        Self {
            node,
            kernel_def,
            provider,
            input_types,
            output_types,
        }
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn kernel_def(&self) -> &'a KernelDef {
        self.kernel_def
    }

    pub fn provider(&self) -> &'a str {
        self.provider
    }

    pub fn input_count(&self) -> usize {
        self.input_types.len()
    }

    pub fn output_count(&self) -> usize {
        self.output_types.len()
    }

    pub fn input_type(&self, index: usize) -> Option<DType> {
        self.input_types.get(index).copied()
    }

    pub fn output_type(&self, index: usize) -> Option<DType> {
        self.output_types.get(index).copied().flatten()
    }

    pub fn attr(&self, name: &str) -> Option<&'a AttrValue> {
        self.node.attr(name)
    }

    pub fn attr_i64_or(&self, name: &str, default: i64) -> Result<i64> {
        match self.attr(name) {
            None => Ok(default),
            Some(AttrValue::Int(value)) => Ok(*value),
            Some(other) => Err(anyhow!(
                "attribute {} must be int, got {}",
                name,
                other.kind_name()
            )),
        }
    }

    pub fn attr_f32_or(&self, name: &str, default: f32) -> Result<f32> {
        match self.attr(name) {
            None => Ok(default),
            Some(AttrValue::Float(value)) => Ok(*value),
            Some(AttrValue::Int(value)) => Ok(*value as f32),
            Some(other) => Err(anyhow!(
                "attribute {} must be float, got {}",
                name,
                other.kind_name()
            )),
        }
    }

    pub fn attr_ints(&self, name: &str) -> Result<Option<&'a [i64]>> {
        match self.attr(name) {
            None => Ok(None),
            Some(AttrValue::Ints(values)) => Ok(Some(values.as_slice())),
            Some(other) => Err(anyhow!(
                "attribute {} must be ints, got {}",
                name,
                other.kind_name()
            )),
        }
    }

    pub fn attr_dtype(&self, name: &str) -> Result<DType> {
        match self.attr(name) {
            Some(AttrValue::DType(dtype)) => Ok(*dtype),
            Some(other) => Err(anyhow!(
                "attribute {} must be dtype, got {}",
                name,
                other.kind_name()
            )),
            None => Err(anyhow!("missing attribute {}", name)),
        }
    }
}
