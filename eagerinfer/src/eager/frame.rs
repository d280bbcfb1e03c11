use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::backend::ExecutionProvider;
use crate::graph::{ArgId, Graph, Node};
use crate::tensor::{DType, TensorValue};

/// Value index assignment for the arguments of one node.
///
/// Inputs come first, then outputs, each in node order. An argument named
/// twice shares one index.
#[derive(Debug, Clone)]
pub struct FrameInfo<'a> {
    names: Vec<String>,
    indices: HashMap<ArgId, usize>,
    initializers: Vec<Option<&'a TensorValue>>,
    input_indices: Vec<usize>,
}

impl<'a> FrameInfo<'a> {
    pub fn new(graph: &Graph<'a>, node: &Node) -> Self {
        let mut info = Self {
            names: Vec::new(),
            indices: HashMap::new(),
            initializers: Vec::new(),
            input_indices: Vec::with_capacity(node.inputs.len()),
        };
        for id in node.inputs.iter().chain(node.outputs.iter()) {
            if info.indices.contains_key(id) {
                continue;
            }
            let name = graph.arg(*id).name.clone();
            info.indices.insert(*id, info.names.len());
            info.initializers.push(graph.initializer(&name));
            info.names.push(name);
        }
        info.input_indices = node.inputs.iter().map(|id| info.indices[id]).collect();
        info
    }

    pub fn value_index(&self, id: ArgId) -> Option<usize> {
        self.indices.get(&id).copied()
    }

    pub fn value_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn num_values(&self) -> usize {
        self.names.len()
    }

    /// Value indices of `node`'s outputs, in order.
    pub fn fetch_indices(&self, node: &Node) -> Result<Vec<usize>> {
        node.outputs
            .iter()
            .map(|id| {
                self.value_index(*id)
                    .ok_or_else(|| anyhow!("output {:?} of {} has no value slot", id, node))
            })
            .collect()
    }
}

#[derive(Debug)]
enum FrameValue<'a> {
    Empty,
    Borrowed(&'a TensorValue),
    Owned(TensorValue),
}

/// Per-call value storage shared by the kernel context.
///
/// Fetch slots start out holding copies of the caller's pre-allocated outputs.
/// The caller's containers are only written by [`ExecutionFrame::get_outputs`].
#[derive(Debug)]
pub struct ExecutionFrame<'a> {
    names: Vec<String>,
    values: Vec<FrameValue<'a>>,
    input_indices: Vec<usize>,
    fetch_indices: Vec<usize>,
    written: Vec<bool>,
    provider: &'a dyn ExecutionProvider,
}

impl<'a> ExecutionFrame<'a> {
    pub fn new(
        info: &FrameInfo<'a>,
        fetch_indices: Vec<usize>,
        outputs: &[Option<TensorValue>],
        provider: &'a dyn ExecutionProvider,
    ) -> Result<Self> {
        if fetch_indices.len() != outputs.len() {
            return Err(anyhow!(
                "{} fetches but {} output containers",
                fetch_indices.len(),
                outputs.len()
            ));
        }
        let mut values: Vec<FrameValue<'a>> = info
            .initializers
            .iter()
            .map(|value| value.map_or(FrameValue::Empty, FrameValue::Borrowed))
            .collect();
        for (&index, output) in fetch_indices.iter().zip(outputs) {
            let slot = values
                .get_mut(index)
                .ok_or_else(|| anyhow!("fetch index {} is out of range", index))?;
            if let Some(value) = output {
                *slot = FrameValue::Owned(value.clone());
            }
        }
        Ok(Self {
            names: info.names.clone(),
            values,
            input_indices: info.input_indices.clone(),
            written: vec![false; fetch_indices.len()],
            fetch_indices,
            provider,
        })
    }

    pub fn input_count(&self) -> usize {
        self.input_indices.len()
    }

    pub fn output_count(&self) -> usize {
        self.fetch_indices.len()
    }

    pub fn input(&self, index: usize) -> Option<&'a TensorValue> {
        match self.values.get(*self.input_indices.get(index)?)? {
            FrameValue::Borrowed(value) => Some(*value),
            _ => None,
        }
    }

    fn fetch_slot(&self, index: usize) -> Result<usize> {
        self.fetch_indices
            .get(index)
            .copied()
            .ok_or_else(|| anyhow!("output index {} is out of range", index))
    }

    /// Buffer for output `index`, reusing a matching pre-allocated value.
    pub fn output_buffer(&mut self, index: usize, dtype: DType, shape: &[usize]) -> Result<&mut TensorValue> {
        let slot = self.fetch_slot(index)?;
        let name = &self.names[slot];
        let value = match std::mem::replace(&mut self.values[slot], FrameValue::Empty) {
            FrameValue::Owned(existing) => {
                if existing.dtype() != dtype || existing.shape() != shape || !existing.is_contiguous() {
                    let err = anyhow!(
                        "pre-allocated {} is {} {:?}, kernel produces {} {:?}",
                        name,
                        existing.dtype(),
                        existing.shape(),
                        dtype,
                        shape
                    );
                    self.values[slot] = FrameValue::Owned(existing);
                    return Err(err);
                }
                existing
            }
            FrameValue::Empty => self.provider.alloc(dtype, shape)?,
            FrameValue::Borrowed(_) => {
                return Err(anyhow!("output {} aliases an input", name));
            }
        };
        self.values[slot] = FrameValue::Owned(value);
        self.written[index] = true;
        match &mut self.values[slot] {
            FrameValue::Owned(value) => Ok(value),
            _ => Err(anyhow!("output {} was not stored", name)),
        }
    }

    /// Store a finished value as output `index`.
    pub fn set_output(&mut self, index: usize, value: TensorValue) -> Result<()> {
        let slot = self.fetch_slot(index)?;
        let name = &self.names[slot];
        match &self.values[slot] {
            FrameValue::Owned(existing)
                if existing.dtype() != value.dtype() || existing.shape() != value.shape() =>
            {
                return Err(anyhow!(
                    "pre-allocated {} is {} {:?}, kernel produced {} {:?}",
                    name,
                    existing.dtype(),
                    existing.shape(),
                    value.dtype(),
                    value.shape()
                ));
            }
            FrameValue::Borrowed(_) => {
                return Err(anyhow!("output {} aliases an input", name));
            }
            _ => {}
        }
        self.values[slot] = FrameValue::Owned(value);
        self.written[index] = true;
        Ok(())
    }

    /// Move every fetched value into the caller's containers, in order.
    ///
    /// Nothing is written unless all outputs were produced.
    pub fn get_outputs(mut self, outputs: &mut [Option<TensorValue>]) -> Result<()> {
        if outputs.len() != self.fetch_indices.len() {
            return Err(anyhow!(
                "{} fetches but {} output containers",
                self.fetch_indices.len(),
                outputs.len()
            ));
        }
        let mut fetched = Vec::with_capacity(outputs.len());
        for (index, &slot) in self.fetch_indices.iter().enumerate() {
            let value = std::mem::replace(&mut self.values[slot], FrameValue::Empty);
            match value {
                FrameValue::Owned(value) if self.written[index] => fetched.push(value),
                _ => {
                    return Err(anyhow!("output {} was not produced", self.names[slot]));
                }
            }
        }
        for (container, value) in outputs.iter_mut().zip(fetched) {
            *container = Some(value);
        }
        Ok(())
    }
}
