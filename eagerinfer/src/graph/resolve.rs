use std::collections::{BTreeMap, HashSet};

use anyhow::{anyhow, Result};

use crate::schema::{op_schema, Formal, OpSchema};
use crate::tensor::DType;

use super::{AttrValue, Graph, Node};

struct Typing {
    since_version: i32,
    bindings: BTreeMap<String, DType>,
    outputs: Vec<DType>,
}

impl<'a> Graph<'a> {
    /// Validate every node and infer output types.
    ///
    /// Nodes whose operator has no known schema are checked structurally only
    /// and stay untyped.
    pub fn resolve(&mut self) -> Result<()> {
        self.check_structure()?;
        for index in 0..self.nodes.len() {
            let node = &self.nodes[index];
            let opset = self
                .opset_for(&node.domain)
                .ok_or_else(|| anyhow!("node {} uses unknown domain '{}'", node, node.domain))?;
            let Some(schema) = op_schema(&node.op_type, &node.domain, opset) else {
                continue;
            };
            let typing = self.infer_types(node, schema)?;
            let outputs = node.outputs.clone();
            for (id, dtype) in outputs.into_iter().zip(typing.outputs) {
                let arg = &mut self.args[id.0];
                match arg.dtype {
                    Some(existing) if existing != dtype => {
                        return Err(anyhow!(
                            "inconsistent types for {}: {} vs {}",
                            arg.name,
                            existing,
                            dtype
                        ));
                    }
                    _ => arg.dtype = Some(dtype),
                }
            }
            let node = &mut self.nodes[index];
            node.since_version = Some(typing.since_version);
            node.type_bindings = typing.bindings;
        }
        Ok(())
    }

    fn check_structure(&self) -> Result<()> {
        let mut produced = HashSet::new();
        for node in &self.nodes {
            if self.opset_for(&node.domain).is_none() {
                return Err(anyhow!("node {} uses unknown domain '{}'", node, node.domain));
            }
            for id in &node.outputs {
                let name = &self.args[id.0].name;
                if self.initializers.contains_key(name) {
                    return Err(anyhow!(
                        "duplicate name: {} is both an initializer and an output of {}",
                        name,
                        node
                    ));
                }
                if !produced.insert(*id) {
                    return Err(anyhow!("duplicate name: {} is produced more than once", name));
                }
            }
        }
        for node in &self.nodes {
            for id in &node.inputs {
                if !produced.contains(id) && !self.is_initializer(*id) {
                    return Err(anyhow!(
                        "input {} of {} is neither an initializer nor produced by a node",
                        self.args[id.0].name,
                        node
                    ));
                }
            }
        }
        Ok(())
    }

    fn infer_types(&self, node: &Node, schema: &OpSchema) -> Result<Typing> {
        let max_inputs = schema.inputs.len();
        if node.inputs.len() < schema.min_inputs || node.inputs.len() > max_inputs {
            return Err(anyhow!(
                "{} expects {}..={} inputs, got {}",
                node.op_type,
                schema.min_inputs,
                max_inputs,
                node.inputs.len()
            ));
        }
        let outputs_ok = if schema.variadic_outputs {
            node.outputs.len() >= schema.outputs.len()
        } else {
            node.outputs.len() == schema.outputs.len()
        };
        if !outputs_ok {
            return Err(anyhow!(
                "{} expects {}{} outputs, got {}",
                node.op_type,
                if schema.variadic_outputs { "at least " } else { "" },
                schema.outputs.len(),
                node.outputs.len()
            ));
        }
        check_attrs(node, schema)?;

        let mut bindings = BTreeMap::new();
        for (position, id) in node.inputs.iter().enumerate() {
            let arg = &self.args[id.0];
            let dtype = arg
                .dtype
                .ok_or_else(|| anyhow!("input {} of {} has no type", arg.name, node))?;
            match schema.inputs[position] {
                Formal::Param(param) | Formal::FromAttr { param, .. } => {
                    bind(schema, &mut bindings, param, dtype, &arg.name)?;
                }
                Formal::Fixed(expected) => {
                    if dtype != expected {
                        return Err(anyhow!(
                            "input {} of {} must be {}, got {}",
                            arg.name,
                            node,
                            expected,
                            dtype
                        ));
                    }
                }
            }
        }

        let mut outputs = Vec::with_capacity(node.outputs.len());
        for (position, id) in node.outputs.iter().enumerate() {
            let name = &self.args[id.0].name;
            let formal = schema
                .output_formal(position)
                .ok_or_else(|| anyhow!("{} has no output {}", node.op_type, position))?;
            let dtype = match formal {
                Formal::Param(param) => bindings.get(param).copied().ok_or_else(|| {
                    anyhow!("cannot infer type of {}: {} is unbound", name, param)
                })?,
                Formal::Fixed(dtype) => dtype,
                Formal::FromAttr { attr, param } => {
                    let dtype = match node.attr(attr) {
                        Some(AttrValue::DType(dtype)) => *dtype,
                        _ => return Err(anyhow!("{} requires dtype attribute {}", node.op_type, attr)),
                    };
                    bind(schema, &mut bindings, param, dtype, name)?;
                    dtype
                }
            };
            outputs.push(dtype);
        }

        Ok(Typing {
            since_version: schema.since_version,
            bindings,
            outputs,
        })
    }
}

fn check_attrs(node: &Node, schema: &OpSchema) -> Result<()> {
    for def in schema.attrs.iter().filter(|def| def.required) {
        if !node.attrs.contains(def.name) {
            return Err(anyhow!("{} requires attribute {}", node.op_type, def.name));
        }
    }
    for (name, value) in node.attrs.iter() {
        let def = schema
            .attr(name)
            .ok_or_else(|| anyhow!("{} does not accept attribute {}", node.op_type, name))?;
        if !def.kind.accepts(value) {
            return Err(anyhow!(
                "attribute {} of {} must be {}, got {}",
                name,
                node.op_type,
                def.kind.as_str(),
                value.kind_name()
            ));
        }
    }
    Ok(())
}

fn bind(
    schema: &OpSchema,
    bindings: &mut BTreeMap<String, DType>,
    param: &str,
    dtype: DType,
    arg_name: &str,
) -> Result<()> {
    if let Some(allowed) = schema.type_param(param) {
        if !allowed.allowed.contains(&dtype) {
            return Err(anyhow!(
                "type {} of {} is not allowed for {} of {} (opset {})",
                dtype,
                arg_name,
                param,
                schema.name,
                schema.since_version
            ));
        }
    }
    match bindings.get(param) {
        Some(bound) if *bound != dtype => Err(anyhow!(
            "inconsistent types for {}: {} is bound to {}, got {} from {}",
            schema.name,
            param,
            bound,
            dtype,
            arg_name
        )),
        Some(_) => Ok(()),
        None => {
            bindings.insert(param.to_string(), dtype);
            Ok(())
        }
    }
}
