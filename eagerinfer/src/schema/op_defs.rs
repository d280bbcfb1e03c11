use crate::tensor::DType;

use super::{OpAttrDef, AXIS_ATTR, MS_DOMAIN, ONNX_DOMAIN, PERM_ATTR, TO_ATTR};

/// Type of one formal input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formal {
    /// Bound to a named type parameter shared with other formals.
    Param(&'static str),
    /// Always this dtype.
    Fixed(DType),
    /// Output dtype read from a dtype attribute and bound to `param`.
    FromAttr {
        attr: &'static str,
        param: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeParam {
    pub name: &'static str,
    pub allowed: &'static [DType],
}

/// Declared contract of one operator version.
#[derive(Debug, Clone, Copy)]
pub struct OpSchema {
    pub name: &'static str,
    pub domain: &'static str,
    pub since_version: i32,
    pub inputs: &'static [Formal],
    /// Trailing inputs past this count are optional.
    pub min_inputs: usize,
    pub outputs: &'static [Formal],
    /// The last output formal repeats; at least one output is required.
    pub variadic_outputs: bool,
    pub attrs: &'static [OpAttrDef],
    pub type_params: &'static [TypeParam],
}

impl OpSchema {
    pub fn attr(&self, name: &str) -> Option<&'static OpAttrDef> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    pub fn type_param(&self, name: &str) -> Option<&'static TypeParam> {
        self.type_params.iter().find(|param| param.name == name)
    }

    /// Formal for output `index`, repeating the last one for variadic outputs.
    pub fn output_formal(&self, index: usize) -> Option<Formal> {
        match self.outputs.get(index) {
            Some(formal) => Some(*formal),
            None if self.variadic_outputs => self.outputs.last().copied(),
            None => None,
        }
    }
}

const NUMERIC_V7: &[DType] = &[DType::F32, DType::F64, DType::I32, DType::I64];
const NUMERIC: &[DType] = &[
    DType::I8,
    DType::U8,
    DType::I32,
    DType::I64,
    DType::F32,
    DType::F64,
];
const SIGNED: &[DType] = &[DType::I8, DType::I32, DType::I64, DType::F32, DType::F64];
const FLOATS: &[DType] = &[DType::F32, DType::F64];

const T: Formal = Formal::Param("T");
const ONE_T: &[Formal] = &[T];
const TWO_T: &[Formal] = &[T, T];

const T_NUMERIC_V7: &[TypeParam] = &[TypeParam { name: "T", allowed: NUMERIC_V7 }];
const T_NUMERIC: &[TypeParam] = &[TypeParam { name: "T", allowed: NUMERIC }];
const T_SIGNED: &[TypeParam] = &[TypeParam { name: "T", allowed: SIGNED }];
const T_FLOATS: &[TypeParam] = &[TypeParam { name: "T", allowed: FLOATS }];
const T_ALL: &[TypeParam] = &[TypeParam { name: "T", allowed: DType::ALL }];

const fn unary(
    name: &'static str,
    domain: &'static str,
    since_version: i32,
    type_params: &'static [TypeParam],
) -> OpSchema {
    OpSchema {
        name,
        domain,
        since_version,
        inputs: ONE_T,
        min_inputs: 1,
        outputs: ONE_T,
        variadic_outputs: false,
        attrs: &[],
        type_params,
    }
}

const fn binary(name: &'static str, since_version: i32, type_params: &'static [TypeParam]) -> OpSchema {
    OpSchema {
        name,
        domain: ONNX_DOMAIN,
        since_version,
        inputs: TWO_T,
        min_inputs: 2,
        outputs: ONE_T,
        variadic_outputs: false,
        attrs: &[],
        type_params,
    }
}

const fn with_attrs(mut schema: OpSchema, attrs: &'static [OpAttrDef]) -> OpSchema {
    schema.attrs = attrs;
    schema
}

pub const OPS: &[OpSchema] = &[
    binary("Add", 7, T_NUMERIC_V7),
    binary("Add", 13, T_NUMERIC_V7),
    binary("Add", 14, T_NUMERIC),
    binary("Sub", 7, T_NUMERIC_V7),
    binary("Sub", 13, T_NUMERIC_V7),
    binary("Sub", 14, T_NUMERIC),
    binary("Mul", 7, T_NUMERIC_V7),
    binary("Mul", 13, T_NUMERIC_V7),
    binary("Mul", 14, T_NUMERIC),
    binary("Div", 7, T_NUMERIC_V7),
    binary("Div", 13, T_NUMERIC_V7),
    binary("Div", 14, T_NUMERIC),
    binary("MatMul", 13, T_NUMERIC_V7),
    unary("Abs", ONNX_DOMAIN, 13, T_NUMERIC),
    unary("Neg", ONNX_DOMAIN, 13, T_SIGNED),
    unary("Relu", ONNX_DOMAIN, 6, T_FLOATS),
    unary("Relu", ONNX_DOMAIN, 14, T_SIGNED),
    with_attrs(unary("Transpose", ONNX_DOMAIN, 1, T_ALL), &[PERM_ATTR]),
    with_attrs(unary("Transpose", ONNX_DOMAIN, 13, T_ALL), &[PERM_ATTR]),
    unary("Identity", ONNX_DOMAIN, 1, T_ALL),
    unary("Identity", ONNX_DOMAIN, 14, T_ALL),
    OpSchema {
        name: "Split",
        domain: ONNX_DOMAIN,
        since_version: 13,
        inputs: &[T, Formal::Fixed(DType::I64)],
        min_inputs: 1,
        outputs: ONE_T,
        variadic_outputs: true,
        attrs: &[AXIS_ATTR],
        type_params: T_ALL,
    },
    OpSchema {
        name: "Cast",
        domain: ONNX_DOMAIN,
        since_version: 13,
        inputs: &[Formal::Param("T1")],
        min_inputs: 1,
        outputs: &[Formal::FromAttr { attr: "to", param: "T2" }],
        variadic_outputs: false,
        attrs: &[TO_ATTR],
        type_params: &[
            TypeParam { name: "T1", allowed: DType::ALL },
            TypeParam { name: "T2", allowed: DType::ALL },
        ],
    },
    unary("Gelu", MS_DOMAIN, 1, T_FLOATS),
];

/// Latest schema for `name` in `domain` whose version does not exceed `opset`.
pub fn op_schema(name: &str, domain: &str, opset: i32) -> Option<&'static OpSchema> {
    OPS.iter()
        .filter(|op| op.name == name && op.domain == domain && op.since_version <= opset)
        .max_by_key(|op| op.since_version)
}
