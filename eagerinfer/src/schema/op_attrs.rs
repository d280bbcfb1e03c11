use crate::graph::AttrValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpAttrType {
    Int,
    Float,
    String,
    Ints,
    Floats,
    DType,
}

impl OpAttrType {
    pub fn as_str(self) -> &'static str {
        match self {
            OpAttrType::Int => "int",
            OpAttrType::Float => "float",
            OpAttrType::String => "string",
            OpAttrType::Ints => "ints",
            OpAttrType::Floats => "floats",
            OpAttrType::DType => "dtype",
        }
    }

    /// True if `value` is an acceptable encoding for this attribute kind.
    ///
    /// Integers are accepted where floats are declared.
    pub fn accepts(self, value: &AttrValue) -> bool {
        matches!(
            (self, value),
            (OpAttrType::Int, AttrValue::Int(_))
                | (OpAttrType::Float, AttrValue::Float(_))
                | (OpAttrType::Float, AttrValue::Int(_))
                | (OpAttrType::String, AttrValue::Str(_))
                | (OpAttrType::Ints, AttrValue::Ints(_))
                | (OpAttrType::Floats, AttrValue::Floats(_))
                | (OpAttrType::DType, AttrValue::DType(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpAttrDef {
    pub name: &'static str,
    pub kind: OpAttrType,
    pub required: bool,
}

impl OpAttrDef {
    pub const fn new(name: &'static str, kind: OpAttrType) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    pub const fn required(name: &'static str, kind: OpAttrType) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }
}

pub const PERM_ATTR: OpAttrDef = OpAttrDef::new("perm", OpAttrType::Ints);
pub const AXIS_ATTR: OpAttrDef = OpAttrDef::new("axis", OpAttrType::Int);
pub const TO_ATTR: OpAttrDef = OpAttrDef::required("to", OpAttrType::DType);
