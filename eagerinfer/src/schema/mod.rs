mod op_attrs;
mod op_defs;

pub use op_attrs::{OpAttrDef, OpAttrType, AXIS_ATTR, PERM_ATTR, TO_ATTR};
pub use op_defs::{op_schema, Formal, OpSchema, TypeParam, OPS};

/// Default operator domain.
pub const ONNX_DOMAIN: &str = "";
/// Spelled-out alias accepted for the default domain.
pub const ONNX_DOMAIN_ALIAS: &str = "ai.onnx";
/// Vendor extension domain.
pub const MS_DOMAIN: &str = "com.microsoft";

/// Opset pinned for the default domain on the eager path.
pub const EAGER_ONNX_OPSET_VERSION: i32 = 14;
/// Opset pinned for the vendor extension domain on the eager path.
pub const EAGER_MS_OPSET_VERSION: i32 = 1;

/// Map the default-domain alias onto the canonical empty domain.
pub fn normalize_domain(domain: &str) -> &str {
    if domain == ONNX_DOMAIN_ALIAS {
        ONNX_DOMAIN
    } else {
        domain
    }
}
