mod context;
mod def;
pub mod hash;
mod info;
mod registry;

use anyhow::Result;

pub use context::OpKernelContext;
pub use def::{KernelDef, KernelDefBuilder};
pub use info::OpKernelInfo;
pub use registry::{KernelCreateFn, KernelCreateInfo, KernelRegistry};

/// A kernel instance bound to one node.
pub trait OpKernel: Send {
    /// Read inputs from `ctx` and populate every output.
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()>;
}
