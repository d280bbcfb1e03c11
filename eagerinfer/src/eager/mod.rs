mod frame;
mod invoker;
mod layout;
mod resolver;

pub use frame::{ExecutionFrame, FrameInfo};
pub use invoker::KernelInvoker;
pub use layout::validate_input_layouts;
pub use resolver::{assign_provider, instantiate, resolution_version, resolve, KernelLookup};
