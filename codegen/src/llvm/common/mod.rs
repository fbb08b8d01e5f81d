//! Helpers shared by the LLVM text renderer.

pub mod ctx;
pub mod types;

pub use ctx::RenderContext;
pub use types::{align, lconst, ldt, mangle};
