//! LLVM IR generation for host kernels.

pub mod common;
pub mod text;

pub use text::render;
