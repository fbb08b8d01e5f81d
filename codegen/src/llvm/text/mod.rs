//! Text-based LLVM IR code generation.
//!
//! This module generates LLVM IR as plain strings using `format!` macros.
//!
//! # Kernel Signature
//!
//! ```llvm
//! void @kernel(ptr %args, ptr %results, ptr %thread)
//! ```
//! - `args`: pointer to array of argument buffer pointers
//! - `results`: pointer to array of result buffer pointers
//! - `thread`: pointer to the `{x, y, z}` i64 thread id of this invocation

pub mod ops;

use crate::bounds::BoundsTable;
use crate::kernel::{KernelModule, ThreadAxis};
use crate::llvm::common::RenderContext;
use ops::{bounds_table_type, render_stmt};

/// Render a kernel module as textual LLVM IR.
pub fn render(module: &KernelModule) -> String {
    let function = &module.function;
    let mut ctx = RenderContext::new(module);
    let mut kernel: Vec<String> = Vec::new();

    kernel.push("  ; Load thread id".to_string());
    for (i, axis) in ThreadAxis::ALL.iter().enumerate() {
        let ptr = ctx.temp();
        kernel.push(format!("  {ptr} = getelementptr inbounds i64, ptr %thread, i64 {i}"));
        kernel.push(format!("  %thread_id_{} = load i64, ptr {ptr}, align 8", axis.as_str()));
    }

    kernel.push("  ; Load buffer pointers".to_string());
    for (table, prefix, count) in
        [("args", "arg", function.arguments.len()), ("results", "result", function.results.len())]
    {
        for i in 0..count {
            let ptr = ctx.temp();
            kernel.push(format!("  {ptr} = getelementptr inbounds ptr, ptr %{table}, i64 {i}"));
            kernel.push(format!("  %{prefix}{i} = load ptr, ptr {ptr}, align 8"));
        }
    }
    kernel.push(String::new());

    for stmt in &function.body {
        render_stmt(stmt, &mut ctx, &mut kernel);
    }
    kernel.push("  ret void".to_string());

    tracing::debug!(
        module = %module.name,
        function = %function.name,
        instructions = ctx.counter(),
        "rendered llvm text"
    );

    let globals = module.globals.iter().map(render_global).collect::<Vec<_>>().join("\n");
    let metadata = if function.attributes.invariant_argument_loads { "\n!0 = !{}\n" } else { "" };

    format!(
        r#"; ModuleID = '{module_name}'
source_filename = "{module_name}"

{globals}

{intrinsics}

define void @{kernel_name}(ptr noalias %args, ptr noalias %results, ptr noalias %thread) #0 {{
entry:
{body}
}}

attributes #0 = {{ nounwind "prefer-vector-width"="{prefer_vector_width}" }}
{metadata}"#,
        module_name = module.name,
        kernel_name = function.name,
        intrinsics = generate_intrinsic_declarations(&kernel),
        body = kernel.join("\n"),
        prefer_vector_width = function.attributes.prefer_vector_width,
    )
}

/// Render a bounds table as a private constant global.
fn render_global(table: &BoundsTable) -> String {
    let dims = table.num_dimensions();
    let dim_type = "[2 x i64]";
    let row_type = format!("[{dims} x {dim_type}]");

    let rows: Vec<String> = (0..table.num_partitions())
        .map(|p| {
            let entries: Vec<String> = (0..dims)
                .filter_map(|d| table.get(p, d))
                .map(|(lower, upper)| format!("{dim_type} [i64 {lower}, i64 {upper}]"))
                .collect();
            format!("{row_type} [{}]", entries.join(", "))
        })
        .collect();

    format!(
        "@{} = private unnamed_addr constant {} [{}], align 8",
        table.name(),
        bounds_table_type(table.num_partitions(), dims),
        rows.join(", ")
    )
}

/// Generate LLVM intrinsic declarations used in the kernel.
fn generate_intrinsic_declarations(kernel: &[String]) -> String {
    let mut decls = Vec::new();
    let kernel_str = kernel.join("\n");

    for (llvm_type, mangled) in [("float", "f32"), ("double", "f64")] {
        for intrinsic in ["fabs", "exp", "sqrt"] {
            if kernel_str.contains(&format!("@llvm.{intrinsic}.{mangled}(")) {
                decls.push(format!("declare {llvm_type} @llvm.{intrinsic}.{mangled}({llvm_type})"));
            }
        }
        for intrinsic in ["maxnum", "minnum"] {
            if kernel_str.contains(&format!("@llvm.{intrinsic}.{mangled}(")) {
                decls.push(format!("declare {llvm_type} @llvm.{intrinsic}.{mangled}({llvm_type}, {llvm_type})"));
            }
        }
    }

    for bits in ["i32", "i64"] {
        if kernel_str.contains(&format!("@llvm.abs.{bits}(")) {
            decls.push(format!("declare {bits} @llvm.abs.{bits}({bits}, i1)"));
        }
        for intrinsic in ["smax", "smin"] {
            if kernel_str.contains(&format!("@llvm.{intrinsic}.{bits}(")) {
                decls.push(format!("declare {bits} @llvm.{intrinsic}.{bits}({bits}, {bits})"));
            }
        }
    }

    decls.join("\n")
}
