//! Statement and expression rendering.

use strata_ir::ElementType;

use crate::kernel::{ArrayKind, BinaryOp, Expr, IrArray, Stmt, UnaryOp};
use crate::llvm::common::{RenderContext, align, lconst, ldt, mangle};

/// Render one statement, appending instructions to `kernel`.
pub fn render_stmt(stmt: &Stmt, ctx: &mut RenderContext<'_>, kernel: &mut Vec<String>) {
    match stmt {
        Stmt::Let { value, expr } => {
            let src = render_expr(expr, ctx, kernel);
            // Index lets are named; `add 0` binds the name to any operand.
            kernel.push(format!("  {} = add i64 {src}, 0", ctx.value(*value)));
        }

        Stmt::For { var, lower, upper, body } => {
            let lower = render_expr(lower, ctx, kernel);
            let upper = render_expr(upper, ctx, kernel);
            let id = ctx.next_loop();
            let dst = ctx.var(*var);
            let next = ctx.temp();
            let cmp = ctx.temp();

            kernel.push(format!("  br label %loop_entry_{id}"));
            kernel.push(format!("loop_entry_{id}:"));
            kernel.push(format!("  br label %loop_latch_{id}"));
            kernel.push(format!("loop_latch_{id}:"));
            kernel.push(format!("  {dst} = phi i64 [ {lower}, %loop_entry_{id} ], [ {next}, %loop_footer_{id} ]"));
            kernel.push(format!("  {cmp} = icmp slt i64 {dst}, {upper}"));
            kernel.push(format!("  br i1 {cmp}, label %loop_body_{id}, label %loop_exit_{id}"));
            kernel.push(format!("loop_body_{id}:"));
            for stmt in body {
                render_stmt(stmt, ctx, kernel);
            }
            kernel.push(format!("  br label %loop_footer_{id}"));
            kernel.push(format!("loop_footer_{id}:"));
            kernel.push(format!("  {next} = add nuw nsw i64 {dst}, 1"));
            kernel.push(format!("  br label %loop_latch_{id}"));
            kernel.push(format!("loop_exit_{id}:"));
        }

        Stmt::Store { array, index, value } => {
            let value = render_expr(value, ctx, kernel);
            let ptr = render_element_ptr(array, index, ctx, kernel);
            let ty = array.shape().element_type();
            kernel.push(format!("  store {} {value}, ptr {ptr}, align {}", ldt(ty), align(ty)));
        }
    }
}

/// Render an expression and return the operand naming its value.
pub fn render_expr(expr: &Expr, ctx: &mut RenderContext<'_>, kernel: &mut Vec<String>) -> String {
    match expr {
        Expr::Index(i) => i.to_string(),
        Expr::Const { value, element_type } => lconst(*value, *element_type),
        Expr::Var(var) => ctx.var(*var),
        Expr::Value(value) => ctx.value(*value),
        Expr::ThreadId(axis) => format!("%thread_id_{}", axis.as_str()),

        Expr::LoadBound { table, partition, dim, side } => {
            let partition = render_expr(partition, ctx, kernel);
            let global = &ctx.globals()[table.0];
            let table_type = bounds_table_type(global.num_partitions(), global.num_dimensions());
            let name = global.name();
            let ptr = ctx.temp();
            let dst = ctx.temp();
            kernel.push(format!(
                "  {ptr} = getelementptr inbounds {table_type}, ptr @{name}, i64 0, i64 {partition}, i64 {dim}, i64 {}",
                *side as usize
            ));
            kernel.push(format!("  {dst} = load i64, ptr {ptr}, align 8"));
            dst
        }

        Expr::Read { array, index } => {
            let ptr = render_element_ptr(array, index, ctx, kernel);
            let ty = array.shape().element_type();
            let invariant =
                if ctx.function().attributes.invariant_argument_loads && matches!(array.kind(), ArrayKind::Argument(_)) {
                    ", !invariant.load !0"
                } else {
                    ""
                };
            let dst = ctx.temp();
            kernel.push(format!("  {dst} = load {}, ptr {ptr}, align {}{invariant}", ldt(ty), align(ty)));
            dst
        }

        Expr::Unary { op, element_type, operand } => {
            let src = render_expr(operand, ctx, kernel);
            render_unary(*op, *element_type, &src, ctx, kernel)
        }

        Expr::Binary { op, element_type, lhs, rhs } => {
            let lhs = render_expr(lhs, ctx, kernel);
            let rhs = render_expr(rhs, ctx, kernel);
            render_binary(*op, *element_type, &lhs, &rhs, ctx, kernel)
        }
    }
}

/// LLVM type of a `[partitions][dims][2]` bounds table.
pub fn bounds_table_type(partitions: usize, dims: usize) -> String {
    format!("[{partitions} x [{dims} x [2 x i64]]]")
}

/// Pointer to the element of `array` at a row-major linearized `index`.
fn render_element_ptr(array: &IrArray, index: &[Expr], ctx: &mut RenderContext<'_>, kernel: &mut Vec<String>) -> String {
    let strides = array.shape().strides();
    let mut linear: Option<String> = None;
    for (idx, &stride) in index.iter().zip(strides.iter()) {
        let idx = render_expr(idx, ctx, kernel);
        let term = if stride == 1 {
            idx
        } else {
            let dst = ctx.temp();
            kernel.push(format!("  {dst} = mul nsw i64 {idx}, {stride}"));
            dst
        };
        linear = Some(match linear {
            None => term,
            Some(acc) => {
                let dst = ctx.temp();
                kernel.push(format!("  {dst} = add nsw i64 {acc}, {term}"));
                dst
            }
        });
    }
    let linear = linear.unwrap_or_else(|| "0".to_string());

    let base = match array.kind() {
        ArrayKind::Argument(i) => format!("%arg{i}"),
        ArrayKind::Result(i) => format!("%result{i}"),
    };
    let dst = ctx.temp();
    kernel.push(format!(
        "  {dst} = getelementptr inbounds {}, ptr {base}, i64 {linear}",
        ldt(array.shape().element_type())
    ));
    dst
}

fn render_unary(
    op: UnaryOp,
    ty: ElementType,
    src: &str,
    ctx: &mut RenderContext<'_>,
    kernel: &mut Vec<String>,
) -> String {
    let lt = ldt(ty);
    let m = mangle(ty);

    if !ty.is_float() && matches!(op, UnaryOp::Exp | UnaryOp::Sqrt) {
        // Integer exp/sqrt round-trip through double.
        let wide = ctx.temp();
        kernel.push(format!("  {wide} = sitofp {lt} {src} to double"));
        let result = render_unary(op, ElementType::F64, &wide, ctx, kernel);
        let dst = ctx.temp();
        kernel.push(format!("  {dst} = fptosi double {result} to {lt}"));
        return dst;
    }

    let dst = ctx.temp();
    let instr = match (op, ty.is_float()) {
        (UnaryOp::Neg, true) => format!("fneg {lt} {src}"),
        (UnaryOp::Neg, false) => format!("sub {lt} 0, {src}"),
        (UnaryOp::Abs, true) => format!("call {lt} @llvm.fabs.{m}({lt} {src})"),
        (UnaryOp::Abs, false) => format!("call {lt} @llvm.abs.{m}({lt} {src}, i1 false)"),
        (UnaryOp::Exp, _) => format!("call {lt} @llvm.exp.{m}({lt} {src})"),
        (UnaryOp::Sqrt, _) => format!("call {lt} @llvm.sqrt.{m}({lt} {src})"),
    };
    kernel.push(format!("  {dst} = {instr}"));
    dst
}

fn render_binary(
    op: BinaryOp,
    ty: ElementType,
    lhs: &str,
    rhs: &str,
    ctx: &mut RenderContext<'_>,
    kernel: &mut Vec<String>,
) -> String {
    let lt = ldt(ty);
    let m = mangle(ty);
    let dst = ctx.temp();
    let instr = match (op, ty.is_float()) {
        (BinaryOp::Add, true) => format!("fadd {lt} {lhs}, {rhs}"),
        (BinaryOp::Sub, true) => format!("fsub {lt} {lhs}, {rhs}"),
        (BinaryOp::Mul, true) => format!("fmul {lt} {lhs}, {rhs}"),
        (BinaryOp::Div, true) => format!("fdiv {lt} {lhs}, {rhs}"),
        (BinaryOp::Max, true) => format!("call {lt} @llvm.maxnum.{m}({lt} {lhs}, {lt} {rhs})"),
        (BinaryOp::Min, true) => format!("call {lt} @llvm.minnum.{m}({lt} {lhs}, {lt} {rhs})"),
        (BinaryOp::Add, false) => format!("add {lt} {lhs}, {rhs}"),
        (BinaryOp::Sub, false) => format!("sub {lt} {lhs}, {rhs}"),
        (BinaryOp::Mul, false) => format!("mul {lt} {lhs}, {rhs}"),
        (BinaryOp::Div, false) => format!("sdiv {lt} {lhs}, {rhs}"),
        (BinaryOp::Max, false) => format!("call {lt} @llvm.smax.{m}({lt} {lhs}, {lt} {rhs})"),
        (BinaryOp::Min, false) => format!("call {lt} @llvm.smin.{m}({lt} {lhs}, {lt} {rhs})"),
    };
    kernel.push(format!("  {dst} = {instr}"));
    dst
}
