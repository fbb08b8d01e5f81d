//! LLVM type and constant string generation.

use strata_ir::ElementType;

/// Convert an element type to its LLVM type string.
pub fn ldt(element_type: ElementType) -> &'static str {
    match element_type {
        ElementType::S32 => "i32",
        ElementType::S64 => "i64",
        ElementType::F32 => "float",
        ElementType::F64 => "double",
    }
}

/// Mangled intrinsic suffix, e.g. "float" -> "f32".
pub fn mangle(element_type: ElementType) -> &'static str {
    match element_type {
        ElementType::S32 => "i32",
        ElementType::S64 => "i64",
        ElementType::F32 => "f32",
        ElementType::F64 => "f64",
    }
}

/// Natural alignment in bytes.
pub fn align(element_type: ElementType) -> usize {
    element_type.byte_size()
}

/// Convert a constant value to an LLVM literal string.
pub fn lconst(value: f64, element_type: ElementType) -> String {
    if element_type.is_float() { format_float(value, element_type) } else { (value as i64).to_string() }
}

/// Format a float value for LLVM IR.
///
/// Both `float` and `double` literals are written as the hex bits of a double;
/// `float` values are rounded to single precision first.
fn format_float(f: f64, element_type: ElementType) -> String {
    if f.is_nan() {
        return "0x7FF8000000000000".to_string();
    }

    let bits = match element_type {
        ElementType::F32 => ((f as f32) as f64).to_bits(),
        _ => f.to_bits(),
    };
    format!("0x{bits:016X}")
}
