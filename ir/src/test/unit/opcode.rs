use std::str::FromStr;

use test_case::test_case;

use crate::Opcode;

#[test_case(Opcode::Fusion, true; "fusion")]
#[test_case(Opcode::Reduce, true; "reduce")]
#[test_case(Opcode::ReduceWindow, true; "reduce_window")]
#[test_case(Opcode::Add, false; "add")]
#[test_case(Opcode::Negate, false; "negate")]
#[test_case(Opcode::Parameter, false; "parameter")]
fn test_supports_multiple_results(opcode: Opcode, expected: bool) {
    assert_eq!(opcode.supports_multiple_results(), expected);
}

#[test_case(Opcode::ReduceWindow, "reduce-window")]
#[test_case(Opcode::Add, "add")]
#[test_case(Opcode::Exponential, "exponential")]
fn test_canonical_names(opcode: Opcode, name: &str) {
    assert_eq!(opcode.to_string(), name);
    assert_eq!(Opcode::from_str(name).unwrap(), opcode);
}

#[test]
fn test_elementwise_classification() {
    assert!(Opcode::Maximum.is_elementwise_binary());
    assert!(Opcode::Sqrt.is_elementwise_unary());
    assert!(!Opcode::Fusion.is_elementwise());
    assert!(!Opcode::Constant.is_elementwise());
}
