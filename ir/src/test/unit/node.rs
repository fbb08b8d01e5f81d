use crate::{BackendConfig, ElementType, Node, Opcode, Shape};

fn f32_16() -> Shape {
    Shape::array(ElementType::F32, &[16]).unwrap()
}

#[test]
fn test_builder_defaults() {
    let node = Node::builder().name("neg").opcode(Opcode::Negate).shape(f32_16()).build();
    assert_eq!(node.name(), "neg");
    assert_eq!(node.opcode(), Opcode::Negate);
    assert!(node.operands().is_empty());
    assert!(node.fused_roots().is_empty());
    assert!(node.raw_backend_config().is_none());
    assert!(node.literal().is_none());
}

#[test]
fn test_parameter_and_constant() {
    let p = Node::parameter(3, "p3", f32_16());
    assert_eq!(p.opcode(), Opcode::Parameter);
    assert_eq!(p.parameter_number(), Some(3));

    let c = Node::constant("two", 2.0, ElementType::F32);
    assert_eq!(c.opcode(), Opcode::Constant);
    assert_eq!(c.literal(), Some(2.0));
    assert_eq!(c.shape().rank(), 0);
}

#[test]
fn test_unique_ids() {
    let a = Node::parameter(0, "a", f32_16());
    let b = Node::parameter(0, "a", f32_16());
    assert_ne!(a.id, b.id);
}

#[test]
fn test_with_backend_config() {
    let p0 = Node::parameter(0, "p0", f32_16());
    let neg = Node::builder().name("neg").opcode(Opcode::Negate).shape(f32_16()).operands(vec![p0.clone()]).build();

    let configured = neg.with_backend_config(&BackendConfig::with_outer_dimension_partitions([4])).unwrap();

    assert_ne!(configured.id, neg.id);
    assert_eq!(configured.name(), "neg");
    assert_eq!(configured.operands()[0].id, p0.id);
    assert_eq!(configured.raw_backend_config(), Some(r#"{"outer_dimension_partitions":[4]}"#));
}
