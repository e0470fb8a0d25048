use modelgraph::{
    ElementType, Model, ModelTransformer, NodeId, OutputPortRef, TransformContext,
};
use modelgraph_nodes::{ConstantOp, InputOp, OutputOp, UnaryKind, UnaryOp};

/// input -> neg -> output, plus a side chain (constant -> abs) that feeds
/// nothing on the way to the output.
fn with_side_chain() -> (Model, NodeId, NodeId) {
    let mut model = Model::new();
    let input = model
        .add_node(Box::new(InputOp::new(4, ElementType::F64)), vec![])
        .expect("insert");
    let x = model
        .port_elements_of(OutputPortRef::new(input, 0))
        .expect("resolve");
    let neg = model
        .add_node(Box::new(UnaryOp::new(UnaryKind::Neg)), vec![x])
        .expect("insert");
    let y = model
        .port_elements_of(OutputPortRef::new(neg, 0))
        .expect("resolve");
    let output = model
        .add_node(Box::new(OutputOp), vec![y])
        .expect("insert");

    let constant = model
        .add_node(Box::new(ConstantOp::new(vec![1.0, 2.0]).expect("non-empty")), vec![])
        .expect("insert");
    let c = model
        .port_elements_of(OutputPortRef::new(constant, 0))
        .expect("resolve");
    model
        .add_node(Box::new(UnaryOp::new(UnaryKind::Abs)), vec![c])
        .expect("insert");

    (model, output, constant)
}

#[test]
fn submodel_contains_exactly_the_needed_nodes() {
    let (model, output, constant) = with_side_chain();
    assert_eq!(model.len(), 5);

    let mut transformer = ModelTransformer::new();
    let extracted = transformer
        .copy_submodel(&model, &[output], &TransformContext::new())
        .expect("extraction must succeed");

    assert_eq!(extracted.len(), 3);
    let kinds: Vec<_> = extracted.iter().map(|node| node.kind()).collect();
    assert_eq!(kinds, vec!["input", "neg", "output"]);
    extracted.validate().expect("extracted model must be well formed");

    // The side chain was never iterated, so its ports have no mapping.
    assert!(transformer
        .corresponding_outputs(OutputPortRef::new(constant, 0))
        .is_none());
}

#[test]
fn submodel_with_multiple_targets_keeps_shared_producers_once() {
    let mut model = Model::new();
    let input = model
        .add_node(Box::new(InputOp::new(2, ElementType::F64)), vec![])
        .expect("insert");
    let x = model
        .port_elements_of(OutputPortRef::new(input, 0))
        .expect("resolve");
    let neg = model
        .add_node(Box::new(UnaryOp::new(UnaryKind::Neg)), vec![x.clone()])
        .expect("insert");
    let abs = model
        .add_node(Box::new(UnaryOp::new(UnaryKind::Abs)), vec![x])
        .expect("insert");

    let mut transformer = ModelTransformer::new();
    let extracted = transformer
        .copy_submodel(&model, &[neg, abs], &TransformContext::new())
        .expect("extraction must succeed");

    assert_eq!(extracted.len(), 3);
    let new_input = transformer
        .corresponding_input_node(input)
        .expect("shared producer was cloned");
    assert_eq!(extracted.node(new_input).map(|n| n.kind()), Some("input"));
}

#[test]
fn submodel_rejects_unknown_targets() {
    let (model, ..) = with_side_chain();
    let mut transformer = ModelTransformer::new();
    let err = transformer
        .copy_submodel(&model, &[NodeId(99)], &TransformContext::new())
        .expect_err("unknown target must fail");
    assert!(err.to_string().contains("unknown node"));
}
