use modelgraph::{
    ElementType, Model, ModelTransformer, NodeId, OutputPortRef, PortElements, PortRange,
    TransformContext,
};
use modelgraph_nodes::{BinaryKind, BinaryOp, InputOp, LinearOp, OutputOp};

/// input(4) -> linear(3x4) -> output
fn feed_forward() -> (Model, NodeId, NodeId, NodeId) {
    let mut model = Model::new();
    let input = model
        .add_node(Box::new(InputOp::new(4, ElementType::F64)), vec![])
        .expect("input must insert");
    let x = model
        .port_elements_of(OutputPortRef::new(input, 0))
        .expect("input port must resolve");
    let linear = model
        .add_node(
            Box::new(LinearOp::new(3, 4, vec![0.5; 12], vec![0.1; 3]).expect("shapes agree")),
            vec![x],
        )
        .expect("linear must insert");
    let y = model
        .port_elements_of(OutputPortRef::new(linear, 0))
        .expect("linear port must resolve");
    let output = model
        .add_node(Box::new(OutputOp), vec![y])
        .expect("output must insert");
    (model, input, linear, output)
}

#[test]
fn copy_preserves_node_count_and_kinds() {
    let (model, ..) = feed_forward();
    let mut transformer = ModelTransformer::new();
    let copied = transformer
        .copy_model(&model, &TransformContext::new())
        .expect("copy must succeed");

    assert_eq!(copied.len(), model.len());
    let kinds: Vec<_> = copied.iter().map(|node| node.kind()).collect();
    assert_eq!(kinds, vec!["input", "linear", "output"]);
    copied.validate().expect("copied model must be well formed");
}

#[test]
fn copy_round_trips_port_type_and_size() {
    let (model, input, linear, _) = feed_forward();
    let mut transformer = ModelTransformer::new();
    let copied = transformer
        .copy_model(&model, &TransformContext::new())
        .expect("copy must succeed");

    let mapped_input = transformer
        .corresponding_outputs(OutputPortRef::new(input, 0))
        .expect("input port was iterated");
    assert_eq!(mapped_input.size(), 4);
    let port = mapped_input.single_source().expect("clone maps a whole port");
    let output = copied.output_port(port).expect("mapped port must exist");
    assert_eq!(output.element_type, ElementType::F64);
    assert_eq!(output.size, 4);

    let mapped_linear = transformer
        .corresponding_outputs(OutputPortRef::new(linear, 0))
        .expect("linear port was iterated");
    assert_eq!(mapped_linear.size(), 3);
}

#[test]
fn copy_rewires_multi_source_inputs() {
    let mut model = Model::new();
    let a = model
        .add_node(Box::new(InputOp::new(4, ElementType::F64)), vec![])
        .expect("insert");
    let b = model
        .add_node(Box::new(InputOp::new(4, ElementType::F64)), vec![])
        .expect("insert");
    // lhs concatenates a slice of each input without copying data.
    let lhs = PortElements::concat([
        PortElements::from_range(PortRange::new(OutputPortRef::new(a, 0), 0, 2)),
        PortElements::from_range(PortRange::new(OutputPortRef::new(b, 0), 2, 2)),
    ]);
    let rhs = model
        .port_elements_of(OutputPortRef::new(b, 0))
        .expect("resolve");
    let sum = model
        .add_node(Box::new(BinaryOp::new(BinaryKind::Add)), vec![lhs, rhs])
        .expect("add must insert");

    let mut transformer = ModelTransformer::new();
    let copied = transformer
        .copy_model(&model, &TransformContext::new())
        .expect("copy must succeed");

    let new_a = transformer
        .corresponding_input_node(a)
        .expect("input a was cloned");
    let new_b = transformer
        .corresponding_input_node(b)
        .expect("input b was cloned");
    let new_sum = transformer
        .corresponding_input_node(sum)
        .expect("add was cloned");

    let copied_sum = copied.node(new_sum).expect("clone must exist");
    assert_eq!(
        copied_sum.inputs()[0].elements().ranges(),
        &[
            PortRange::new(OutputPortRef::new(new_a, 0), 0, 2),
            PortRange::new(OutputPortRef::new(new_b, 0), 2, 2),
        ]
    );
    assert_eq!(copied_sum.inputs()[1].elements().size(), 4);
}

#[test]
fn transformer_state_is_scoped_to_one_call() {
    let (model, input, ..) = feed_forward();
    let mut transformer = ModelTransformer::new();
    assert!(transformer.is_empty());

    transformer
        .copy_model(&model, &TransformContext::new())
        .expect("copy must succeed");
    assert!(!transformer.is_empty());
    assert!(transformer
        .corresponding_outputs(OutputPortRef::new(input, 0))
        .is_some());

    transformer.reset();
    assert!(transformer.is_empty());
    assert!(transformer
        .corresponding_outputs(OutputPortRef::new(input, 0))
        .is_none());
}
