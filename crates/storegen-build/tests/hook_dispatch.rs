use storegen_build::{
    JsonEmitter, ModelPlan, PlanBuilder, generate,
    traversal::{Guard, TraversalTree, build_traversal},
};
use std::sync::Arc;
use storegen_schema::{
    build::build_models,
    config::GeneratorConfig,
    graph::SchemaGraph,
    node::Schema,
    types::{Action, Containment, Phase, Scope},
};

const RECUR: &str = include_str!("fixtures/recur.json");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn schema() -> Schema {
    init_tracing();
    let graph = SchemaGraph::from_json(RECUR).expect("fixture parses");

    build_models(&graph, &GeneratorConfig::default())
        .into_result()
        .expect("fixture builds")
}

fn traversal(phase: Phase, action: Action) -> TraversalTree {
    let schema = schema();
    let model = schema.model("Recur").expect("Recur model");

    build_traversal(&schema, model, phase, action)
}

fn calls(tree: &TraversalTree) -> Vec<(String, String)> {
    tree.calls()
        .into_iter()
        .map(|call| (call.method.clone(), call.label.clone()))
        .collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
        .collect()
}

#[test]
fn before_insert_visits_things_inside_double_index() {
    let tree = traversal(Phase::Before, Action::Insert);

    assert_eq!(
        calls(&tree),
        pairs(&[
            ("BeforeInsert", ""),
            ("BeforeSave", ""),
            ("BeforeSave", ".Things[k0][k1]"),
            ("BeforeSave", ".MoreThings[k0]"),
        ])
    );

    let things = tree.root.find(".Things[k0][k1]").expect("things node");
    assert_eq!(
        things.guards,
        vec![
            Guard::Iterate {
                index: "k0".to_string(),
                kind: Containment::Map,
            },
            Guard::Iterate {
                index: "k1".to_string(),
                kind: Containment::Sequence,
            },
            Guard::NilCheck,
        ]
    );
    assert_eq!(things.name, "Things");
}

#[test]
fn after_insert_visits_other_inside_nil_guard() {
    let tree = traversal(Phase::After, Action::Insert);

    assert_eq!(
        calls(&tree),
        pairs(&[("AfterInsert", ".R"), ("AfterSave", ".R")])
    );

    let other = tree.root.find(".R").expect("R node");
    assert_eq!(other.guards, vec![Guard::NilCheck]);
    assert!(tree.root.find(".Things[k0][k1]").is_none());
}

#[test]
fn save_hooks_fire_for_update_but_not_insert_hooks() {
    let tree = traversal(Phase::After, Action::Update);

    assert_eq!(calls(&tree), pairs(&[("AfterSave", ".R"), ("AfterUpdate", ".")]));
    assert_eq!(tree.store_hooks.len(), 1);
    assert_eq!(tree.store_hooks[0].hook.scope, Scope::Store);
}

#[test]
fn save_request_only_matches_save_hooks() {
    let tree = traversal(Phase::Before, Action::Save);

    let methods: Vec<_> = tree.calls().into_iter().map(|c| c.method.as_str()).collect();
    assert!(methods.iter().all(|m| *m == "BeforeSave"), "{methods:?}");
    assert_eq!(methods.len(), 3);
}

#[test]
fn recursion_back_to_root_is_one_loop_marker() {
    for phase in Phase::ALL {
        let tree = traversal(phase, Action::Insert);
        let loops = tree.loop_backs();

        assert_eq!(loops.len(), 1, "{phase:?}");
        let node = loops[0];
        assert_eq!(node.label, ".R.R2");
        assert!(node.children.is_empty());

        let back = node.loop_back.as_ref().expect("loop marker");
        assert_eq!(back.depth, 0);
        assert_eq!(back.label, "");
    }
}

#[test]
fn traversals_are_deterministic() {
    let schema = schema();
    let model = schema.model("Recur").expect("Recur model");

    for phase in Phase::ALL {
        for action in Action::ALL {
            assert_eq!(
                build_traversal(&schema, model, phase, action),
                build_traversal(&schema, model, phase, action)
            );
        }
    }
}

#[test]
fn plan_carries_six_traversals_and_constructor() {
    let schema = Arc::new(schema());
    let model = schema.model("Recur").expect("Recur model").clone();
    let plan = PlanBuilder::new(Arc::clone(&schema), model).build();

    assert_eq!(plan.traversals.len(), 6);
    assert!(plan.traversal(Phase::After, Action::Save).is_some());

    let ctor = plan.model.constructor.as_ref().expect("constructor");
    assert_eq!(ctor.arg_list(), "foo");
    assert_eq!(ctor.return_vars(), vec!["doc", "err"]);

    let json = plan.to_json().expect("plan serializes");
    let back: ModelPlan = serde_json::from_str(&json).expect("plan deserializes");
    assert_eq!(back, plan);
}

#[test]
fn generate_hands_every_model_to_the_emitter() {
    init_tracing();
    let graph = SchemaGraph::from_json(RECUR).expect("fixture parses");
    let mut emitter = JsonEmitter::new();

    let report = generate(&graph, &GeneratorConfig::default(), &mut emitter).expect("generates");

    assert!(report.is_complete());
    assert_eq!(report.generated, vec!["Recur".to_string()]);
    assert!(emitter.documents["Recur"].contains(".Things[k0][k1]"));
}
