use std::sync::Arc;

use dprep_core::{ActivityReference, Dataflow, DataflowReference, EngineCall, EngineClient, ExternalReference,
                 InMemoryEngine, StepType, Value};

fn setup() -> (Arc<InMemoryEngine>, Arc<EngineClient>) {
    let engine = Arc::new(InMemoryEngine::new().with_package_dataflow("/pkgs/shared.dprep", "customers"));
    let client = EngineClient::shared(engine.clone());
    (engine, client)
}

#[test]
fn split_halves_are_independent_pipelines() {
    let (engine, client) = setup();
    let d = Dataflow::get_files(&client, "/data/orders.csv").unwrap().take(100).unwrap();
    let (first, second) = d.random_split(0.7, Some(42), None).unwrap();

    assert_eq!(first.id(), d.id());
    assert_ne!(second.id(), d.id());
    assert_eq!(second.name(), "orders_split");
    assert_eq!(second.step_count(), 1);
    assert_eq!(first.last_step().map(|s| s.step_type()), Some(StepType::RandomSplit));
    assert_eq!(engine.count_calls("create_anonymous_reference"), 1);

    // el filtro inverso apunta al step de split del primer lado
    let filter = second.first_step().unwrap().argument("sourceFilter").unwrap();
    let token = ActivityReference::try_from(filter).unwrap();
    assert_eq!(token.referenced_step().map(|s| s.step_id), first.last_step().map(|s| s.id()));

    // modificar un lado no altera el otro
    let first_more = first.take(5).unwrap();
    assert_eq!(second.step_count(), 1);
    assert_eq!(first_more.id(), first.id());
}

#[test]
fn external_references_need_no_rpc_once_opened() {
    let (engine, client) = setup();
    let external = ExternalReference::open(&client, "/pkgs/shared.dprep", "customers").unwrap();
    engine.clear_calls();

    let d = Dataflow::reference(&client, external.clone()).unwrap();
    let joined = Dataflow::get_files(&client, "a.csv").unwrap()
                                                       .join(external, dprep_core::JoinOptions::on("id", "customer_id"))
                                                       .unwrap();
    assert!(engine.calls().iter().all(|c| !matches!(c, EngineCall::ResolveReference(_))));
    assert_eq!(d.first_step().map(|s| s.step_type()), Some(StepType::Reference));
    assert_eq!(joined.step_count(), 1);
}

#[test]
fn each_resolution_registers_the_current_steps() {
    let (engine, client) = setup();
    let base = Dataflow::get_files(&client, "a.csv").unwrap();
    let longer = base.take(3).unwrap();

    Dataflow::reference(&client, &base).unwrap();
    Dataflow::reference(&client, &longer).unwrap();
    let registered: Vec<usize> = engine.calls()
                                       .into_iter()
                                       .filter_map(|c| match c {
                                           EngineCall::CreateAnonymousReference(args) => Some(args.blocks.len()),
                                           _ => None,
                                       })
                                       .collect();
    assert_eq!(registered, vec![1, 2]);
}

#[test]
fn only_reference_shaped_values_convert() {
    let token = ActivityReference::package("/p.dprep", "x");
    assert!(DataflowReference::try_from(&token.to_value()).is_ok());
    assert!(DataflowReference::try_from(&Value::from("x")).is_err());
}
