use std::sync::Arc;

use dprep_core::args;
use dprep_core::dataflow::ParseDelimitedOptions;
use dprep_core::{Dataflow, DataflowError, EngineCall, EngineClient, Expression, FieldType, InMemoryEngine, Step, StepType,
                 Value};
use serde_json::json;

fn setup() -> (Arc<InMemoryEngine>, Arc<EngineClient>) {
    let engine = Arc::new(InMemoryEngine::new());
    let client = EngineClient::shared(engine.clone());
    (engine, client)
}

#[test]
fn csv_pipeline_is_built_without_engine_calls() {
    let (engine, client) = setup();
    let files = Dataflow::get_files(&client, "/data/sales.csv").unwrap();
    let parsed = files.parse_delimited(ParseDelimitedOptions::default()).unwrap();
    let typed = parsed.set_column_types([("amount", FieldType::Decimal)]).unwrap();
    let expression = Expression::new(Value::from_json(&json!({"r": ["Value", "amount"]})).unwrap());
    let filtered = typed.filter(expression).unwrap();

    assert!(engine.calls().is_empty());
    assert_eq!(filtered.name(), "sales");
    assert_eq!(filtered.id(), files.id());
    let types: Vec<_> = filtered.steps().iter().map(Step::step_type).collect();
    assert_eq!(types,
               vec![StepType::GetFiles, StepType::ParseDelimited, StepType::SetColumnTypes, StepType::ExpressionFilter]);

    // cada paso anterior sigue intacto
    assert_eq!(files.step_count(), 1);
    assert_eq!(parsed.step_count(), 2);
    assert!(filtered.extends(&typed));
}

#[test]
fn running_sends_every_step_once() {
    let (engine, client) = setup();
    let d = Dataflow::get_files(&client, "a.csv").unwrap()
                                                  .parse_delimited(ParseDelimitedOptions::default())
                                                  .unwrap()
                                                  .take(10)
                                                  .unwrap();
    d.run_local().unwrap();

    let ops: Vec<_> = engine.calls().iter().map(EngineCall::operation).collect();
    assert_eq!(ops, vec!["get_secrets", "execute_anonymous_blocks"]);
    match engine.calls().last() {
        Some(EngineCall::ExecuteAnonymousBlocks(args)) => assert_eq!(args.blocks, d.to_blocks()),
        other => panic!("unexpected call {other:?}"),
    }
}

#[test]
fn wire_blocks_round_trip_through_steps() {
    let (_, client) = setup();
    let d = Dataflow::get_files(&client, "a.csv").unwrap()
                                                  .add_step(StepType::Take, args! { "count" => 5i64 })
                                                  .unwrap();
    let rebuilt: Vec<Step> = d.to_blocks().iter().map(|b| Step::from_wire(b).unwrap()).collect();
    assert_eq!(rebuilt, d.steps());
    assert_eq!(Dataflow::from_steps(&client, rebuilt).unwrap().content_hash(), d.content_hash());
}

#[test]
fn local_validation_errors_precede_rpc() {
    let (engine, client) = setup();
    let d = Dataflow::get_files(&client, "a.csv").unwrap();
    let err = d.add_step(StepType::Take, args! {}).unwrap_err();
    assert!(matches!(err, DataflowError::MissingArgument { .. }));
    assert!(err.is_local());
    assert!(d.take_sample(1.5, None).is_err());
    assert!(engine.calls().is_empty());
}
