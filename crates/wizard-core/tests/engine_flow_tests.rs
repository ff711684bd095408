use serde_json::{json, Value};
use wizard_core::{DataMap, Field, InMemoryEventSink, InMemoryWizardRepository, JsonResponseRenderer, Rule, Wizard,
                  WizardDefinition, WizardEngine, WizardError, WizardRepository, WizardRequest, WizardResponse,
                  WizardStep};

type MemoryEngine = WizardEngine<InMemoryWizardRepository, InMemoryEventSink, JsonResponseRenderer>;

fn map(v: Value) -> DataMap {
    v.as_object().cloned().unwrap_or_default()
}

struct StepA;
impl WizardStep for StepA {
    fn slug(&self) -> &str {
        "a"
    }
    fn name(&self) -> &str {
        "Step A"
    }
    fn fields(&self) -> Vec<Field> {
        vec![Field::new("x").rule(Rule::Required)]
    }
    fn is_complete(&self, wizard: &Wizard<'_>) -> bool {
        wizard.has("x")
    }
}

struct StepB;
impl WizardStep for StepB {
    fn slug(&self) -> &str {
        "b"
    }
    fn fields(&self) -> Vec<Field> {
        vec![Field::new("y").depends_on(["x"])]
    }
    fn is_complete(&self, wizard: &Wizard<'_>) -> bool {
        wizard.has("y")
    }
    fn view_data(&self, _request: &WizardRequest, wizard: &Wizard<'_>) -> DataMap {
        map(json!({"x": wizard.value_or("x", Value::Null)}))
    }
}

fn definition() -> WizardDefinition {
    WizardDefinition::builder("demo", "Demo").step(StepA)
                                             .step(StepB)
                                             .build()
                                             .expect("definition")
}

#[test]
fn create_renders_first_step_without_loading() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    let res = engine.create(&def, &WizardRequest::new()).expect("create");
    match res {
        WizardResponse::Render { step, index, wizard, .. } => {
            assert_eq!((step.as_str(), index), ("a", 0));
            assert_eq!(wizard.id, None);
            assert!(wizard.steps.iter().all(|s| s.url.is_none()));
            assert_eq!(wizard.active_step().map(|s| s.slug.as_str()), Some("a"));
        }
        other => panic!("unexpected response {other:?}"),
    }
    assert!(engine.events().list().is_empty());
    assert!(engine.repository().is_empty());
}

#[test]
fn store_rejects_invalid_input_then_persists_valid_input() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();

    let err = engine.store(&def, &WizardRequest::new()).unwrap_err();
    match &err {
        WizardError::InvalidInput(errors) => assert_eq!(errors.first("x"), Some("The x field is required.")),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.status_code(), 422);
    assert!(engine.repository().is_empty());
    assert!(engine.events().list().is_empty());

    let res = engine.store(&def, &WizardRequest::new().with("x", "v")).expect("store");
    assert_eq!(res, WizardResponse::Redirect { url: "/wizard/demo/1/b".into() });
    assert_eq!(engine.repository().load_data("demo", 1).expect("load"), map(json!({"x": "v"})));
    assert_eq!(engine.events().kinds(), ["saving"]);
    assert_eq!(engine.events().list()[0].wizard_id, None);
}

#[test]
fn undeclared_input_is_not_persisted() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.store(&def, &WizardRequest::new().with("x", "v").with("junk", 1))
          .expect("store");
    assert_eq!(engine.repository().load_data("demo", 1).expect("load"), map(json!({"x": "v"})));
}

#[test]
fn show_without_slug_redirects_after_last_complete_step() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    let repo = engine.repository();
    repo.save_data("demo", Some(1), &DataMap::new()).expect("seed");
    repo.save_data("demo", Some(2), &map(json!({"x": 1}))).expect("seed");
    repo.save_data("demo", Some(3), &map(json!({"x": 1, "y": 2}))).expect("seed");
    // sólo el último completo: igual redirige al siguiente
    repo.save_data("demo", Some(4), &map(json!({"y": 2}))).expect("seed");

    let url = |engine: &mut MemoryEngine, id| {
        engine.show(&def, &WizardRequest::new(), id, None)
              .expect("show")
              .redirect_url()
              .map(str::to_string)
    };
    assert_eq!(url(&mut engine, 1).as_deref(), Some("/wizard/demo/1/a"));
    assert_eq!(url(&mut engine, 2).as_deref(), Some("/wizard/demo/2/b"));
    assert_eq!(url(&mut engine, 3).as_deref(), Some("/wizard/demo/3/b"));
    assert_eq!(url(&mut engine, 4).as_deref(), Some("/wizard/demo/4/b"));
    assert_eq!(engine.events().kinds(), ["loaded"; 4]);
}

#[test]
fn show_with_slug_renders_that_step_active() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.repository()
          .save_data("demo", Some(7), &map(json!({"x": "hello"})))
          .expect("seed");

    let res = engine.show(&def, &WizardRequest::new(), 7, Some("b")).expect("show");
    let WizardResponse::Render { step, index, wizard, data } = res else {
        panic!("expected render");
    };
    assert_eq!((step.as_str(), index), ("b", 1));
    assert_eq!(data, map(json!({"x": "hello"})));
    assert_eq!(wizard.id, Some(7));
    assert_eq!(wizard.steps.iter().filter(|s| s.active).count(), 1);
    assert!(wizard.steps[1].active);
    assert!(wizard.steps[0].is_complete);
    assert!(!wizard.steps[1].is_complete);
    assert_eq!(wizard.steps[0].url.as_deref(), Some("/wizard/demo/7/a"));
    assert_eq!(wizard.steps[0].name, "Step A");
    assert_eq!(wizard.steps[1].name, "b");
}

#[test]
fn show_unknown_slug_or_missing_wizard_is_not_found() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.repository().save_data("demo", Some(1), &DataMap::new()).expect("seed");

    let err = engine.show(&def, &WizardRequest::new(), 1, Some("zzz")).unwrap_err();
    assert_eq!(err, WizardError::UnknownStep { wizard: "demo".into(), slug: "zzz".into() });
    let err = engine.show(&def, &WizardRequest::new(), 99, None).unwrap_err();
    assert_eq!(err, WizardError::WizardNotFound { wizard: "demo".into(), id: 99 });
    assert!(err.is_not_found());
}

#[test]
fn update_unknown_slug_is_rejected_before_processing() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.repository().save_data("demo", Some(1), &DataMap::new()).expect("seed");
    let err = engine.update(&def, &WizardRequest::new().with("x", 1), 1, "nope").unwrap_err();
    assert!(matches!(err, WizardError::UnknownStep { .. }));
    assert_eq!(engine.events().kinds(), ["loaded"]);
}

#[test]
fn destroy_then_show_is_not_found() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.store(&def, &WizardRequest::new().with("x", "v")).expect("store");

    let res = engine.destroy(&def, &WizardRequest::new(), 1).expect("destroy");
    assert_eq!(res, WizardResponse::Redirect { url: "/".into() });
    let err = engine.show(&def, &WizardRequest::new(), 1, Some("a")).unwrap_err();
    assert!(matches!(err, WizardError::WizardNotFound { id: 1, .. }));
}

#[test]
fn destroy_tolerates_missing_record() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    let res = engine.destroy(&def, &WizardRequest::new(), 42).expect("destroy");
    assert_eq!(res.redirect_url(), Some("/"));
    assert!(engine.events().list().is_empty());
}

#[test]
fn full_run_emits_events_in_order() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.store(&def, &WizardRequest::new().with("x", "v")).expect("store");
    let res = engine.update(&def, &WizardRequest::new().with("y", "w"), 1, "b")
                    .expect("update");
    assert_eq!(res, WizardResponse::Redirect { url: "/".into() });
    assert_eq!(engine.events().kinds(), ["saving", "loaded", "saving", "finishing", "finished"]);
    assert_eq!(engine.events().list_for(1).len(), 4);
    assert_eq!(engine.repository().load_data("demo", 1).expect("load"),
               map(json!({"x": "v", "y": "w"})));
}

#[test]
fn single_step_wizard_completes_on_store() {
    let def = WizardDefinition::builder("one", "One").step(StepA).build().expect("definition");
    let mut engine = WizardEngine::in_memory();
    let res = engine.store(&def, &WizardRequest::new().with("x", 1)).expect("store");
    assert_eq!(res.redirect_url(), Some("/"));
    assert_eq!(engine.events().kinds(), ["saving", "finishing", "finished"]);
    assert!(engine.repository().contains(1));
}
