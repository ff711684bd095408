use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use wizard_core::{parse_route, AfterComplete, DataMap, EventSink, Field, JsonResponseRenderer, ObserverSink,
                  StepResult, Wizard, WizardAction, WizardConfig, WizardDefinition, WizardEngine, WizardError,
                  WizardHooks, WizardRegistry, WizardRepository, WizardRequest, WizardResponse, WizardStep,
                  InMemoryWizardRepository};

fn map(v: Value) -> DataMap {
    v.as_object().cloned().unwrap_or_default()
}

struct Account;
impl WizardStep for Account {
    fn slug(&self) -> &str {
        "account"
    }
    fn fields(&self) -> Vec<Field> {
        vec![Field::new("email").transform(|v| match v {
                                   Value::String(s) => Value::String(s.to_lowercase()),
                                   other => other,
                               })]
    }
    fn before_saving(&self, _request: &WizardRequest, payload: &DataMap, wizard: &mut Wizard<'_>) {
        if payload.contains_key("email") {
            wizard.set_data("verified", false);
        }
    }
}

/// Rechaza el plan "banned" con un mensaje de negocio.
struct Plan;
impl WizardStep for Plan {
    fn slug(&self) -> &str {
        "plan"
    }
    fn fields(&self) -> Vec<Field> {
        vec![Field::new("plan")]
    }
    fn process(&self, _request: &WizardRequest, validated: DataMap, _wizard: &Wizard<'_>) -> StepResult {
        if validated.get("plan") == Some(&json!("banned")) {
            return StepResult::failure("plan not available");
        }
        StepResult::success(validated)
    }
    fn is_complete(&self, wizard: &Wizard<'_>) -> bool {
        wizard.has("plan")
    }
    fn before_saving(&self, _request: &WizardRequest, _payload: &DataMap, wizard: &mut Wizard<'_>) {
        // los datos adicionales ganan sobre el payload
        wizard.set_data("plan", "pro");
    }
}

struct Done;
impl WizardStep for Done {
    fn slug(&self) -> &str {
        "done"
    }
    fn is_complete(&self, _wizard: &Wizard<'_>) -> bool {
        false
    }
}

struct OnboardingHooks;
impl WizardHooks for OnboardingHooks {
    fn on_after_complete(&self, wizard: &Wizard<'_>) -> AfterComplete {
        AfterComplete::Render { view: "onboarding.finished".into(),
                                data: map(json!({"id": wizard.id(), "plan": wizard.value("plan")})) }
    }
    fn redirect_to(&self, _config: &WizardConfig) -> String {
        "/dashboard".into()
    }
    fn before_delete(&self, wizard: &Wizard<'_>) -> Result<(), WizardError> {
        if wizard.value("locked") == Some(&json!(true)) {
            return Err(WizardError::Internal("wizard is locked".into()));
        }
        Ok(())
    }
    fn cancel_text(&self) -> String {
        "Abandon".into()
    }
    fn shared_data(&self, wizard: &Wizard<'_>) -> DataMap {
        map(json!({"title": wizard.title(), "theme": "dark"}))
    }
}

fn definition() -> WizardDefinition {
    WizardDefinition::builder("onboarding", "Onboarding").step(Account)
                                                          .step(Plan)
                                                          .step(Done)
                                                          .hooks(OnboardingHooks)
                                                          .build()
                                                          .expect("definition")
}

#[test]
fn staged_data_and_transformers_are_persisted() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.store(&def, &WizardRequest::new().with("email", "Me@Example.COM"))
          .expect("store");
    assert_eq!(engine.repository().load_data("onboarding", 1).expect("load"),
               map(json!({"email": "me@example.com", "verified": false})));

    engine.update(&def, &WizardRequest::new().with("plan", "basic"), 1, "plan")
          .expect("update");
    let stored = engine.repository().load_data("onboarding", 1).expect("load");
    assert_eq!(stored["plan"], json!("pro"));
}

#[test]
fn step_failure_redirects_to_first_step_without_saving() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.store(&def, &WizardRequest::new().with("email", "a@b.co")).expect("store");
    let before = engine.repository().load_data("onboarding", 1).expect("load");

    let res = engine.update(&def, &WizardRequest::new().with("plan", "banned"), 1, "plan")
                    .expect("update");
    assert_eq!(res,
               WizardResponse::RedirectWithError { url: "/wizard/onboarding/1/account".into(),
                                                   error: "plan not available".into() });
    assert_eq!(engine.repository().load_data("onboarding", 1).expect("load"), before);
    assert_eq!(engine.events().kinds(), ["saving", "loaded"]);
}

#[test]
fn completion_returns_hook_view() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.store(&def, &WizardRequest::new().with("email", "a@b.co")).expect("store");
    engine.update(&def, &WizardRequest::new().with("plan", "basic"), 1, "plan")
          .expect("plan");
    engine.events_mut().clear();

    let res = engine.update(&def, &WizardRequest::new(), 1, "done").expect("done");
    assert_eq!(res,
               WizardResponse::View { view: "onboarding.finished".into(),
                                      data: map(json!({"id": 1, "plan": "pro"})) });
    assert_eq!(engine.events().kinds(), ["loaded", "saving", "finishing", "finished"]);
}

#[test]
fn shared_data_is_merged_under_step_view_data() {
    struct Themed;
    impl WizardStep for Themed {
        fn slug(&self) -> &str {
            "themed"
        }
        fn view_data(&self, _request: &WizardRequest, _wizard: &Wizard<'_>) -> DataMap {
            map(json!({"theme": "light", "extra": 1}))
        }
    }
    let def = WizardDefinition::builder("t", "Themes").step(Themed)
                                                      .hooks(OnboardingHooks)
                                                      .build()
                                                      .expect("definition");
    let mut engine = WizardEngine::in_memory();
    let WizardResponse::Render { data, wizard, .. } = engine.create(&def, &WizardRequest::new()).expect("create")
    else {
        panic!("expected render");
    };
    assert_eq!(data, map(json!({"title": "Themes", "theme": "light", "extra": 1})));
    assert_eq!(wizard.cancel_text, "Abandon");
}

#[test]
fn destroy_uses_hook_redirect_and_can_be_vetoed() {
    let def = definition();
    let mut engine = WizardEngine::in_memory();
    engine.repository()
          .save_data("onboarding", Some(1), &map(json!({"locked": true})))
          .expect("seed");
    engine.repository().save_data("onboarding", Some(2), &DataMap::new()).expect("seed");

    let err = engine.destroy(&def, &WizardRequest::new(), 1).unwrap_err();
    assert_eq!(err, WizardError::Internal("wizard is locked".into()));
    assert!(engine.repository().contains(1));

    let res = engine.destroy(&def, &WizardRequest::new(), 2).expect("destroy");
    assert_eq!(res, WizardResponse::Redirect { url: "/dashboard".into() });
    assert!(!engine.repository().contains(2));
}

#[test]
fn configured_fallback_redirect_and_route_prefix() {
    struct Only;
    impl WizardStep for Only {
        fn slug(&self) -> &str {
            "only"
        }
    }
    struct Next;
    impl WizardStep for Next {
        fn slug(&self) -> &str {
            "next"
        }
    }
    let def = WizardDefinition::builder("cfg", "Cfg").step(Only)
                                                     .step(Next)
                                                     .build()
                                                     .expect("definition");
    let config = WizardConfig::new("/home").with_route_prefix("/flows/");
    let mut engine = WizardEngine::builder(InMemoryWizardRepository::new()).config(config)
                                                                            .build();
    let res = engine.store(&def, &WizardRequest::new()).expect("store");
    assert_eq!(res.redirect_url(), Some("/flows/cfg/1/next"));
    let res = engine.destroy(&def, &WizardRequest::new(), 1).expect("destroy");
    assert_eq!(res.redirect_url(), Some("/home"));
}

#[test]
fn observers_receive_lifecycle_events() {
    let def = definition();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let mut sink = ObserverSink::new();
    let seen_clone = Arc::clone(&seen);
    sink.subscribe(move |ev| {
            if let Ok(mut seen) = seen_clone.lock() {
                seen.push(format!("{}:{:?}", ev.kind.name(), ev.wizard_id));
            }
        });
    let mut engine = WizardEngine::new(InMemoryWizardRepository::new(), sink, JsonResponseRenderer);
    engine.store(&def, &WizardRequest::new().with("email", "a@b.co")).expect("store");
    engine.show(&def, &WizardRequest::new(), 1, None).expect("show");
    assert_eq!(*seen.lock().expect("lock"), ["saving:None", "loaded:Some(1)"]);
    // el sink sigue usable directamente
    let ev = engine.events_mut().emit("onboarding", Some(1), wizard_core::WizardEventKind::WizardLoaded);
    assert_eq!(ev.seq, 2);
}

#[test]
fn after_complete_hook_runs_between_finishing_and_finished() {
    type Log = Arc<Mutex<Vec<String>>>;

    struct Single;
    impl WizardStep for Single {
        fn slug(&self) -> &str {
            "single"
        }
    }
    struct LoggingHooks(Log);
    impl WizardHooks for LoggingHooks {
        fn on_after_complete(&self, wizard: &Wizard<'_>) -> AfterComplete {
            if let Ok(mut log) = self.0.lock() {
                log.push("hook".into());
            }
            AfterComplete::RedirectTo(format!("/done/{}", wizard.id().unwrap_or_default()))
        }
    }

    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let def = WizardDefinition::builder("single", "Single").step(Single)
                                                           .hooks(LoggingHooks(Arc::clone(&log)))
                                                           .build()
                                                           .expect("definition");
    let mut sink = ObserverSink::new();
    let events_log = Arc::clone(&log);
    sink.subscribe(move |ev| {
            if let Ok(mut log) = events_log.lock() {
                log.push(ev.kind.name().to_string());
            }
        });
    let mut engine = WizardEngine::new(InMemoryWizardRepository::new(), sink, JsonResponseRenderer);

    let res = engine.store(&def, &WizardRequest::new()).expect("store");
    assert_eq!(res.redirect_url(), Some("/done/1"));
    assert_eq!(*log.lock().expect("lock"), ["saving", "finishing", "hook", "finished"]);
}

#[test]
fn registry_and_routes_dispatch_actions() {
    let mut registry = WizardRegistry::new();
    registry.register(definition()).expect("register");
    let mut engine = WizardEngine::in_memory();

    let mut call = |method: &str, path: &str, request: WizardRequest| -> Result<WizardResponse, WizardError> {
        let (slug, action) = parse_route(method, path, "/wizard").ok_or_else(|| WizardError::Internal(path.into()))?;
        let def = registry.resolve(&slug)?;
        engine.handle(&def, &action, &request)
    };

    let res = call("GET", "/wizard/onboarding", WizardRequest::new()).expect("create");
    assert_eq!(res.rendered_step(), Some("account"));
    let res = call("POST", "/wizard/onboarding", WizardRequest::new().with("email", "x@y.io")).expect("store");
    assert_eq!(res.redirect_url(), Some("/wizard/onboarding/1/plan"));
    let res = call("GET", "/wizard/onboarding/1", WizardRequest::new()).expect("show");
    assert_eq!(res.redirect_url(), Some("/wizard/onboarding/1/plan"));
    let res = call("POST", "/wizard/onboarding/1/plan", WizardRequest::new().with("plan", "x")).expect("update");
    assert_eq!(res.redirect_url(), Some("/wizard/onboarding/1/done"));
    let res = call("DELETE", "/wizard/onboarding/1", WizardRequest::new()).expect("destroy");
    assert_eq!(res.redirect_url(), Some("/dashboard"));

    let err = call("GET", "/wizard/missing", WizardRequest::new()).unwrap_err();
    assert_eq!(err, WizardError::UnknownWizard("missing".into()));
    assert_eq!(WizardAction::Create.name(), "create");
}
