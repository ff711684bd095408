//! Wizard de ejemplo ("onboarding") usado por `wizard-cli demo`.

use chrono::Utc;
use serde_json::{json, Value};
use wizard_core::{AfterComplete, DataMap, DefinitionError, Field, Rule, StepResult, Wizard, WizardDefinition,
                  WizardHooks, WizardRequest, WizardStep};

pub const DEMO_SLUG: &str = "onboarding";

pub struct AccountStep;

impl WizardStep for AccountStep {
    fn slug(&self) -> &str {
        "account"
    }

    fn name(&self) -> &str {
        "Account"
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::new("email").rules([Rule::Required, Rule::Email])
                                .transform(|v| match v {
                                    Value::String(s) => Value::String(s.trim().to_lowercase()),
                                    other => other,
                                })]
    }

    fn is_complete(&self, wizard: &Wizard<'_>) -> bool {
        wizard.has("email")
    }
}

pub struct PlanStep;

impl WizardStep for PlanStep {
    fn slug(&self) -> &str {
        "plan"
    }

    fn name(&self) -> &str {
        "Plan"
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::new("plan").rules([Rule::Required, Rule::one_of(["free", "pro"])]),
             Field::new("seats").rules([Rule::Nullable, Rule::Integer, Rule::Min(1.0)])
                                .depends_on(["plan"])]
    }

    fn process(&self, _request: &WizardRequest, validated: DataMap, _wizard: &Wizard<'_>) -> StepResult {
        let seats = validated.get("seats").and_then(Value::as_i64).unwrap_or(1);
        if validated.get("plan") == Some(&json!("free")) && seats > 1 {
            return StepResult::failure("the free plan allows a single seat");
        }
        StepResult::success(wizard_core::field_values(&self.fields(), validated))
    }

    fn is_complete(&self, wizard: &Wizard<'_>) -> bool {
        wizard.has("plan")
    }

    fn view_data(&self, _request: &WizardRequest, _wizard: &Wizard<'_>) -> DataMap {
        let mut data = DataMap::new();
        data.insert("plans".into(), json!(["free", "pro"]));
        data
    }
}

pub struct ConfirmStep;

impl WizardStep for ConfirmStep {
    fn slug(&self) -> &str {
        "confirm"
    }

    fn name(&self) -> &str {
        "Confirm"
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::new("accept").rules([Rule::Required, Rule::Boolean])]
    }

    fn before_saving(&self, _request: &WizardRequest, _payload: &DataMap, wizard: &mut Wizard<'_>) {
        wizard.set_data("confirmed_at", Utc::now().to_rfc3339());
    }

    fn is_complete(&self, wizard: &Wizard<'_>) -> bool {
        wizard.has("confirmed_at")
    }
}

pub struct OnboardingHooks;

impl WizardHooks for OnboardingHooks {
    fn on_after_complete(&self, wizard: &Wizard<'_>) -> AfterComplete {
        let mut data = DataMap::new();
        data.insert("id".into(), json!(wizard.id()));
        data.insert("email".into(), wizard.value_or("email", Value::Null));
        data.insert("plan".into(), wizard.value_or("plan", Value::Null));
        AfterComplete::Render { view: "onboarding.done".into(),
                                data }
    }

    fn cancel_text(&self) -> String {
        "Cancel onboarding".into()
    }

    fn shared_data(&self, wizard: &Wizard<'_>) -> DataMap {
        let mut data = DataMap::new();
        data.insert("title".into(), json!(wizard.title()));
        data
    }
}

pub fn demo_definition() -> Result<WizardDefinition, DefinitionError> {
    WizardDefinition::builder(DEMO_SLUG, "Onboarding").step(AccountStep)
                                                      .step(PlanStep)
                                                      .step(ConfirmStep)
                                                      .hooks(OnboardingHooks)
                                                      .build()
}

/// Requests del recorrido de ejemplo: (descripción, step, input).
pub fn demo_script() -> Vec<(&'static str, Option<&'static str>, Value)> {
    vec![("store without email", None, json!({})),
         ("store account", None, json!({"email": "  Ada@Example.COM "})),
         ("free plan with 3 seats", Some("plan"), json!({"plan": "free", "seats": 3})),
         ("pro plan with 3 seats", Some("plan"), json!({"plan": "pro", "seats": 3})),
         ("switch to free plan", Some("plan"), json!({"plan": "free"})),
         ("confirm", Some("confirm"), json!({"accept": true}))]
}
