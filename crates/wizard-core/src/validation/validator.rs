use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::rule::Rule;
use crate::errors::FieldErrors;
use crate::DataMap;

/// Reglas por nombre de campo, en orden de declaración.
pub type RuleSet = IndexMap<String, Vec<Rule>>;

/// Colaborador de validación: dado el input de un request y un set de reglas
/// devuelve los valores validados (sólo campos con reglas declaradas) o los
/// errores por campo.
pub trait Validator: Send + Sync {
    fn validate(&self, input: &DataMap, rules: &RuleSet) -> Result<DataMap, FieldErrors>;
}

/// Implementación por defecto basada en `Rule`.
///
/// Semántica:
/// - Un valor ausente, `null`, `""` o `[]` se considera vacío. Si el campo es
///   `Required` genera error; si no, las demás reglas no se evalúan.
/// - `Min`/`Max` miden el valor numérico cuando el campo declara `Integer` o
///   `Numeric`; si no, el largo del string o la cantidad de elementos.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleValidator;

impl Validator for RuleValidator {
    fn validate(&self, input: &DataMap, rules: &RuleSet) -> Result<DataMap, FieldErrors> {
        let mut validated = DataMap::new();
        let mut errors = FieldErrors::new();

        for (field, field_rules) in rules {
            let raw = input.get(field);
            let required = field_rules.iter().any(|r| matches!(r, Rule::Required));

            let Some(value) = raw.filter(|v| !is_empty_value(v)) else {
                if required {
                    errors.add(field, format!("The {field} field is required."));
                } else if let Some(v) = raw {
                    validated.insert(field.clone(), v.clone());
                }
                continue;
            };

            let numeric = field_rules.iter().any(|r| matches!(r, Rule::Integer | Rule::Numeric));
            for rule in field_rules {
                if let Err(message) = check(rule, field, value, numeric) {
                    errors.add(field, message);
                }
            }
            if !errors.contains(field) {
                validated.insert(field.clone(), value.clone());
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_i64(), Some(0 | 1)),
        Value::String(s) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
        _ => false,
    }
}

/// Un `@`, sin espacios, y un dominio con al menos un punto entre etiquetas
/// no vacías.
static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").ok());

fn looks_like_email(s: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(s))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Size {
    Number(f64),
    Chars(f64),
    Items(f64),
}

fn size_of(value: &Value, numeric: bool) -> Option<Size> {
    if numeric {
        if let Some(n) = as_number(value) {
            return Some(Size::Number(n));
        }
    }
    match value {
        Value::String(s) => Some(Size::Chars(s.chars().count() as f64)),
        Value::Array(a) => Some(Size::Items(a.len() as f64)),
        Value::Object(o) => Some(Size::Items(o.len() as f64)),
        Value::Number(n) => n.as_f64().map(Size::Number),
        _ => None,
    }
}

fn check(rule: &Rule, field: &str, value: &Value, numeric: bool) -> Result<(), String> {
    let ok_or = |cond: bool, message: String| if cond { Ok(()) } else { Err(message) };
    match rule {
        Rule::Required | Rule::Nullable => Ok(()),
        Rule::String => ok_or(value.is_string(), format!("The {field} field must be a string.")),
        Rule::Integer => ok_or(as_integer(value).is_some(), format!("The {field} field must be an integer.")),
        Rule::Numeric => ok_or(as_number(value).is_some(), format!("The {field} field must be a number.")),
        Rule::Boolean => ok_or(is_boolean_like(value), format!("The {field} field must be true or false.")),
        Rule::Array => ok_or(value.is_array() || value.is_object(),
                             format!("The {field} field must be an array.")),
        Rule::Email => ok_or(value.as_str().is_some_and(looks_like_email),
                             format!("The {field} field must be a valid email address.")),
        Rule::Regex(re) => ok_or(value.as_str().is_some_and(|s| re.is_match(s)),
                                 format!("The {field} field format is invalid.")),
        Rule::Min(min) => match size_of(value, numeric) {
            Some(Size::Number(n)) => ok_or(n >= *min, format!("The {field} field must be at least {min}.")),
            Some(Size::Chars(n)) => ok_or(n >= *min, format!("The {field} field must be at least {min} characters.")),
            Some(Size::Items(n)) => ok_or(n >= *min, format!("The {field} field must have at least {min} items.")),
            None => Err(format!("The {field} field must be at least {min}.")),
        },
        Rule::Max(max) => match size_of(value, numeric) {
            Some(Size::Number(n)) => ok_or(n <= *max, format!("The {field} field must not be greater than {max}.")),
            Some(Size::Chars(n)) => {
                ok_or(n <= *max,
                      format!("The {field} field must not be greater than {max} characters."))
            }
            Some(Size::Items(n)) => ok_or(n <= *max, format!("The {field} field must not have more than {max} items.")),
            None => Err(format!("The {field} field must not be greater than {max}.")),
        },
        Rule::In(options) => ok_or(scalar_string(value).is_some_and(|s| options.contains(&s)),
                                   format!("The selected {field} is invalid.")),
        Rule::Custom(custom) => custom(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(entries: &[(&str, &str)]) -> RuleSet {
        entries.iter()
               .map(|(field, raw)| (field.to_string(), super::super::parse_rules(raw).expect("rules")))
               .collect()
    }

    fn input(value: Value) -> DataMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn required_field_missing_is_reported() {
        let err = RuleValidator.validate(&input(json!({})), &rules(&[("x", "required")]))
                               .unwrap_err();
        assert_eq!(err.first("x"), Some("The x field is required."));
    }

    #[test]
    fn blank_string_counts_as_missing() {
        let err = RuleValidator.validate(&input(json!({"x": "   "})), &rules(&[("x", "required|string")]))
                               .unwrap_err();
        assert_eq!(err.get("x").map(<[String]>::len), Some(1));
    }

    #[test]
    fn only_fields_with_rules_are_returned() {
        let out = RuleValidator.validate(&input(json!({"x": "v", "extra": 1})), &rules(&[("x", "required|string")]))
                               .expect("valid");
        assert_eq!(out.len(), 1);
        assert_eq!(out["x"], json!("v"));
    }

    #[test]
    fn optional_empty_field_skips_type_rules() {
        let out = RuleValidator.validate(&input(json!({"age": null})), &rules(&[("age", "nullable|integer")]))
                               .expect("valid");
        assert_eq!(out["age"], Value::Null);
        let out = RuleValidator.validate(&input(json!({})), &rules(&[("age", "integer")])).expect("valid");
        assert!(out.is_empty());
    }

    #[test]
    fn size_rules_depend_on_type() {
        let set = rules(&[("age", "integer|min:18"), ("name", "string|max:3"), ("tags", "array|max:1")]);
        let err = RuleValidator.validate(&input(json!({"age": "17", "name": "Alice", "tags": [1, 2]})), &set)
                               .unwrap_err();
        assert_eq!(err.first("age"), Some("The age field must be at least 18."));
        assert_eq!(err.first("name"), Some("The name field must not be greater than 3 characters."));
        assert_eq!(err.first("tags"), Some("The tags field must not have more than 1 items."));
    }

    #[test]
    fn type_and_membership_rules() {
        let set = rules(&[("email", "email"), ("plan", "in:free,pro"), ("agree", "boolean"), ("n", "numeric")]);
        let ok = RuleValidator.validate(&input(json!({"email": "a@b.io", "plan": "pro", "agree": "1", "n": "2.5"})), &set);
        assert!(ok.is_ok());
        let err = RuleValidator.validate(&input(json!({"email": "nope", "plan": "gold", "agree": "yes", "n": "x"})), &set)
                               .unwrap_err();
        assert_eq!(err.len(), 4);
        assert_eq!(err.first("plan"), Some("The selected plan is invalid."));
    }

    #[test]
    fn custom_rule_message_is_used() {
        let mut set = RuleSet::new();
        set.insert("code".into(),
                   vec![Rule::custom(|v| {
                       if v.as_str().is_some_and(|s| s.starts_with("WZ-")) {
                           Ok(())
                       } else {
                           Err("codes start with WZ-".into())
                       }
                   })]);
        let err = RuleValidator.validate(&input(json!({"code": "AB-1"})), &set).unwrap_err();
        assert_eq!(err.first("code"), Some("codes start with WZ-"));
    }

    #[test]
    fn email_rule_rejects_malformed_addresses() {
        let set = rules(&[("email", "email")]);
        for good in ["a@b.io", "first.last@mail.example.com"] {
            assert!(RuleValidator.validate(&input(json!({ "email": good })), &set).is_ok(), "{good}");
        }
        for bad in ["a@b", "a b@c.io", "@c.io", "a@@c.io", "a@.io", "a@c.io.", "a@c..io"] {
            assert!(RuleValidator.validate(&input(json!({ "email": bad })), &set).is_err(), "{bad}");
        }
    }

    #[test]
    fn regex_rule_matches_strings_only() {
        let set = rules(&[("code", "regex:^WZ-[0-9]{3}$")]);
        assert!(RuleValidator.validate(&input(json!({"code": "WZ-042"})), &set).is_ok());
        let err = RuleValidator.validate(&input(json!({"code": "WZ-42"})), &set).unwrap_err();
        assert_eq!(err.first("code"), Some("The code field format is invalid."));
        assert!(RuleValidator.validate(&input(json!({"code": 42})), &set).is_err());
    }
}
