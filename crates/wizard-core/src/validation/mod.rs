//! Validación de requests: reglas tipadas y el trait `Validator`.

mod rule;
mod validator;

pub use rule::{parse_rules, Rule, RuleParseError};
pub use validator::{RuleSet, RuleValidator, Validator};
