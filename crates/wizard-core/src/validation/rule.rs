//! Reglas de validación tipadas.
//!
//! Se pueden declarar directamente (`Rule::Max(10.0)`) o parsear desde la
//! notación compacta `"required|string|max:10"`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

type CustomCheck = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub enum Rule {
    /// El campo debe estar presente y no vacío.
    Required,
    /// Acepta `null` explícito sin evaluar el resto de reglas.
    Nullable,
    String,
    /// Entero JSON o string con un entero.
    Integer,
    /// Número JSON o string numérico.
    Numeric,
    Boolean,
    Array,
    Email,
    /// Mínimo: valor numérico, largo del string o cantidad de elementos.
    Min(f64),
    /// Máximo, con la misma semántica de tamaño que `Min`.
    Max(f64),
    In(Vec<String>),
    /// El string debe matchear el patrón. En notación compacta (`regex:...`)
    /// el patrón no puede contener `|`.
    Regex(Regex),
    /// Regla arbitraria; el `Err` es el mensaje de error.
    Custom(CustomCheck),
}

impl Rule {
    pub fn custom<F>(check: F) -> Self
        where F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static
    {
        Rule::Custom(Arc::new(check))
    }

    pub fn one_of<I, S>(options: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Rule::In(options.into_iter().map(Into::into).collect())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "required"),
            Rule::Nullable => write!(f, "nullable"),
            Rule::String => write!(f, "string"),
            Rule::Integer => write!(f, "integer"),
            Rule::Numeric => write!(f, "numeric"),
            Rule::Boolean => write!(f, "boolean"),
            Rule::Array => write!(f, "array"),
            Rule::Email => write!(f, "email"),
            Rule::Min(n) => write!(f, "min:{n}"),
            Rule::Max(n) => write!(f, "max:{n}"),
            Rule::In(options) => write!(f, "in:{}", options.join(",")),
            Rule::Regex(re) => write!(f, "regex:{}", re.as_str()),
            Rule::Custom(_) => write!(f, "custom"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid validation rule `{0}`")]
pub struct RuleParseError(pub String);

impl FromStr for Rule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (name, arg) = match raw.split_once(':') {
            Some((n, a)) => (n, Some(a)),
            None => (raw, None),
        };
        let number = |a: Option<&str>| {
            a.and_then(|v| v.trim().parse::<f64>().ok())
             .ok_or_else(|| RuleParseError(raw.to_string()))
        };
        match name {
            "required" => Ok(Rule::Required),
            "nullable" => Ok(Rule::Nullable),
            "string" => Ok(Rule::String),
            "integer" | "int" => Ok(Rule::Integer),
            "numeric" => Ok(Rule::Numeric),
            "boolean" | "bool" => Ok(Rule::Boolean),
            "array" => Ok(Rule::Array),
            "email" => Ok(Rule::Email),
            "min" => number(arg).map(Rule::Min),
            "max" => number(arg).map(Rule::Max),
            "in" => match arg {
                Some(list) if !list.is_empty() => Ok(Rule::one_of(list.split(',').map(str::trim))),
                _ => Err(RuleParseError(raw.to_string())),
            },
            "regex" => match arg {
                Some(pattern) if !pattern.is_empty() => {
                    Regex::new(pattern).map(Rule::Regex)
                                       .map_err(|_| RuleParseError(raw.to_string()))
                }
                _ => Err(RuleParseError(raw.to_string())),
            },
            _ => Err(RuleParseError(raw.to_string())),
        }
    }
}

/// Parsea una lista de reglas separadas por `|`.
pub fn parse_rules(raw: &str) -> Result<Vec<Rule>, RuleParseError> {
    raw.split('|')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::parse)
        .collect()
}
