//! Descriptor de campo declarado por un step.
//!
//! Un `Field` agrupa nombre, reglas de validación, dependencias y un
//! transformador opcional del valor validado. Las dependencias alimentan la
//! invalidación de campos dependientes (ver `step::invalidate_dependent_fields`).

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::validation::Rule;

type Transformer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

#[derive(Clone)]
pub struct Field {
    name: String,
    rules: Vec<Rule>,
    depends_on: Vec<String>,
    transformer: Option<Transformer>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               rules: Vec::new(),
               depends_on: Vec::new(),
               transformer: None }
    }

    /// Reemplaza las reglas de validación del campo.
    pub fn rules<I>(mut self, rules: I) -> Self
        where I: IntoIterator<Item = Rule>
    {
        self.rules = rules.into_iter().collect();
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Declara los campos de los que depende. Si alguno cambia de valor, el
    /// valor almacenado de este campo se descarta.
    pub fn depends_on<I, S>(mut self, fields: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        for f in fields {
            let f = f.into();
            if !self.depends_on.contains(&f) {
                self.depends_on.push(f);
            }
        }
        self
    }

    pub fn transform<F>(mut self, transformer: F) -> Self
        where F: Fn(Value) -> Value + Send + Sync + 'static
    {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn validation_rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub fn is_dependent(&self) -> bool {
        !self.depends_on.is_empty()
    }

    /// `true` si alguno de los campos modificados es una dependencia.
    pub fn should_invalidate<'a, I>(&self, changed: I) -> bool
        where I: IntoIterator<Item = &'a str>
    {
        changed.into_iter().any(|c| self.depends_on.iter().any(|d| d == c))
    }

    /// Aplica el transformador (si existe) al valor validado.
    pub fn value(&self, raw: Value) -> Value {
        match &self.transformer {
            Some(t) => t(raw),
            None => raw,
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
         .field("name", &self.name)
         .field("rules", &self.rules)
         .field("depends_on", &self.depends_on)
         .field("transformer", &self.transformer.is_some())
         .finish()
    }
}
