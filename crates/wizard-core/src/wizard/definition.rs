//! Definición inmutable de un tipo de wizard y su builder.
//!
//! La definición se construye una vez (por proceso) y se comparte entre
//! requests. Al construirla se valida:
//! - que haya al menos un step,
//! - que los slugs de steps sean únicos,
//! - que ningún campo dependa de sí mismo ni existan ciclos de dependencias.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::errors::{DefinitionError, WizardError};
use crate::field::Field;
use crate::step::{StepRef, WizardStep};

use super::hooks::{DefaultHooks, WizardHooks};

pub struct WizardDefinition {
    slug: String,
    title: String,
    steps: Vec<Box<dyn WizardStep>>,
    slug_index: HashMap<String, usize>,
    /// Campos de todos los steps, en orden de step y de declaración.
    fields: Vec<Field>,
    hooks: Box<dyn WizardHooks>,
}

impl WizardDefinition {
    pub fn builder(slug: impl Into<String>, title: impl Into<String>) -> WizardBuilder {
        WizardBuilder { slug: slug.into(),
                        title: title.into(),
                        steps: Vec::new(),
                        hooks: None }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Siempre `false` para una definición construida.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<StepRef<'_>> {
        self.steps.get(index).map(|s| StepRef::new(index, s.as_ref()))
    }

    pub fn first_step(&self) -> StepRef<'_> {
        StepRef::new(0, self.steps[0].as_ref())
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn is_last(&self, index: usize) -> bool {
        index == self.last_index()
    }

    pub fn steps(&self) -> impl Iterator<Item = StepRef<'_>> {
        self.steps.iter().enumerate().map(|(i, s)| StepRef::new(i, s.as_ref()))
    }

    pub fn index_of(&self, slug: &str) -> Option<usize> {
        self.slug_index.get(slug).copied()
    }

    /// Resuelve un step por slug o falla con `UnknownStep`.
    pub fn resolve(&self, slug: &str) -> Result<StepRef<'_>, WizardError> {
        self.index_of(slug)
            .and_then(|i| self.step(i))
            .ok_or_else(|| WizardError::UnknownStep { wizard: self.slug.clone(),
                                                      slug: slug.to_string() })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn hooks(&self) -> &dyn WizardHooks {
        self.hooks.as_ref()
    }
}

impl fmt::Debug for WizardDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slugs: Vec<&str> = self.steps.iter().map(|s| s.slug()).collect();
        f.debug_struct("WizardDefinition")
         .field("slug", &self.slug)
         .field("title", &self.title)
         .field("steps", &slugs)
         .finish()
    }
}

/// Builder de `WizardDefinition`. El orden de `step` define los índices.
pub struct WizardBuilder {
    slug: String,
    title: String,
    steps: Vec<Box<dyn WizardStep>>,
    hooks: Option<Box<dyn WizardHooks>>,
}

impl WizardBuilder {
    pub fn step<S>(mut self, step: S) -> Self
        where S: WizardStep + 'static
    {
        self.steps.push(Box::new(step));
        self
    }

    pub fn boxed_step(mut self, step: Box<dyn WizardStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn hooks<H>(mut self, hooks: H) -> Self
        where H: WizardHooks + 'static
    {
        self.hooks = Some(Box::new(hooks));
        self
    }

    pub fn build(self) -> Result<WizardDefinition, DefinitionError> {
        if self.steps.is_empty() {
            return Err(DefinitionError::NoSteps(self.slug));
        }

        let mut slug_index = HashMap::with_capacity(self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            if slug_index.insert(step.slug().to_string(), i).is_some() {
                return Err(DefinitionError::DuplicateSlug(step.slug().to_string()));
            }
        }

        let fields: Vec<Field> = self.steps.iter().flat_map(|s| s.fields()).collect();
        check_dependencies(&fields)?;

        Ok(WizardDefinition { slug: self.slug,
                              title: self.title,
                              steps: self.steps,
                              slug_index,
                              fields,
                              hooks: self.hooks.unwrap_or_else(|| Box::new(DefaultHooks)) })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn check_dependencies(fields: &[Field]) -> Result<(), DefinitionError> {
    let mut graph: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for field in fields {
        if field.dependencies().iter().any(|d| d == field.name()) {
            return Err(DefinitionError::SelfDependency(field.name().to_string()));
        }
        let edges = graph.entry(field.name()).or_default();
        for dep in field.dependencies() {
            if !edges.contains(&dep.as_str()) {
                edges.push(dep.as_str());
            }
        }
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();
    for node in graph.keys() {
        visit(node, &graph, &mut marks, &mut path)?;
    }
    Ok(())
}

fn visit<'a>(node: &'a str,
             graph: &IndexMap<&'a str, Vec<&'a str>>,
             marks: &mut HashMap<&'a str, Mark>,
             path: &mut Vec<&'a str>)
             -> Result<(), DefinitionError> {
    match marks.get(node) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = path.iter().position(|n| *n == node).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(node.to_string());
            return Err(DefinitionError::DependencyCycle(cycle));
        }
        None => {}
    }
    marks.insert(node, Mark::Visiting);
    path.push(node);
    if let Some(deps) = graph.get(node) {
        for dep in deps {
            visit(dep, graph, marks, path)?;
        }
    }
    path.pop();
    marks.insert(node, Mark::Done);
    Ok(())
}
