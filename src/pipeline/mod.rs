//! Named steps with declared predecessors, put in a runnable order before anything executes.

#[cfg(test)]
mod tests;

use crate::internal_prelude::*;
use itertools::Itertools;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Step<T> {
    pub name: String,
    pub after: Vec<String>,
    pub task: T,
}

#[derive(Debug, Clone)]
pub struct Pipeline<T> {
    steps: Vec<Step<T>>,
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a step that runs once every step in `after` has finished.
    pub fn step(mut self, name: impl Into<String>, after: &[&str], task: T) -> Self {
        self.steps.push(Step {
            name: name.into(),
            after: after.iter().map(|a| a.to_string()).collect(),
            task,
        });
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Orders the steps so that each one follows its predecessors.
    /// Independent steps keep their declaration order.
    pub fn ordered(self) -> Result<Vec<Step<T>>> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            ensure!(
                seen.insert(step.name.as_str()),
                r#"Pipeline step "{}" is declared twice"#,
                step.name
            );
        }
        for step in &self.steps {
            for before in &step.after {
                ensure!(
                    seen.contains(before.as_str()),
                    r#"Pipeline step "{}" runs after unknown step "{}""#,
                    step.name,
                    before
                );
            }
        }

        let mut pending = self.steps;
        let mut done: HashSet<String> = HashSet::new();
        let mut ordered = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let ready = pending
                .iter()
                .position(|step| step.after.iter().all(|a| done.contains(a)));
            let Some(index) = ready else {
                let stuck = pending.iter().map(|s| s.name.as_str()).join(", ");
                bail!("Pipeline has a dependency cycle between: {}", stuck);
            };
            let step = pending.remove(index);
            trace!("Pipeline step {} ready", step.name);
            done.insert(step.name.clone());
            ordered.push(step);
        }
        Ok(ordered)
    }
}

/// One line summary of an ordered plan, for logging.
pub fn describe<T>(steps: &[Step<T>]) -> String {
    steps
        .iter()
        .map(|s| match s.after.as_slice() {
            [] => s.name.clone(),
            after => format!("{} (after {})", s.name, after.join(", ")),
        })
        .join(" -> ")
}
