//! Step domain model

use std::fmt;
use std::sync::Arc;

/// Value produced by a step for a single input item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput<T> {
    /// Carried forward as one item
    Single(T),
    /// Fan-out: each element continues as an independent item.
    /// An empty list ends the lineage.
    Many(Vec<T>),
}

impl<T> StepOutput<T> {
    /// Fan-out to zero items, dropping the lineage
    pub fn none() -> Self {
        StepOutput::Many(Vec::new())
    }

    /// Number of downstream items this output produces
    pub fn len(&self) -> usize {
        match self {
            StepOutput::Single(_) => 1,
            StepOutput::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fan_out(&self) -> bool {
        matches!(self, StepOutput::Many(_))
    }

    /// Flatten into the items that continue to the next step
    pub fn into_items(self) -> Vec<T> {
        match self {
            StepOutput::Single(item) => vec![item],
            StepOutput::Many(items) => items,
        }
    }
}

impl<T> FromIterator<T> for StepOutput<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        StepOutput::Many(iter.into_iter().collect())
    }
}

impl<T> From<Option<T>> for StepOutput<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(item) => StepOutput::Single(item),
            None => StepOutput::none(),
        }
    }
}

type StepFn<T, E> = dyn Fn(T) -> Result<StepOutput<T>, E> + Send + Sync;

/// A single transformation in a pipeline
///
/// Wraps a caller-supplied function. The engine never inspects it beyond
/// calling it and reading the [`StepOutput`] variant it returns.
pub struct Step<T, E> {
    name: Option<String>,
    func: Arc<StepFn<T, E>>,
}

impl<T: 'static, E: 'static> Step<T, E> {
    /// Create a step from a function returning a [`StepOutput`]
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(T) -> Result<StepOutput<T>, E> + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    /// Create a one-to-one step
    pub fn map<F>(func: F) -> Self
    where
        F: Fn(T) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::new(move |input| func(input).map(StepOutput::Single))
    }

    /// Create a one-to-many step. Every element of the returned collection
    /// becomes its own downstream item.
    pub fn flat_map<F, I>(func: F) -> Self
    where
        F: Fn(T) -> Result<I, E> + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        Self::new(move |input| func(input).map(|items| items.into_iter().collect()))
    }
}

impl<T, E> Step<T, E> {
    /// Attach a name used in log output
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Apply the step to one item
    pub fn apply(&self, input: T) -> Result<StepOutput<T>, E> {
        (self.func)(input)
    }
}

impl<T, E> Clone for Step<T, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<T, E> fmt::Debug for Step<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name.as_deref().unwrap_or("<anonymous>"))
            .finish_non_exhaustive()
    }
}
