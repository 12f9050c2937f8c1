//! Named trainable parameters
//!
//! The external training framework owns gradient computation; this crate only
//! needs a parameter store it can enumerate, snapshot, and update. `Param`
//! pairs a name with an `ndarray` value and an optional gradient written by
//! the caller before each optimization step.

use ndarray::Array1;
use std::collections::HashMap;

/// A named trainable parameter with an optional gradient.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    data: Array1<f32>,
    grad: Option<Array1<f32>>,
    trainable: bool,
}

impl Param {
    /// Create a trainable parameter.
    pub fn new(name: impl Into<String>, data: Array1<f32>) -> Self {
        Self { name: name.into(), data, grad: None, trainable: true }
    }

    /// Create a frozen parameter (never updated, never decayed).
    pub fn frozen(name: impl Into<String>, data: Array1<f32>) -> Self {
        Self { name: name.into(), data, grad: None, trainable: false }
    }

    /// Parameter name, used by the weight-decay exclusion rule.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    #[must_use]
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable access to the value (optimizer updates go through here).
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Current gradient, if one has been set since the last `zero_grad`.
    #[must_use]
    pub fn grad(&self) -> Option<&Array1<f32>> {
        self.grad.as_ref()
    }

    /// Overwrite the gradient. Called by the framework after backprop, and by
    /// gradient clipping when rescaling.
    pub fn set_grad(&mut self, grad: Array1<f32>) {
        self.grad = Some(grad);
    }

    /// Clear the gradient before the next backward pass.
    pub fn zero_grad(&mut self) {
        self.grad = None;
    }

    /// Whether this parameter participates in optimization.
    #[must_use]
    pub fn is_trainable(&self) -> bool {
        self.trainable
    }
}

/// Ordered collection of named parameters.
///
/// Ordering is stable so optimizer moment buffers can be keyed by index.
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    params: Vec<Param>,
}

impl ParamSet {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter. Names are expected to be unique; the snapshot keyed
    /// by name keeps only the last value for a duplicated name.
    pub fn push(&mut self, param: Param) {
        self.params.push(param);
    }

    /// Number of parameters (trainable or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Param> {
        self.params.iter_mut()
    }

    /// Snapshot every trainable parameter's current value, keyed by name.
    ///
    /// The copies carry no gradient and are never touched by the optimizer:
    /// they are the pre-update reference that decoupled weight decay subtracts
    /// from, so decay does not compound through the optimizer's own update.
    #[must_use]
    pub fn snapshot(&self) -> ParamSnapshot {
        let values = self
            .params
            .iter()
            .filter(|p| p.is_trainable())
            .map(|p| (p.name().to_string(), p.data().clone()))
            .collect();
        ParamSnapshot { values }
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl FromIterator<Param> for ParamSet {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self { params: iter.into_iter().collect() }
    }
}

/// Immutable pre-step copy of trainable parameter values.
#[derive(Debug, Clone)]
pub struct ParamSnapshot {
    values: HashMap<String, Array1<f32>>,
}

impl ParamSnapshot {
    /// The snapshotted value for a parameter, if it was trainable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Array1<f32>> {
        self.values.get(name)
    }

    /// Number of snapshotted parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
