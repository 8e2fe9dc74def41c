//! Spatially varying materials.
//!
//! A scene entry pairs a surface with an [`InteractionSelector`], which picks
//! the interaction model to use at each hit point. Any interaction model is a
//! selector that always answers with itself.

use std::fmt;
use std::sync::Arc;

use crate::material::InteractionModel;

/// Chooses the interaction model at a point on a surface.
pub trait InteractionSelector: Send + Sync + fmt::Debug {
    /// The model at `point`, or `None` if the selector has nothing there.
    fn select(&self, point: &[f64]) -> Option<&dyn InteractionModel>;
}

impl<M: InteractionModel> InteractionSelector for M {
    fn select(&self, _point: &[f64]) -> Option<&dyn InteractionModel> {
        Some(self)
    }
}

/// Alternates two models on a lattice of cubes with side `scale`.
#[derive(Debug, Clone)]
pub struct Checker {
    even: Arc<dyn InteractionModel>,
    odd: Arc<dyn InteractionModel>,
    scale: f64,
}

impl Checker {
    pub fn new(even: Arc<dyn InteractionModel>, odd: Arc<dyn InteractionModel>, scale: f64) -> Self {
        Self { even, odd, scale }
    }
}

impl InteractionSelector for Checker {
    fn select(&self, point: &[f64]) -> Option<&dyn InteractionModel> {
        let cell: i64 = point
            .iter()
            .map(|x| (x / self.scale).floor() as i64)
            .sum();
        if cell.rem_euclid(2) == 0 {
            Some(self.even.as_ref())
        } else {
            Some(self.odd.as_ref())
        }
    }
}

type Chooser = dyn Fn(&[f64]) -> Option<usize> + Send + Sync;

/// Selector driven by a closure that returns an index into `models`.
///
/// An index past the end, or `None`, means no model applies at that point.
#[derive(Clone)]
pub struct FnSelector {
    models: Vec<Arc<dyn InteractionModel>>,
    choose: Arc<Chooser>,
}

impl FnSelector {
    pub fn new(
        models: Vec<Arc<dyn InteractionModel>>,
        choose: impl Fn(&[f64]) -> Option<usize> + Send + Sync + 'static,
    ) -> Self {
        Self {
            models,
            choose: Arc::new(choose),
        }
    }
}

impl fmt::Debug for FnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSelector")
            .field("models", &self.models)
            .finish_non_exhaustive()
    }
}

impl InteractionSelector for FnSelector {
    fn select(&self, point: &[f64]) -> Option<&dyn InteractionModel> {
        let index = (self.choose)(point)?;
        self.models.get(index).map(|m| m.as_ref())
    }
}
