//! The default type learner: frequency counting per computation name.
//!
//! `learn` records each observed result type; `predict` answers with the
//! modal type and how dominant it is. Good enough for the prediction cache
//! on reactive nodes; hosts wanting a smarter model register their own
//! learner through `rill_value::config`.

use dashmap::DashMap;
use rustc_hash::FxHashMap;

use rill_value::{Type, TypeLearner, TypePrediction, Value};

/// Counts observed result types keyed by computation name.
#[derive(Default)]
pub struct CountingTypeLearner {
    observations: DashMap<String, FxHashMap<Type, usize>>,
}

impl CountingTypeLearner {
    pub fn new() -> Self {
        CountingTypeLearner::default()
    }

    /// Register this learner process-wide.
    pub fn install() {
        rill_value::config::set_type_learner(std::sync::Arc::new(
            CountingTypeLearner::new(),
        ));
    }

    /// Total observations recorded for a name.
    pub fn observed(&self, name: &str) -> usize {
        self.observations
            .get(name)
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }
}

impl TypeLearner for CountingTypeLearner {
    fn predict(&self, name: &str, _inputs: &[Value]) -> Option<TypePrediction> {
        let counts = self.observations.get(name)?;
        let total: usize = counts.values().sum();
        let (probable, seen) = counts
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(t, count)| (*t, *count))?;
        Some(TypePrediction {
            probable,
            certainty: seen as f64 / total as f64,
        })
    }

    fn learn(&self, name: &str, _inputs: &[Value], observed: Type) {
        *self
            .observations
            .entry(name.to_string())
            .or_default()
            .entry(observed)
            .or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicts_the_modal_type() {
        let learner = CountingTypeLearner::new();
        learner.learn("f", &[], Type::Integer);
        learner.learn("f", &[], Type::Integer);
        learner.learn("f", &[], Type::String);

        let prediction = learner.predict("f", &[]).map(|p| (p.probable, p.certainty));
        assert_eq!(prediction, Some((Type::Integer, 2.0 / 3.0)));
    }

    #[test]
    fn unknown_names_have_no_prediction() {
        let learner = CountingTypeLearner::new();
        assert!(learner.predict("g", &[]).is_none());
        assert_eq!(learner.observed("g"), 0);
    }
}
