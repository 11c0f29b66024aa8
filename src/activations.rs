use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Elementwise activation function with its derivative.
pub trait Activation: fmt::Debug + Send + Sync {
    fn apply(&self, x: f64) -> f64;
    fn derivative(&self, x: f64) -> f64;
    fn kind(&self) -> ActivationKind;
}

/// ReLU: max(0, x)
#[derive(Debug, Clone, Default)]
pub struct ReLU;

impl Activation for ReLU {
    fn apply(&self, x: f64) -> f64 {
        x.max(0.0)
    }
    fn derivative(&self, x: f64) -> f64 {
        (x > 0.0) as u8 as f64
    }
    fn kind(&self) -> ActivationKind {
        ActivationKind::ReLU
    }
}

/// Sigmoid: 1 / (1 + exp(-x))
#[derive(Debug, Clone, Default)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn apply(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }
    fn derivative(&self, x: f64) -> f64 {
        let s = self.apply(x);
        s * (1.0 - s)
    }
    fn kind(&self) -> ActivationKind {
        ActivationKind::Sigmoid
    }
}

/// Serializable activation kinds for persistence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivationKind {
    ReLU,
    Sigmoid,
}

impl ActivationKind {
    pub fn to_arc(self) -> Arc<dyn Activation> {
        match self {
            ActivationKind::ReLU => Arc::new(ReLU),
            ActivationKind::Sigmoid => Arc::new(Sigmoid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_and_derivative() {
        assert_eq!(ReLU.apply(-2.0), 0.0);
        assert_eq!(ReLU.apply(3.5), 3.5);
        assert_eq!(ReLU.derivative(-1.0), 0.0);
        assert_eq!(ReLU.derivative(1.0), 1.0);
    }

    #[test]
    fn sigmoid_is_bounded() {
        assert_eq!(Sigmoid.apply(0.0), 0.5);
        assert!(Sigmoid.apply(40.0) <= 1.0);
        assert!(Sigmoid.apply(-40.0) >= 0.0);
        assert_eq!(Sigmoid.derivative(0.0), 0.25);
    }

    #[test]
    fn kinds_round_trip_through_arc() {
        for kind in [ActivationKind::ReLU, ActivationKind::Sigmoid] {
            assert_eq!(kind.to_arc().kind(), kind);
        }
    }
}
