use russell_lab::{vec_copy, Vector};
use russell_tensor::{Mandel, Tensor2};
use serde::{Deserialize, Serialize};

/// Holds local state data for the solid phase (effective stress)
///
/// This data structure is associated with a Gauss (integration) point
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalState {
    /// Holds the internal values Z
    pub internal_values: Vector,

    /// Holds the effective stress tensor σ'
    pub stress: Tensor2,

    /// Holds the elastic (vs elastoplastic) flag
    pub elastic: bool,

    /// Holds the algorithmic Lagrange multiplier (Λ) of the last stress update
    pub algo_lagrange: f64,
}

impl LocalState {
    /// Allocates a new instance
    pub fn new(mandel: Mandel, n_internal_values: usize) -> Self {
        LocalState {
            internal_values: Vector::new(n_internal_values),
            stress: Tensor2::new(mandel),
            elastic: true,
            algo_lagrange: 0.0,
        }
    }

    /// Copy data from another state into this state
    pub fn mirror(&mut self, other: &LocalState) {
        vec_copy(&mut self.internal_values, &other.internal_values).unwrap();
        self.stress.set_tensor(1.0, &other.stress);
        self.elastic = other.elastic;
        self.algo_lagrange = other.algo_lagrange;
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
