use crate::material::{LocalState, LocalStatePorous};
use serde::{Deserialize, Serialize};

/// Holds all secondary values (local states) at the Gauss points of one cell
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GaussState {
    /// Number of Gauss (integration) points of this cell
    pub ngauss: usize,

    /// Solid (effective stress) states, one per Gauss point (may be empty)
    pub solid: Vec<LocalState>,

    /// Porous (retention) states, one per Gauss point (may be empty)
    pub porous: Vec<LocalStatePorous>,
}

impl GaussState {
    /// Allocates a new instance with empty state arrays
    pub fn new_empty(ngauss: usize) -> Self {
        GaussState {
            ngauss,
            solid: Vec::new(),
            porous: Vec::new(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
