use super::{ParamPorousLiq, ParamPorousSldLiq, ParamSolid};
use serde::{Deserialize, Serialize};

/// Defines degrees-of-freedom (DOF) types
///
/// Note: The fixed numbering scheme assists in sorting the DOFs.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Dof {
    /// Displacement along the first dimension
    Ux = 0,

    /// Displacement along the second dimension
    Uy = 1,

    /// Displacement along the third dimension
    Uz = 2,

    /// Liquid pressure
    Pl = 3,

    /// Gas pressure
    Pg = 4,

    /// Liquid boundary flux unknown on seepage faces
    Fl = 5,
}

impl Dof {
    /// Returns the order of the time derivative of this variable in the transient equations
    ///
    /// Pressure-like variables appear with first-order rates (θ-method) whereas
    /// displacements appear with second-order rates (Newmark method).
    pub fn time_deriv_order(&self) -> usize {
        match self {
            Dof::Ux | Dof::Uy | Dof::Uz => 2,
            Dof::Pl | Dof::Pg | Dof::Fl => 1,
        }
    }

    /// Returns the natural boundary condition matching this solution variable
    ///
    /// This maps each primary unknown to the face condition that prescribes
    /// its conjugate boundary quantity (None when no face condition exists).
    pub fn natural_bc_key(&self) -> Option<Nbc> {
        match self {
            Dof::Ux => Some(Nbc::Qx),
            Dof::Uy => Some(Nbc::Qy),
            Dof::Uz => Some(Nbc::Qz),
            Dof::Pl => Some(Nbc::Ql),
            Dof::Pg => None,
            Dof::Fl => Some(Nbc::Seep),
        }
    }
}

/// Defines natural boundary conditions (NBC) on edges or faces
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Nbc {
    /// Normal distributed load (traction; positive acts along the outward normal)
    Qn,

    /// Distributed load parallel to x
    Qx,

    /// Distributed load parallel to y
    Qy,

    /// Distributed load parallel to z
    Qz,

    /// Liquid flux
    Ql,

    /// Seepage face (potential liquid outflow capped by a maximum pressure)
    Seep,
}

impl Nbc {
    /// Indicates whether this NBC contributes to the Jacobian matrix or not
    pub fn contributes_to_jacobian_matrix(&self) -> bool {
        match self {
            Nbc::Seep => true,
            _ => false,
        }
    }
}

/// Defines the element types (parameters) keyed by cell attribute
#[derive(Clone, Copy, Debug)]
pub enum Elem {
    /// Solid mechanics element (momentum balance only)
    Solid(ParamSolid),

    /// Liquid seepage element (mass balance only)
    PorousLiq(ParamPorousLiq),

    /// Coupled solid-liquid porous media element (u-p formulation)
    PorousSldLiq(ParamPorousSldLiq),
}

impl Elem {
    /// Returns the name of this element
    pub fn name(&self) -> String {
        match self {
            Elem::Solid(..) => "Solid".to_string(),
            Elem::PorousLiq(..) => "PorousLiq".to_string(),
            Elem::PorousSldLiq(..) => "PorousSldLiq".to_string(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
