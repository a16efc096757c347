use super::Idealization;
use crate::StrError;
use gemlab::mesh::{CellAttribute, Mesh};
use std::collections::HashMap;

/// Holds configuration parameters affecting elements and the time loop
pub struct Config<'a> {
    /// Holds the geometry idealization (axisymmetric, plane-strain)
    pub ideal: Idealization,

    /// θ-method parameter with `1e-5 ≤ θ ≤ 1.0` (first-order transient variables)
    pub theta: f64,

    /// First Newmark parameter `θ1` (aka γ) with `0.0001 ≤ θ1 ≤ 1.0`
    pub theta1: f64,

    /// Second Newmark parameter `θ2` (aka 2β) with `0.0001 ≤ θ2 ≤ 1.0`
    pub theta2: f64,

    /// Initial time
    pub t_ini: f64,

    /// Final time
    pub t_fin: f64,

    /// Minimum allowed timestep
    pub ddt_min: f64,

    /// Timestep as a function of time
    pub ddt: Box<dyn Fn(f64) -> f64 + 'a>,

    /// Gravity acceleration intensity as a function of time
    ///
    /// The gravity vector acts along the negative last axis (y in 2D, z in 3D).
    pub gravity: Box<dyn Fn(f64) -> f64 + 'a>,

    /// Requested number of integration (Gauss) points per cell attribute
    pub ngauss: HashMap<CellAttribute, usize>,

    /// Tolerance to check the symmetry of local Jacobian matrices (None disables the check)
    pub symmetry_check_tolerance: Option<f64>,
}

impl<'a> Config<'a> {
    /// Allocates a new instance with default values
    pub fn new(mesh: &Mesh) -> Self {
        Config {
            ideal: Idealization::new(mesh.ndim),
            theta: 0.5,
            theta1: 0.5,
            theta2: 0.5,
            t_ini: 0.0,
            t_fin: 1.0,
            ddt_min: 1e-10,
            ddt: Box::new(|_| 1.0),
            gravity: Box::new(|_| 0.0),
            ngauss: HashMap::new(),
            symmetry_check_tolerance: None,
        }
    }

    /// Validates the θ and Newmark parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if self.theta < 1e-5 || self.theta > 1.0 {
            return Err("θ-method requires 1e-5 ≤ θ ≤ 1.0");
        }
        if self.theta1 < 0.0001 || self.theta1 > 1.0 {
            return Err("Newmark's method requires: 0.0001 ≤ θ1 ≤ 1.0");
        }
        if self.theta2 < 0.0001 || self.theta2 > 1.0 {
            return Err("Newmark's method requires: 0.0001 ≤ θ2 ≤ 1.0");
        }
        Ok(())
    }

    /// Enables the axisymmetric idealization in 2D
    pub fn set_axisymmetric(&mut self) -> &mut Self {
        self.ideal.axisymmetric = true;
        self
    }

    /// Sets the initial time
    pub fn set_t_ini(&mut self, t_ini: f64) -> &mut Self {
        self.t_ini = t_ini;
        self
    }

    /// Sets the final time
    pub fn set_t_fin(&mut self, t_fin: f64) -> &mut Self {
        self.t_fin = t_fin;
        self
    }

    /// Sets the timestep as a function of time
    pub fn set_dt(&mut self, ddt: impl Fn(f64) -> f64 + 'a) -> &mut Self {
        self.ddt = Box::new(ddt);
        self
    }

    /// Sets the gravity intensity as a function of time
    pub fn set_gravity(&mut self, gravity: impl Fn(f64) -> f64 + 'a) -> &mut Self {
        self.gravity = Box::new(gravity);
        self
    }

    /// Sets the number of integration points for a cell attribute
    pub fn set_ngauss(&mut self, attribute: CellAttribute, ngauss: usize) -> &mut Self {
        self.ngauss.insert(attribute, ngauss);
        self
    }

    /// Returns the requested number of integration points for a cell attribute
    pub fn requested_ngauss(&self, attribute: CellAttribute, param_ngauss: Option<usize>) -> Option<usize> {
        match self.ngauss.get(&attribute) {
            Some(n) => Some(*n),
            None => param_ngauss,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
