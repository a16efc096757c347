use super::FemState;
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Defines the trait for local (element) equations
pub trait ElementTrait {
    /// Returns whether the local Jacobian matrix is symmetric or not
    fn symmetric_jacobian(&self) -> bool;

    /// Returns the local-to-global mapping
    ///
    /// The ordering is: displacement DOFs first, then liquid pressure DOFs,
    /// then (if any) the liquid boundary flux DOFs of seepage faces.
    fn local_to_global(&self) -> &Vec<usize>;

    /// Initializes the internal variables (e.g., initial saturation from the current pressures)
    fn initialize_internal_values(&mut self, state: &mut FemState) -> Result<(), StrError>;

    /// Interpolates the auxiliary time-discretization (star) variables to the integration points
    ///
    /// Must be called whenever the star vectors change, before computing
    /// residuals or Jacobians.
    fn interpolate_star_vars(&mut self, state: &FemState) -> Result<(), StrError>;

    /// Calculates the vector of internal forces f_int (including transient terms)
    fn calc_f_int(&mut self, f_int: &mut Vector, state: &FemState) -> Result<(), StrError>;

    /// Calculates the vector of external forces f_ext at the given time
    fn calc_f_ext(&mut self, f_ext: &mut Vector, time: f64) -> Result<(), StrError>;

    /// Calculates the Jacobian matrix
    ///
    /// `first_iteration` signals the first Newton iteration of the current
    /// timestep (the stress models may then use the elastic predictor).
    fn calc_jacobian(&mut self, kke: &mut Matrix, state: &FemState, first_iteration: bool) -> Result<(), StrError>;

    /// Updates secondary values such as stresses, saturation, and internal variables
    ///
    /// Note that state.uu and state.duu have been updated already
    fn update_secondary_values(&mut self, state: &mut FemState) -> Result<(), StrError>;

    /// Creates a copy of the secondary values (e.g., stress, saturation, int_vars)
    fn backup_secondary_values(&mut self, state: &FemState);

    /// Restores the secondary values (e.g., stress, saturation, int_vars) from the backup
    fn restore_secondary_values(&self, state: &mut FemState);
}
