use super::FemState;
use crate::base::Config;
use crate::StrError;

/// Assists in the time loop control
///
/// Computes the coefficients of the implicit time discretization:
/// the θ-method for first-order variables (liquid pressure) and
/// Newmark's method for second-order variables (displacements).
pub struct ControlTime<'a> {
    /// Holds configuration parameters
    config: &'a Config<'a>,
}

impl<'a> ControlTime<'a> {
    /// Allocates a new instance
    pub fn new(config: &'a Config) -> Result<Self, StrError> {
        config.validate()?;
        Ok(ControlTime { config })
    }

    /// Initializes the time, Δt, α, and β coefficients at t_ini
    pub fn initialize(&self, state: &mut FemState) -> Result<(), StrError> {
        state.t = self.config.t_ini;
        state.ddt = (self.config.ddt)(state.t);
        if state.ddt < self.config.ddt_min {
            return Err("Δt is smaller than the allowed minimum");
        }
        self.calculate_coefficients(state);
        Ok(())
    }

    /// Updates the time and the α and β coefficients with the given Δt
    ///
    /// Returns `true` if the simulation has finished (the final time has been reached)
    pub fn update(&self, state: &mut FemState, ddt: f64) -> Result<bool, StrError> {
        state.ddt = ddt;
        if state.ddt < self.config.ddt_min {
            return Err("Δt is smaller than the allowed minimum");
        }
        if state.t + state.ddt > self.config.t_fin {
            return Ok(true);
        }
        state.t += state.ddt;
        self.calculate_coefficients(state);
        Ok(false)
    }

    /// Calculates all derived coefficients for the current timestep Δt
    fn calculate_coefficients(&self, state: &mut FemState) {
        let (theta, theta1, theta2) = (self.config.theta, self.config.theta1, self.config.theta2);
        let dt = state.ddt;

        // α coefficients (Newmark)
        let m = dt * dt / 2.0;
        state.alpha1 = 1.0 / (theta2 * m);
        state.alpha2 = dt / (theta2 * m);
        state.alpha3 = 1.0 / theta2 - 1.0;
        state.alpha4 = theta1 * dt / (theta2 * m);
        state.alpha5 = 2.0 * theta1 / theta2 - 1.0;
        state.alpha6 = (theta1 / theta2 - 1.0) * dt;

        // β coefficients (θ-method)
        state.beta1 = 1.0 / (theta * dt);
        state.beta2 = (1.0 - theta) / theta;
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
