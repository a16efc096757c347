use super::LiquidRetentionTrait;
use crate::StrError;

/// Implements the van Genuchten model for liquid retention
///
/// This model is of non-rate type: the saturation is an algebraic function
/// of the capillary pressure (no hysteresis):
///
/// ```text
/// sl(pc) = sl_min + (sl_max - sl_min)・[1 + (α pc)^n]^(-m)   for pc > pc_min
/// ```
pub struct ModelVanGenuchten {
    alpha: f64,  // α parameter
    m: f64,      // m parameter
    n: f64,      // n parameter
    sl_min: f64, // residual (minimum) saturation
    sl_max: f64, // maximum saturation
    pc_min: f64, // capillary pressure limit to consider zero slope
}

impl ModelVanGenuchten {
    /// Allocates a new instance
    pub fn new(alpha: f64, m: f64, n: f64, sl_min: f64, sl_max: f64, pc_min: f64) -> Result<Self, StrError> {
        // check saturation limits
        if sl_max <= 0.0 || sl_max > 1.0 {
            return Err("sl_max parameter for the van Genuchten retention model is invalid");
        }
        if sl_min <= 0.0 || sl_min >= sl_max {
            return Err("sl_min parameter for the van Genuchten retention model is invalid");
        }
        // check parameters
        if alpha <= 0.0 {
            return Err("alpha parameter for the van Genuchten retention model is invalid");
        }
        if m <= 0.0 {
            return Err("m parameter for the van Genuchten retention model is invalid");
        }
        if n <= 0.0 {
            return Err("n parameter for the van Genuchten retention model is invalid");
        }
        if pc_min <= 0.0 {
            return Err("pc_min parameter for the van Genuchten retention model is invalid");
        }
        // return model
        Ok(ModelVanGenuchten {
            alpha,
            m,
            n,
            sl_min,
            sl_max,
            pc_min,
        })
    }

    /// Computes Φ' = dΦ/dpc with Φ = [1 + (α pc)^n]^(-m)
    fn phi_deriv1(&self, pc: f64) -> f64 {
        let u = f64::powf(self.alpha * pc, self.n);
        let q = 1.0 + u;
        -self.m * self.n * u * f64::powf(q, -self.m - 1.0) / pc
    }

    /// Computes the log-derivative factor g with Φ'' = Φ'·g
    fn log_factor(&self, pc: f64) -> f64 {
        let u = f64::powf(self.alpha * pc, self.n);
        let q = 1.0 + u;
        ((self.n - 1.0) - (self.m + 1.0) * self.n * u / q) / pc
    }
}

impl LiquidRetentionTrait for ModelVanGenuchten {
    /// Returns the saturation limits (sl_min,sl_max)
    fn saturation_limits(&self) -> (f64, f64) {
        (self.sl_min, self.sl_max)
    }

    /// Calculates Cc(pc,sl) = dsl/dpc
    fn calc_cc(&self, pc: f64, _sl: f64, _wetting: bool) -> Result<f64, StrError> {
        if pc <= self.pc_min {
            return Ok(0.0);
        }
        Ok((self.sl_max - self.sl_min) * self.phi_deriv1(pc))
    }

    /// Calculates L = ∂Cc/∂pc
    fn calc_ll(&self, pc: f64, _sl: f64, _wetting: bool) -> Result<f64, StrError> {
        if pc <= self.pc_min {
            return Ok(0.0);
        }
        let phi_d1 = self.phi_deriv1(pc);
        Ok((self.sl_max - self.sl_min) * phi_d1 * self.log_factor(pc))
    }

    /// Calculates J = ∂Cc/∂sl (zero: no dependence on the current saturation)
    fn calc_jj(&self, _pc: f64, _sl: f64, _wetting: bool) -> Result<f64, StrError> {
        Ok(0.0)
    }

    /// Calculates the derivative set (L, Lx, J, Jx, Jy)
    fn calc_derivs(&self, pc: f64, _sl: f64, _wetting: bool) -> Result<(f64, f64, f64, f64, f64), StrError> {
        if pc <= self.pc_min {
            return Ok((0.0, 0.0, 0.0, 0.0, 0.0));
        }
        let dsl = self.sl_max - self.sl_min;
        let u = f64::powf(self.alpha * pc, self.n);
        let q = 1.0 + u;
        let phi_d1 = self.phi_deriv1(pc);
        let g = self.log_factor(pc);
        // g' with d/dpc[u/(q pc)] = u (n - q)/(q² pc²)
        let g_deriv = -(self.n - 1.0) / (pc * pc) - (self.m + 1.0) * self.n * u * (self.n - q) / (q * q * pc * pc);
        let ll = dsl * phi_d1 * g;
        let lx = dsl * phi_d1 * (g * g + g_deriv);
        Ok((ll, lx, 0.0, 0.0, 0.0))
    }

    /// Calculates the saturation directly
    fn calc_sl(&self, pc: f64) -> Option<f64> {
        if pc <= self.pc_min {
            return Some(self.sl_max);
        }
        let q = 1.0 + f64::powf(self.alpha * pc, self.n);
        Some(self.sl_min + (self.sl_max - self.sl_min) * f64::powf(q, -self.m))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
