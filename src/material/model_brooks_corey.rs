use super::LiquidRetentionTrait;
use crate::StrError;

/// Implements the Brooks-Corey model for liquid retention
///
/// This model is of non-rate type: the saturation is an algebraic function
/// of the capillary pressure (no hysteresis):
///
/// ```text
/// sl(pc) = sl_min + (sl_max - sl_min)・(pc_ae/pc)^λ   for pc > pc_ae
/// ```
///
/// # Reference
///
/// * Pedroso DM and Williams DJ (2011) Automatic Calibration of soil-water characteristic
///   curves using genetic algorithms. Computers and Geotechnics, 38(3), 330-340
pub struct ModelBrooksCorey {
    lambda: f64, // slope coefficient
    pc_ae: f64,  // air-entry pressure
    sl_min: f64, // residual (minimum) saturation
    sl_max: f64, // maximum saturation
}

impl ModelBrooksCorey {
    /// Allocates a new instance
    pub fn new(lambda: f64, pc_ae: f64, sl_min: f64, sl_max: f64) -> Result<Self, StrError> {
        // check saturation limits
        if sl_max <= 0.0 || sl_max > 1.0 {
            return Err("sl_max parameter for the Brooks-Corey retention model is invalid");
        }
        if sl_min <= 0.0 || sl_min >= sl_max {
            return Err("sl_min parameter for the Brooks-Corey retention model is invalid");
        }
        // check parameters
        if lambda <= 0.0 {
            return Err("lambda parameter for the Brooks-Corey retention model is invalid");
        }
        if pc_ae <= 0.0 {
            return Err("pc_ae parameter for the Brooks-Corey retention model is invalid");
        }
        // return model
        Ok(ModelBrooksCorey {
            lambda,
            pc_ae,
            sl_min,
            sl_max,
        })
    }
}

impl LiquidRetentionTrait for ModelBrooksCorey {
    /// Returns the saturation limits (sl_min,sl_max)
    fn saturation_limits(&self) -> (f64, f64) {
        (self.sl_min, self.sl_max)
    }

    /// Calculates Cc(pc,sl) = dsl/dpc
    fn calc_cc(&self, pc: f64, _sl: f64, _wetting: bool) -> Result<f64, StrError> {
        if pc <= self.pc_ae {
            return Ok(0.0);
        }
        let cc = -(self.sl_max - self.sl_min) * self.lambda * f64::powf(self.pc_ae / pc, self.lambda) / pc;
        Ok(cc)
    }

    /// Calculates L = ∂Cc/∂pc
    fn calc_ll(&self, pc: f64, _sl: f64, _wetting: bool) -> Result<f64, StrError> {
        if pc <= self.pc_ae {
            return Ok(0.0);
        }
        let (lam, dsl) = (self.lambda, self.sl_max - self.sl_min);
        let ll = dsl * lam * (lam + 1.0) * f64::powf(self.pc_ae / pc, lam) / (pc * pc);
        Ok(ll)
    }

    /// Calculates J = ∂Cc/∂sl (zero: no dependence on the current saturation)
    fn calc_jj(&self, _pc: f64, _sl: f64, _wetting: bool) -> Result<f64, StrError> {
        Ok(0.0)
    }

    /// Calculates the derivative set (L, Lx, J, Jx, Jy)
    fn calc_derivs(&self, pc: f64, sl: f64, wetting: bool) -> Result<(f64, f64, f64, f64, f64), StrError> {
        let ll = self.calc_ll(pc, sl, wetting)?;
        let lx = if pc <= self.pc_ae {
            0.0
        } else {
            let (lam, dsl) = (self.lambda, self.sl_max - self.sl_min);
            -dsl * lam * (lam + 1.0) * (lam + 2.0) * f64::powf(self.pc_ae / pc, lam) / (pc * pc * pc)
        };
        Ok((ll, lx, 0.0, 0.0, 0.0))
    }

    /// Calculates the saturation directly
    fn calc_sl(&self, pc: f64) -> Option<f64> {
        if pc <= self.pc_ae {
            return Some(self.sl_max);
        }
        Some(self.sl_min + (self.sl_max - self.sl_min) * f64::powf(self.pc_ae / pc, self.lambda))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ModelBrooksCorey;
    use crate::material::LiquidRetentionTrait;
    use russell_lab::{approx_eq, deriv1_central5};

    #[test]
    fn new_handles_errors() {
        assert_eq!(
            ModelBrooksCorey::new(0.5, 1.0, 0.1, 2.0).err(),
            Some("sl_max parameter for the Brooks-Corey retention model is invalid")
        );
        assert_eq!(
            ModelBrooksCorey::new(0.5, 1.0, 0.0, 1.0).err(),
            Some("sl_min parameter for the Brooks-Corey retention model is invalid")
        );
        assert_eq!(
            ModelBrooksCorey::new(0.0, 1.0, 0.1, 1.0).err(),
            Some("lambda parameter for the Brooks-Corey retention model is invalid")
        );
        assert_eq!(
            ModelBrooksCorey::new(0.5, 0.0, 0.1, 1.0).err(),
            Some("pc_ae parameter for the Brooks-Corey retention model is invalid")
        );
    }

    #[test]
    fn sl_and_cc_work() {
        let model = ModelBrooksCorey::new(0.5, 2.0, 0.1, 0.95).unwrap();
        assert_eq!(model.calc_sl(1.0), Some(0.95)); // below air entry
        assert_eq!(model.calc_cc(1.0, 0.95, false).unwrap(), 0.0);
        let sl = model.calc_sl(8.0).unwrap();
        assert_eq!(sl, 0.1 + 0.85 * 0.5); // (2/8)^0.5 = 0.5
        // Cc equals the slope of sl(pc)
        struct Args {}
        let mut args = Args {};
        for pc in [3.0, 8.0, 50.0] {
            let num = deriv1_central5(pc, &mut args, |x, _| Ok(model.calc_sl(x).unwrap())).unwrap();
            approx_eq(model.calc_cc(pc, 0.5, false).unwrap(), num, 1e-9);
        }
    }

    #[test]
    fn derivatives_work() {
        let model = ModelBrooksCorey::new(1.5, 2.0, 0.1, 1.0).unwrap();
        struct Args {}
        let mut args = Args {};
        for pc in [3.0, 10.0, 100.0] {
            let ll_num = deriv1_central5(pc, &mut args, |x, _| Ok(model.calc_cc(x, 0.5, false).unwrap())).unwrap();
            approx_eq(model.calc_ll(pc, 0.5, false).unwrap(), ll_num, 1e-10);
            let (ll, lx, jj, jx, jy) = model.calc_derivs(pc, 0.5, false).unwrap();
            assert_eq!(ll, model.calc_ll(pc, 0.5, false).unwrap());
            let lx_num = deriv1_central5(pc, &mut args, |x, _| Ok(model.calc_ll(x, 0.5, false).unwrap())).unwrap();
            approx_eq(lx, lx_num, 1e-10);
            assert_eq!((jj, jx, jy), (0.0, 0.0, 0.0));
        }
    }
}
