use crate::base::Conductivity;
use crate::StrError;

/// Implements relative liquid conductivity models klr(sl)
///
/// The relative conductivity multiplies the saturated conductivity tensor.
/// The two-slope model joins an initial slope λ0 and a final slope λ1 at the
/// saturation α through a smooth ramp of sharpness β:
///
/// ```text
/// klr(sl) = λ0・sl + (λ1 - λ0)・sramp(sl - α, β)
/// ```
pub struct ModelConductivity {
    /// Use the constant model (klr = 1)
    cte_enabled: bool,

    /// Two-slope model: λ0 parameter (initial slope)
    lambda_0: f64,

    /// Two-slope model: λ1 parameter (final slope)
    lambda_1: f64,

    /// Two-slope model: α parameter (saturation at the slope transition)
    alpha: f64,

    /// Two-slope model: β parameter (sharpness of the slope transition)
    beta: f64,
}

/// Computes the smooth ramp function (smooth approximation to max(x,0))
pub fn sramp(x: f64, beta: f64) -> f64 {
    if -beta * x > 500.0 {
        return 0.0;
    }
    if beta * x > 500.0 {
        return x;
    }
    x + f64::ln(1.0 + f64::exp(-beta * x)) / beta
}

/// Computes the derivative of the smooth ramp function
pub fn sramp_deriv(x: f64, beta: f64) -> f64 {
    if -beta * x > 500.0 {
        return 0.0;
    }
    if beta * x > 500.0 {
        return 1.0;
    }
    1.0 / (1.0 + f64::exp(-beta * x))
}

impl ModelConductivity {
    /// Allocates a new instance
    pub fn new(param: &Conductivity) -> Result<Self, StrError> {
        match *param {
            Conductivity::Constant { .. } => Ok(ModelConductivity {
                cte_enabled: true,
                lambda_0: 0.0,
                lambda_1: 0.0,
                alpha: 0.0,
                beta: 0.0,
            }),
            Conductivity::PedrosoZhangEhlers {
                lambda_0,
                lambda_1,
                alpha,
                beta,
                ..
            } => {
                if lambda_0 < 0.0 || lambda_1 <= 0.0 {
                    return Err("lambda parameters for the relative conductivity model are invalid");
                }
                if alpha < 0.0 || alpha >= 1.0 {
                    return Err("alpha parameter for the relative conductivity model is invalid");
                }
                if beta <= 0.0 {
                    return Err("beta parameter for the relative conductivity model is invalid");
                }
                Ok(ModelConductivity {
                    cte_enabled: false,
                    lambda_0,
                    lambda_1,
                    alpha,
                    beta,
                })
            }
        }
    }

    /// Calculates the relative conductivity klr(sl)
    pub fn klr(&self, sl: f64) -> f64 {
        if self.cte_enabled {
            return 1.0;
        }
        self.lambda_0 * sl + (self.lambda_1 - self.lambda_0) * sramp(sl - self.alpha, self.beta)
    }

    /// Calculates the derivative dklr/dsl
    pub fn dklr_dsl(&self, sl: f64) -> f64 {
        if self.cte_enabled {
            return 0.0;
        }
        self.lambda_0 + (self.lambda_1 - self.lambda_0) * sramp_deriv(sl - self.alpha, self.beta)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ModelConductivity;
    use crate::base::Conductivity;
    use russell_lab::{approx_eq, deriv1_central5};

    #[test]
    fn constant_works() {
        let param = Conductivity::Constant {
            kx: 0.1,
            ky: 0.1,
            kz: 0.1,
        };
        let model = ModelConductivity::new(&param).unwrap();
        assert_eq!(model.klr(0.2), 1.0);
        assert_eq!(model.klr(1.0), 1.0);
        assert_eq!(model.dklr_dsl(0.5), 0.0);
    }

    #[test]
    fn two_slope_model_works() {
        let param = Conductivity::PedrosoZhangEhlers {
            kx: 2.2,
            ky: 2.2,
            kz: 2.2,
            lambda_0: 0.001,
            lambda_1: 1.2,
            alpha: 0.01,
            beta: 10.0,
        };
        let model = ModelConductivity::new(&param).unwrap();

        // monotone increasing and positive
        let mut klr_prev = model.klr(0.0);
        for i in 1..=100 {
            let sl = (i as f64) / 100.0;
            let klr = model.klr(sl);
            assert!(klr > klr_prev);
            klr_prev = klr;
        }

        // derivative matches finite differences
        struct Args {}
        let mut args = Args {};
        for sl in [0.05, 0.3, 0.6, 0.95] {
            let num = deriv1_central5(sl, &mut args, |x, _| Ok(model.klr(x))).unwrap();
            approx_eq(model.dklr_dsl(sl), num, 1e-10);
        }
    }

    #[test]
    fn new_handles_errors() {
        let param = Conductivity::PedrosoZhangEhlers {
            kx: 2.2,
            ky: 2.2,
            kz: 2.2,
            lambda_0: 0.001,
            lambda_1: 1.2,
            alpha: 2.0,
            beta: 10.0,
        };
        assert_eq!(
            ModelConductivity::new(&param).err(),
            Some("alpha parameter for the relative conductivity model is invalid")
        );
    }
}
