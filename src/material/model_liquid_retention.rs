use super::{ModelBrooksCorey, ModelPedrosoWilliams, ModelVanGenuchten};
use crate::base::LiquidRetention;
use crate::StrError;

/// Specifies the essential functions for liquid retention models
///
/// The retention law is treated as a rate equation in the capillary pressure:
///
/// ```text
/// Cc(pc, sl, wetting) = dsl/dpc
/// ```
///
/// with first derivatives `L = ∂Cc/∂pc` and `J = ∂Cc/∂sl`, and the
/// second-order set `(L, Lx, J, Jx, Jy)` where `Lx = ∂L/∂pc`, `Jx = ∂J/∂pc`,
/// and `Jy = ∂J/∂sl` (note `∂L/∂sl = Jx` by the symmetry of mixed partials).
/// Models with a direct algebraic relation additionally expose `sl(pc)`.
pub trait LiquidRetentionTrait: Send + Sync {
    /// Returns the saturation limits (sl_min, sl_max)
    fn saturation_limits(&self) -> (f64, f64);

    /// Calculates Cc(pc,sl) = dsl/dpc
    fn calc_cc(&self, pc: f64, sl: f64, wetting: bool) -> Result<f64, StrError>;

    /// Calculates L = ∂Cc/∂pc
    fn calc_ll(&self, pc: f64, sl: f64, wetting: bool) -> Result<f64, StrError>;

    /// Calculates J = ∂Cc/∂sl
    fn calc_jj(&self, pc: f64, sl: f64, wetting: bool) -> Result<f64, StrError>;

    /// Calculates the derivative set (L, Lx, J, Jx, Jy)
    fn calc_derivs(&self, pc: f64, sl: f64, wetting: bool) -> Result<(f64, f64, f64, f64, f64), StrError>;

    /// Calculates the saturation directly (non-rate models only)
    fn calc_sl(&self, _pc: f64) -> Option<f64> {
        None
    }
}

/// Holds the actual liquid retention model implementation
pub struct ModelLiquidRetention {
    /// Holds the actual model implementation
    pub actual: Box<dyn LiquidRetentionTrait>,
}

impl ModelLiquidRetention {
    /// Allocates a new instance
    pub fn new(param: &LiquidRetention) -> Result<Self, StrError> {
        let actual: Box<dyn LiquidRetentionTrait> = match *param {
            LiquidRetention::BrooksCorey {
                lambda,
                pc_ae,
                sl_min,
                sl_max,
            } => Box::new(ModelBrooksCorey::new(lambda, pc_ae, sl_min, sl_max)?),
            LiquidRetention::VanGenuchten {
                alpha,
                m,
                n,
                sl_min,
                sl_max,
                pc_min,
            } => Box::new(ModelVanGenuchten::new(alpha, m, n, sl_min, sl_max, pc_min)?),
            LiquidRetention::PedrosoWilliams {
                with_hysteresis,
                lambda_d,
                lambda_w,
                beta_d,
                beta_w,
                beta_1,
                beta_2,
                x_rd,
                x_rw,
                y_0,
                y_r,
            } => Box::new(ModelPedrosoWilliams::new(
                with_hysteresis,
                lambda_d,
                lambda_w,
                beta_d,
                beta_w,
                beta_1,
                beta_2,
                x_rd,
                x_rw,
                y_0,
                y_r,
            )?),
        };
        Ok(ModelLiquidRetention { actual })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
