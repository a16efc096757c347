use super::LiquidRetentionTrait;
use crate::StrError;

/// Holds the λ̄ factor and its partial derivatives with respect to x = ln(1+pc) and y = sl
struct PathVars {
    w: f64,    // λ̄
    w_x: f64,  // ∂λ̄/∂x
    w_y: f64,  // ∂λ̄/∂y
    w_xx: f64, // ∂²λ̄/∂x²
    w_xy: f64, // ∂²λ̄/∂x∂y
    w_yy: f64, // ∂²λ̄/∂y²
}

/// Implements the Pedroso-Williams model for liquid retention with hysteresis
///
/// The retention law is a rate equation `Cc = dsl/dpc = -λ̄/(1+pc)` where the
/// slope factor λ̄(x,y) follows either the drying or the wetting path in the
/// (x,y) = (ln(1+pc), sl) plane, with scanning-curve attenuation between the
/// main curves.
///
/// # References
///
/// 1. Pedroso DM, Zhang Y, Ehlers W (2017) Solution of liquid-gas-solid coupled
///    equations for porous media considering dynamics and hysteretic behavior,
///    ASCE Journal of Engineering Mechanics, 143:6(04017021)
/// 2. Pedroso DM (2015) A consistent u-p formulation for porous media with hysteresis,
///    Int. J. for Numerical Methods in Engineering, 101:606-634
pub struct ModelPedrosoWilliams {
    // params
    with_hysteresis: bool,
    lambda_d: f64,
    lambda_w: f64,
    beta_d: f64,
    beta_w: f64,
    beta_1: f64,
    beta_2: f64,
    y_0: f64,
    y_r: f64,

    // constants
    c1_d: f64,
    c2_d: f64,
    c3_d: f64,
    c1_w: f64,
    c2_w: f64,
    c3_w: f64,
}

impl ModelPedrosoWilliams {
    /// Allocates a new instance
    pub fn new(
        with_hysteresis: bool,
        lambda_d: f64,
        lambda_w: f64,
        beta_d: f64,
        beta_w: f64,
        beta_1: f64,
        beta_2: f64,
        x_rd: f64,
        x_rw: f64,
        y_0: f64,
        y_r: f64,
    ) -> Result<Self, StrError> {
        // check saturation limits
        if y_0 <= 0.0 || y_0 > 1.0 {
            return Err("y_0 parameter for the Pedroso-Williams retention model is invalid");
        }
        if y_r <= 0.0 || y_r >= y_0 {
            return Err("y_r parameter for the Pedroso-Williams retention model is invalid");
        }
        // check parameters for the drying path
        if x_rd <= 0.0 {
            return Err("x_rd parameter for the Pedroso-Williams retention model is invalid");
        }
        if lambda_d <= 0.0 {
            return Err("lambda_d parameter for the Pedroso-Williams retention model is invalid");
        }
        if beta_d <= 0.0 {
            return Err("beta_d parameter for the Pedroso-Williams retention model is invalid");
        }
        if beta_2 <= 0.0 {
            return Err("beta_2 parameter for the Pedroso-Williams retention model is invalid");
        }
        // compute constants for the drying path
        let c1_d = beta_d * lambda_d;
        let c2_d = f64::exp(beta_d * y_r);
        let c3_d = f64::exp(beta_d * (y_0 + lambda_d * x_rd)) - c2_d * f64::exp(c1_d * x_rd);
        // handle hysteresis option
        let (c1_w, c2_w, c3_w) = if with_hysteresis {
            // check parameters for the wetting path
            if lambda_w <= 0.0 {
                return Err("lambda_w parameter for the Pedroso-Williams retention model is invalid");
            }
            if beta_w <= 0.0 {
                return Err("beta_w parameter for the Pedroso-Williams retention model is invalid");
            }
            if beta_1 <= 0.0 {
                return Err("beta_1 parameter for the Pedroso-Williams retention model is invalid");
            }
            if x_rw <= 0.0 {
                return Err("x_rw parameter for the Pedroso-Williams retention model is invalid");
            }
            // compute constants for the wetting path
            let c1_w = -beta_w * lambda_w;
            let c2_w = f64::exp(-beta_w * y_0);
            let c3_w = f64::exp(-beta_w * lambda_w * x_rw) - c2_w * f64::exp(c1_w * x_rw);
            (c1_w, c2_w, c3_w)
        } else {
            (c1_d, c2_d, c3_d)
        };
        // return model
        Ok(ModelPedrosoWilliams {
            with_hysteresis,
            lambda_d,
            lambda_w,
            beta_d,
            beta_w,
            beta_1,
            beta_2,
            y_0,
            y_r,
            c1_d,
            c2_d,
            c3_d,
            c1_w,
            c2_w,
            c3_w,
        })
    }

    /// Checks the saturation range
    fn check_sl(&self, sl: f64) -> Result<(), StrError> {
        if sl < self.y_r {
            return Err("Pedroso-Williams retention model: sl cannot be smaller than y_r");
        }
        if sl > self.y_0 {
            return Err("Pedroso-Williams retention model: sl cannot be greater than y_0");
        }
        Ok(())
    }

    /// Calculates λ̄ and its partial derivatives for the drying path
    ///
    /// λ̄ = λ̄d(y)・exp(-β̄2(y)・D(x,y)) with D = max(yd(x) - y, 0) and β̄2 = β2・√y
    fn drying_path(&self, x: f64, y: f64) -> PathVars {
        // distance above the residual saturation
        let dd_d = f64::max(y - self.y_r, 0.0);
        let gate_d = if dd_d > 0.0 { 1.0 } else { 0.0 };
        let a = (1.0 - f64::exp(-self.beta_d * dd_d)) * self.lambda_d;
        let a_y = gate_d * self.beta_d * (self.lambda_d - a);
        let a_yy = -self.beta_d * a_y;

        // main drying curve and its slopes
        let ee = self.c2_d * f64::exp(self.c1_d * x);
        let tt = self.c3_d + ee;
        let y_d = -self.lambda_d * x + f64::ln(tt) / self.beta_d;
        let ydp = -self.lambda_d + self.c1_d * ee / (self.beta_d * tt);
        let ydpp = self.c1_d * self.c1_d * ee * self.c3_d / (self.beta_d * tt * tt);

        // distance below the main drying curve
        let dd = f64::max(y_d - y, 0.0);
        let gate = if dd > 0.0 { 1.0 } else { 0.0 };

        // saturation-dependent attenuation coefficient
        let yp = f64::max(y, 0.0);
        let b2 = self.beta_2 * f64::sqrt(yp);
        let b2_y = 0.5 * self.beta_2 * f64::powf(yp, -0.5);
        let b2_yy = -0.25 * self.beta_2 * f64::powf(yp, -1.5);

        // exponent B = β̄2・D and its partials
        let bb = b2 * dd;
        let bb_x = b2 * ydp * gate;
        let bb_y = b2_y * dd - b2 * gate;
        let bb_xx = b2 * ydpp * gate;
        let bb_xy = b2_y * ydp * gate;
        let bb_yy = b2_yy * dd - 2.0 * b2_y * gate;

        // λ̄ and partials
        let ex = f64::exp(-bb);
        let w = a * ex;
        PathVars {
            w,
            w_x: -w * bb_x,
            w_y: (a_y - a * bb_y) * ex,
            w_xx: w * (bb_x * bb_x - bb_xx),
            w_xy: -(a_y - a * bb_y) * ex * bb_x - w * bb_xy,
            w_yy: (a_yy - 2.0 * a_y * bb_y - a * bb_yy + a * bb_y * bb_y) * ex,
        }
    }

    /// Calculates λ̄ and its partial derivatives for the wetting path
    ///
    /// λ̄ = λ̄w(y)・exp(-β1・D(x,y)) with D = max(y - yw(x), 0)
    fn wetting_path(&self, x: f64, y: f64) -> PathVars {
        // distance below the maximum saturation
        let dd_w = f64::max(self.y_0 - y, 0.0);
        let gate_w = if dd_w > 0.0 { 1.0 } else { 0.0 };
        let a = (1.0 - f64::exp(-self.beta_w * dd_w)) * self.lambda_w;
        let a_y = -gate_w * self.beta_w * (self.lambda_w - a);
        let a_yy = self.beta_w * a_y;

        // main wetting curve and its slopes
        let ee = self.c2_w * f64::exp(self.c1_w * x);
        let tt = self.c3_w + ee;
        let y_w = -self.lambda_w * x - f64::ln(tt) / self.beta_w;
        let ywp = -self.lambda_w - self.c1_w * ee / (self.beta_w * tt);
        let ywpp = -self.c1_w * self.c1_w * ee * self.c3_w / (self.beta_w * tt * tt);

        // distance above the main wetting curve
        let dd = f64::max(y - y_w, 0.0);
        let gate = if dd > 0.0 { 1.0 } else { 0.0 };

        // exponent B = β1・D and its partials
        let bb = self.beta_1 * dd;
        let bb_x = -self.beta_1 * ywp * gate;
        let bb_y = self.beta_1 * gate;
        let bb_xx = -self.beta_1 * ywpp * gate;

        // λ̄ and partials
        let ex = f64::exp(-bb);
        let w = a * ex;
        PathVars {
            w,
            w_x: -w * bb_x,
            w_y: (a_y - a * bb_y) * ex,
            w_xx: w * (bb_x * bb_x - bb_xx),
            w_xy: -(a_y - a * bb_y) * ex * bb_x,
            w_yy: (a_yy - 2.0 * a_y * bb_y + a * bb_y * bb_y) * ex,
        }
    }

    /// Selects the path variables according to the wetting flag
    fn path_vars(&self, pc: f64, sl: f64, wetting: bool) -> PathVars {
        let x = f64::ln(1.0 + pc);
        if wetting && self.with_hysteresis {
            self.wetting_path(x, sl)
        } else {
            self.drying_path(x, sl)
        }
    }
}

impl LiquidRetentionTrait for ModelPedrosoWilliams {
    /// Returns the saturation limits (sl_min,sl_max)
    fn saturation_limits(&self) -> (f64, f64) {
        (self.y_r, self.y_0)
    }

    /// Calculates Cc(pc,sl) = dsl/dpc
    fn calc_cc(&self, pc: f64, sl: f64, wetting: bool) -> Result<f64, StrError> {
        if pc <= 0.0 {
            return Ok(0.0);
        }
        self.check_sl(sl)?;
        let v = self.path_vars(pc, sl, wetting);
        Ok(-v.w / (1.0 + pc))
    }

    /// Calculates L = ∂Cc/∂pc
    fn calc_ll(&self, pc: f64, sl: f64, wetting: bool) -> Result<f64, StrError> {
        if pc <= 0.0 {
            return Ok(0.0);
        }
        self.check_sl(sl)?;
        let v = self.path_vars(pc, sl, wetting);
        let d = 1.0 + pc;
        Ok((v.w - v.w_x) / (d * d))
    }

    /// Calculates J = ∂Cc/∂sl
    fn calc_jj(&self, pc: f64, sl: f64, wetting: bool) -> Result<f64, StrError> {
        if pc <= 0.0 {
            return Ok(0.0);
        }
        self.check_sl(sl)?;
        let v = self.path_vars(pc, sl, wetting);
        Ok(-v.w_y / (1.0 + pc))
    }

    /// Calculates the derivative set (L, Lx, J, Jx, Jy)
    fn calc_derivs(&self, pc: f64, sl: f64, wetting: bool) -> Result<(f64, f64, f64, f64, f64), StrError> {
        if pc <= 0.0 {
            return Ok((0.0, 0.0, 0.0, 0.0, 0.0));
        }
        self.check_sl(sl)?;
        let v = self.path_vars(pc, sl, wetting);
        let d = 1.0 + pc;
        let ll = (v.w - v.w_x) / (d * d);
        let lx = (3.0 * v.w_x - v.w_xx - 2.0 * v.w) / (d * d * d);
        let jj = -v.w_y / d;
        let jx = (v.w_y - v.w_xy) / (d * d);
        let jy = -v.w_yy / d;
        Ok((ll, lx, jj, jx, jy))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
