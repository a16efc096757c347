use super::{LocalStatePorous, ModelConductivity, ModelLiquidRetention};
use crate::base::{Conductivity, LiquidRetention, ParamFluids, ParamPorousLiq, ParamPorousSldLiq};
use crate::StrError;

/// Holds the results of the per-IP mixture evaluation (liquid-solid variables)
///
/// The derivatives with the `_dus` suffix are multipliers of `G[m][j]`, i.e.,
/// they give the sensitivity with respect to the divergence of the solid
/// displacement.
#[derive(Clone, Copy, Debug, Default)]
pub struct LsVars {
    /// Liquid partial density `ρl = nf・sl・ρL`
    pub a_rhol: f64,

    /// Total mixture density `ρ = nf・(sl・ρL + (1-sl)・ρG) + (1-nf)・ρS`
    pub a_rho: f64,

    /// Effective pressure `p = sl・pl`
    pub a_p: f64,

    /// Storage coefficient `Cpl = ∂ρl/∂pl = nf・(sl・Cl - ρL・C̄c)`
    pub cpl: f64,

    /// Kinematic coefficient `Cvs = ∂ρl/∂(divus) = sl・ρL・ns0`
    pub cvs: f64,

    /// `∂ρ/∂pl`
    pub drho_dpl: f64,

    /// `∂p/∂pl`
    pub dp_dpl: f64,

    /// `∂Cpl/∂pl`
    pub dcpl_dpl: f64,

    /// `∂Cvs/∂pl`
    pub dcvs_dpl: f64,

    /// `∂klr/∂pl`
    pub dklr_dpl: f64,

    /// `∂Cpl/∂(divus)` multiplier
    pub dcpl_dus: f64,

    /// `∂ρl/∂(divus)` multiplier
    pub drhol_dus: f64,

    /// `∂ρ/∂(divus)` multiplier
    pub drho_dus: f64,
}

/// Implements the porous-medium model for liquid retention, densities, and conductivities
///
/// The model integrates the retention state with a backward-Euler scheme over
/// the (possibly hysteretic) rate law `Cc(pc, sl, wetting)` and exposes the
/// consistent derivatives `C̄c = dsl/dpc` (ccb) and `dC̄c/dpc` (ccd) of the
/// updated saturation.
///
/// # References
///
/// 1. Pedroso DM (2015) A consistent u-p formulation for porous media with hysteresis.
///    Int Journal for Numerical Methods in Engineering, 101(8) 606-634
/// 2. Pedroso DM (2015) A solution to transient seepage in unsaturated porous media.
///    Computer Methods in Applied Mechanics and Engineering, 285 791-816
pub struct PorousMedium {
    /// Maximum number of iterations of the saturation update
    pub nmax_it: usize,

    /// Tolerance for the iterations of the saturation update
    pub itol: f64,

    /// Minimum effective value of the capillary pressure
    pub pc_zero: f64,

    /// Performs a Modified-Euler trial to start the saturation update
    pub me_trial: bool,

    /// Uses the backward-Euler update even for models with a direct sl(pc) relation
    pub all_be: bool,

    /// Uses the non-consistent method for all derivatives
    pub ncns: bool,

    /// Uses the non-consistent method for second-order derivatives only
    pub ncns2: bool,

    /// Initial porosity nf₀
    pub nf_ini: f64,

    /// Initial intrinsic (real) density of liquid ρL₀
    pub rho_ll_ini: f64,

    /// Initial intrinsic (real) density of gas ρG₀
    pub rho_gg_ini: f64,

    /// Intrinsic (real) density of solids ρS (constant)
    pub rho_ss: f64,

    /// Liquid compressibility `Cl = ρL₀/BulkL`
    pub cl: f64,

    /// Gas compressibility `Cg = 1/RTg`
    pub cg: f64,

    /// Saturated liquid conductivity divided by the reference gravity (3x3 diagonal)
    pub klsat: [[f64; 3]; 3],

    /// Model for the relative liquid conductivity
    pub conductivity: ModelConductivity,

    /// Model for the liquid retention behavior
    pub retention: ModelLiquidRetention,
}

impl PorousMedium {
    /// Allocates a new instance for coupled solid-liquid analyses
    pub fn new(fluids: &ParamFluids, param: &ParamPorousSldLiq) -> Result<Self, StrError> {
        PorousMedium::new_common(
            fluids,
            param.porosity_initial,
            param.density_solid,
            param.gref,
            &param.retention_liquid,
            &param.conductivity_liquid,
        )
    }

    /// Allocates a new instance for liquid-only (seepage) analyses
    pub fn new_liquid_only(fluids: &ParamFluids, param: &ParamPorousLiq) -> Result<Self, StrError> {
        PorousMedium::new_common(
            fluids,
            param.porosity_initial,
            0.0,
            param.gref,
            &param.retention_liquid,
            &param.conductivity_liquid,
        )
    }

    /// Allocates a new instance (common code)
    fn new_common(
        fluids: &ParamFluids,
        porosity_initial: f64,
        density_solid: f64,
        gref: f64,
        retention: &LiquidRetention,
        conductivity: &Conductivity,
    ) -> Result<Self, StrError> {
        // check
        if porosity_initial <= 0.0 || porosity_initial >= 1.0 {
            return Err("porosity_initial must be in (0, 1)");
        }
        if fluids.density_liquid.rho_ref <= 0.0 {
            return Err("reference liquid density must be positive");
        }
        if fluids.density_liquid.cc <= 0.0 {
            return Err("liquid compressibility must be positive");
        }
        if gref <= 0.0 {
            return Err("reference gravity must be positive");
        }
        let (kx, ky, kz) = conductivity.ksat();
        if kx < 0.0 || ky < 0.0 || kz < 0.0 {
            return Err("saturated conductivity components must be non-negative");
        }

        // gas constants (zero when the gas phase is absent)
        let (rho_gg_ini, cg) = match &fluids.density_gas {
            Some(p) => (p.rho_ref, p.cc),
            None => (0.0, 0.0),
        };

        // return model
        Ok(PorousMedium {
            nmax_it: 20,
            itol: 1e-9,
            pc_zero: 1e-10,
            me_trial: true,
            all_be: false,
            ncns: false,
            ncns2: false,
            nf_ini: porosity_initial,
            rho_ll_ini: fluids.density_liquid.rho_ref,
            rho_gg_ini,
            rho_ss: density_solid,
            cl: fluids.density_liquid.cc,
            cg,
            klsat: [
                [kx / gref, 0.0, 0.0],
                [0.0, ky / gref, 0.0],
                [0.0, 0.0, kz / gref],
            ],
            conductivity: ModelConductivity::new(conductivity)?,
            retention: ModelLiquidRetention::new(retention)?,
        })
    }

    /// Creates and initializes a new state
    ///
    /// The initial saturation follows from the capillary pressure `pc = pg - pl`:
    /// full saturation if `pc ≤ 0`; otherwise the saturation results from an
    /// update over the capillary pressure step `0 → pc` starting from the
    /// maximum saturation.
    pub fn new_state(&self, rho_ll: f64, rho_gg: f64, pl: f64, pg: f64) -> Result<LocalStatePorous, StrError> {
        let pc = pg - pl;
        let sl = if pc > self.pc_zero {
            let (_, sl_max) = self.retention.actual.saturation_limits();
            self.integrate_saturation(sl_max, 0.0, pc, false)?
        } else {
            1.0
        };
        Ok(LocalStatePorous {
            ns0: 1.0 - self.nf_ini,
            liquid_saturation: sl,
            rho_ll,
            rho_gg,
            delta_pc: 0.0,
            wetting: false,
        })
    }

    /// Updates the state with the (new) pressures and their increments
    ///
    /// `pl` and `pg` are the updated (new) values.
    pub fn update_state(
        &self,
        state: &mut LocalStatePorous,
        delta_pl: f64,
        delta_pg: f64,
        pl: f64,
        pg: f64,
    ) -> Result<(), StrError> {
        // auxiliary variables
        let (sl_min, _) = self.retention.actual.saturation_limits();
        let delta_pc = delta_pg - delta_pl;
        let wetting = delta_pc < 0.0;
        let pl0 = pl - delta_pl;
        let pg0 = pg - delta_pg;
        let pc0 = pg0 - pl0;
        let sl0 = state.liquid_saturation;
        let pc = pc0 + delta_pc;

        // update liquid saturation
        let sl = if pc <= self.pc_zero {
            1.0 // full liquid saturation if the capillary pressure is ineffective
        } else {
            self.integrate_saturation(sl0, pc0, delta_pc, wetting)?
        };

        // check results
        if pc < 0.0 && sl < 1.0 {
            return Err("inconsistent results: saturation must be equal to one when the capillary pressure is ineffective");
        }
        if sl < sl_min {
            return Err("inconsistent results: saturation must be greater than the minimum saturation");
        }

        // set state
        state.liquid_saturation = sl;
        state.rho_ll += self.cl * delta_pl;
        state.rho_gg += self.cg * delta_pg;
        state.delta_pc = delta_pc;
        state.wetting = wetting;
        Ok(())
    }

    /// Integrates the saturation over a capillary pressure increment
    ///
    /// Either evaluates the direct algebraic relation (non-rate models) or
    /// performs the trial prediction followed by the backward-Euler fixed
    /// point on `r(sl) = sl - sl0 - Δpc・Cc(pc, sl, wetting)`.
    fn integrate_saturation(&self, sl0: f64, pc0: f64, delta_pc: f64, wetting: bool) -> Result<f64, StrError> {
        let lrm = &self.retention.actual;
        let (sl_min, _) = lrm.saturation_limits();
        let pc = pc0 + delta_pc;

        // handle models with a direct sl(pc) relation
        if !self.all_be {
            if let Some(sl) = lrm.calc_sl(pc) {
                return Ok(sl);
            }
        }

        // trial saturation update
        let f_a = lrm.calc_cc(pc0, sl0, wetting)?;
        let mut sl = if self.me_trial {
            let sl_fe = sl0 + delta_pc * f_a;
            let f_b = lrm.calc_cc(pc, sl_fe, wetting)?;
            sl0 + 0.5 * delta_pc * (f_a + f_b)
        } else {
            sl0 + delta_pc * f_a
        };

        // fix trial out-of-range values
        if sl < sl_min {
            sl = sl_min;
        }
        if sl > 1.0 {
            sl = 1.0;
        }

        // backward-Euler update
        let mut converged = false;
        for _ in 0..self.nmax_it {
            let f = lrm.calc_cc(pc, sl, wetting)?;
            let r = sl - sl0 - delta_pc * f;
            if f64::abs(r) < self.itol {
                converged = true;
                break;
            }
            let jj = lrm.calc_jj(pc, sl, wetting)?;
            let delta_sl = -r / (1.0 - delta_pc * jj);
            sl += delta_sl;
            if f64::is_nan(sl) {
                return Err("NaN found in the saturation update");
            }
        }
        if !converged {
            return Err("saturation update failed to converge");
        }
        Ok(sl)
    }

    /// Returns `C̄c = dsl/dpc` consistent with the update method
    ///
    /// See Eq. (54) on page 618 of Reference #1
    pub fn ccb(&self, state: &LocalStatePorous, pc: f64) -> Result<f64, StrError> {
        let lrm = &self.retention.actual;
        let sl = state.liquid_saturation;
        let wetting = state.wetting;
        let delta_pc = state.delta_pc;
        let f = lrm.calc_cc(pc, sl, wetting)?; // @ n+1
        if self.ncns {
            // non-consistent
            return Ok(f);
        }
        let ll = lrm.calc_ll(pc, sl, wetting)?; // @ n+1
        let jj = lrm.calc_jj(pc, sl, wetting)?; // @ n+1
        Ok((f + delta_pc * ll) / (1.0 - delta_pc * jj))
    }

    /// Returns `dC̄c/dpc` consistent with the update method
    ///
    /// See Eqs. (55) and (56) on page 618 of Reference #1
    pub fn ccd(&self, state: &LocalStatePorous, pc: f64) -> Result<f64, StrError> {
        let lrm = &self.retention.actual;
        let sl = state.liquid_saturation;
        let wetting = state.wetting;
        let delta_pc = state.delta_pc;
        if self.ncns || self.ncns2 {
            // non-consistent
            return lrm.calc_ll(pc, sl, wetting); // @ n+1
        }
        let f = lrm.calc_cc(pc, sl, wetting)?; // @ n+1
        let (ll, lx, jj, jx, jy) = lrm.calc_derivs(pc, sl, wetting)?;
        let ly = jx; // symmetry of mixed partials
        let ccb = (f + delta_pc * ll) / (1.0 - delta_pc * jj);
        let ll_tot = lx + ly * ccb;
        let jj_tot = jx + jy * ccb;
        Ok((2.0 * ll + delta_pc * ll_tot + (2.0 * jj + delta_pc * jj_tot) * ccb) / (1.0 - delta_pc * jj))
    }

    /// Calculates the mixture variables for liquid-solid analyses (per IP)
    ///
    /// The gas pressure is atmospheric (zero) in the u-p formulation, thus
    /// `pc = -pl`. With `derivs = true`, all sensitivities required by the
    /// coupled Jacobian are evaluated using the consistent derivatives.
    pub fn calc_ls(
        &self,
        res: &mut LsVars,
        state: &LocalStatePorous,
        pl: f64,
        divus: f64,
        derivs: bool,
    ) -> Result<(), StrError> {
        // auxiliary
        let ns0 = state.ns0;
        let sl = state.liquid_saturation;
        let sg = 1.0 - sl;
        let rho_ll = state.rho_ll;
        let rho_gg = state.rho_gg;
        let cl = self.cl;
        let pc = -pl;
        let ns = (1.0 - divus) * ns0;
        let nf = 1.0 - ns;

        // density and pressure variables
        res.a_rhol = nf * sl * rho_ll;
        res.a_rho = nf * (sl * rho_ll + sg * rho_gg) + ns * self.rho_ss;
        res.a_p = sl * pl;

        // moduli
        let ccb = self.ccb(state, pc)?;
        res.cpl = nf * (sl * cl - rho_ll * ccb);
        res.cvs = sl * rho_ll * ns0;

        // derivatives
        if derivs {
            let ccd = self.ccd(state, pc)?;
            let dklr_dsl = self.conductivity.dklr_dsl(sl);

            // derivatives with respect to pl (note dsl/dpl = -C̄c and dC̄c/dpl = -dC̄c/dpc)
            res.drho_dpl = nf * (sl * cl - (rho_ll - rho_gg) * ccb);
            res.dp_dpl = sl - pl * ccb;
            res.dcpl_dpl = nf * (rho_ll * ccd - 2.0 * cl * ccb);
            res.dcvs_dpl = ns0 * (sl * cl - rho_ll * ccb);
            res.dklr_dpl = -dklr_dsl * ccb;

            // derivatives with respect to divus (multipliers)
            res.dcpl_dus = ns0 * (sl * cl - rho_ll * ccb);
            res.drhol_dus = ns0 * sl * rho_ll;
            res.drho_dus = ns0 * (sl * rho_ll + sg * rho_gg - self.rho_ss);
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{LsVars, PorousMedium};
    use crate::base::{ParamFluids, ParamPorousLiq, ParamPorousSldLiq};
    use russell_lab::approx_eq;

    #[test]
    fn new_handles_errors() {
        let fluids = ParamFluids::sample_water();
        let mut param = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        param.porosity_initial = 1.5;
        assert_eq!(
            PorousMedium::new(&fluids, &param).err(),
            Some("porosity_initial must be in (0, 1)")
        );
        let mut param = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        param.gref = 0.0;
        assert_eq!(
            PorousMedium::new(&fluids, &param).err(),
            Some("reference gravity must be positive")
        );
    }

    #[test]
    fn new_works() {
        let fluids = ParamFluids::sample_water();
        let param = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let model = PorousMedium::new(&fluids, &param).unwrap();
        assert_eq!(model.nmax_it, 20);
        assert_eq!(model.itol, 1e-9);
        assert_eq!(model.pc_zero, 1e-10);
        assert!(model.me_trial);
        assert!(!model.all_be);
        approx_eq(model.klsat[0][0], 0.1 / 10.0, 1e-15);
        assert_eq!(model.klsat[0][1], 0.0);
        assert_eq!(model.cg, 0.0);

        let pl = ParamPorousLiq::sample_brooks_corey_constant();
        let model = PorousMedium::new_liquid_only(&fluids, &pl).unwrap();
        assert_eq!(model.rho_ss, 0.0);
    }

    #[test]
    fn new_state_works() {
        let fluids = ParamFluids::sample_water();
        let param = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let model = PorousMedium::new(&fluids, &param).unwrap();

        // saturated: pg ≤ pl
        let state = model.new_state(1.0, 0.0, 10.0, 0.0).unwrap();
        assert_eq!(state.liquid_saturation, 1.0);
        assert_eq!(state.ns0, 1.0 - 0.4);
        assert_eq!(state.delta_pc, 0.0);
        assert!(!state.wetting);

        // unsaturated: pc = 1.0 > pc_ae = 0.1 ⇒ sl = 0.1 + 0.9 (0.1/1)^0.1
        let state = model.new_state(1.0, 0.0, -1.0, 0.0).unwrap();
        let correct = 0.1 + 0.9 * f64::powf(0.1, 0.1);
        approx_eq(state.liquid_saturation, correct, 1e-14);
        assert!(state.liquid_saturation > 0.1 && state.liquid_saturation < 1.0);
    }

    #[test]
    fn update_state_works_saturated_branch() {
        let fluids = ParamFluids::sample_water();
        let param = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let model = PorousMedium::new(&fluids, &param).unwrap();
        let mut state = model.new_state(1.0, 0.0, 10.0, 0.0).unwrap();

        // increasing the liquid pressure keeps full saturation and compresses the liquid
        model.update_state(&mut state, 5.0, 0.0, 15.0, 0.0).unwrap();
        assert_eq!(state.liquid_saturation, 1.0);
        approx_eq(state.rho_ll, 1.0 + model.cl * 5.0, 1e-15);
        assert_eq!(state.delta_pc, -5.0);
        assert!(state.wetting);
    }

    #[test]
    fn calc_ls_works_saturated() {
        let fluids = ParamFluids::sample_water();
        let param = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let model = PorousMedium::new(&fluids, &param).unwrap();
        let state = model.new_state(1.0, 0.0, 10.0, 0.0).unwrap();
        let mut res = LsVars::default();
        model.calc_ls(&mut res, &state, 10.0, 0.0, true).unwrap();
        // nf = nf0 at divus = 0; saturated: sl = 1, C̄c = 0
        approx_eq(res.a_rhol, 0.4 * 1.0, 1e-15);
        approx_eq(res.a_rho, 0.4 * 1.0 + 0.6 * 2.7, 1e-15);
        approx_eq(res.a_p, 10.0, 1e-15);
        approx_eq(res.cpl, 0.4 * model.cl, 1e-15);
        approx_eq(res.cvs, 0.6, 1e-15);
        approx_eq(res.dp_dpl, 1.0, 1e-15);
        assert_eq!(res.dklr_dpl, 0.0);
    }
}
