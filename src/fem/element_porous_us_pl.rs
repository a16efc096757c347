use super::{ElementLiquid, ElementSolid, ElementTrait, FemBase, FemState};
use crate::base::{Config, Natural, ParamFluids, ParamPorousSldLiq};
use crate::material::{LsVars, PorousMedium};
use crate::StrError;
use gemlab::mesh::{Cell, CellId, Mesh};
use russell_lab::{Matrix, Vector};

/// Holds the output quantities at one integration point of the coupled element
#[derive(Clone, Debug)]
pub struct IpOutput {
    /// Real coordinates of the integration point
    pub x: Vec<f64>,

    /// Liquid saturation
    pub sl: f64,

    /// Liquid pressure
    pub pl: f64,

    /// Current porosity
    pub nf: f64,

    /// Relative liquid conductivity
    pub klr: f64,

    /// Filter (Darcy) velocity of the liquid
    pub wl: Vec<f64>,

    /// Effective stress components (Mandel basis)
    pub stress: Vec<f64>,
}

/// Implements the local equations of the coupled porous element (u-p formulation)
///
/// The element couples the momentum balance of the mixture (solid displacement
/// unknowns) with the mass balance of the liquid (liquid pressure unknowns at
/// the corner nodes). Both sub-elements share the integration rule of the
/// displacement interpolation. The local system is ordered as
///
/// ```text
///  _              _
/// |  Kuu Kup  0    |
/// |  Kpu Kpp Kpf   |
/// |_  0  Kfp Kff  _|
/// ```
///
/// where the f-rows are the liquid boundary flux unknowns of seepage faces,
/// whose Jacobian couples both fields through the ρl extrapolation.
///
/// # References
///
/// 1. Pedroso DM (2015) A consistent u-p formulation for porous media with hysteresis.
///    Int Journal for Numerical Methods in Engineering, 101(8) 606-634
/// 2. Pedroso DM (2015) A solution to transient seepage in unsaturated porous media.
///    Computer Methods in Applied Mechanics and Engineering, 285 791-816
pub struct ElementPorousUsPl<'a> {
    /// Number of space dimensions
    pub ndim: usize,

    /// Global configuration
    pub config: &'a Config<'a>,

    /// The cell corresponding to this element
    pub cell: &'a Cell,

    /// Displacement (solid) sub-element
    pub u: ElementSolid<'a>,

    /// Liquid pressure sub-element
    pub p: ElementLiquid<'a>,

    /// Combined local-to-global mapping (u DOFs, then pl DOFs, then fl DOFs)
    pub l2g: Vec<usize>,

    /// At-rest earth pressure coefficient for the geostatic initialization
    pub earth_pres_coef_ini: f64,

    /// Divergence of the solid displacement at the current integration point
    pub divus: f64,

    /// Body acceleration term bs = α1・us - ζs - g at the current integration point
    pub bs: Vector,

    /// Seepage forcing hl = -ρL・bs - ∇pl at the current integration point
    pub hl: Vector,

    /// ∂ρl/∂us extrapolated to the nodes (np, nu); allocated only with seepage faces
    pub drho_ldus_ex: Matrix,

    /// Scratch for the Kpp flux derivative
    tmp: Vector,
}

impl<'a> ElementPorousUsPl<'a> {
    /// Allocates a new instance
    pub fn new(
        mesh: &'a Mesh,
        base: &FemBase,
        config: &'a Config<'a>,
        cell_id: CellId,
        fluids: &ParamFluids,
        param: &ParamPorousSldLiq,
        natural: Option<&'a Natural<'a>>,
    ) -> Result<Self, StrError> {
        let ndim = mesh.ndim;
        let cell = &mesh.cells[cell_id];

        // sub-elements (sharing the integration rule of the displacement interpolation)
        let u = ElementSolid::new(mesh, base, config, cell_id, &param.stress_strain, param.ngauss, natural)?;
        let model = PorousMedium::new(fluids, param)?;
        let p = ElementLiquid::new_coupled(mesh, base, config, cell_id, model, param.ngauss, natural)?;
        assert_eq!(u.calc.ngauss(), p.calc.ngauss());

        // combined local-to-global mapping
        let mut l2g = u.umap.clone();
        l2g.extend(&p.pmap);
        l2g.extend(&p.fmap);

        // seepage coupling accumulator
        let (nu, np) = (u.umap.len(), p.pmap.len());
        let drho_ldus_ex = if p.do_extrap {
            Matrix::new(np, nu)
        } else {
            Matrix::new(0, 0)
        };

        Ok(ElementPorousUsPl {
            ndim,
            config,
            cell,
            u,
            p,
            l2g,
            earth_pres_coef_ini: param.earth_pres_coef_ini,
            divus: 0.0,
            bs: Vector::new(ndim),
            hl: Vector::new(ndim),
            drho_ldus_ex,
            tmp: Vector::new(ndim),
        })
    }

    /// Computes the kinematic and flow variables at an integration point
    ///
    /// Evaluates both interpolations, recovers `us`, `divus`, `pl`, and `∇pl`
    /// from the solution, and computes `bs` and `hl`. Returns `(det(J), pl)`.
    fn ipvars(&mut self, index: usize, state: &FemState) -> Result<(f64, f64), StrError> {
        // interpolation functions and gradients
        let det_jac = self.u.calc.calc_at_ip(index, true)?;
        self.p.calc.calc_at_ip(index, true)?;

        // auxiliary
        let ndim = self.ndim;
        let rho_ll = state.gauss[self.cell.id].porous[index].rho_ll;
        self.p.compute_gvec(state.t);

        // recover u-variables
        let nnode = self.cell.points.len();
        self.divus = 0.0;
        for i in 0..ndim {
            self.u.us[i] = 0.0;
            for m in 0..nnode {
                let r = self.u.umap[i + m * ndim];
                self.u.us[i] += self.u.calc.pad.interp[m] * state.uu[r];
                self.divus += self.u.calc.pad.gradient.get(m, i) * state.uu[r];
            }
        }

        // recover p-variables
        let pl = self.p.calc_pl_and_gradient(&state.uu);

        // compute bs and hl
        for i in 0..ndim {
            self.bs[i] = state.alpha1 * self.u.us[i] - self.u.zeta_s[index][i] - self.p.g[i];
            self.hl[i] = -rho_ll * self.bs[i] - self.p.gpl[i];
        }
        Ok((det_jac, pl))
    }

    /// Sets the initial internal values, optionally from total vertical stresses
    ///
    /// When `svt_k0` is given as (svT, K0) -- the total vertical stress at
    /// each integration point and the at-rest coefficient -- the effective
    /// stresses follow from `svE = svT + sl・pl` and `shE = K0・svE`, with the
    /// vertical axis being y in 2D and z in 3D. Otherwise the current stress
    /// state is kept and only the internal values are initialized.
    pub fn set_initial_ivs(&mut self, state: &mut FemState, svt_k0: Option<(&[f64], f64)>) -> Result<(), StrError> {
        // liquid states first (the saturation enters the effective stress)
        self.p.initialize_internal_values(state)?;

        match svt_k0 {
            Some((svt, k0)) => {
                let nip = self.u.calc.ngauss();
                if svt.len() != nip {
                    return Err("svT must have one value per integration point");
                }
                let np = self.p.pmap.len();
                let mut sx = vec![0.0; nip];
                let mut sy = vec![0.0; nip];
                let mut sz = vec![0.0; nip];
                for index in 0..nip {
                    // liquid pressure at this integration point
                    self.p.calc.calc_at_ip(index, false)?;
                    let mut pl = 0.0;
                    for m in 0..np {
                        pl += self.p.calc.pad.interp[m] * state.uu[self.p.pmap[m]];
                    }

                    // effective stresses
                    let sl = state.gauss[self.cell.id].porous[index].liquid_saturation;
                    let p_eff = pl * sl;
                    let sv_e = svt[index] + p_eff;
                    let sh_e = k0 * sv_e;
                    if self.ndim == 2 {
                        sx[index] = sh_e;
                        sy[index] = sv_e;
                        sz[index] = sh_e;
                    } else {
                        sx[index] = sh_e;
                        sy[index] = sh_e;
                        sz[index] = sv_e;
                    }
                }
                self.u.set_initial_stress_components(state, &sx, &sy, &sz)
            }
            None => self.u.initialize_internal_values(state),
        }
    }

    /// Recomputes the reference solid fraction after the displacements have been zeroed
    ///
    /// Used by geostatic stage transitions: `ns0 = (1 - divus)・(1 - nf0)` is
    /// evaluated with the current displacements and mirrored into the backup.
    pub fn reset_reference_solid_fraction(&mut self, state: &mut FemState) -> Result<(), StrError> {
        let ndim = self.ndim;
        let nnode = self.cell.points.len();
        for index in 0..self.u.calc.ngauss() {
            self.u.calc.calc_at_ip(index, true)?;
            let mut divus = 0.0;
            for m in 0..nnode {
                for i in 0..ndim {
                    let r = self.u.umap[i + m * ndim];
                    divus += self.u.calc.pad.gradient.get(m, i) * state.uu[r];
                }
            }
            let ns0 = (1.0 - divus) * (1.0 - self.p.model.nf_ini);
            state.gauss[self.cell.id].porous[index].ns0 = ns0;
            self.p.backup_ns0(index, ns0);
        }
        Ok(())
    }

    /// Computes the output quantities at all integration points
    pub fn output_ip_data(&mut self, state: &FemState) -> Result<Vec<IpOutput>, StrError> {
        let ndim = self.ndim;
        self.u.interpolate_star_vars(state)?; // ensure ζs is current
        let mut data = Vec::with_capacity(self.u.calc.ngauss());
        for index in 0..self.u.calc.ngauss() {
            let (_, pl) = self.ipvars(index, state)?;
            let porous_state = &state.gauss[self.cell.id].porous[index];
            let solid_state = &state.gauss[self.cell.id].solid[index];
            let sl = porous_state.liquid_saturation;
            let rho_ll = porous_state.rho_ll;
            let klr = self.p.model.conductivity.klr(sl);
            let ns = (1.0 - self.divus) * porous_state.ns0;
            let mut wl = vec![0.0; ndim];
            for i in 0..ndim {
                for j in 0..ndim {
                    wl[i] += klr * self.p.model.klsat[i][j] * self.hl[j] / rho_ll;
                }
            }
            let mut x = Vector::new(ndim);
            self.u.calc.ip_coords(&mut x, index)?;
            data.push(IpOutput {
                x: x.as_data().clone(),
                sl,
                pl,
                nf: 1.0 - ns,
                klr,
                wl,
                stress: solid_state.stress.vector().as_data().clone(),
            });
        }
        Ok(data)
    }
}

impl<'a> ElementTrait for ElementPorousUsPl<'a> {
    /// The coupled system is non-symmetric by construction
    fn symmetric_jacobian(&self) -> bool {
        false
    }

    /// Returns the local-to-global mapping
    fn local_to_global(&self) -> &Vec<usize> {
        &self.l2g
    }

    /// Initializes the internal variables (saturation from pressures; stress model internals)
    fn initialize_internal_values(&mut self, state: &mut FemState) -> Result<(), StrError> {
        self.set_initial_ivs(state, None)
    }

    /// Interpolates the star variables of both sub-elements to the integration points
    fn interpolate_star_vars(&mut self, state: &FemState) -> Result<(), StrError> {
        self.u.interpolate_star_vars(state)?;
        self.p.interpolate_star_vars(state)
    }

    /// Calculates the coupled vector of internal forces
    fn calc_f_int(&mut self, f_int: &mut Vector, state: &FemState) -> Result<(), StrError> {
        f_int.fill(0.0);
        self.p.clear_extrapolation();
        let ndim = self.ndim;
        let u_nnode = self.cell.points.len();
        let (nu, np) = (self.u.umap.len(), self.p.pmap.len());
        let axisymmetric = self.config.ideal.axisymmetric;
        for index in 0..self.u.calc.ngauss() {
            // kinematic and flow variables
            let (det_jac, pl) = self.ipvars(index, state)?;
            let mut coef = det_jac * self.u.calc.weight(index);
            if axisymmetric {
                coef *= self.u.calc.radius();
            }

            // mixture variables
            let porous_state = &state.gauss[self.cell.id].porous[index];
            let sl = porous_state.liquid_saturation;
            let klr = self.p.model.conductivity.klr(sl);
            let mut res = LsVars::default();
            self.p.model.calc_ls(&mut res, porous_state, pl, self.divus, false)?;

            // transient variables
            let divvs = state.alpha4 * self.divus - self.u.div_chi_s[index];
            let plt = state.beta1 * pl - self.p.psi_l[index];

            // relative liquid flux
            for i in 0..ndim {
                self.p.rho_wl[i] = 0.0;
                for j in 0..ndim {
                    self.p.rho_wl[i] += klr * self.p.model.klsat[i][j] * self.hl[j];
                }
            }

            // p: mass balance rows
            for m in 0..np {
                let sb_m = self.p.calc.pad.interp[m];
                f_int[nu + m] += coef * sb_m * (res.cpl * plt + res.cvs * divvs);
                for i in 0..ndim {
                    f_int[nu + m] -= coef * self.p.calc.pad.gradient.get(m, i) * self.p.rho_wl[i];
                }
                if self.p.do_extrap {
                    self.p.rho_l_ex[m] += self.p.emat.get(m, index) * res.a_rhol;
                }
            }

            // u: momentum balance rows (general tensor form)
            let sigma = &state.gauss[self.cell.id].solid[index].stress;
            for m in 0..u_nnode {
                let sm = self.u.calc.pad.interp[m];
                for i in 0..ndim {
                    let r = i + m * ndim;
                    f_int[r] += coef * sm * res.a_rho * self.bs[i];
                    f_int[r] -= coef * res.a_p * self.u.calc.pad.gradient.get(m, i);
                    for j in 0..ndim {
                        f_int[r] += coef * sigma.get(i, j) * self.u.calc.pad.gradient.get(m, j);
                    }
                }
            }
        }

        // seepage faces
        if self.p.has_seep {
            self.p.add_natbcs_to_f_int(f_int, state, nu, nu + np)?;
        }
        Ok(())
    }

    /// Calculates the vector of external forces (tractions and prescribed fluxes)
    fn calc_f_ext(&mut self, f_ext: &mut Vector, time: f64) -> Result<(), StrError> {
        f_ext.fill(0.0);
        let nu = self.u.umap.len();
        self.u.calc_f_ext(f_ext, time)?;
        self.p.add_natbcs_to_f_ext(f_ext, time, nu)
    }

    /// Calculates the coupled Jacobian matrix
    fn calc_jacobian(&mut self, kke: &mut Matrix, state: &FemState, first_iteration: bool) -> Result<(), StrError> {
        kke.fill(0.0);
        self.p.kpp.fill(0.0);
        self.p.kpf.fill(0.0);
        self.p.kfp.fill(0.0);
        self.p.kff.fill(0.0);
        self.p.clear_extrapolation();
        if self.p.do_extrap {
            self.drho_ldus_ex.fill(0.0);
        }
        let ndim = self.ndim;
        let u_nnode = self.cell.points.len();
        let (nu, np, nf) = (self.u.umap.len(), self.p.pmap.len(), self.p.fmap.len());
        let axisymmetric = self.config.ideal.axisymmetric;
        let cl = self.p.model.cl;
        for index in 0..self.u.calc.ngauss() {
            // kinematic and flow variables
            let (det_jac, pl) = self.ipvars(index, state)?;
            let mut coef = det_jac * self.u.calc.weight(index);
            if axisymmetric {
                coef *= self.u.calc.radius();
            }

            // mixture variables (with derivatives)
            let porous_state = &state.gauss[self.cell.id].porous[index];
            let sl = porous_state.liquid_saturation;
            let rho_ll = porous_state.rho_ll;
            let klr = self.p.model.conductivity.klr(sl);
            let mut res = LsVars::default();
            self.p.model.calc_ls(&mut res, porous_state, pl, self.divus, true)?;

            // transient variables
            let divvs = state.alpha4 * self.divus - self.u.div_chi_s[index];
            let plt = state.beta1 * pl - self.p.psi_l[index];

            // Kpu, Kup, and Kpp
            for n in 0..np {
                let sb_n = self.p.calc.pad.interp[n];
                for j in 0..ndim {
                    // Kpu := ∂Rl/∂us and Kup := ∂Rus/∂pl
                    for m in 0..u_nnode {
                        let c = j + m * ndim;
                        let sm = self.u.calc.pad.interp[m];
                        let g_mj = self.u.calc.pad.gradient.get(m, j);

                        // storage and kinematic terms
                        kke.add(
                            nu + n,
                            c,
                            coef * sb_n * (res.dcpl_dus * plt + state.alpha4 * res.cvs) * g_mj,
                        );

                        // flux term through the solid acceleration
                        for i in 0..ndim {
                            kke.add(
                                nu + n,
                                c,
                                coef * self.p.calc.pad.gradient.get(n, i)
                                    * sm
                                    * state.alpha1
                                    * rho_ll
                                    * klr
                                    * self.p.model.klsat[i][j],
                            );
                        }

                        // mixture weight and effective pressure terms
                        kke.add(
                            c,
                            nu + n,
                            coef * (sm * sb_n * res.drho_dpl * self.bs[j] - g_mj * sb_n * res.dp_dpl),
                        );

                        // for seepage faces
                        if self.p.do_extrap {
                            self.drho_ldus_ex
                                .add(n, c, self.p.emat.get(n, index) * res.drhol_dus * g_mj);
                        }
                    }

                    // term in brackets of the flux derivative
                    self.tmp[j] = sb_n * res.dklr_dpl * self.hl[j]
                        - klr * (sb_n * cl * self.bs[j] + self.p.calc.pad.gradient.get(n, j));
                }

                // Kpp := ∂Rl/∂pl
                for m in 0..np {
                    let sb_m = self.p.calc.pad.interp[m];
                    self.p.kpp.add(
                        m,
                        n,
                        coef * sb_m * sb_n * (res.dcpl_dpl * plt + res.dcvs_dpl * divvs + state.beta1 * res.cpl),
                    );
                    for i in 0..ndim {
                        for j in 0..ndim {
                            self.p.kpp.add(
                                m,
                                n,
                                -coef * self.p.calc.pad.gradient.get(m, i) * self.p.model.klsat[i][j] * self.tmp[j],
                            );
                        }
                    }
                    if self.p.do_extrap {
                        self.p.drho_ldpl_ex.add(m, n, self.p.emat.get(m, index) * res.cpl * sb_n);
                    }
                }
                if self.p.do_extrap {
                    self.p.rho_l_ex[n] += self.p.emat.get(n, index) * res.a_rhol;
                }
            }

            // Kuu: mixture weight terms
            for m in 0..u_nnode {
                let sm = self.u.calc.pad.interp[m];
                for i in 0..ndim {
                    let r = i + m * ndim;
                    for n in 0..u_nnode {
                        let sn = self.u.calc.pad.interp[n];
                        for j in 0..ndim {
                            let c = j + n * ndim;
                            let delta_ij = if i == j { 1.0 } else { 0.0 };
                            kke.add(
                                r,
                                c,
                                coef * sm
                                    * (sn * state.alpha1 * res.a_rho * delta_ij
                                        + res.drho_dus * self.bs[i] * self.u.calc.pad.gradient.get(n, j)),
                            );
                        }
                    }
                }
            }

            // Kuu: stiffness term with the consistent tangent modulus
            self.u
                .model
                .actual
                .stiffness(&mut self.u.dd, &state.gauss[self.cell.id].solid[index], first_iteration)?;
            let gg = &self.u.calc.pad.gradient;
            for m in 0..u_nnode {
                for i in 0..ndim {
                    let r = i + m * ndim;
                    for n in 0..u_nnode {
                        for j in 0..ndim {
                            let c = j + n * ndim;
                            let mut value = 0.0;
                            for k in 0..ndim {
                                for l in 0..ndim {
                                    value += gg.get(m, k) * self.u.dd.get(i, k, j, l) * gg.get(n, l);
                                }
                            }
                            kke.add(r, c, coef * value);
                        }
                    }
                }
            }
        }

        // seepage face contributions (Kpp, Kpf, Kfp, Kff, and the coupled Kpu block)
        if self.p.has_seep {
            self.p.add_natbcs_to_jac(state)?;
            self.p.add_natbcs_to_jac_coupled(kke, state, nu, &self.drho_ldus_ex)?;
        }

        // copy the liquid sub-matrices into the local system
        for m in 0..np {
            for n in 0..np {
                kke.add(nu + m, nu + n, self.p.kpp.get(m, n));
            }
            for b in 0..nf {
                kke.add(nu + m, nu + np + b, self.p.kpf.get(m, b));
                kke.add(nu + np + b, nu + m, self.p.kfp.get(b, m));
            }
        }
        for a in 0..nf {
            for b in 0..nf {
                kke.add(nu + np + a, nu + np + b, self.p.kff.get(a, b));
            }
        }
        Ok(())
    }

    /// Updates the stresses and saturation states with the solution increments
    fn update_secondary_values(&mut self, state: &mut FemState) -> Result<(), StrError> {
        self.u.update_secondary_values(state)?;
        self.p.update_secondary_values(state)
    }

    /// Creates a copy of the secondary values of both sub-elements
    fn backup_secondary_values(&mut self, state: &FemState) {
        self.u.backup_secondary_values(state);
        self.p.backup_secondary_values(state);
    }

    /// Restores the secondary values of both sub-elements from the backups
    fn restore_secondary_values(&self, state: &mut FemState) {
        self.u.restore_secondary_values(state);
        self.p.restore_secondary_values(state);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ElementPorousUsPl;
    use crate::base::{Config, Elem, ParamFluids, ParamPorousSldLiq};
    use crate::fem::{ControlTime, ElementTrait, FemBase, FemState};
    use gemlab::mesh::Samples;
    use russell_lab::{approx_eq, Vector};

    #[test]
    fn new_works() {
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let base = FemBase::new(&mesh, [(1, Elem::PorousSldLiq(p1))]).unwrap();
        let config = Config::new(&mesh);
        let elem = ElementPorousUsPl::new(&mesh, &base, &config, 0, &fluids, &p1, None).unwrap();
        // Qua4 pair: 8 u DOFs + 4 pl DOFs
        assert_eq!(elem.u.umap.len(), 8);
        assert_eq!(elem.p.pmap.len(), 4);
        assert_eq!(elem.l2g.len(), 12);
        assert!(!elem.symmetric_jacobian());
    }

    #[test]
    fn lbb_pair_uses_corner_nodes() {
        let mesh = Samples::block_2d_four_qua8();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let base = FemBase::new(&mesh, [(1, Elem::PorousSldLiq(p1))]).unwrap();
        let config = Config::new(&mesh);
        let elem = ElementPorousUsPl::new(&mesh, &base, &config, 0, &fluids, &p1, None).unwrap();
        // Qua8/Qua4 pair: 16 u DOFs + 4 pl DOFs at the corners
        assert_eq!(elem.u.umap.len(), 16);
        assert_eq!(elem.p.pmap.len(), 4);
        assert_eq!(elem.u.calc.ngauss(), elem.p.calc.ngauss());
    }

    #[test]
    fn initialization_and_residual_work_saturated() {
        // hydrostatic liquid pressure and zero stresses: the pressure rows
        // vanish and the momentum rows carry only the mixture weight
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let base = FemBase::new(&mesh, [(1, Elem::PorousSldLiq(p1))]).unwrap();
        let mut config = Config::new(&mesh);
        config.set_gravity(|_| 10.0).set_dt(|_| 1.0);
        let mut elem = ElementPorousUsPl::new(&mesh, &base, &config, 0, &fluids, &p1, None).unwrap();
        let mut state = FemState::new(&mesh, &base, &config).unwrap();
        let control = ControlTime::new(&config).unwrap();
        control.initialize(&mut state).unwrap();

        // hydrostatic pl = ρL g (H - y)
        for m in 0..4 {
            let y = mesh.points[mesh.cells[0].points[m]].coords[1];
            state.uu[elem.p.pmap[m]] = 10.0 * (1.0 - y);
        }
        elem.initialize_internal_values(&mut state).unwrap();
        for p in 0..state.gauss[0].ngauss {
            assert_eq!(state.gauss[0].porous[p].liquid_saturation, 1.0);
        }

        // steady state: ψl = β1 pl
        for m in 0..4 {
            state.uu_star[elem.p.pmap[m]] = state.beta1 * state.uu[elem.p.pmap[m]];
        }
        elem.interpolate_star_vars(&state).unwrap();

        let neq = elem.l2g.len();
        let mut f_int = Vector::new(neq);
        elem.calc_f_int(&mut f_int, &state).unwrap();

        // pressure rows vanish (no flow)
        for m in 0..4 {
            approx_eq(f_int[8 + m], 0.0, 1e-12);
        }

        // total vertical internal force equals the mixture weight
        // ρ = nf sl ρL + (1 - nf) ρS = 0.4 + 0.6 x 2.7 = 2.02; W = ρ g V = 20.2
        let mut total = 0.0;
        for m in 0..4 {
            total += f_int[1 + m * 2];
        }
        approx_eq(total, 2.02 * 10.0, 1e-12);
    }

    #[test]
    fn reset_reference_solid_fraction_works() {
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let base = FemBase::new(&mesh, [(1, Elem::PorousSldLiq(p1))]).unwrap();
        let config = Config::new(&mesh);
        let mut elem = ElementPorousUsPl::new(&mesh, &base, &config, 0, &fluids, &p1, None).unwrap();
        let mut state = FemState::new(&mesh, &base, &config).unwrap();
        elem.initialize_internal_values(&mut state).unwrap();
        assert_eq!(state.gauss[0].porous[0].ns0, 0.6);

        // uniform expansion: ux = ε x, uy = ε y ⇒ divus = 2 ε
        let eps = 0.01;
        for m in 0..4 {
            let q = mesh.cells[0].points[m];
            state.uu[elem.u.umap[0 + m * 2]] = eps * mesh.points[q].coords[0];
            state.uu[elem.u.umap[1 + m * 2]] = eps * mesh.points[q].coords[1];
        }
        elem.reset_reference_solid_fraction(&mut state).unwrap();
        for p in 0..state.gauss[0].ngauss {
            approx_eq(state.gauss[0].porous[p].ns0, (1.0 - 2.0 * eps) * 0.6, 1e-14);
        }
    }

    #[test]
    fn output_ip_data_works() {
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let base = FemBase::new(&mesh, [(1, Elem::PorousSldLiq(p1))]).unwrap();
        let config = Config::new(&mesh);
        let mut elem = ElementPorousUsPl::new(&mesh, &base, &config, 0, &fluids, &p1, None).unwrap();
        let mut state = FemState::new(&mesh, &base, &config).unwrap();

        // unsaturated uniform pressure
        for m in 0..4 {
            state.uu[elem.p.pmap[m]] = -2.0;
        }
        elem.initialize_internal_values(&mut state).unwrap();
        let data = elem.output_ip_data(&state).unwrap();
        assert_eq!(data.len(), state.gauss[0].ngauss);
        for ip in &data {
            assert!(ip.x[0] > 0.0 && ip.x[0] < 1.0);
            approx_eq(ip.pl, -2.0, 1e-14);
            assert!(ip.sl < 1.0 && ip.sl > 0.1);
            approx_eq(ip.nf, 0.4, 1e-14);
            assert_eq!(ip.klr, 1.0); // constant relative conductivity
            assert_eq!(ip.wl.len(), 2);
            assert_eq!(ip.stress.len(), 4); // Mandel components in 2D
        }
    }
}
