use super::element_solid::{find_face_bcs, FaceBc};
use super::{CalcData, ElementTrait, FemBase, FemState};
use crate::base::{basic_geo_kind, Config, Dof, Natural, Nbc, ParamFluids, ParamPorousLiq};
use crate::material::{sramp, sramp_deriv, LocalStatePorous, LsVars, PorousMedium};
use crate::StrError;
use gemlab::mesh::{Cell, CellId, Mesh};
use gemlab::recovery::get_extrap_matrix;
use russell_lab::{Matrix, Vector};

/// Computes the ramp function of the seepage condition
fn ramp(x: f64, beta: f64, macaulay: bool) -> f64 {
    if macaulay {
        return 0.5 * (x + f64::abs(x));
    }
    sramp(x, beta)
}

/// Computes the derivative of the ramp function of the seepage condition
fn ramp_deriv(x: f64, beta: f64, macaulay: bool) -> f64 {
    if macaulay {
        if x > 0.0 {
            return 1.0;
        }
        return 0.0;
    }
    sramp_deriv(x, beta)
}

/// Implements the local equations of the liquid element (mass balance of liquid)
///
/// Standalone, this element solves transient seepage with the liquid pressure
/// as primary unknown at all nodes of the cell. As the pressure part of the
/// coupled element, the interpolation uses the basic (lower-order) kind at the
/// corner nodes, evaluated at the integration points of the displacement part.
///
/// Seepage faces introduce a liquid boundary flux unknown (fl) per face
/// vertex. With `g = pl - plmax` and the ramp function `r = ramp(fl + κ g)`,
/// the face adds the outflow term `∫ Sf・ρl・r dΓ` to the pressure rows and
/// the closure `∫ Sf・(fl - r) dΓ` to the flux rows.
pub struct ElementLiquid<'a> {
    /// Number of space dimensions
    pub ndim: usize,

    /// Global configuration
    pub config: &'a Config<'a>,

    /// The cell corresponding to this element
    pub cell: &'a Cell,

    /// Porous medium model
    pub model: PorousMedium,

    /// Local-to-global mapping (liquid pressure DOFs)
    pub pmap: Vec<usize>,

    /// Local-to-global mapping (liquid boundary flux DOFs on seepage faces)
    pub fmap: Vec<usize>,

    /// Combined local-to-global mapping (pressures then fluxes)
    pub l2g: Vec<usize>,

    /// Scratchpad and integration rule (pressure interpolation)
    pub calc: CalcData,

    /// ψl: interpolated pressure predictor at each integration point
    ///
    /// (nip)
    pub psi_l: Vec<f64>,

    /// Gravity vector (negative last component under gravity)
    pub g: Vector,

    /// Pressure gradient at the current integration point
    pub gpl: Vector,

    /// Body acceleration term at the current integration point (bs = -g without solids)
    pub bs: Vector,

    /// Relative liquid flux (ρl w) at the current integration point
    pub rho_wl: Vector,

    /// Scratch for the Kpp flux derivative
    tmp: Vector,

    /// Kpp sub-matrix (np, np)
    pub kpp: Matrix,

    /// Kpf sub-matrix (np, nf)
    pub kpf: Matrix,

    /// Kfp sub-matrix (nf, np)
    pub kfp: Matrix,

    /// Kff sub-matrix (nf, nf)
    pub kff: Matrix,

    /// Indicates that a seepage face is present
    pub has_seep: bool,

    /// Indicates that extrapolation of ρl to the nodes is required
    pub do_extrap: bool,

    /// Extrapolation matrix from integration points to nodes (np, nip)
    pub emat: Matrix,

    /// ρl extrapolated to the nodes (np)
    pub rho_l_ex: Vector,

    /// ∂ρl/∂pl extrapolated to the nodes (np, np)
    pub drho_ldpl_ex: Matrix,

    /// Seepage penalty coefficient κ
    pub kappa: f64,

    /// Sharpness of the smooth ramp function
    pub beta_ramp: f64,

    /// Uses the Macaulay brackets instead of the smooth ramp function
    pub macaulay: bool,

    /// Maps each node to its seepage vertex index (usize::MAX if none)
    pub vid_to_seep: Vec<usize>,

    /// Natural boundary conditions (liquid flux and seepage) on the faces of this element
    pub(crate) bcs: Vec<FaceBc<'a>>,

    /// Backup of the local states
    backup: Vec<LocalStatePorous>,

    /// Scratch record for the mixture variables
    pub res: LsVars,
}

impl<'a> ElementLiquid<'a> {
    /// Allocates a new standalone (seepage) instance
    ///
    /// The pressure interpolation uses the cell kind at all nodes.
    pub fn new(
        mesh: &'a Mesh,
        base: &FemBase,
        config: &'a Config<'a>,
        cell_id: CellId,
        fluids: &ParamFluids,
        param: &ParamPorousLiq,
        natural: Option<&'a Natural<'a>>,
    ) -> Result<Self, StrError> {
        let model = PorousMedium::new_liquid_only(fluids, param)?;
        let cell = &mesh.cells[cell_id];
        ElementLiquid::new_common(mesh, base, config, cell, model, cell.points.len(), param.ngauss, natural)
    }

    /// Allocates a new instance as the pressure part of the coupled element
    ///
    /// The pressure interpolation uses the basic (lower-order) kind at the
    /// corner nodes, sharing the integration rule of the cell kind.
    pub fn new_coupled(
        mesh: &'a Mesh,
        base: &FemBase,
        config: &'a Config<'a>,
        cell_id: CellId,
        model: PorousMedium,
        ngauss: Option<usize>,
        natural: Option<&'a Natural<'a>>,
    ) -> Result<Self, StrError> {
        let cell = &mesh.cells[cell_id];
        let ncorner = basic_geo_kind(cell.kind).nnode();
        ElementLiquid::new_common(mesh, base, config, cell, model, ncorner, ngauss, natural)
    }

    /// Allocates a new instance (common code)
    fn new_common(
        mesh: &'a Mesh,
        base: &FemBase,
        config: &'a Config<'a>,
        cell: &'a Cell,
        model: PorousMedium,
        np: usize,
        ngauss: Option<usize>,
        natural: Option<&'a Natural<'a>>,
    ) -> Result<Self, StrError> {
        let ndim = mesh.ndim;

        // local-to-global mapping for the pressure DOFs
        let p_points = &cell.points[..np];
        let mut pmap = Vec::with_capacity(np);
        for m in 0..np {
            pmap.push(base.dofs.eq(p_points[m], Dof::Pl)?);
        }

        // integration scratchpad: pressure kind with the rule of the cell kind
        let p_kind = if np == cell.points.len() {
            cell.kind
        } else {
            basic_geo_kind(cell.kind)
        };
        let mut calc = CalcData::new(
            mesh,
            p_kind,
            p_points,
            cell.kind,
            config.requested_ngauss(cell.attribute, ngauss),
        )?;
        let nip = calc.ngauss();

        // natural boundary conditions on the faces of this element
        let mut bcs = find_face_bcs(mesh, cell, natural, |nbc| match nbc {
            Nbc::Ql | Nbc::Seep => true,
            _ => false,
        })?;
        // face vertices must index into the pressure nodes
        for bc in &bcs {
            if bc.local_vertex.iter().any(|v| *v >= np) {
                return Err("face conditions of the liquid element must touch pressure nodes");
            }
        }
        let has_seep = bcs.iter().any(|bc| bc.nbc == Nbc::Seep);
        let do_extrap = has_seep;

        // seepage vertices and flux DOFs
        let mut vid_to_seep = vec![usize::MAX; np];
        let mut fmap = Vec::new();
        if has_seep {
            let mut seep_vertices: Vec<usize> = Vec::new();
            for bc in &bcs {
                if bc.nbc == Nbc::Seep {
                    seep_vertices.extend(&bc.local_vertex);
                }
            }
            seep_vertices.sort();
            seep_vertices.dedup();
            for (index, vertex) in seep_vertices.iter().enumerate() {
                vid_to_seep[*vertex] = index;
                fmap.push(base.dofs.eq(p_points[*vertex], Dof::Fl)?);
            }
        }
        let nf = fmap.len();

        // extrapolation matrix
        let emat = if do_extrap {
            get_extrap_matrix(&mut calc.pad, &calc.gauss)?
        } else {
            Matrix::new(0, 0)
        };

        // combined local-to-global mapping
        let mut l2g = pmap.clone();
        l2g.extend(&fmap);

        Ok(ElementLiquid {
            ndim,
            config,
            cell,
            model,
            pmap,
            fmap,
            l2g,
            calc,
            psi_l: vec![0.0; nip],
            g: Vector::new(ndim),
            gpl: Vector::new(ndim),
            bs: Vector::new(ndim),
            rho_wl: Vector::new(ndim),
            tmp: Vector::new(ndim),
            kpp: Matrix::new(np, np),
            kpf: Matrix::new(np, nf),
            kfp: Matrix::new(nf, np),
            kff: Matrix::new(nf, nf),
            has_seep,
            do_extrap,
            emat,
            rho_l_ex: Vector::new(np),
            drho_ldpl_ex: Matrix::new(np, np),
            kappa: 100.0,
            beta_ramp: 100.0,
            macaulay: false,
            vid_to_seep,
            bcs,
            backup: Vec::new(),
            res: LsVars::default(),
        })
    }

    /// Recomputes the gravity vector at the given time
    pub fn compute_gvec(&mut self, time: f64) {
        self.g.fill(0.0);
        self.g[self.ndim - 1] = -(self.config.gravity)(time);
    }

    /// Interpolates the liquid pressure and its gradient at the current integration point
    ///
    /// Requires `calc_at_ip` to have been called with gradients.
    pub fn calc_pl_and_gradient(&mut self, uu: &Vector) -> f64 {
        let np = self.pmap.len();
        let mut pl = 0.0;
        self.gpl.fill(0.0);
        for m in 0..np {
            let value = uu[self.pmap[m]];
            pl += self.calc.pad.interp[m] * value;
            for i in 0..self.ndim {
                self.gpl[i] += self.calc.pad.gradient.get(m, i) * value;
            }
        }
        pl
    }

    /// Computes the relative liquid flux ρwl = klr・Klsat・hl with hl = -ρL・bs - ∇pl
    pub fn calc_rho_wl(&mut self, klr: f64, rho_ll: f64) {
        for i in 0..self.ndim {
            self.rho_wl[i] = 0.0;
            for j in 0..self.ndim {
                let hl_j = -rho_ll * self.bs[j] - self.gpl[j];
                self.rho_wl[i] += klr * self.model.klsat[i][j] * hl_j;
            }
        }
    }

    /// Returns (pl, fl, ρl) interpolated/extrapolated at the current face integration point
    ///
    /// Requires `calc_at_face_ip` to have been called for the face.
    fn face_ip_vars(
        pmap: &[usize],
        fmap: &[usize],
        vid_to_seep: &[usize],
        rho_l_ex: &Vector,
        bc: &FaceBc,
        uu: &Vector,
    ) -> (f64, f64, f64) {
        let mut pl = 0.0;
        let mut fl = 0.0;
        let mut rho_l = 0.0;
        for (i, vertex) in bc.local_vertex.iter().enumerate() {
            let sf = bc.calc.pad.interp[i];
            pl += sf * uu[pmap[*vertex]];
            fl += sf * uu[fmap[vid_to_seep[*vertex]]];
            rho_l += sf * rho_l_ex[*vertex];
        }
        (pl, fl, rho_l)
    }

    /// Returns the current pressure ceiling of a seepage face
    fn face_plmax(bc: &FaceBc, time: f64) -> f64 {
        let shift = match bc.function {
            Some(f) => (f)(time),
            None => 0.0,
        };
        f64::max(bc.value - shift, 0.0)
    }

    /// Adds the contributions of the natural boundary conditions to f_int
    ///
    /// The pressure rows start at `offset_p` and the flux rows at `offset_f`
    /// within the local vector.
    pub(crate) fn add_natbcs_to_f_int(
        &mut self,
        f_int: &mut Vector,
        state: &FemState,
        offset_p: usize,
        offset_f: usize,
    ) -> Result<(), StrError> {
        let (kappa, beta_ramp, macaulay) = (self.kappa, self.beta_ramp, self.macaulay);
        for bc in &mut self.bcs {
            if bc.nbc != Nbc::Seep {
                continue;
            }
            let plmax = ElementLiquid::face_plmax(bc, state.t);
            for p in 0..bc.calc.ngauss() {
                let jf = bc.calc.calc_at_face_ip(p)?;
                let coef = jf * bc.calc.weight(p);
                let (pl, fl, rho_l) =
                    ElementLiquid::face_ip_vars(&self.pmap, &self.fmap, &self.vid_to_seep, &self.rho_l_ex, bc, &state.uu);
                let g = pl - plmax;
                let rmp = ramp(fl + kappa * g, beta_ramp, macaulay);
                for (i, vertex) in bc.local_vertex.iter().enumerate() {
                    let sf = bc.calc.pad.interp[i];
                    f_int[offset_p + vertex] += coef * sf * rho_l * rmp;
                    f_int[offset_f + self.vid_to_seep[*vertex]] += coef * sf * (fl - rmp);
                }
            }
        }
        Ok(())
    }

    /// Adds the prescribed liquid flux contributions to f_ext
    pub(crate) fn add_natbcs_to_f_ext(&mut self, f_ext: &mut Vector, time: f64, offset_p: usize) -> Result<(), StrError> {
        let axisymmetric = self.config.ideal.axisymmetric;
        for bc in &mut self.bcs {
            if bc.nbc != Nbc::Ql {
                continue;
            }
            let value = match bc.function {
                Some(f) => (f)(time),
                None => bc.value,
            };
            for p in 0..bc.calc.ngauss() {
                let jf = bc.calc.calc_at_face_ip(p)?;
                let mut coef = jf * bc.calc.weight(p);
                if axisymmetric {
                    let mut radius = 0.0;
                    for (i, _) in bc.local_vertex.iter().enumerate() {
                        radius += bc.calc.pad.interp[i] * bc.calc.pad.xxt.get(0, i);
                    }
                    coef *= radius;
                }
                for (i, vertex) in bc.local_vertex.iter().enumerate() {
                    f_ext[offset_p + vertex] += coef * bc.calc.pad.interp[i] * value;
                }
            }
        }
        Ok(())
    }

    /// Adds the seepage face contributions to the Kpp, Kpf, Kfp, and Kff sub-matrices
    ///
    /// Requires `rho_l_ex` and `drho_ldpl_ex` to be up-to-date.
    pub(crate) fn add_natbcs_to_jac(&mut self, state: &FemState) -> Result<(), StrError> {
        let (kappa, beta_ramp, macaulay) = (self.kappa, self.beta_ramp, self.macaulay);
        let np = self.pmap.len();
        for bc in &mut self.bcs {
            if bc.nbc != Nbc::Seep {
                continue;
            }
            let plmax = ElementLiquid::face_plmax(bc, state.t);
            for p in 0..bc.calc.ngauss() {
                let jf = bc.calc.calc_at_face_ip(p)?;
                let coef = jf * bc.calc.weight(p);
                let (pl, fl, rho_l) =
                    ElementLiquid::face_ip_vars(&self.pmap, &self.fmap, &self.vid_to_seep, &self.rho_l_ex, bc, &state.uu);
                let g = pl - plmax;
                let rmp = ramp(fl + kappa * g, beta_ramp, macaulay);
                let rmp_d = ramp_deriv(fl + kappa * g, beta_ramp, macaulay);
                for (i, vertex_i) in bc.local_vertex.iter().enumerate() {
                    let sf_i = bc.calc.pad.interp[i];
                    let mu = self.vid_to_seep[*vertex_i];
                    // ∂(ρl r)/∂pl via the extrapolated densities (all pressure nodes)
                    for n in 0..np {
                        let mut drho_l = 0.0;
                        for (l, vertex_l) in bc.local_vertex.iter().enumerate() {
                            drho_l += bc.calc.pad.interp[l] * self.drho_ldpl_ex.get(*vertex_l, n);
                        }
                        self.kpp.add(*vertex_i, n, coef * sf_i * drho_l * rmp);
                    }
                    // ramp function derivatives (face vertices only)
                    for (j, vertex_j) in bc.local_vertex.iter().enumerate() {
                        let sf_j = bc.calc.pad.interp[j];
                        let nu = self.vid_to_seep[*vertex_j];
                        self.kpp.add(*vertex_i, *vertex_j, coef * sf_i * sf_j * rho_l * rmp_d * kappa);
                        self.kpf.add(*vertex_i, nu, coef * sf_i * sf_j * rho_l * rmp_d);
                        self.kfp.add(mu, *vertex_j, -coef * sf_i * sf_j * rmp_d * kappa);
                        self.kff.add(mu, nu, coef * sf_i * sf_j * (1.0 - rmp_d));
                    }
                }
            }
        }
        Ok(())
    }

    /// Adds the seepage face coupling block ∂(ρl r)/∂us to the local matrix of the coupled element
    ///
    /// `drho_ldus_ex` holds ∂ρl/∂us extrapolated to the nodes (np, nu);
    /// the rows of the coupled matrix are offset by `nu` for the pressures.
    pub(crate) fn add_natbcs_to_jac_coupled(
        &mut self,
        kke: &mut Matrix,
        state: &FemState,
        nu: usize,
        drho_ldus_ex: &Matrix,
    ) -> Result<(), StrError> {
        let (kappa, beta_ramp, macaulay) = (self.kappa, self.beta_ramp, self.macaulay);
        for bc in &mut self.bcs {
            if bc.nbc != Nbc::Seep {
                continue;
            }
            let plmax = ElementLiquid::face_plmax(bc, state.t);
            for p in 0..bc.calc.ngauss() {
                let jf = bc.calc.calc_at_face_ip(p)?;
                let coef = jf * bc.calc.weight(p);
                let (pl, fl, _) =
                    ElementLiquid::face_ip_vars(&self.pmap, &self.fmap, &self.vid_to_seep, &self.rho_l_ex, bc, &state.uu);
                let g = pl - plmax;
                let rmp = ramp(fl + kappa * g, beta_ramp, macaulay);
                for (i, vertex_i) in bc.local_vertex.iter().enumerate() {
                    let sf_i = bc.calc.pad.interp[i];
                    for c in 0..nu {
                        let mut value = 0.0;
                        for (l, vertex_l) in bc.local_vertex.iter().enumerate() {
                            value += sf_i * bc.calc.pad.interp[l] * drho_ldus_ex.get(*vertex_l, c) * rmp;
                        }
                        kke.add(nu + *vertex_i, c, coef * value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Mirrors a reference solid fraction into the backup state (if any)
    pub(crate) fn backup_ns0(&mut self, index: usize, ns0: f64) {
        if let Some(saved) = self.backup.get_mut(index) {
            saved.ns0 = ns0;
        }
    }

    /// Clears the extrapolation accumulators
    pub(crate) fn clear_extrapolation(&mut self) {
        if self.do_extrap {
            self.rho_l_ex.fill(0.0);
            self.drho_ldpl_ex.fill(0.0);
        }
    }
}

impl<'a> ElementTrait for ElementLiquid<'a> {
    /// Returns whether the local Jacobian matrix is symmetric or not
    fn symmetric_jacobian(&self) -> bool {
        false
    }

    /// Returns the local-to-global mapping
    fn local_to_global(&self) -> &Vec<usize> {
        &self.l2g
    }

    /// Initializes the internal variables from the current liquid pressure
    fn initialize_internal_values(&mut self, state: &mut FemState) -> Result<(), StrError> {
        for p in 0..self.calc.ngauss() {
            self.calc.calc_at_ip(p, false)?;
            let np = self.pmap.len();
            let mut pl = 0.0;
            for m in 0..np {
                pl += self.calc.pad.interp[m] * state.uu[self.pmap[m]];
            }
            let porous_state = self
                .model
                .new_state(self.model.rho_ll_ini, self.model.rho_gg_ini, pl, 0.0)?;
            state.gauss[self.cell.id].porous[p] = porous_state;
        }
        Ok(())
    }

    /// Interpolates the star variable ψl to the integration points
    fn interpolate_star_vars(&mut self, state: &FemState) -> Result<(), StrError> {
        let np = self.pmap.len();
        for p in 0..self.calc.ngauss() {
            self.calc.calc_at_ip(p, false)?;
            self.psi_l[p] = 0.0;
            for m in 0..np {
                self.psi_l[p] += self.calc.pad.interp[m] * state.uu_star[self.pmap[m]];
            }
        }
        Ok(())
    }

    /// Calculates the vector of internal forces (storage, Darcy flux, and seepage terms)
    fn calc_f_int(&mut self, f_int: &mut Vector, state: &FemState) -> Result<(), StrError> {
        f_int.fill(0.0);
        self.clear_extrapolation();
        self.compute_gvec(state.t);
        let ndim = self.ndim;
        let np = self.pmap.len();
        let axisymmetric = self.config.ideal.axisymmetric;
        for p in 0..self.calc.ngauss() {
            let det_jac = self.calc.calc_at_ip(p, true)?;
            let mut coef = det_jac * self.calc.weight(p);
            if axisymmetric {
                coef *= self.calc.radius();
            }
            let pl = self.calc_pl_and_gradient(&state.uu);
            let porous_state = &state.gauss[self.cell.id].porous[p];
            let (sl, rho_ll) = (porous_state.liquid_saturation, porous_state.rho_ll);
            let klr = self.model.conductivity.klr(sl);
            let mut res = LsVars::default();
            self.model.calc_ls(&mut res, porous_state, pl, 0.0, false)?;
            self.res = res;

            // without solids, bs = -g
            let plt = state.beta1 * pl - self.psi_l[p];
            for i in 0..ndim {
                self.bs[i] = -self.g[i];
            }
            self.calc_rho_wl(klr, rho_ll);

            for m in 0..np {
                f_int[m] += coef * self.calc.pad.interp[m] * res.cpl * plt;
                for i in 0..ndim {
                    f_int[m] -= coef * self.calc.pad.gradient.get(m, i) * self.rho_wl[i];
                }
                if self.do_extrap {
                    self.rho_l_ex[m] += self.emat.get(m, p) * res.a_rhol;
                }
            }
        }

        // seepage faces
        if self.has_seep {
            self.add_natbcs_to_f_int(f_int, state, 0, np)?;
        }
        Ok(())
    }

    /// Calculates the vector of external forces (prescribed liquid fluxes)
    fn calc_f_ext(&mut self, f_ext: &mut Vector, time: f64) -> Result<(), StrError> {
        f_ext.fill(0.0);
        self.add_natbcs_to_f_ext(f_ext, time, 0)
    }

    /// Calculates the Jacobian matrix
    fn calc_jacobian(&mut self, kke: &mut Matrix, state: &FemState, _first_iteration: bool) -> Result<(), StrError> {
        kke.fill(0.0);
        self.kpp.fill(0.0);
        self.kpf.fill(0.0);
        self.kfp.fill(0.0);
        self.kff.fill(0.0);
        self.clear_extrapolation();
        self.compute_gvec(state.t);
        let ndim = self.ndim;
        let np = self.pmap.len();
        let nf = self.fmap.len();
        let axisymmetric = self.config.ideal.axisymmetric;
        for p in 0..self.calc.ngauss() {
            let det_jac = self.calc.calc_at_ip(p, true)?;
            let mut coef = det_jac * self.calc.weight(p);
            if axisymmetric {
                coef *= self.calc.radius();
            }
            let pl = self.calc_pl_and_gradient(&state.uu);
            let porous_state = &state.gauss[self.cell.id].porous[p];
            let (sl, rho_ll) = (porous_state.liquid_saturation, porous_state.rho_ll);
            let klr = self.model.conductivity.klr(sl);
            let mut res = LsVars::default();
            self.model.calc_ls(&mut res, porous_state, pl, 0.0, true)?;
            self.res = res;

            let plt = state.beta1 * pl - self.psi_l[p];
            let cl = self.model.cl;
            for i in 0..ndim {
                self.bs[i] = -self.g[i]; // bs without solids
            }

            for n in 0..np {
                let sb_n = self.calc.pad.interp[n];
                // term in brackets of the flux derivative
                for j in 0..ndim {
                    let hl_j = -rho_ll * self.bs[j] - self.gpl[j];
                    self.tmp[j] = sb_n * res.dklr_dpl * hl_j
                        - klr * (sb_n * cl * self.bs[j] + self.calc.pad.gradient.get(n, j));
                }
                for m in 0..np {
                    let sb_m = self.calc.pad.interp[m];
                    self.kpp
                        .add(m, n, coef * sb_m * sb_n * (res.dcpl_dpl * plt + state.beta1 * res.cpl));
                    for i in 0..ndim {
                        for j in 0..ndim {
                            self.kpp
                                .add(m, n, -coef * self.calc.pad.gradient.get(m, i) * self.model.klsat[i][j] * self.tmp[j]);
                        }
                    }
                    if self.do_extrap {
                        self.drho_ldpl_ex.add(m, n, self.emat.get(m, p) * res.cpl * sb_n);
                    }
                }
                if self.do_extrap {
                    self.rho_l_ex[n] += self.emat.get(n, p) * res.a_rhol;
                }
            }
        }

        // seepage faces
        if self.has_seep {
            self.add_natbcs_to_jac(state)?;
        }

        // assemble the local matrix [[Kpp, Kpf], [Kfp, Kff]]
        for m in 0..np {
            for n in 0..np {
                kke.set(m, n, self.kpp.get(m, n));
            }
            for b in 0..nf {
                kke.set(m, np + b, self.kpf.get(m, b));
                kke.set(np + b, m, self.kfp.get(b, m));
            }
        }
        for a in 0..nf {
            for b in 0..nf {
                kke.set(np + a, np + b, self.kff.get(a, b));
            }
        }
        Ok(())
    }

    /// Updates the saturation states with the pressure increments
    fn update_secondary_values(&mut self, state: &mut FemState) -> Result<(), StrError> {
        let np = self.pmap.len();
        for p in 0..self.calc.ngauss() {
            self.calc.calc_at_ip(p, false)?;
            let mut pl = 0.0;
            let mut delta_pl = 0.0;
            for m in 0..np {
                pl += self.calc.pad.interp[m] * state.uu[self.pmap[m]];
                delta_pl += self.calc.pad.interp[m] * state.duu[self.pmap[m]];
            }
            let porous_state = &mut state.gauss[self.cell.id].porous[p];
            self.model.update_state(porous_state, delta_pl, 0.0, pl, 0.0)?;
        }
        Ok(())
    }

    /// Creates a copy of the secondary values
    fn backup_secondary_values(&mut self, state: &FemState) {
        self.backup = state.gauss[self.cell.id].porous.clone();
    }

    /// Restores the secondary values from the backup
    fn restore_secondary_values(&self, state: &mut FemState) {
        for (p, saved) in self.backup.iter().enumerate() {
            state.gauss[self.cell.id].porous[p].mirror(saved);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ElementLiquid;
    use crate::base::{Config, Elem, Natural, Nbc, ParamFluids, ParamPorousLiq};
    use crate::fem::{ControlTime, ElementTrait, FemBase, FemState};
    use gemlab::mesh::{Edge, Samples};
    use gemlab::shapes::GeoKind;
    use russell_lab::{approx_eq, Matrix, Vector};

    #[test]
    fn new_works_standalone() {
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousLiq::sample_brooks_corey_constant();
        let base = FemBase::new(&mesh, [(1, Elem::PorousLiq(p1))]).unwrap();
        let config = Config::new(&mesh);
        let elem = ElementLiquid::new(&mesh, &base, &config, 0, &fluids, &p1, None).unwrap();
        assert_eq!(elem.pmap.len(), 4);
        assert_eq!(elem.fmap.len(), 0);
        assert!(!elem.has_seep);
        assert_eq!(elem.l2g.len(), 4);
    }

    #[test]
    fn initialize_and_update_work() {
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousLiq::sample_brooks_corey_constant();
        let base = FemBase::new(&mesh, [(1, Elem::PorousLiq(p1))]).unwrap();
        let config = Config::new(&mesh);
        let mut elem = ElementLiquid::new(&mesh, &base, &config, 0, &fluids, &p1, None).unwrap();
        let mut state = FemState::new(&mesh, &base, &config).unwrap();

        // saturated initialization with positive pressures
        for m in 0..4 {
            state.uu[elem.pmap[m]] = 10.0;
        }
        elem.initialize_internal_values(&mut state).unwrap();
        for p in 0..state.gauss[0].ngauss {
            assert_eq!(state.gauss[0].porous[p].liquid_saturation, 1.0);
            assert_eq!(state.gauss[0].porous[p].rho_ll, 1.0);
        }

        // drying: pressures decrease below the air-entry value
        for m in 0..4 {
            state.duu[elem.pmap[m]] = -11.0;
            state.uu[elem.pmap[m]] = -1.0;
        }
        elem.update_secondary_values(&mut state).unwrap();
        for p in 0..state.gauss[0].ngauss {
            let sl = state.gauss[0].porous[p].liquid_saturation;
            assert!(sl < 1.0 && sl > 0.1);
            assert!(!state.gauss[0].porous[p].wetting);
        }

        // backup-restore round-trip
        elem.backup_secondary_values(&state);
        let saved = state.gauss[0].porous[0].liquid_saturation;
        state.gauss[0].porous[0].liquid_saturation = 0.123;
        elem.restore_secondary_values(&mut state);
        assert_eq!(state.gauss[0].porous[0].liquid_saturation, saved);
    }

    #[test]
    fn f_int_vanishes_under_hydrostatic_conditions() {
        // hydrostatic pressure gradient balances gravity: ρwl = 0 and plt = 0
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousLiq::sample_brooks_corey_constant();
        let base = FemBase::new(&mesh, [(1, Elem::PorousLiq(p1))]).unwrap();
        let mut config = Config::new(&mesh);
        config.set_gravity(|_| 10.0).set_dt(|_| 1.0);
        let mut elem = ElementLiquid::new(&mesh, &base, &config, 0, &fluids, &p1, None).unwrap();
        let mut state = FemState::new(&mesh, &base, &config).unwrap();
        let control = ControlTime::new(&config).unwrap();
        control.initialize(&mut state).unwrap();

        // pl = ρL g (H - y) with ρL = 1, g = 10, H = 1
        for m in 0..4 {
            let y = mesh.points[mesh.cells[0].points[m]].coords[1];
            state.uu[elem.pmap[m]] = 10.0 * (1.0 - y);
        }
        elem.initialize_internal_values(&mut state).unwrap();

        // steady state: ψl = β1 pl so that plt = 0
        for m in 0..4 {
            state.uu_star[elem.pmap[m]] = state.beta1 * state.uu[elem.pmap[m]];
        }
        elem.interpolate_star_vars(&state).unwrap();

        let mut f_int = Vector::new(4);
        elem.calc_f_int(&mut f_int, &state).unwrap();
        for m in 0..4 {
            approx_eq(f_int[m], 0.0, 1e-12);
        }
    }

    #[test]
    fn seepage_face_allocates_flux_dofs() {
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousLiq::sample_brooks_corey_constant();
        let top = Edge {
            kind: GeoKind::Lin2,
            points: vec![2, 3],
        };
        let mut natural = Natural::new();
        natural.edge(&top, Nbc::Seep, 0.0);
        let base = FemBase::new_with_natural(&mesh, [(1, Elem::PorousLiq(p1))], &natural).unwrap();
        let config = Config::new(&mesh);
        let elem = ElementLiquid::new(&mesh, &base, &config, 0, &fluids, &p1, Some(&natural)).unwrap();
        assert!(elem.has_seep);
        assert_eq!(elem.fmap.len(), 2);
        assert_eq!(elem.l2g.len(), 6);
        assert_eq!(elem.vid_to_seep[2], 0);
        assert_eq!(elem.vid_to_seep[3], 1);
        assert_eq!(elem.emat.dims(), (4, 4));
    }

    #[test]
    fn jacobian_dims_are_correct_with_seepage() {
        let mesh = Samples::one_qua4();
        let fluids = ParamFluids::sample_water();
        let p1 = ParamPorousLiq::sample_brooks_corey_constant();
        let top = Edge {
            kind: GeoKind::Lin2,
            points: vec![2, 3],
        };
        let mut natural = Natural::new();
        natural.edge(&top, Nbc::Seep, 0.0);
        let base = FemBase::new_with_natural(&mesh, [(1, Elem::PorousLiq(p1))], &natural).unwrap();
        let mut config = Config::new(&mesh);
        config.set_dt(|_| 0.1);
        let mut elem = ElementLiquid::new(&mesh, &base, &config, 0, &fluids, &p1, Some(&natural)).unwrap();
        let mut state = FemState::new(&mesh, &base, &config).unwrap();
        let control = ControlTime::new(&config).unwrap();
        control.initialize(&mut state).unwrap();
        elem.initialize_internal_values(&mut state).unwrap();
        elem.interpolate_star_vars(&state).unwrap();
        let neq = elem.l2g.len();
        let mut kke = Matrix::new(neq, neq);
        elem.calc_jacobian(&mut kke, &state, true).unwrap();
        // the flux rows carry the closure equation: Kff diagonal entries are nonzero
        assert!(f64::abs(kke.get(4, 4)) > 0.0);
        assert!(f64::abs(kke.get(5, 5)) > 0.0);
    }
}
