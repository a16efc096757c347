use super::{CalcData, CalcDataBry, ElementTrait, FemBase, FemState};
use crate::base::{Config, Dof, Natural, Nbc, StressStrain};
use crate::material::{LocalState, ModelStressStrain};
use crate::StrError;
use gemlab::mesh::{Cell, CellId, Mesh};
use russell_lab::{Matrix, Vector};
use russell_tensor::{Tensor2, Tensor4};

/// Holds one natural boundary condition applied to a face of the element
pub(crate) struct FaceBc<'a> {
    /// Scratchpad and integration rule of the face
    pub calc: CalcDataBry,

    /// The condition
    pub nbc: Nbc,

    /// The value of the condition
    pub value: f64,

    /// Optional function of time overriding the value
    pub function: Option<&'a Box<dyn Fn(f64) -> f64 + 'a>>,

    /// Positions of the face points in the cell points array
    pub local_vertex: Vec<usize>,
}

/// Selects the natural boundary conditions touching this cell
pub(crate) fn find_face_bcs<'a, F>(
    mesh: &Mesh,
    cell: &Cell,
    natural: Option<&'a Natural<'a>>,
    filter: F,
) -> Result<Vec<FaceBc<'a>>, StrError>
where
    F: Fn(Nbc) -> bool,
{
    let mut bcs = Vec::new();
    if let Some(natural) = natural {
        let mut candidates: Vec<(&Vec<usize>, gemlab::shapes::GeoKind, Nbc, f64, Option<usize>)> = Vec::new();
        for (edge, nbc, value, f_index) in &natural.on_edges {
            candidates.push((&edge.points, edge.kind, *nbc, *value, *f_index));
        }
        for (face, nbc, value, f_index) in &natural.on_faces {
            candidates.push((&face.points, face.kind, *nbc, *value, *f_index));
        }
        for (points, kind, nbc, value, f_index) in candidates {
            if !filter(nbc) {
                continue;
            }
            if !points.iter().all(|p| cell.points.contains(p)) {
                continue;
            }
            let local_vertex = points
                .iter()
                .map(|p| cell.points.iter().position(|q| q == p).unwrap())
                .collect();
            bcs.push(FaceBc {
                calc: CalcDataBry::new(mesh, kind, points)?,
                nbc,
                value,
                function: match f_index {
                    Some(index) => Some(&natural.functions[index]),
                    None => None,
                },
                local_vertex,
            });
        }
    }
    Ok(bcs)
}

/// Implements the local equations of the solid element (momentum balance)
///
/// The internal force follows the general tensor form `f_int = ∫ σ'・G dΩ`
/// and the tangent is `∫ GᵀDG dΩ` with the consistent modulus D. This element
/// also serves as the displacement part of the coupled porous element, which
/// adds the mixture inertia and pressure terms on top of these.
pub struct ElementSolid<'a> {
    /// Number of space dimensions
    pub ndim: usize,

    /// Global configuration
    pub config: &'a Config<'a>,

    /// The cell corresponding to this element
    pub cell: &'a Cell,

    /// Local-to-global mapping (displacement DOFs)
    pub umap: Vec<usize>,

    /// Scratchpad and integration rule
    pub calc: CalcData,

    /// Stress-strain model
    pub model: ModelStressStrain,

    /// ζs: interpolated acceleration predictor at each integration point
    ///
    /// (nip, ndim)
    pub zeta_s: Vec<Vector>,

    /// χs: interpolated velocity predictor at each integration point
    ///
    /// (nip, ndim)
    pub chi_s: Vec<Vector>,

    /// div(χs) at each integration point
    ///
    /// (nip)
    pub div_chi_s: Vec<f64>,

    /// Displacement at the current integration point
    pub us: Vector,

    /// Consistent tangent modulus
    pub dd: Tensor4,

    /// Strain increment scratch
    delta_strain: Tensor2,

    /// Backup of the local states
    backup: Vec<LocalState>,

    /// Natural boundary conditions (tractions) on the faces of this element
    bcs: Vec<FaceBc<'a>>,
}

impl<'a> ElementSolid<'a> {
    /// Allocates a new instance
    pub fn new(
        mesh: &'a Mesh,
        base: &FemBase,
        config: &'a Config<'a>,
        cell_id: CellId,
        stress_strain: &StressStrain,
        ngauss: Option<usize>,
        natural: Option<&'a Natural<'a>>,
    ) -> Result<Self, StrError> {
        let ndim = mesh.ndim;
        let cell = &mesh.cells[cell_id];
        let nnode = cell.points.len();

        // local-to-global mapping (Ux, Uy, [Uz] for each node)
        let mut umap = Vec::with_capacity(nnode * ndim);
        for m in 0..nnode {
            umap.push(base.dofs.eq(cell.points[m], Dof::Ux)?);
            umap.push(base.dofs.eq(cell.points[m], Dof::Uy)?);
            if ndim == 3 {
                umap.push(base.dofs.eq(cell.points[m], Dof::Uz)?);
            }
        }

        // integration scratchpad
        let calc = CalcData::new(
            mesh,
            cell.kind,
            &cell.points,
            cell.kind,
            config.requested_ngauss(cell.attribute, ngauss),
        )?;
        let nip = calc.ngauss();

        // natural boundary conditions (tractions)
        let bcs = find_face_bcs(mesh, cell, natural, |nbc| match nbc {
            Nbc::Qn | Nbc::Qx | Nbc::Qy | Nbc::Qz => true,
            _ => false,
        })?;

        // element instance
        let mandel = config.ideal.mandel();
        Ok(ElementSolid {
            ndim,
            config,
            cell,
            umap,
            calc,
            model: ModelStressStrain::new(&config.ideal, stress_strain)?,
            zeta_s: vec![Vector::new(ndim); nip],
            chi_s: vec![Vector::new(ndim); nip],
            div_chi_s: vec![0.0; nip],
            us: Vector::new(ndim),
            dd: Tensor4::new(mandel),
            delta_strain: Tensor2::new(mandel),
            backup: Vec::new(),
            bcs,
        })
    }

    /// Sets the initial effective stress components (σxx, σyy, σzz) at all integration points
    pub fn set_initial_stress_components(
        &mut self,
        state: &mut FemState,
        sx: &[f64],
        sy: &[f64],
        sz: &[f64],
    ) -> Result<(), StrError> {
        let nip = self.calc.ngauss();
        if sx.len() != nip || sy.len() != nip || sz.len() != nip {
            return Err("arrays of initial stresses must have the number of integration points");
        }
        for p in 0..nip {
            let sigma = &mut state.gauss[self.cell.id].solid[p];
            sigma.stress.clear();
            sigma.stress.sym_set(0, 0, sx[p]);
            sigma.stress.sym_set(1, 1, sy[p]);
            sigma.stress.sym_set(2, 2, sz[p]);
        }
        self.initialize_internal_values(state)
    }

    /// Computes the strain increment at an integration point from the cumulated ΔU
    ///
    /// Requires the gradient at this point to be available in the scratchpad.
    fn calc_delta_strain(&mut self, duu: &Vector) {
        let gg = &self.calc.pad.gradient;
        let l2g = &self.umap;
        let nnode = self.cell.points.len();
        let eps = &mut self.delta_strain;
        eps.clear();
        #[rustfmt::skip]
        if self.ndim == 2 {
            for m in 0..nnode {
                eps.sym_add(0, 0, 1.0,  duu[l2g[0+2*m]] * gg.get(m,0));
                eps.sym_add(1, 1, 1.0,  duu[l2g[1+2*m]] * gg.get(m,1));
                eps.sym_add(0, 1, 1.0, (duu[l2g[0+2*m]] * gg.get(m,1) + duu[l2g[1+2*m]] * gg.get(m,0))/2.0);
            }
        } else {
            for m in 0..nnode {
                eps.sym_add(0, 0, 1.0,  duu[l2g[0+3*m]] * gg.get(m,0));
                eps.sym_add(1, 1, 1.0,  duu[l2g[1+3*m]] * gg.get(m,1));
                eps.sym_add(2, 2, 1.0,  duu[l2g[2+3*m]] * gg.get(m,2));
                eps.sym_add(0, 1, 1.0, (duu[l2g[0+3*m]] * gg.get(m,1) + duu[l2g[1+3*m]] * gg.get(m,0))/2.0);
                eps.sym_add(1, 2, 1.0, (duu[l2g[1+3*m]] * gg.get(m,2) + duu[l2g[2+3*m]] * gg.get(m,1))/2.0);
                eps.sym_add(0, 2, 1.0, (duu[l2g[0+3*m]] * gg.get(m,2) + duu[l2g[2+3*m]] * gg.get(m,0))/2.0);
            }
        };
    }

    /// Adds the traction contributions to f_ext
    fn add_tractions_to_f_ext(&mut self, f_ext: &mut Vector, time: f64) -> Result<(), StrError> {
        let ndim = self.ndim;
        let axisymmetric = self.config.ideal.axisymmetric;
        for bc in &mut self.bcs {
            let value = match bc.function {
                Some(f) => (f)(time),
                None => bc.value,
            };
            let nnode_face = bc.local_vertex.len();
            for p in 0..bc.calc.ngauss() {
                let jf = bc.calc.calc_at_face_ip(p)?;
                let mut coef = bc.calc.weight(p);
                if axisymmetric {
                    let mut radius = 0.0;
                    for m in 0..nnode_face {
                        radius += bc.calc.pad.interp[m] * bc.calc.pad.xxt.get(0, m);
                    }
                    coef *= radius;
                }
                for m in 0..nnode_face {
                    let sf = bc.calc.pad.interp[m];
                    let vertex = bc.local_vertex[m];
                    match bc.nbc {
                        // positive value acts along the outward normal
                        Nbc::Qn => {
                            for i in 0..ndim {
                                f_ext[vertex * ndim + i] += coef * sf * value * bc.calc.normal[i];
                            }
                        }
                        Nbc::Qx => f_ext[vertex * ndim] += coef * jf * sf * value,
                        Nbc::Qy => f_ext[vertex * ndim + 1] += coef * jf * sf * value,
                        Nbc::Qz => f_ext[vertex * ndim + 2] += coef * jf * sf * value,
                        _ => (),
                    }
                }
            }
        }
        Ok(())
    }
}

impl<'a> ElementTrait for ElementSolid<'a> {
    /// Returns whether the local Jacobian matrix is symmetric or not
    fn symmetric_jacobian(&self) -> bool {
        self.model.actual.symmetric_stiffness()
    }

    /// Returns the local-to-global mapping
    fn local_to_global(&self) -> &Vec<usize> {
        &self.umap
    }

    /// Initializes the internal variables
    fn initialize_internal_values(&mut self, state: &mut FemState) -> Result<(), StrError> {
        for local_state in &mut state.gauss[self.cell.id].solid {
            self.model.actual.initialize_internal_values(local_state)?;
        }
        Ok(())
    }

    /// Interpolates the star variables (ζs, χs, div χs) to the integration points
    fn interpolate_star_vars(&mut self, state: &FemState) -> Result<(), StrError> {
        let ndim = self.ndim;
        let nnode = self.cell.points.len();
        for p in 0..self.calc.ngauss() {
            self.calc.calc_at_ip(p, true)?;
            self.div_chi_s[p] = 0.0;
            for i in 0..ndim {
                self.zeta_s[p][i] = 0.0;
                self.chi_s[p][i] = 0.0;
            }
            for m in 0..nnode {
                let sm = self.calc.pad.interp[m];
                for i in 0..ndim {
                    let r = self.umap[i + m * ndim];
                    self.zeta_s[p][i] += sm * state.aa_star[r];
                    self.chi_s[p][i] += sm * state.vv_star[r];
                    self.div_chi_s[p] += self.calc.pad.gradient.get(m, i) * state.vv_star[r];
                }
            }
        }
        Ok(())
    }

    /// Calculates the vector of internal forces f_int = ∫ σ'・G dΩ
    fn calc_f_int(&mut self, f_int: &mut Vector, state: &FemState) -> Result<(), StrError> {
        f_int.fill(0.0);
        let ndim = self.ndim;
        let nnode = self.cell.points.len();
        let axisymmetric = self.config.ideal.axisymmetric;
        for p in 0..self.calc.ngauss() {
            let det_jac = self.calc.calc_at_ip(p, true)?;
            let mut coef = det_jac * self.calc.weight(p);
            if axisymmetric {
                coef *= self.calc.radius();
            }
            let sigma = &state.gauss[self.cell.id].solid[p].stress;
            for m in 0..nnode {
                for i in 0..ndim {
                    let mut value = 0.0;
                    for j in 0..ndim {
                        value += sigma.get(i, j) * self.calc.pad.gradient.get(m, j);
                    }
                    f_int[i + m * ndim] += coef * value;
                }
            }
        }
        Ok(())
    }

    /// Calculates the vector of external forces f_ext (tractions)
    fn calc_f_ext(&mut self, f_ext: &mut Vector, time: f64) -> Result<(), StrError> {
        f_ext.fill(0.0);
        self.add_tractions_to_f_ext(f_ext, time)
    }

    /// Calculates the Jacobian matrix ∫ GᵀDG dΩ
    fn calc_jacobian(&mut self, kke: &mut Matrix, state: &FemState, first_iteration: bool) -> Result<(), StrError> {
        kke.fill(0.0);
        let ndim = self.ndim;
        let nnode = self.cell.points.len();
        let axisymmetric = self.config.ideal.axisymmetric;
        for p in 0..self.calc.ngauss() {
            let det_jac = self.calc.calc_at_ip(p, true)?;
            let mut coef = det_jac * self.calc.weight(p);
            if axisymmetric {
                coef *= self.calc.radius();
            }
            self.model
                .actual
                .stiffness(&mut self.dd, &state.gauss[self.cell.id].solid[p], first_iteration)?;
            let gg = &self.calc.pad.gradient;
            for m in 0..nnode {
                for i in 0..ndim {
                    let r = i + m * ndim;
                    for n in 0..nnode {
                        for j in 0..ndim {
                            let c = j + n * ndim;
                            let mut value = 0.0;
                            for k in 0..ndim {
                                for l in 0..ndim {
                                    value += gg.get(m, k) * self.dd.get(i, k, j, l) * gg.get(n, l);
                                }
                            }
                            kke.add(r, c, coef * value);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Updates the stresses and internal variables with the strain increments
    fn update_secondary_values(&mut self, state: &mut FemState) -> Result<(), StrError> {
        for p in 0..self.calc.ngauss() {
            self.calc.calc_at_ip(p, true)?;
            self.calc_delta_strain(&state.duu);
            self.model
                .actual
                .update_stress(&mut state.gauss[self.cell.id].solid[p], &self.delta_strain)?;
        }
        Ok(())
    }

    /// Creates a copy of the secondary values
    fn backup_secondary_values(&mut self, state: &FemState) {
        self.backup = state.gauss[self.cell.id].solid.clone();
    }

    /// Restores the secondary values from the backup
    fn restore_secondary_values(&self, state: &mut FemState) {
        for (p, saved) in self.backup.iter().enumerate() {
            state.gauss[self.cell.id].solid[p].mirror(saved);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
