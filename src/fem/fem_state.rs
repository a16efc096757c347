use super::{FemBase, GaussState};
use crate::base::{Config, Elem};
use crate::material::{LocalState, LocalStatePorous};
use crate::StrError;
use gemlab::integ::Gauss;
use gemlab::mesh::Mesh;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};

/// Holds the state of a simulation, including primary and secondary variables
///
/// The auxiliary (star) vectors hold the time-discretization predictors:
///
/// * `uu_star` -- ψ: θ-method predictor of the first-order variables (e.g., pl)
/// * `vv_star` -- χ: Newmark predictor associated with velocities
/// * `aa_star` -- ζ: Newmark predictor associated with accelerations
///
/// The α and β coefficients are recomputed by the time-loop control whenever
/// the timestep changes; they are constant during a residual/Jacobian evaluation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FemState {
    /// Time
    pub t: f64,

    /// Delta time
    pub ddt: f64,

    /// Newmark coefficient α1
    pub alpha1: f64,

    /// Newmark coefficient α2
    pub alpha2: f64,

    /// Newmark coefficient α3
    pub alpha3: f64,

    /// Newmark coefficient α4
    pub alpha4: f64,

    /// Newmark coefficient α5
    pub alpha5: f64,

    /// Newmark coefficient α6
    pub alpha6: f64,

    /// θ-method coefficient β1
    pub beta1: f64,

    /// θ-method coefficient β2
    pub beta2: f64,

    /// Cumulated (for one timestep) primary unknowns {ΔU}
    ///
    /// (n_equation)
    pub duu: Vector,

    /// Primary unknowns {U}
    ///
    /// (n_equation)
    pub uu: Vector,

    /// Auxiliary time-discretization variable ψ (θ-method)
    ///
    /// (n_equation)
    pub uu_star: Vector,

    /// Auxiliary time-discretization variable χ (Newmark method)
    ///
    /// (n_equation)
    pub vv_star: Vector,

    /// Auxiliary time-discretization variable ζ (Newmark method)
    ///
    /// (n_equation)
    pub aa_star: Vector,

    /// Secondary values (local states) at all Gauss points of all cells
    ///
    /// (n_cells)
    pub gauss: Vec<GaussState>,
}

impl FemState {
    /// Allocates a new instance
    pub fn new(mesh: &Mesh, base: &FemBase, config: &Config) -> Result<FemState, StrError> {
        // check number of cells
        if mesh.cells.len() == 0 {
            return Err("there are no cells in the mesh");
        }

        // allocate secondary values
        let mandel = config.ideal.mandel();
        let mut gauss = Vec::with_capacity(mesh.cells.len());
        for cell in &mesh.cells {
            let element = base.amap.get(cell.attribute)?;
            let (ngauss_opt, n_int_vars, sl_max, nf_ini) = match element {
                Elem::Solid(p) => (p.ngauss, p.stress_strain.n_internal_values(), 0.0, 0.0),
                Elem::PorousLiq(p) => (p.ngauss, 0, p.retention_liquid.max_liquid_saturation(), p.porosity_initial),
                Elem::PorousSldLiq(p) => (
                    p.ngauss,
                    p.stress_strain.n_internal_values(),
                    p.retention_liquid.max_liquid_saturation(),
                    p.porosity_initial,
                ),
            };
            let rule = Gauss::new_or_sized(cell.kind, config.requested_ngauss(cell.attribute, ngauss_opt))?;
            let ngauss = rule.npoint();
            let mut gs = GaussState::new_empty(ngauss);
            match element {
                Elem::Solid(..) => {
                    gs.solid = vec![LocalState::new(mandel, n_int_vars); ngauss];
                }
                Elem::PorousLiq(..) => {
                    gs.porous = vec![FemState::porous_placeholder(nf_ini, sl_max); ngauss];
                }
                Elem::PorousSldLiq(..) => {
                    gs.solid = vec![LocalState::new(mandel, n_int_vars); ngauss];
                    gs.porous = vec![FemState::porous_placeholder(nf_ini, sl_max); ngauss];
                }
            }
            gauss.push(gs);
        }

        // allocate new instance
        let n_equation = base.dofs.size();
        Ok(FemState {
            t: config.t_ini,
            ddt: (config.ddt)(config.t_ini),
            alpha1: 0.0,
            alpha2: 0.0,
            alpha3: 0.0,
            alpha4: 0.0,
            alpha5: 0.0,
            alpha6: 0.0,
            beta1: 0.0,
            beta2: 0.0,
            duu: Vector::new(n_equation),
            uu: Vector::new(n_equation),
            uu_star: Vector::new(n_equation),
            vv_star: Vector::new(n_equation),
            aa_star: Vector::new(n_equation),
            gauss,
        })
    }

    /// Returns a placeholder porous state (overwritten by the element initialization)
    fn porous_placeholder(nf_ini: f64, sl_max: f64) -> LocalStatePorous {
        LocalStatePorous {
            ns0: 1.0 - nf_ini,
            liquid_saturation: sl_max,
            rho_ll: 0.0,
            rho_gg: 0.0,
            delta_pc: 0.0,
            wetting: false,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
