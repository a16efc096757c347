use super::{ElementLiquid, ElementPorousUsPl, ElementSolid, ElementTrait, FemBase, FemState};
use crate::base::{Config, Elem, Natural, ParamFluids};
use crate::StrError;
use gemlab::mesh::{CellId, Mesh};
use russell_lab::{deriv1_central5, Matrix, Vector};

/// Defines a generic finite element, wrapping an "actual" implementation
pub struct GenericElement<'a> {
    /// Connects to the "actual" implementation of local equations
    pub actual: Box<dyn ElementTrait + 'a>,

    /// Holds the local vector of internal forces (including the transient terms)
    pub f_int: Vector,

    /// Holds the local vector of external forces
    pub f_ext: Vector,

    /// Holds the local Jacobian matrix
    pub kke: Matrix,
}

/// Holds auxiliary arguments for the computation of numerical Jacobian matrices
struct ArgsForNumericalJacobian<'b> {
    /// Holds the local vector of internal forces
    pub f_int: &'b mut Vector,

    /// Holds the current state
    pub state: &'b mut FemState,
}

impl<'a> GenericElement<'a> {
    /// Allocates a new instance
    ///
    /// `fluids` is required by the porous elements only.
    pub fn new(
        mesh: &'a Mesh,
        base: &FemBase,
        config: &'a Config<'a>,
        cell_id: CellId,
        fluids: Option<&ParamFluids>,
        natural: Option<&'a Natural<'a>>,
    ) -> Result<Self, StrError> {
        let cell = &mesh.cells[cell_id];
        let element = base.amap.get(cell.attribute)?;
        let actual: Box<dyn ElementTrait + 'a> = match element {
            Elem::Solid(p) => Box::new(ElementSolid::new(
                mesh,
                base,
                config,
                cell_id,
                &p.stress_strain,
                p.ngauss,
                natural,
            )?),
            Elem::PorousLiq(p) => {
                let fluids = fluids.ok_or("parameters for fluids are required by PorousLiq")?;
                Box::new(ElementLiquid::new(mesh, base, config, cell_id, fluids, p, natural)?)
            }
            Elem::PorousSldLiq(p) => {
                let fluids = fluids.ok_or("parameters for fluids are required by PorousSldLiq")?;
                Box::new(ElementPorousUsPl::new(mesh, base, config, cell_id, fluids, p, natural)?)
            }
        };
        let neq = actual.local_to_global().len();
        Ok(GenericElement {
            actual,
            f_int: Vector::new(neq),
            f_ext: Vector::new(neq),
            kke: Matrix::new(neq, neq),
        })
    }

    /// Calculates the local Jacobian matrix using finite differences
    ///
    /// The element backup must hold the local states at the beginning of the
    /// current timestep: every probe restores the backup, re-applies the full
    /// (perturbed) increment, and evaluates f_int. The state is left updated
    /// with the original increment.
    pub fn numerical_jacobian(&mut self, state: &mut FemState) -> Result<(), StrError> {
        let l2g = self.actual.local_to_global().clone();
        let neq = l2g.len();
        let mut args = ArgsForNumericalJacobian {
            f_int: &mut self.f_int,
            state,
        };
        for i in 0..neq {
            for j in 0..neq {
                let gj = l2g[j];
                let at_u = args.state.uu[gj];
                let original_duu = args.state.duu[gj];
                let res = deriv1_central5(at_u, &mut args, |u, a| {
                    a.state.uu[gj] = u;
                    a.state.duu[gj] = original_duu + (u - at_u);
                    self.actual.restore_secondary_values(a.state);
                    self.actual.update_secondary_values(a.state).unwrap();
                    self.actual.calc_f_int(a.f_int, a.state).unwrap();
                    a.state.uu[gj] = at_u;
                    a.state.duu[gj] = original_duu;
                    Ok(a.f_int[i])
                });
                self.kke.set(i, j, res.unwrap());
            }
        }
        // leave the state consistent with the original solution
        self.actual.restore_secondary_values(args.state);
        self.actual.update_secondary_values(args.state)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
