use crate::base::{AllDofs, Attributes, Elem, ElementDofsMap, Natural};
use crate::StrError;
use gemlab::mesh::{Cell, CellAttribute, Mesh};

/// Holds the material parameters, element attributes, and DOF numbers
pub struct FemBase {
    /// Holds all attributes
    pub amap: Attributes,

    /// Holds the element information such as local DOFs and equation numbers
    pub emap: ElementDofsMap,

    /// Holds all DOF numbers
    pub dofs: AllDofs,
}

impl FemBase {
    /// Allocates a new instance
    pub fn new<const N: usize>(mesh: &Mesh, arr: [(CellAttribute, Elem); N]) -> Result<Self, StrError> {
        let amap = Attributes::from(arr);
        let emap = ElementDofsMap::new(&mesh, &amap)?;
        let dofs = AllDofs::new(&mesh, &emap, &[])?;
        Ok(FemBase { amap, emap, dofs })
    }

    /// Allocates a new instance considering seepage faces
    ///
    /// The points on faces under seepage conditions receive the extra liquid
    /// boundary flux unknowns (Dof::Fl).
    pub fn new_with_natural<const N: usize>(
        mesh: &Mesh,
        arr: [(CellAttribute, Elem); N],
        natural: &Natural,
    ) -> Result<Self, StrError> {
        let amap = Attributes::from(arr);
        let emap = ElementDofsMap::new(&mesh, &amap)?;
        let dofs = AllDofs::new(&mesh, &emap, &natural.seepage_points())?;
        Ok(FemBase { amap, emap, dofs })
    }

    /// Returns the number of local equations (without seepage flux unknowns)
    pub fn n_local_eq(&self, cell: &Cell) -> Result<usize, StrError> {
        let info = self.emap.get(cell)?;
        Ok(info.n_equation)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
