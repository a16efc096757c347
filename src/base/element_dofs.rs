use super::{Attributes, Dof, Elem};
use crate::StrError;
use gemlab::mesh::{Cell, CellAttribute, Mesh};
use gemlab::shapes::GeoKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Returns the basic (lowest-order) kind used by the liquid pressure interpolation
///
/// Quadratic kinds map to their linear counterpart so that the mixed u-p
/// interpolation satisfies the LBB condition; kinds without a lower-order
/// counterpart (e.g., Qua4) are their own basic kind.
pub fn basic_geo_kind(kind: GeoKind) -> GeoKind {
    match kind.lower_order() {
        Some(basic) => basic,
        None => kind,
    }
}

/// Holds information of an (Element,GeoKind) pair such as DOFs and local equation numbers
///
/// The displacement DOFs come first at every node; the liquid pressure DOFs
/// are appended afterwards at the corner nodes of the basic kind:
///
/// ```text
/// leq: local equation number       leq   point   geq
/// geq: global equation number       ↓        ↓    ↓
///                                   0 → Ux @ 0 →  0
///            {Ux → 6}               1 → Uy @ 0 →  1
///            {Uy → 7}               2 → Ux @ 1 →  3
///            {Pl → 8}               3 → Uy @ 1 →  4
///                2                  4 → Ux @ 2 →  6
///               / \                 5 → Uy @ 2 →  7
///   {Ux → 13}  /   \  {Ux → 11}     6 → Ux @ 3 →  9
///   {Uy → 14} 5     4 {Uy → 12}     7 → Uy @ 3 → 10
///            /       \              8 → Ux @ 4 → 11
/// {Ux → 0}  /         \  {Ux → 3}   9 → Uy @ 4 → 12
/// {Uy → 1} 0-----3-----1 {Uy → 4}  10 → Ux @ 5 → 13
/// {Pl → 2}   {Ux → 9}    {Pl → 5}  11 → Uy @ 5 → 14
///            {Uy → 10}             12 → Pl @ 0 →  2  <<< eq_first_pl
///                                  13 → Pl @ 1 →  5
///                                  14 → Pl @ 2 →  8
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ElementDofs {
    /// Holds all cell DOF keys and local equation numbers
    ///
    /// **Notes:** The outer array has length = nnode.
    /// The inner arrays have variable lengths = ndof at the node.
    pub dofs: Vec<Vec<(Dof, usize)>>,

    /// Dimension of the local system of equations
    ///
    /// **Note:** This is equal to the total number of DOFs in the cell,
    /// excluding any seepage-face flux unknowns
    pub n_equation: usize,

    /// Local equation number of the first Dof::Pl
    pub eq_first_pl: Option<usize>,
}

impl ElementDofs {
    /// Allocates a new instance
    pub fn new(ndim: usize, element: Elem, kind: GeoKind) -> Result<Self, StrError> {
        // check
        if kind.is_lin() {
            return Err("GeoClass::Lin cannot be used with Solid or Porous elements");
        }

        // auxiliary data
        let nnode = kind.nnode();
        let mut dofs = vec![Vec::new(); nnode];
        let mut count = 0;
        let mut eq_first_pl = None;

        // handle each element type
        #[rustfmt::skip]
        match element {
            Elem::Solid(..) => {
                for m in 0..nnode {
                    dofs[m].push((Dof::Ux, count)); count += 1;
                    dofs[m].push((Dof::Uy, count)); count += 1;
                    if ndim == 3 {
                        dofs[m].push((Dof::Uz, count)); count += 1;
                    }
                }
            }
            Elem::PorousLiq(..) => {
                for m in 0..nnode {
                    dofs[m].push((Dof::Pl, count)); count += 1;
                }
            }
            Elem::PorousSldLiq(..) => {
                for m in 0..nnode {
                    dofs[m].push((Dof::Ux, count)); count += 1;
                    dofs[m].push((Dof::Uy, count)); count += 1;
                    if ndim == 3 {
                        dofs[m].push((Dof::Uz, count)); count += 1;
                    }
                }
                let ncorner = basic_geo_kind(kind).nnode();
                eq_first_pl = Some(count);
                for m in 0..ncorner {
                    dofs[m].push((Dof::Pl, count)); count += 1;
                }
            }
        };
        Ok(ElementDofs {
            dofs,
            n_equation: count,
            eq_first_pl,
        })
    }
}

/// Maps (CellAttribute, GeoKind) to ElementDofs
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ElementDofsMap {
    all: HashMap<(CellAttribute, GeoKind), ElementDofs>,
    names: HashMap<(CellAttribute, GeoKind), String>,
}

impl ElementDofsMap {
    /// Allocates a new instance
    pub fn new(mesh: &Mesh, att_map: &Attributes) -> Result<Self, StrError> {
        let mut all = HashMap::new();
        let mut names = HashMap::new();
        for cell in &mesh.cells {
            let element = att_map.get(cell.attribute)?;
            all.insert(
                (cell.attribute, cell.kind),
                ElementDofs::new(mesh.ndim, *element, cell.kind)?,
            );
            names.insert((cell.attribute, cell.kind), element.name());
        }
        Ok(ElementDofsMap { all, names })
    }

    /// Returns the ElementDofs corresponding to Cell
    pub fn get(&self, cell: &Cell) -> Result<&ElementDofs, StrError> {
        self.all
            .get(&(cell.attribute, cell.kind))
            .ok_or("cannot find (CellAttribute, GeoKind) in ElementDofsMap")
    }
}

impl fmt::Display for ElementDofs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in 0..self.dofs.len() {
            write!(f, "{}: {:?}\n", m, self.dofs[m]).unwrap();
        }
        write!(f, "(Pl @ {:?})\n", self.eq_first_pl)
    }
}

impl fmt::Display for ElementDofsMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Elements: DOFs and local equation numbers\n").unwrap();
        write!(f, "=========================================\n").unwrap();
        let mut keys: Vec<_> = self.all.keys().collect();
        keys.sort_by(|a, b| a.0.cmp(&b.0));
        for key in keys {
            let info = self.all.get(key).unwrap();
            let name = self.names.get(key).unwrap();
            let (id, kind) = key;
            write!(f, "{} → {} → {:?}\n", id, name, kind).unwrap();
            write!(f, "{}", info).unwrap();
            write!(f, "-----------------------------------------\n").unwrap();
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{basic_geo_kind, ElementDofs, ElementDofsMap};
    use crate::base::{Attributes, Dof, Elem, ParamPorousLiq, ParamPorousSldLiq, ParamSolid};
    use gemlab::{mesh::Samples, shapes::GeoKind};

    #[test]
    fn basic_geo_kind_works() {
        assert_eq!(basic_geo_kind(GeoKind::Tri6), GeoKind::Tri3);
        assert_eq!(basic_geo_kind(GeoKind::Qua8), GeoKind::Qua4);
        assert_eq!(basic_geo_kind(GeoKind::Qua4), GeoKind::Qua4);
        assert_eq!(basic_geo_kind(GeoKind::Tri3), GeoKind::Tri3);
    }

    #[test]
    fn new_handles_errors() {
        let p = ParamSolid::sample_linear_elastic();
        assert_eq!(
            ElementDofs::new(2, Elem::Solid(p), GeoKind::Lin2).err(),
            Some("GeoClass::Lin cannot be used with Solid or Porous elements")
        );
    }

    #[test]
    fn new_works_2d() {
        let pd = ParamSolid::sample_linear_elastic();
        let pe = ParamPorousLiq::sample_brooks_corey_constant();
        let pg = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let d = ElementDofs::new(2, Elem::Solid(pd), GeoKind::Tri3).unwrap();
        let e = ElementDofs::new(2, Elem::PorousLiq(pe), GeoKind::Tri3).unwrap();
        let g = ElementDofs::new(2, Elem::PorousSldLiq(pg), GeoKind::Tri6).unwrap();
        let q = ElementDofs::new(2, Elem::PorousSldLiq(pg), GeoKind::Qua4).unwrap();
        assert_eq!(
            d.dofs,
            vec![
                vec![(Dof::Ux, 0), (Dof::Uy, 1)],
                vec![(Dof::Ux, 2), (Dof::Uy, 3)],
                vec![(Dof::Ux, 4), (Dof::Uy, 5)]
            ]
        );
        assert_eq!(e.dofs, &[[(Dof::Pl, 0)], [(Dof::Pl, 1)], [(Dof::Pl, 2)]]);
        assert_eq!(
            g.dofs,
            vec![
                vec![(Dof::Ux, 0), (Dof::Uy, 1), (Dof::Pl, 12)],
                vec![(Dof::Ux, 2), (Dof::Uy, 3), (Dof::Pl, 13)],
                vec![(Dof::Ux, 4), (Dof::Uy, 5), (Dof::Pl, 14)],
                vec![(Dof::Ux, 6), (Dof::Uy, 7)],
                vec![(Dof::Ux, 8), (Dof::Uy, 9)],
                vec![(Dof::Ux, 10), (Dof::Uy, 11)]
            ]
        );
        assert_eq!(g.eq_first_pl, Some(12));
        assert_eq!(g.n_equation, 15);
        // equal-order pair: the basic kind of Qua4 is Qua4 itself
        assert_eq!(
            q.dofs,
            vec![
                vec![(Dof::Ux, 0), (Dof::Uy, 1), (Dof::Pl, 8)],
                vec![(Dof::Ux, 2), (Dof::Uy, 3), (Dof::Pl, 9)],
                vec![(Dof::Ux, 4), (Dof::Uy, 5), (Dof::Pl, 10)],
                vec![(Dof::Ux, 6), (Dof::Uy, 7), (Dof::Pl, 11)]
            ]
        );
        assert_eq!(q.n_equation, 12);
    }

    #[test]
    fn new_works_3d() {
        let pg = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let g = ElementDofs::new(3, Elem::PorousSldLiq(pg), GeoKind::Tri6).unwrap();
        assert_eq!(
            g.dofs,
            vec![
                vec![(Dof::Ux, 0), (Dof::Uy, 1), (Dof::Uz, 2), (Dof::Pl, 18)],
                vec![(Dof::Ux, 3), (Dof::Uy, 4), (Dof::Uz, 5), (Dof::Pl, 19)],
                vec![(Dof::Ux, 6), (Dof::Uy, 7), (Dof::Uz, 8), (Dof::Pl, 20)],
                vec![(Dof::Ux, 9), (Dof::Uy, 10), (Dof::Uz, 11)],
                vec![(Dof::Ux, 12), (Dof::Uy, 13), (Dof::Uz, 14)],
                vec![(Dof::Ux, 15), (Dof::Uy, 16), (Dof::Uz, 17)]
            ]
        );
    }

    #[test]
    fn map_and_display_work() {
        let mesh = Samples::one_tri6();
        let p1 = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let att = Attributes::from([(1, Elem::PorousSldLiq(p1))]);
        let emap = ElementDofsMap::new(&mesh, &att).unwrap();
        let info = emap.get(&mesh.cells[0]).unwrap();
        assert_eq!(info.n_equation, 15);
        assert_eq!(
            format!("{}", info),
            "0: [(Ux, 0), (Uy, 1), (Pl, 12)]\n\
             1: [(Ux, 2), (Uy, 3), (Pl, 13)]\n\
             2: [(Ux, 4), (Uy, 5), (Pl, 14)]\n\
             3: [(Ux, 6), (Uy, 7)]\n\
             4: [(Ux, 8), (Uy, 9)]\n\
             5: [(Ux, 10), (Uy, 11)]\n\
             (Pl @ Some(12))\n"
        );
        let mut mesh_wrong = mesh.clone();
        mesh_wrong.cells[0].attribute = 100; // never do this
        assert_eq!(
            emap.get(&mesh_wrong.cells[0]).err(),
            Some("cannot find (CellAttribute, GeoKind) in ElementDofsMap")
        );
    }
}
