use super::{Dof, ElementDofsMap};
use crate::StrError;
use gemlab::mesh::{Mesh, PointId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Holds all DOF numbers for all points
///
/// The liquid boundary flux unknowns (Dof::Fl) exist only at the points of
/// seepage faces and are appended after the regular DOFs of each point.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AllDofs {
    /// Holds all DOFs and respective global numbers for all points
    ///
    /// (npoint)
    list: Vec<HashMap<Dof, usize>>,

    /// Holds the total number of DOFs
    ndof: usize,
}

impl AllDofs {
    /// Allocates a new instance
    ///
    /// `seepage_points` holds the IDs of all points on seepage faces; these
    /// points receive an extra Dof::Fl unknown.
    pub fn new(mesh: &Mesh, emap: &ElementDofsMap, seepage_points: &[usize]) -> Result<Self, StrError> {
        // auxiliary memoization data
        let npoint = mesh.points.len();
        let mut memo_point_dofs = vec![HashSet::new(); npoint];

        // find all element DOFs and add (unique) DOF keys to the point DOFs array
        for cell in &mesh.cells {
            let info = emap.get(cell)?;
            for m in 0..cell.points.len() {
                for (dof, _) in &info.dofs[m] {
                    memo_point_dofs[cell.points[m]].insert(*dof);
                }
            }
        }

        // liquid boundary flux unknowns on seepage faces
        for point_id in seepage_points {
            if *point_id >= npoint {
                return Err("seepage point is out-of-bounds");
            }
            if !memo_point_dofs[*point_id].contains(&Dof::Pl) {
                return Err("seepage faces must touch points with liquid pressure DOFs");
            }
            memo_point_dofs[*point_id].insert(Dof::Fl);
        }

        // assign numbers to all DOFs
        let mut list = vec![HashMap::new(); npoint];
        let mut ndof = 0; // total number of DOFs
        for point_id in 0..npoint {
            let mut sorted_dofs: Vec<_> = memo_point_dofs[point_id].iter().collect();
            sorted_dofs.sort();
            for dof in sorted_dofs {
                list[point_id].insert(*dof, ndof);
                ndof += 1;
            }
        }

        // done
        Ok(AllDofs { list, ndof })
    }

    /// Returns whether a point has a specific DOF or not
    pub fn contains(&self, point_id: PointId, dof: Dof) -> bool {
        self.list[point_id].contains_key(&dof)
    }

    /// Returns the total number of DOFs
    pub fn size(&self) -> usize {
        self.ndof
    }

    /// Returns the (global) number of a DOF
    pub fn eq(&self, point_id: PointId, dof: Dof) -> Result<usize, StrError> {
        if point_id >= self.list.len() {
            return Err("cannot find equation number because PointId is out-of-bounds");
        }
        let eq = self.list[point_id]
            .get(&dof)
            .ok_or("cannot find the number of a (PointId, DOF) pair")?;
        Ok(*eq)
    }

    /// Returns the DOF keys of a point (sorted according to the enum value)
    pub fn keys(&self, point_id: PointId) -> Vec<Dof> {
        let mut keys: Vec<_> = self.list[point_id].keys().copied().collect();
        keys.sort();
        keys
    }
}

impl fmt::Display for AllDofs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Points: DOF keys and global numbers\n").unwrap();
        write!(f, "===================================\n").unwrap();
        for point_id in 0..self.list.len() {
            let mut dof_eqn: Vec<_> = self.list[point_id].iter().collect();
            dof_eqn.sort_by(|a, b| a.0.partial_cmp(b.0).unwrap());
            write!(f, "{:?}: {:?}\n", point_id, dof_eqn).unwrap();
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::AllDofs;
    use crate::base::{Attributes, Dof, Elem, ElementDofsMap, ParamPorousSldLiq, ParamSolid};
    use gemlab::mesh::Samples;

    #[test]
    fn new_works() {
        let mesh = Samples::one_tri6();
        let p1 = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let amap = Attributes::from([(1, Elem::PorousSldLiq(p1))]);
        let emap = ElementDofsMap::new(&mesh, &amap).unwrap();
        let dofs = AllDofs::new(&mesh, &emap, &[]).unwrap();
        assert_eq!(dofs.size(), 15);
        assert_eq!(dofs.eq(0, Dof::Ux).unwrap(), 0);
        assert_eq!(dofs.eq(0, Dof::Pl).unwrap(), 2);
        assert_eq!(dofs.eq(1, Dof::Ux).unwrap(), 3);
        assert_eq!(dofs.eq(3, Dof::Ux).unwrap(), 9);
        assert!(!dofs.contains(3, Dof::Pl));
        assert_eq!(dofs.keys(0), &[Dof::Ux, Dof::Uy, Dof::Pl]);
        assert_eq!(
            format!("{}", dofs),
            "Points: DOF keys and global numbers\n\
             ===================================\n\
             0: [(Ux, 0), (Uy, 1), (Pl, 2)]\n\
             1: [(Ux, 3), (Uy, 4), (Pl, 5)]\n\
             2: [(Ux, 6), (Uy, 7), (Pl, 8)]\n\
             3: [(Ux, 9), (Uy, 10)]\n\
             4: [(Ux, 11), (Uy, 12)]\n\
             5: [(Ux, 13), (Uy, 14)]\n"
        );
    }

    #[test]
    fn new_with_seepage_points_works() {
        let mesh = Samples::one_qua4();
        let p1 = ParamPorousSldLiq::sample_brooks_corey_constant_elastic();
        let amap = Attributes::from([(1, Elem::PorousSldLiq(p1))]);
        let emap = ElementDofsMap::new(&mesh, &amap).unwrap();
        let dofs = AllDofs::new(&mesh, &emap, &[2, 3]).unwrap();
        // 4 x (Ux,Uy,Pl) + 2 x Fl
        assert_eq!(dofs.size(), 14);
        assert!(dofs.contains(2, Dof::Fl));
        assert!(dofs.contains(3, Dof::Fl));
        assert!(!dofs.contains(0, Dof::Fl));
        // Fl is numbered after Pl at its point
        assert_eq!(dofs.keys(2), &[Dof::Ux, Dof::Uy, Dof::Pl, Dof::Fl]);
    }

    #[test]
    fn new_handles_errors() {
        let mesh = Samples::one_tri3();
        let p1 = ParamSolid::sample_linear_elastic();
        let amap = Attributes::from([(1, Elem::Solid(p1))]);
        let emap = ElementDofsMap::new(&mesh, &amap).unwrap();
        assert_eq!(
            AllDofs::new(&mesh, &emap, &[100]).err(),
            Some("seepage point is out-of-bounds")
        );
        assert_eq!(
            AllDofs::new(&mesh, &emap, &[0]).err(),
            Some("seepage faces must touch points with liquid pressure DOFs")
        );
        let dofs = AllDofs::new(&mesh, &emap, &[]).unwrap();
        assert_eq!(
            dofs.eq(100, Dof::Ux).err(),
            Some("cannot find equation number because PointId is out-of-bounds")
        );
        assert_eq!(
            dofs.eq(0, Dof::Pl).err(),
            Some("cannot find the number of a (PointId, DOF) pair")
        );
    }
}
