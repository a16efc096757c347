use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_sparse::CooMatrix;

/// Assembles a local vector into the global vector
///
/// # Input
///
/// * `rr_global` -- the global vector R with length = `n_equation`
/// * `r_local` -- the local vector r with length = `n_equation_local`
/// * `local_to_global` -- an array holding all global equation numbers
/// * `prescribed` -- tells whether a global equation number has a prescribed
///   DOF or not; its length is equal to the total number of DOFs
///
/// # Panics
///
/// This function will panic if the indices are out-of-bounds
pub fn assemble_vector(rr_global: &mut Vector, r_local: &Vector, local_to_global: &[usize], prescribed: &[bool]) {
    let n_equation_local = r_local.dim();
    for l in 0..n_equation_local {
        let g = local_to_global[l];
        if !prescribed[g] {
            rr_global[g] += r_local[l];
        }
    }
}

/// Assembles a local matrix into the global sparse (triplet) matrix
///
/// This is the only path by which elements emit (i,j,value) entries; the
/// caller supplies the sink and is responsible for its thread-safety.
///
/// # Input
///
/// * `kk_global` -- the global square matrix K (triplet sink)
/// * `kk_local` -- the local square matrix K with dims = (`n_equation_local`,`n_equation_local`)
/// * `local_to_global` -- an array holding all global equation numbers
/// * `prescribed` -- tells whether a global equation number has a prescribed
///   DOF or not; its length is equal to the total number of DOFs
/// * `tol_symmetry` -- if Some, checks that the local matrix is symmetric
///   within the given tolerance (for drivers exploiting symmetric storage)
///
/// # Panics
///
/// This function will panic if the indices are out-of-bounds
pub fn assemble_matrix(
    kk_global: &mut CooMatrix,
    kk_local: &Matrix,
    local_to_global: &[usize],
    prescribed: &[bool],
    tol_symmetry: Option<f64>,
) -> Result<(), StrError> {
    let n_equation_local = kk_local.dims().0;
    if let Some(tol) = tol_symmetry {
        for l in 0..n_equation_local {
            for ll in (l + 1)..n_equation_local {
                if f64::abs(kk_local.get(l, ll) - kk_local.get(ll, l)) > tol {
                    return Err("local matrix is not symmetric");
                }
            }
        }
    }
    for l in 0..n_equation_local {
        let g = local_to_global[l];
        if !prescribed[g] {
            for ll in 0..n_equation_local {
                let gg = local_to_global[ll];
                if !prescribed[gg] {
                    kk_global.put(g, gg, kk_local.get(l, ll))?;
                }
            }
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{assemble_matrix, assemble_vector};
    use russell_lab::{mat_approx_eq, Matrix, Vector};
    use russell_sparse::{CooMatrix, Sym};

    #[test]
    fn assemble_vector_works() {
        //       {2}4---.__
        //         / \     `--.___3{3}   [#] indicates id
        //        /   \          / \     {#} indicates equation id
        //       /     \  [1]   /   \
        //      /  [0]  \      / [2] \
        // {0}0---.__     \  /      ___2{4}
        //           `--.__\/__.---'
        //               {1}1
        let l2g = [vec![0, 1, 2], vec![1, 3, 2], vec![1, 4, 3]];
        let mut global = Vector::new(5);
        let local_0 = Vector::from(&[10.0, 11.0, 14.0]);
        let local_1 = Vector::from(&[2100.0, 2300.0, 2400.0]);
        let local_2 = Vector::from(&[310000.0, 320000.0, 330000.0]);
        let prescribed = vec![false; 5];
        assemble_vector(&mut global, &local_0, &l2g[0], &prescribed);
        assemble_vector(&mut global, &local_1, &l2g[1], &prescribed);
        assemble_vector(&mut global, &local_2, &l2g[2], &prescribed);
        assert_eq!(global.as_data(), &[10.0, 312111.0, 2414.0, 332300.0, 320000.0]);
    }

    #[test]
    fn assemble_matrix_works() {
        let l2g = [vec![0, 1], vec![1, 2]];
        let kk_a = Matrix::from(&[[1.0, 2.0], [2.0, 4.0]]);
        let kk_b = Matrix::from(&[[10.0, 20.0], [20.0, 40.0]]);
        let mut kk = CooMatrix::new(3, 3, 8, Sym::No).unwrap();
        let prescribed = vec![false, false, true];
        assemble_matrix(&mut kk, &kk_a, &l2g[0], &prescribed, Some(1e-12)).unwrap();
        assemble_matrix(&mut kk, &kk_b, &l2g[1], &prescribed, Some(1e-12)).unwrap();
        let dense = kk.as_dense();
        let correct = Matrix::from(&[[1.0, 2.0, 0.0], [2.0, 14.0, 0.0], [0.0, 0.0, 0.0]]);
        mat_approx_eq(&dense, &correct, 1e-15);
    }

    #[test]
    fn assemble_matrix_checks_symmetry() {
        let l2g = vec![0, 1];
        let kk_unsym = Matrix::from(&[[1.0, 2.0], [3.0, 4.0]]);
        let mut kk = CooMatrix::new(2, 2, 4, Sym::No).unwrap();
        let prescribed = vec![false, false];
        assert_eq!(
            assemble_matrix(&mut kk, &kk_unsym, &l2g, &prescribed, Some(1e-12)).err(),
            Some("local matrix is not symmetric")
        );
        assemble_matrix(&mut kk, &kk_unsym, &l2g, &prescribed, None).unwrap();
    }
}
