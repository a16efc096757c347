use crate::StrError;
use gemlab::integ::Gauss;
use gemlab::mesh::Mesh;
use gemlab::shapes::{GeoKind, Scratchpad};
use russell_lab::{vec_norm, Norm, Vector};

/// Assists in the evaluation of shape functions at the integration points of a cell
///
/// Wraps a scratchpad (shape functions, gradients, Jacobian) and an
/// integration rule. The rule kind may differ from the scratchpad kind:
/// the liquid pressure interpolation of the coupled element uses the basic
/// (lower-order) kind evaluated at the integration points of the
/// displacement interpolation.
pub struct CalcData {
    /// Scratchpad to evaluate interpolation functions and gradients
    pub pad: Scratchpad,

    /// Integration (Gauss) points
    pub gauss: Gauss,
}

impl CalcData {
    /// Allocates a new instance
    ///
    /// * `kind` -- the kind of the interpolation (shape) functions
    /// * `points` -- the point IDs matching `kind`
    /// * `rule_kind` -- the kind defining the integration rule
    /// * `ngauss` -- optional number of integration points (None means default)
    pub fn new(
        mesh: &Mesh,
        kind: GeoKind,
        points: &[usize],
        rule_kind: GeoKind,
        ngauss: Option<usize>,
    ) -> Result<Self, StrError> {
        let mut pad = Scratchpad::new(mesh.ndim, kind)?;
        mesh.set_pad(&mut pad, points);
        let gauss = Gauss::new_or_sized(rule_kind, ngauss)?;
        Ok(CalcData { pad, gauss })
    }

    /// Returns the number of integration points
    pub fn ngauss(&self) -> usize {
        self.gauss.npoint()
    }

    /// Returns the weight of the p-th integration point
    pub fn weight(&self, p: usize) -> f64 {
        self.gauss.weight(p)
    }

    /// Evaluates the interpolation functions (and gradients) at the p-th integration point
    ///
    /// Returns det(J) when the gradient is requested (zero otherwise).
    /// The results are stored in `pad.interp` and `pad.gradient`.
    pub fn calc_at_ip(&mut self, p: usize, want_gradient: bool) -> Result<f64, StrError> {
        let ksi = self.gauss.coords(p).as_data();
        (self.pad.fn_interp)(&mut self.pad.interp, ksi);
        if want_gradient {
            let det_jac = self.pad.calc_gradient(ksi)?;
            if det_jac <= 0.0 {
                return Err("cannot evaluate shape functions because det(J) ≤ 0");
            }
            return Ok(det_jac);
        }
        Ok(0.0)
    }

    /// Returns the radius at the current integration point (axisymmetric analyses)
    ///
    /// Requires `calc_at_ip` to have been called for this point.
    pub fn radius(&self) -> f64 {
        let nnode = self.pad.kind.nnode();
        let mut r = 0.0;
        for m in 0..nnode {
            r += self.pad.interp[m] * self.pad.xxt.get(0, m);
        }
        r
    }

    /// Calculates the real coordinates of the p-th integration point
    pub fn ip_coords(&mut self, x: &mut Vector, p: usize) -> Result<(), StrError> {
        let ksi = self.gauss.coords(p).as_data();
        self.pad.calc_coords(x, ksi)
    }
}

/// Assists in the evaluation of shape functions at the integration points of a boundary face
pub struct CalcDataBry {
    /// Scratchpad to evaluate the face interpolation functions
    pub pad: Scratchpad,

    /// Integration (Gauss) points of the face
    pub gauss: Gauss,

    /// Outward normal vector (with magnitude equal to the face Jacobian)
    pub normal: Vector,
}

impl CalcDataBry {
    /// Allocates a new instance
    pub fn new(mesh: &Mesh, kind: GeoKind, points: &[usize]) -> Result<Self, StrError> {
        let mut pad = Scratchpad::new(mesh.ndim, kind)?;
        mesh.set_pad(&mut pad, points);
        let gauss = Gauss::new(kind);
        Ok(CalcDataBry {
            pad,
            gauss,
            normal: Vector::new(mesh.ndim),
        })
    }

    /// Returns the number of integration points of the face
    pub fn ngauss(&self) -> usize {
        self.gauss.npoint()
    }

    /// Returns the weight of the p-th integration point of the face
    pub fn weight(&self, p: usize) -> f64 {
        self.gauss.weight(p)
    }

    /// Evaluates the face interpolation functions and the outward normal
    ///
    /// Returns the face Jacobian ‖n‖; the results are stored in `pad.interp`
    /// and `normal`.
    pub fn calc_at_face_ip(&mut self, p: usize) -> Result<f64, StrError> {
        let ksi = self.gauss.coords(p).as_data();
        (self.pad.fn_interp)(&mut self.pad.interp, ksi);
        self.pad.calc_normal_vector(&mut self.normal, ksi)?;
        let jf = vec_norm(&self.normal, Norm::Euc);
        if jf <= 0.0 {
            return Err("cannot evaluate face shape functions because ‖n‖ ≤ 0");
        }
        Ok(jf)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{CalcData, CalcDataBry};
    use gemlab::mesh::{Features, Samples};
    use gemlab::shapes::GeoKind;
    use russell_lab::{approx_eq, Vector};

    #[test]
    fn calc_data_works() {
        // unit square: det(J) = 1/4, Σ S = 1
        let mesh = Samples::one_qua4();
        let cell = &mesh.cells[0];
        let mut calc = CalcData::new(&mesh, cell.kind, &cell.points, cell.kind, None).unwrap();
        assert_eq!(calc.ngauss(), 4);
        let det_jac = calc.calc_at_ip(0, true).unwrap();
        approx_eq(det_jac, 0.25, 1e-15);
        let mut sum = 0.0;
        for m in 0..4 {
            sum += calc.pad.interp[m];
        }
        approx_eq(sum, 1.0, 1e-15);
        // weights of the 2x2 rule sum to the reference area
        let total: f64 = (0..4).map(|p| calc.weight(p)).sum();
        approx_eq(total, 4.0, 1e-15);
        // real coordinates of the first point are inside the cell
        let mut x = Vector::new(2);
        calc.ip_coords(&mut x, 0).unwrap();
        assert!(x[0] > 0.0 && x[0] < 1.0);
        assert!(x[1] > 0.0 && x[1] < 1.0);
    }

    #[test]
    fn calc_data_with_basic_kind_works() {
        // Qua8 cell with the pressure pad on the corner nodes, sharing the Qua8 rule
        let mesh = Samples::block_2d_four_qua8();
        let cell = &mesh.cells[0];
        let corner = &cell.points[..4];
        let mut calc = CalcData::new(&mesh, GeoKind::Qua4, corner, cell.kind, None).unwrap();
        assert_eq!(calc.ngauss(), 9); // rule of the Qua8
        calc.calc_at_ip(0, true).unwrap();
        let mut sum = 0.0;
        for m in 0..4 {
            sum += calc.pad.interp[m];
        }
        approx_eq(sum, 1.0, 1e-14);
    }

    #[test]
    fn calc_data_bry_works() {
        // top edge of the unit square: outward normal points up, ‖n‖ = L/2 = 1/2
        let mesh = Samples::one_qua4();
        let features = Features::new(&mesh, false);
        let top = features.edges.get(&(2, 3)).unwrap();
        let mut bry = CalcDataBry::new(&mesh, top.kind, &top.points).unwrap();
        let jf = bry.calc_at_face_ip(0).unwrap();
        approx_eq(jf, 0.5, 1e-15);
        approx_eq(bry.normal[0], 0.0, 1e-15);
        approx_eq(bry.normal[1], 0.5, 1e-15);
    }
}
