use russell_tensor::Mandel;

/// Defines the geometry idealization (axisymmetric, plane-strain, none)
///
/// In 2D, the default choice is plane-strain with unit out-of-plane thickness.
/// The axisymmetric case multiplies all volume integrals by the radius at
/// each integration point (no further idealization-specific terms are added).
#[derive(Clone, Copy, Debug)]
pub struct Idealization {
    /// Indicates 2D instead of 3D
    pub two_dim: bool,

    /// Indicates an axisymmetry idealization in 2D
    pub axisymmetric: bool,

    /// Indicates a plane-stress idealization in 2D
    pub plane_stress: bool,

    /// Holds the out-of-plane thickness (default = 1.0)
    pub thickness: f64,
}

impl Idealization {
    /// Allocates a new instance
    pub fn new(ndim: usize) -> Self {
        Idealization {
            two_dim: ndim == 2,
            axisymmetric: false,
            plane_stress: false,
            thickness: 1.0,
        }
    }

    /// Returns the symmetric Mandel representation associated with the idealization
    pub fn mandel(&self) -> Mandel {
        if self.two_dim {
            Mandel::Symmetric2D
        } else {
            Mandel::Symmetric
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
