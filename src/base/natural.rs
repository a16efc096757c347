use super::Nbc;
use gemlab::mesh::{Edge, Face};

/// Holds natural (Neumann-like) boundary conditions on edges and faces
///
/// Each condition carries a constant value and, optionally, the index of a
/// function of time that overrides the value during the simulation. For
/// seepage conditions, the value is the base pressure ceiling (plmax) and the
/// function gives the time-varying shift subtracted from it.
pub struct Natural<'a> {
    /// All edge conditions: (edge, condition, value, function index)
    pub on_edges: Vec<(Edge, Nbc, f64, Option<usize>)>,

    /// All face conditions: (face, condition, value, function index)
    pub on_faces: Vec<(Face, Nbc, f64, Option<usize>)>,

    /// All functions of time
    pub functions: Vec<Box<dyn Fn(f64) -> f64 + 'a>>,
}

impl<'a> Natural<'a> {
    /// Allocates a new instance
    pub fn new() -> Self {
        Natural {
            on_edges: Vec::new(),
            on_faces: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Sets a natural boundary condition on an edge
    pub fn edge(&mut self, edge: &Edge, nbc: Nbc, value: f64) -> &mut Self {
        self.on_edges.push((edge.clone(), nbc, value, None));
        self
    }

    /// Sets a natural boundary condition on an edge with a function of time
    pub fn edge_fn(&mut self, edge: &Edge, nbc: Nbc, value: f64, f: impl Fn(f64) -> f64 + 'a) -> &mut Self {
        self.functions.push(Box::new(f));
        self.on_edges
            .push((edge.clone(), nbc, value, Some(self.functions.len() - 1)));
        self
    }

    /// Sets a natural boundary condition on a face
    pub fn face(&mut self, face: &Face, nbc: Nbc, value: f64) -> &mut Self {
        self.on_faces.push((face.clone(), nbc, value, None));
        self
    }

    /// Sets a natural boundary condition on a face with a function of time
    pub fn face_fn(&mut self, face: &Face, nbc: Nbc, value: f64, f: impl Fn(f64) -> f64 + 'a) -> &mut Self {
        self.functions.push(Box::new(f));
        self.on_faces
            .push((face.clone(), nbc, value, Some(self.functions.len() - 1)));
        self
    }

    /// Returns the points of all edges/faces under seepage conditions (sorted, unique)
    pub fn seepage_points(&self) -> Vec<usize> {
        let mut points = Vec::new();
        for (edge, nbc, _, _) in &self.on_edges {
            if *nbc == Nbc::Seep {
                points.extend(&edge.points);
            }
        }
        for (face, nbc, _, _) in &self.on_faces {
            if *nbc == Nbc::Seep {
                points.extend(&face.points);
            }
        }
        points.sort();
        points.dedup();
        points
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
