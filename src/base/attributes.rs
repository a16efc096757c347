use super::Elem;
use crate::StrError;
use gemlab::mesh::CellAttribute;
use std::collections::HashMap;

/// Holds all (CellAttribute, Elem) pairs
#[derive(Clone, Debug)]
pub struct Attributes {
    all: HashMap<CellAttribute, Elem>,
}

impl Attributes {
    /// Allocates a new instance from an array of (CellAttribute, Elem) pairs
    pub fn from<const N: usize>(arr: [(CellAttribute, Elem); N]) -> Self {
        Attributes {
            all: HashMap::from(arr),
        }
    }

    /// Returns the Elem associated with a CellAttribute
    pub fn get(&self, attribute: CellAttribute) -> Result<&Elem, StrError> {
        self.all
            .get(&attribute)
            .ok_or("cannot find CellAttribute in Attributes map")
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
