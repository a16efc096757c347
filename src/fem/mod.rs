//! Implements finite elements and the state of a simulation

mod calc_data;
mod control_time;
mod element_liquid;
mod element_porous_us_pl;
mod element_solid;
mod element_trait;
mod elements;
mod fem_base;
mod fem_state;
mod secondary_values;
pub use crate::fem::calc_data::*;
pub use crate::fem::control_time::*;
pub use crate::fem::element_liquid::*;
pub use crate::fem::element_porous_us_pl::*;
pub use crate::fem::element_solid::*;
pub use crate::fem::element_trait::*;
pub use crate::fem::elements::*;
pub use crate::fem::fem_base::*;
pub use crate::fem::fem_state::*;
pub use crate::fem::secondary_values::*;
