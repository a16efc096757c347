//! Implements material models and local (integration point) state data

mod linear_elastic;
mod local_state;
mod local_state_porous;
mod model_brooks_corey;
mod model_conductivity;
mod model_liquid_retention;
mod model_pedroso_williams;
mod model_stress_strain;
mod model_van_genuchten;
mod porous_medium;
mod von_mises;
pub use crate::material::linear_elastic::*;
pub use crate::material::local_state::*;
pub use crate::material::local_state_porous::*;
pub use crate::material::model_brooks_corey::*;
pub use crate::material::model_conductivity::*;
pub use crate::material::model_liquid_retention::*;
pub use crate::material::model_pedroso_williams::*;
pub use crate::material::model_stress_strain::*;
pub use crate::material::model_van_genuchten::*;
pub use crate::material::porous_medium::*;
pub use crate::material::von_mises::*;
