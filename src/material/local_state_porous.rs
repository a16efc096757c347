use serde::{Deserialize, Serialize};

/// Holds local state data for the porous medium (liquid retention)
///
/// This data structure is associated with a Gauss (integration) point.
/// It is mutated only by the saturation update and restored in lockstep
/// with the solid state during backup/restore cycles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalStatePorous {
    /// Reference volume fraction of solids `ns0 = (1 - divus)・(1 - nf0)` at the stage start
    pub ns0: f64,

    /// Holds the current liquid saturation `sl ∈ [sl_min, 1]`
    pub liquid_saturation: f64,

    /// Holds the current intrinsic (real) density of liquid `ρL`
    pub rho_ll: f64,

    /// Holds the current intrinsic (real) density of gas `ρG`
    ///
    /// Kept up-to-date for future gas coupling; unused by the u-p residual
    pub rho_gg: f64,

    /// Holds the capillary pressure increment `Δpc` committed by the last update
    pub delta_pc: f64,

    /// Holds the wetting flag (true when the last `Δpc < 0`)
    pub wetting: bool,
}

impl LocalStatePorous {
    /// Copy data from another state into this state
    pub fn mirror(&mut self, other: &LocalStatePorous) {
        self.ns0 = other.ns0;
        self.liquid_saturation = other.liquid_saturation;
        self.rho_ll = other.rho_ll;
        self.rho_gg = other.rho_gg;
        self.delta_pc = other.delta_pc;
        self.wetting = other.wetting;
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LocalStatePorous;

    #[test]
    fn mirror_and_derive_work() {
        let a = LocalStatePorous {
            ns0: 0.6,
            liquid_saturation: 0.8,
            rho_ll: 1.0,
            rho_gg: 0.0012,
            delta_pc: -3.0,
            wetting: true,
        };
        let mut b = a.clone();
        b.liquid_saturation = 0.5;
        b.mirror(&a);
        assert_eq!(b.liquid_saturation, 0.8);
        assert_eq!(b.delta_pc, -3.0);
        assert!(b.wetting);
        let json = serde_json::to_string(&a).unwrap();
        let c: LocalStatePorous = serde_json::from_str(&json).unwrap();
        assert_eq!(c.ns0, 0.6);
    }
}
