/// Holds parameters for stress-strain relations (total or effective stress)
#[derive(Clone, Copy, Debug)]
pub enum StressStrain {
    /// Linear elastic model
    LinearElastic {
        /// Young's modulus
        young: f64,

        /// Poisson's coefficient
        poisson: f64,
    },

    /// von Mises plasticity model
    VonMises {
        /// Young's modulus
        young: f64,

        /// Poisson's coefficient
        poisson: f64,

        /// Hardening coefficient
        hh: f64,

        /// Initial size of the yield surface
        ///
        /// This value corresponds to the von Mises stress:
        ///
        /// ```text
        /// f = σd - z
        /// ```
        z_ini: f64,
    },
}

impl StressStrain {
    /// Returns the number of internal values used by the model
    pub fn n_internal_values(&self) -> usize {
        match self {
            StressStrain::LinearElastic { .. } => 0,
            StressStrain::VonMises { .. } => 1,
        }
    }

    /// Returns a sample of parameters for the linear elastic model
    pub fn sample_linear_elastic() -> Self {
        StressStrain::LinearElastic {
            young: 1500.0,
            poisson: 0.25,
        }
    }
}

/// Holds parameters for liquid-retention models
#[derive(Clone, Copy, Debug)]
pub enum LiquidRetention {
    BrooksCorey {
        /// Slope coefficient
        lambda: f64,

        /// Air-entry pressure
        pc_ae: f64,

        /// Residual (minimum) saturation
        sl_min: f64,

        /// Maximum saturation
        sl_max: f64,
    },
    VanGenuchten {
        /// α parameter
        alpha: f64,

        /// m parameter
        m: f64,

        /// n parameter
        n: f64,

        /// Minimum sl
        sl_min: f64,

        /// Maximum sl
        sl_max: f64,

        /// Capillary pressure limit to consider zero slope
        pc_min: f64,
    },
    PedrosoWilliams {
        /// Allows the model to generate hysteresis loops and scanning curves
        with_hysteresis: bool,

        /// λd parameter
        lambda_d: f64,

        /// λw parameter
        lambda_w: f64,

        /// βd parameter
        beta_d: f64,

        /// βw parameter
        beta_w: f64,

        /// β1 parameter
        beta_1: f64,

        /// β2 parameter
        beta_2: f64,

        /// xrd parameter
        x_rd: f64,

        /// xrw parameter
        x_rw: f64,

        /// y0 parameter
        y_0: f64,

        /// yr parameter
        y_r: f64,
    },
}

impl LiquidRetention {
    /// Returns the maximum liquid saturation
    pub fn max_liquid_saturation(&self) -> f64 {
        match self {
            LiquidRetention::BrooksCorey { sl_max, .. } => *sl_max,
            LiquidRetention::VanGenuchten { sl_max, .. } => *sl_max,
            LiquidRetention::PedrosoWilliams { y_0, .. } => *y_0,
        }
    }
}

/// Holds parameters for the liquid conductivity (saturated values and relative model)
#[derive(Clone, Copy, Debug)]
pub enum Conductivity {
    /// Constant relative conductivity (klr = 1)
    Constant {
        /// x-component of the saturated conductivity tensor
        kx: f64,

        /// y-component of the saturated conductivity tensor
        ky: f64,

        /// z-component of the saturated conductivity tensor
        kz: f64,
    },

    /// Smooth two-slope relative conductivity model
    PedrosoZhangEhlers {
        /// x-component of the saturated conductivity tensor
        kx: f64,

        /// y-component of the saturated conductivity tensor
        ky: f64,

        /// z-component of the saturated conductivity tensor
        kz: f64,

        /// λ0 parameter (initial slope)
        lambda_0: f64,

        /// λ1 parameter (final slope)
        lambda_1: f64,

        /// α parameter (saturation at the slope transition)
        alpha: f64,

        /// β parameter (sharpness of the slope transition)
        beta: f64,
    },
}

impl Conductivity {
    /// Returns the (kx,ky,kz) saturated conductivity components
    pub fn ksat(&self) -> (f64, f64, f64) {
        match self {
            Conductivity::Constant { kx, ky, kz } => (*kx, *ky, *kz),
            Conductivity::PedrosoZhangEhlers { kx, ky, kz, .. } => (*kx, *ky, *kz),
        }
    }
}

/// Holds parameters for the intrinsic (real) density of a fluid
///
/// The intrinsic density varies linearly with the fluid pressure:
///
/// ```text
/// ρReal(p) = ρReal₀ + C・(p - p₀)
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ParamRealDensity {
    /// Compressibility C = dρReal/dp
    pub cc: f64,

    /// Reference pressure p₀
    pub p_ref: f64,

    /// Reference intrinsic density ρReal₀
    pub rho_ref: f64,

    /// Reference temperature T₀
    pub tt_ref: f64,
}

/// Holds parameters for fluids (liquid and gas)
#[derive(Clone, Copy, Debug)]
pub struct ParamFluids {
    /// Density of liquid constituent
    pub density_liquid: ParamRealDensity,

    /// Density of gas constituent (if any)
    pub density_gas: Option<ParamRealDensity>,
}

impl ParamFluids {
    /// Returns a sample of parameters for water (SI units, kPa, Mg/m³)
    ///
    /// The compressibility follows from the bulk modulus: C = ρL₀ / Kl
    pub fn sample_water() -> Self {
        ParamFluids {
            density_liquid: ParamRealDensity {
                cc: 1.0 / 2.2e6, // Mg/(m³ kPa) = ρL₀/BulkL with ρL₀ = 1, BulkL = 2.2e6 kPa
                p_ref: 0.0,      // kPa
                rho_ref: 1.0,    // Mg/m³
                tt_ref: 25.0,    // ℃
            },
            density_gas: None,
        }
    }

    /// Returns a sample of parameters for water and dry air
    pub fn sample_water_and_air() -> Self {
        ParamFluids {
            density_liquid: ParamRealDensity {
                cc: 4.53e-7,  // Mg/(m³ kPa)
                p_ref: 0.0,   // kPa
                rho_ref: 1.0, // Mg/m³
                tt_ref: 25.0, // ℃
            },
            density_gas: Some(ParamRealDensity {
                cc: 1.17e-5,     // Mg/(m³ kPa) = 1/RTg
                p_ref: 0.0,      // kPa
                rho_ref: 0.0012, // Mg/m³
                tt_ref: 25.0,    // ℃
            }),
        }
    }
}

// parameters for elements ------------------------------------------------------------------------

/// Holds parameters for solid media mechanics simulations
#[derive(Clone, Copy, Debug)]
pub struct ParamSolid {
    /// Intrinsic (real) density
    pub density: f64,

    /// Parameters for the stress-strain model
    pub stress_strain: StressStrain,

    /// Number of integration (Gauss) points (None means default)
    pub ngauss: Option<usize>,
}

impl ParamSolid {
    /// Returns a sample of parameters with the linear elastic model
    pub fn sample_linear_elastic() -> Self {
        ParamSolid {
            density: 2.7, // Mg/m³
            stress_strain: StressStrain::sample_linear_elastic(),
            ngauss: None,
        }
    }

    /// Returns a sample of parameters with the von Mises model
    pub fn sample_von_mises() -> Self {
        ParamSolid {
            density: 2.7, // Mg/m³
            stress_strain: StressStrain::VonMises {
                young: 1500.0,
                poisson: 0.25,
                hh: 800.0,
                z_ini: 9.0,
            },
            ngauss: None,
        }
    }
}

/// Holds parameters for seepage simulations with liquid only
#[derive(Clone, Copy, Debug)]
pub struct ParamPorousLiq {
    /// Initial porosity nf₀
    pub porosity_initial: f64,

    /// Reference gravity at the time of measuring the saturated conductivity
    pub gref: f64,

    /// Liquid retention model Cc = dsl/dpc
    pub retention_liquid: LiquidRetention,

    /// Liquid conductivity kl
    pub conductivity_liquid: Conductivity,

    /// Number of integration (Gauss) points (None means default)
    pub ngauss: Option<usize>,
}

impl ParamPorousLiq {
    /// Returns a sample of parameters with Brooks-Corey retention and constant conductivity
    pub fn sample_brooks_corey_constant() -> Self {
        ParamPorousLiq {
            porosity_initial: 0.4,
            gref: 10.0, // m/s²
            retention_liquid: LiquidRetention::BrooksCorey {
                lambda: 0.1,
                pc_ae: 0.1,
                sl_min: 0.1,
                sl_max: 1.0,
            },
            conductivity_liquid: Conductivity::Constant {
                kx: 0.1,
                ky: 0.1,
                kz: 0.1,
            },
            ngauss: None,
        }
    }
}

/// Holds parameters for porous media mechanics simulations with solid and liquid
#[derive(Clone, Copy, Debug)]
pub struct ParamPorousSldLiq {
    /// At-rest earth pressure coefficient `K0 = σₕ'/σᵥ'` to compute initial
    /// horizontal effective stress (`σₕ'`) from vertical effective stress (`σᵥ'`)
    pub earth_pres_coef_ini: f64,

    /// Initial porosity: `nf_ini = nf₀`
    pub porosity_initial: f64,

    /// Intrinsic (real) density of solids: `rho_ss = ρS = ρS0` (constant/incompressible solids)
    pub density_solid: f64,

    /// Reference gravity at the time of measuring the saturated conductivity
    pub gref: f64,

    /// Effective stress model
    pub stress_strain: StressStrain,

    /// Liquid retention model: `Cc = dsl/dpc`
    pub retention_liquid: LiquidRetention,

    /// Liquid conductivity: `kl`
    pub conductivity_liquid: Conductivity,

    /// Number of integration (Gauss) points (None means default)
    pub ngauss: Option<usize>,
}

impl ParamPorousSldLiq {
    /// Returns a sample of parameters with Brooks-Corey retention, constant
    /// relative conductivity, and linear elastic effective stress
    pub fn sample_brooks_corey_constant_elastic() -> Self {
        let nu = 0.2;
        ParamPorousSldLiq {
            earth_pres_coef_ini: nu / (1.0 - nu),
            porosity_initial: 0.4,
            density_solid: 2.7, // Mg/m³
            gref: 10.0,         // m/s²
            stress_strain: StressStrain::LinearElastic {
                young: 10_000.0, // kPa
                poisson: nu,     // [-]
            },
            retention_liquid: LiquidRetention::BrooksCorey {
                lambda: 0.1,
                pc_ae: 0.1,
                sl_min: 0.1,
                sl_max: 1.0,
            },
            conductivity_liquid: Conductivity::Constant {
                kx: 0.1,
                ky: 0.1,
                kz: 0.1,
            },
            ngauss: None,
        }
    }

    /// Returns a sample of parameters with the hysteretic Pedroso-Williams
    /// retention model and the two-slope relative conductivity
    pub fn sample_pedroso_williams_elastic() -> Self {
        let nu = 0.2;
        let k_iso = 2.2; // m/s
        ParamPorousSldLiq {
            earth_pres_coef_ini: nu / (1.0 - nu),
            porosity_initial: 0.4,
            density_solid: 2.7, // Mg/m³
            gref: 10.0,         // m/s²
            stress_strain: StressStrain::LinearElastic {
                young: 10_000.0, // kPa
                poisson: nu,     // [-]
            },
            retention_liquid: LiquidRetention::PedrosoWilliams {
                with_hysteresis: true,
                lambda_d: 3.0,
                lambda_w: 3.0,
                beta_d: 6.0,
                beta_w: 6.0,
                beta_1: 6.0,
                beta_2: 6.0,
                x_rd: 2.0,
                x_rw: 2.0,
                y_0: 0.95,
                y_r: 0.005,
            },
            conductivity_liquid: Conductivity::PedrosoZhangEhlers {
                kx: k_iso,
                ky: k_iso,
                kz: k_iso,
                lambda_0: 0.001,
                lambda_1: 1.2,
                alpha: 0.01,
                beta: 10.0,
            },
            ngauss: None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
