use crate::core::units::JOULES_PER_KILOJOULE;
use crate::errors::{ensure_positive, ConfigurationError};
use std::sync::LazyLock;

/// This module contains data on the properties of the two fluids the greenhouse model needs,
/// evaluated once at a single reference state.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialProperties {
    density: f64,                // kg/m3
    specific_heat_capacity: f64, // J/(kg.K)
}

impl MaterialProperties {
    pub fn new(density: f64, specific_heat_capacity: f64) -> Self {
        Self {
            density,
            specific_heat_capacity,
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn specific_heat_capacity(&self) -> f64 {
        self.specific_heat_capacity
    }

    pub fn specific_heat_capacity_kj(&self) -> f64 {
        self.specific_heat_capacity / JOULES_PER_KILOJOULE as f64
    }

    /// Mass of a volume of this material, in kg
    pub fn mass_of(&self, volume: f64) -> f64 {
        volume * self.density
    }

    fn validated(
        self,
        density_name: &'static str,
        heat_name: &'static str,
    ) -> Result<Self, ConfigurationError> {
        ensure_positive(density_name, self.density)?;
        ensure_positive(heat_name, self.specific_heat_capacity)?;
        Ok(self)
    }
}

// properties at 300 K and 101325 Pa
pub static AIR: LazyLock<MaterialProperties> =
    LazyLock::new(|| MaterialProperties::new(1.1769955883877592, 1006.3739076641027));
pub static WATER: LazyLock<MaterialProperties> =
    LazyLock::new(|| MaterialProperties::new(996.5569352652021, 4180.6357765560715));

/// The four scalar fluid properties consumed by the load calculation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidProperties {
    pub air: MaterialProperties,
    pub water: MaterialProperties,
}

impl FluidProperties {
    pub fn new(
        air: MaterialProperties,
        water: MaterialProperties,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            air: air.validated("air density", "air specific heat capacity")?,
            water: water.validated("water density", "water specific heat capacity")?,
        })
    }
}

impl Default for FluidProperties {
    fn default() -> Self {
        Self {
            air: *AIR,
            water: *WATER,
        }
    }
}
