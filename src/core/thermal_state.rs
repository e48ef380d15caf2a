use crate::errors::{ensure_non_negative, ensure_positive, ConfigurationError};
use std::ops::RangeInclusive;

/// Indoor temperatures outside this range (in K) are physically implausible for a greenhouse and
/// indicate a diverging simulation.
pub const PLAUSIBLE_INDOOR_TEMPERATURE: RangeInclusive<f64> = 200.0..=400.0;

/// Lumped heat capacity of the indoor volume
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalMass {
    /// in J/K
    capacity: f64,
}

impl ThermalMass {
    /// Arguments:
    /// * `air_mass` - mass of the internal air, in kg
    /// * `air_specific_heat` - specific heat capacity of air, in J/(kg.K)
    /// * `floor_area` - in m2
    /// * `areal_heat_capacity` - heat capacity of floor, crop and structure per unit floor
    ///                           area, in J/(m2.K); zero for an air-only thermal mass
    pub fn new(
        air_mass: f64,
        air_specific_heat: f64,
        floor_area: f64,
        areal_heat_capacity: f64,
    ) -> Result<Self, ConfigurationError> {
        ensure_positive("air mass", air_mass)?;
        ensure_positive("air specific heat capacity", air_specific_heat)?;
        ensure_non_negative("areal heat capacity", areal_heat_capacity)?;
        Ok(Self {
            capacity: air_mass * air_specific_heat + areal_heat_capacity * floor_area,
        })
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Ratio of the timestep to the thermal time constant of the building. The explicit update
    /// overshoots equilibrium above 1 and oscillates with growing amplitude above 2.
    pub fn stability_ratio(&self, total_conductance: f64, step_seconds: f64) -> f64 {
        step_seconds * total_conductance / self.capacity
    }

    /// Indoor temperature at the start of the next timestep
    ///
    /// Forward Euler step using the net heat flow of the previous timestep only, so the
    /// temperature always lags the heat balance by one step.
    ///
    /// Arguments:
    /// * `prev_indoor_temp` - indoor temperature at the start of the previous timestep, in K
    /// * `prev_total_flux` - net heat flow into the building during the previous timestep, in W
    /// * `step_seconds` - length of the timestep, in s
    pub fn next_indoor_temperature(
        &self,
        prev_indoor_temp: f64,
        prev_total_flux: f64,
        step_seconds: f64,
    ) -> f64 {
        prev_indoor_temp + prev_total_flux * step_seconds / self.capacity
    }
}

pub fn is_plausible_indoor_temperature(temperature: f64) -> bool {
    PLAUSIBLE_INDOOR_TEMPERATURE.contains(&temperature)
}
