// This module provides the envelope heat balance of a single-zone greenhouse: the heat flows
// through each part of the covering and the floor, the ventilation exchange and the solar gain
// transmitted through the glazing.
//
// Sign convention: every flux is positive when heat flows INTO the building. All fluxes are
// hourly-mean powers in W.

use crate::core::material_properties::MaterialProperties;
use crate::core::units::SECONDS_PER_HOUR;
use crate::errors::{ensure_fraction, ensure_non_negative, ensure_positive, ConfigurationError};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingGeometry {
    floor_area: f64,
    envelope_wall_area: f64,
    roof_area: f64,
    front_back_wall_area: f64,
    side_wall_area: f64,
    volume: f64,
}

impl BuildingGeometry {
    /// Arguments (areas in m2, volume in m3, all greater than zero):
    /// * `floor_area` - ground floor area, also the glazed area used for solar gain
    /// * `envelope_wall_area` - total area of the four walls
    /// * `roof_area` - area of the roof covering
    /// * `front_back_wall_area` - combined area of the two gable walls
    /// * `side_wall_area` - combined area of the two long walls
    /// * `volume` - internal air volume
    pub fn new(
        floor_area: f64,
        envelope_wall_area: f64,
        roof_area: f64,
        front_back_wall_area: f64,
        side_wall_area: f64,
        volume: f64,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            floor_area: ensure_positive("floor area", floor_area)?,
            envelope_wall_area: ensure_positive("envelope wall area", envelope_wall_area)?,
            roof_area: ensure_positive("roof area", roof_area)?,
            front_back_wall_area: ensure_positive("front/back wall area", front_back_wall_area)?,
            side_wall_area: ensure_positive("side wall area", side_wall_area)?,
            volume: ensure_positive("volume", volume)?,
        })
    }

    /// Geometry of a rectangular house. The roof is taken as flat over the floor and the
    /// long walls as the side walls; use `with_surface_areas` for curved or pitched coverings.
    pub fn from_dimensions(
        length: f64,
        width: f64,
        height: f64,
        number_of_floors: u32,
    ) -> Result<Self, ConfigurationError> {
        ensure_positive("length", length)?;
        ensure_positive("width", width)?;
        ensure_positive("height", height)?;
        ensure_positive("number of floors", number_of_floors as f64)?;

        let floor_area = length * width;
        let side_wall_area = 2. * length * height;
        let front_back_wall_area = 2. * width * height;

        Self::new(
            floor_area,
            side_wall_area + front_back_wall_area,
            floor_area,
            front_back_wall_area,
            side_wall_area,
            floor_area * height * number_of_floors as f64,
        )
    }

    pub fn with_surface_areas(
        self,
        roof_area: Option<f64>,
        side_wall_area: Option<f64>,
        front_back_wall_area: Option<f64>,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            self.floor_area,
            self.envelope_wall_area,
            roof_area.unwrap_or(self.roof_area),
            front_back_wall_area.unwrap_or(self.front_back_wall_area),
            side_wall_area.unwrap_or(self.side_wall_area),
            self.volume,
        )
    }

    pub fn floor_area(&self) -> f64 {
        self.floor_area
    }

    pub fn envelope_wall_area(&self) -> f64 {
        self.envelope_wall_area
    }

    pub fn roof_area(&self) -> f64 {
        self.roof_area
    }

    pub fn front_back_wall_area(&self) -> f64 {
        self.front_back_wall_area
    }

    pub fn side_wall_area(&self) -> f64 {
        self.side_wall_area
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Mass of the internal air, in kg
    pub fn air_mass(&self, air: &MaterialProperties) -> f64 {
        air.mass_of(self.volume)
    }
}

/// One value per envelope surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceValues {
    pub roof: f64,
    pub floor: f64,
    pub side_wall: f64,
    pub front_back_wall: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Surface {
    Roof,
    Floor,
    SideWall,
    FrontBackWall,
}

impl SurfaceValues {
    fn for_surface(&self, surface: Surface) -> f64 {
        match surface {
            Surface::Roof => self.roof,
            Surface::Floor => self.floor,
            Surface::SideWall => self.side_wall,
            Surface::FrontBackWall => self.front_back_wall,
        }
    }

    fn ensure_positive(self, quantity: [&'static str; 4]) -> Result<Self, ConfigurationError> {
        ensure_positive(quantity[0], self.roof)?;
        ensure_positive(quantity[1], self.floor)?;
        ensure_positive(quantity[2], self.side_wall)?;
        ensure_positive(quantity[3], self.front_back_wall)?;
        Ok(self)
    }
}

/// How conduction through the covering and floor is expressed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceConvention {
    /// q = (T_drive - T_in) / R * A, with R in (m2.K)/W
    Resistance(SurfaceValues),
    /// q = (T_drive - T_in) * U * A * (1 - coverage_loss_reduction), with U in W/(m2.K).
    /// The reduction from thermal screens applies to the covering only, not to the floor.
    Transmittance {
        u_values: SurfaceValues,
        coverage_loss_reduction: f64,
    },
}

impl SurfaceConvention {
    pub fn resistance(resistances: SurfaceValues) -> Result<Self, ConfigurationError> {
        Ok(Self::Resistance(resistances.ensure_positive([
            "roof thermal resistance",
            "floor thermal resistance",
            "side wall thermal resistance",
            "front/back wall thermal resistance",
        ])?))
    }

    pub fn transmittance(
        u_values: SurfaceValues,
        coverage_loss_reduction: f64,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::Transmittance {
            u_values: u_values.ensure_positive([
                "roof transmittance",
                "floor transmittance",
                "side wall transmittance",
                "front/back wall transmittance",
            ])?,
            coverage_loss_reduction: ensure_fraction(
                "coverage loss reduction",
                coverage_loss_reduction,
            )?,
        })
    }

    /// Heat transfer coefficient per unit area of a surface, in W/(m2.K)
    fn coefficient_for(&self, surface: Surface) -> f64 {
        match self {
            Self::Resistance(resistances) => 1. / resistances.for_surface(surface),
            Self::Transmittance {
                u_values,
                coverage_loss_reduction,
            } => match surface {
                Surface::Floor => u_values.floor,
                _ => u_values.for_surface(surface) * (1. - coverage_loss_reduction),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ventilation {
    /// q = ACH * (T_drive - T_in) * m_air * c_air / 3600
    AirChange { air_changes_per_hour: f64 },
    /// q = (T_drive - T_in) * h_v * A, with h_v a ventilation heat transfer coefficient per unit
    /// of greenhouse surface area
    Conductance { coefficient: f64, area: f64 },
}

impl Ventilation {
    pub fn air_change(air_changes_per_hour: f64) -> Result<Self, ConfigurationError> {
        Ok(Self::AirChange {
            air_changes_per_hour: ensure_non_negative("air change rate", air_changes_per_hour)?,
        })
    }

    pub fn conductance(coefficient: f64, area: f64) -> Result<Self, ConfigurationError> {
        Ok(Self::Conductance {
            coefficient: ensure_non_negative("ventilation heat transfer coefficient", coefficient)?,
            area: ensure_positive("ventilation reference area", area)?,
        })
    }
}

/// Which outdoor temperature drives a heat flow
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub enum DrivingTemperature {
    #[default]
    SolAir,
    OutdoorAir,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowConduction {
    pub area: f64,
    pub thermal_resistance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    transmittance: f64,
    solar_fraction: f64,
    conduction: Option<WindowConduction>,
}

impl Window {
    /// Arguments:
    /// * `transmittance` - solar transmittance of the glass, 0 to 1
    /// * `solar_fraction` - fraction of the floor area receiving transmitted radiation, 0 to 1
    /// * `conduction` - area and thermal resistance of openings (windows, doors) exchanging
    ///                  heat with the outdoor air directly
    pub fn new(
        transmittance: f64,
        solar_fraction: f64,
        conduction: Option<WindowConduction>,
    ) -> Result<Self, ConfigurationError> {
        if let Some(WindowConduction {
            area,
            thermal_resistance,
        }) = conduction
        {
            ensure_positive("window area", area)?;
            ensure_positive("window thermal resistance", thermal_resistance)?;
        }
        Ok(Self {
            transmittance: ensure_fraction("glass transmittance", transmittance)?,
            solar_fraction: ensure_fraction("window solar fraction", solar_fraction)?,
            conduction,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub surfaces: SurfaceConvention,
    pub window: Window,
    pub ventilation: Ventilation,
    pub ventilation_driving_temperature: DrivingTemperature,
}

/// Outdoor boundary conditions for one hour
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HourlyConditions {
    /// in K
    pub outdoor_temperature: f64,
    /// in K
    pub sol_air_temperature: f64,
    /// in K
    pub ground_temperature: f64,
    /// in W/m2
    pub solar_irradiance: f64,
}

/// Heat flows for one hour, in W, positive into the building
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluxComponents {
    pub solar_gain: f64,
    pub roof: f64,
    pub floor: f64,
    pub side_wall: f64,
    pub front_back: f64,
    pub window: f64,
    pub ventilation: f64,
    pub total: f64,
}

impl FluxComponents {
    /// Names of the components, in the order of `values`
    pub const NAMES: [&'static str; 8] = [
        "Solar gain",
        "Roof",
        "Floor",
        "Side wall",
        "Front/back wall",
        "Window",
        "Ventilation",
        "Net heat flow",
    ];

    pub fn values(&self) -> [f64; 8] {
        [
            self.solar_gain,
            self.roof,
            self.floor,
            self.side_wall,
            self.front_back,
            self.window,
            self.ventilation,
            self.total,
        ]
    }

    pub fn from_values(values: [f64; 8]) -> Self {
        let [solar_gain, roof, floor, side_wall, front_back, window, ventilation, total] = values;
        Self {
            solar_gain,
            roof,
            floor,
            side_wall,
            front_back,
            window,
            ventilation,
            total,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnvelopeFluxModel {
    geometry: BuildingGeometry,
    envelope: Envelope,
    /// heat capacity of the internal air, in J/K
    air_heat_capacity: f64,
}

impl EnvelopeFluxModel {
    pub fn new(geometry: BuildingGeometry, envelope: Envelope, air: &MaterialProperties) -> Self {
        Self {
            geometry,
            envelope,
            air_heat_capacity: geometry.air_mass(air) * air.specific_heat_capacity(),
        }
    }

    pub fn geometry(&self) -> &BuildingGeometry {
        &self.geometry
    }

    pub fn air_heat_capacity(&self) -> f64 {
        self.air_heat_capacity
    }

    fn surface_conductance(&self, surface: Surface) -> f64 {
        let area = match surface {
            Surface::Roof => self.geometry.roof_area,
            Surface::Floor => self.geometry.floor_area,
            Surface::SideWall => self.geometry.side_wall_area,
            Surface::FrontBackWall => self.geometry.front_back_wall_area,
        };
        self.envelope.surfaces.coefficient_for(surface) * area
    }

    /// in W/K
    fn ventilation_conductance(&self) -> f64 {
        match self.envelope.ventilation {
            Ventilation::AirChange {
                air_changes_per_hour,
            } => air_changes_per_hour * self.air_heat_capacity / SECONDS_PER_HOUR as f64,
            Ventilation::Conductance { coefficient, area } => coefficient * area,
        }
    }

    /// in W/K
    fn window_conductance(&self) -> f64 {
        self.envelope
            .window
            .conduction
            .map_or(0., |conduction| conduction.area / conduction.thermal_resistance)
    }

    /// Sum of all conductances coupling the indoor air to a boundary temperature, in W/K
    pub fn total_conductance(&self) -> f64 {
        [
            Surface::Roof,
            Surface::Floor,
            Surface::SideWall,
            Surface::FrontBackWall,
        ]
        .into_iter()
        .map(|surface| self.surface_conductance(surface))
        .sum::<f64>()
            + self.ventilation_conductance()
            + self.window_conductance()
    }

    /// Solar gain through the glazing, in W. Independent of the indoor temperature.
    pub fn solar_gain(&self, solar_irradiance: f64) -> f64 {
        let window = &self.envelope.window;
        window.solar_fraction * window.transmittance * self.geometry.floor_area * solar_irradiance
    }

    /// Heat flows into the building for one hour
    ///
    /// Arguments:
    /// * `conditions` - outdoor, sol-air and ground temperatures and irradiance for the hour
    /// * `indoor_temperature` - indoor air temperature at the start of the hour, in K
    pub fn compute_fluxes(
        &self,
        conditions: &HourlyConditions,
        indoor_temperature: f64,
    ) -> FluxComponents {
        let delta_sol_air = conditions.sol_air_temperature - indoor_temperature;
        let delta_outdoor = conditions.outdoor_temperature - indoor_temperature;
        let delta_ground = conditions.ground_temperature - indoor_temperature;
        let delta_ventilation = match self.envelope.ventilation_driving_temperature {
            DrivingTemperature::SolAir => delta_sol_air,
            DrivingTemperature::OutdoorAir => delta_outdoor,
        };

        let solar_gain = self.solar_gain(conditions.solar_irradiance);
        let roof = self.surface_conductance(Surface::Roof) * delta_sol_air;
        let floor = self.surface_conductance(Surface::Floor) * delta_ground;
        let side_wall = self.surface_conductance(Surface::SideWall) * delta_sol_air;
        let front_back = self.surface_conductance(Surface::FrontBackWall) * delta_sol_air;
        let window = self.window_conductance() * delta_outdoor;
        let ventilation = self.ventilation_conductance() * delta_ventilation;

        FluxComponents {
            solar_gain,
            roof,
            floor,
            side_wall,
            front_back,
            window,
            ventilation,
            total: solar_gain + roof + floor + side_wall + front_back + window + ventilation,
        }
    }
}
