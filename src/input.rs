use crate::core::construction::{Layer, LayeredConstruction};
use crate::core::envelope::{
    BuildingGeometry, DrivingTemperature, Envelope, SurfaceConvention, SurfaceValues, Ventilation,
    Window, WindowConduction,
};
use crate::core::load::{LoadPolicy, Setpoints};
use crate::core::material_properties::{FluidProperties, MaterialProperties};
use crate::core::sol_air::{SolAirModel, H_CONV_BASE, H_CONV_WIND, LONG_WAVE_FLUX};
use crate::core::units::kcal_per_hour_transmittance_to_watts;
use crate::errors::{ensure_non_negative, ConfigurationError};
use crate::simulation_time::SimulationTime;
use serde::Deserialize;
use serde_valid::Validate;
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> Result<Input, anyhow::Error> {
    let reader = BufReader::new(json);

    let input: Input = serde_json::from_reader(reader)?;
    input.validate().map_err(ConfigurationError::from)?;

    Ok(input)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    pub simulation_time: SimulationTime,
    pub building: BuildingInput,
    #[validate]
    pub envelope: EnvelopeInput,
    pub sol_air: Option<SolAirInput>,
    #[validate]
    pub setpoints: SetpointsInput,
    #[serde(default)]
    pub load_policy: LoadPolicy,
    /// in K
    #[validate(exclusive_minimum = 0.)]
    pub initial_indoor_temperature: f64,
    /// in K
    #[validate(exclusive_minimum = 0.)]
    pub ground_temperature: f64,
    pub fluid_properties: Option<FluidPropertiesInput>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingInput {
    pub geometry: GeometryInput,
    /// Measured areas of the covering, overriding the areas derived from the geometry
    pub roof_area: Option<f64>,
    pub side_wall_area: Option<f64>,
    pub front_back_wall_area: Option<f64>,
    /// Heat capacity of floor, crop and structure per unit floor area, in J/(m2.K)
    pub areal_heat_capacity: Option<f64>,
}

impl BuildingInput {
    pub fn geometry(&self) -> Result<BuildingGeometry, ConfigurationError> {
        let geometry = match self.geometry {
            GeometryInput::Dimensions {
                length,
                width,
                height,
                number_of_floors,
            } => BuildingGeometry::from_dimensions(length, width, height, number_of_floors)?,
            GeometryInput::Areas {
                floor_area,
                envelope_wall_area,
                roof_area,
                front_back_wall_area,
                side_wall_area,
                volume,
            } => BuildingGeometry::new(
                floor_area,
                envelope_wall_area,
                roof_area,
                front_back_wall_area,
                side_wall_area,
                volume,
            )?,
        };
        geometry.with_surface_areas(
            self.roof_area,
            self.side_wall_area,
            self.front_back_wall_area,
        )
    }

    pub fn areal_heat_capacity(&self) -> Result<f64, ConfigurationError> {
        ensure_non_negative(
            "areal heat capacity",
            self.areal_heat_capacity.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum GeometryInput {
    Dimensions {
        length: f64,
        width: f64,
        height: f64,
        #[serde(default = "default_number_of_floors")]
        number_of_floors: u32,
    },
    Areas {
        floor_area: f64,
        envelope_wall_area: f64,
        roof_area: f64,
        front_back_wall_area: f64,
        side_wall_area: f64,
        volume: f64,
    },
}

fn default_number_of_floors() -> u32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EnvelopeInput {
    pub surfaces: SurfacesInput,
    #[validate]
    pub window: WindowInput,
    pub ventilation: VentilationInput,
    #[serde(default)]
    pub ventilation_driving_temperature: DrivingTemperature,
}

impl EnvelopeInput {
    pub fn envelope(&self, geometry: &BuildingGeometry) -> Result<Envelope, ConfigurationError> {
        Ok(Envelope {
            surfaces: self.surfaces.convention()?,
            window: self.window.window()?,
            ventilation: self.ventilation.ventilation(geometry)?,
            ventilation_driving_temperature: self.ventilation_driving_temperature,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "convention", deny_unknown_fields)]
pub enum SurfacesInput {
    Resistance {
        roof: ResistanceInput,
        floor: ResistanceInput,
        side_wall: ResistanceInput,
        front_back_wall: ResistanceInput,
    },
    Transmittance {
        #[serde(default)]
        unit: TransmittanceUnit,
        roof: f64,
        floor: f64,
        side_wall: f64,
        front_back_wall: f64,
        /// Fraction of covering losses saved by thermal screens
        #[serde(default)]
        coverage_loss_reduction: f64,
    },
}

impl SurfacesInput {
    fn convention(&self) -> Result<SurfaceConvention, ConfigurationError> {
        match self {
            Self::Resistance {
                roof,
                floor,
                side_wall,
                front_back_wall,
            } => SurfaceConvention::resistance(SurfaceValues {
                roof: roof.thermal_resistance()?,
                floor: floor.thermal_resistance()?,
                side_wall: side_wall.thermal_resistance()?,
                front_back_wall: front_back_wall.thermal_resistance()?,
            }),
            Self::Transmittance {
                unit,
                roof,
                floor,
                side_wall,
                front_back_wall,
                coverage_loss_reduction,
            } => SurfaceConvention::transmittance(
                SurfaceValues {
                    roof: unit.to_watts(*roof),
                    floor: unit.to_watts(*floor),
                    side_wall: unit.to_watts(*side_wall),
                    front_back_wall: unit.to_watts(*front_back_wall),
                },
                *coverage_loss_reduction,
            ),
        }
    }
}

/// A surface thermal resistance, given directly in (m2.K)/W or built up from layers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResistanceInput {
    Value(f64),
    Layers(LayeredConstructionInput),
}

impl ResistanceInput {
    fn thermal_resistance(&self) -> Result<f64, ConfigurationError> {
        match self {
            Self::Value(resistance) => Ok(*resistance),
            Self::Layers(construction) => Ok(construction.construction()?.thermal_resistance()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayeredConstructionInput {
    pub h_in: f64,
    /// Omitted for constructions in contact with the ground
    pub h_out: Option<f64>,
    pub layers: Vec<LayerInput>,
}

impl LayeredConstructionInput {
    fn construction(&self) -> Result<LayeredConstruction, ConfigurationError> {
        LayeredConstruction::new(
            self.h_in,
            self.h_out,
            self.layers
                .iter()
                .map(|layer| Layer::new(layer.thickness, layer.thermal_conductivity))
                .collect::<Result<Vec<_>, _>>()?,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerInput {
    pub thickness: f64,
    pub thermal_conductivity: f64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub enum TransmittanceUnit {
    #[default]
    #[serde(rename = "W/m2K")]
    WattsPerSquareMetreKelvin,
    #[serde(rename = "kcal/m2hC")]
    KilocaloriesPerSquareMetreHourDegree,
}

impl TransmittanceUnit {
    fn to_watts(self, value: f64) -> f64 {
        match self {
            Self::WattsPerSquareMetreKelvin => value,
            Self::KilocaloriesPerSquareMetreHourDegree => {
                kcal_per_hour_transmittance_to_watts(value)
            }
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct WindowInput {
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub transmittance: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub solar_fraction: f64,
    /// Area of openings exchanging heat directly with the outdoor air, in m2
    pub area: Option<f64>,
    /// in (m2.K)/W
    pub thermal_resistance: Option<f64>,
}

impl WindowInput {
    fn window(&self) -> Result<Window, ConfigurationError> {
        let conduction = match (self.area, self.thermal_resistance) {
            (Some(area), Some(thermal_resistance)) => Some(WindowConduction {
                area,
                thermal_resistance,
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigurationError::Invalid(
                    "window area and thermal_resistance must be given together".to_string(),
                ))
            }
        };
        Window::new(self.transmittance, self.solar_fraction, conduction)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum VentilationInput {
    AirChange {
        air_changes_per_hour: f64,
    },
    Conductance {
        coefficient: f64,
        /// Reference area in m2, defaults to the area of the covering (roof and walls)
        area: Option<f64>,
    },
}

impl VentilationInput {
    fn ventilation(&self, geometry: &BuildingGeometry) -> Result<Ventilation, ConfigurationError> {
        match *self {
            Self::AirChange {
                air_changes_per_hour,
            } => Ventilation::air_change(air_changes_per_hour),
            Self::Conductance { coefficient, area } => Ventilation::conductance(
                coefficient,
                area.unwrap_or(
                    geometry.roof_area()
                        + geometry.side_wall_area()
                        + geometry.front_back_wall_area(),
                ),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum SolAirInput {
    WindDependent {
        absorptivity: f64,
        emissivity: f64,
        h_conv_base: Option<f64>,
        h_conv_wind: Option<f64>,
        long_wave_flux: Option<f64>,
    },
    FixedCoefficient {
        absorptivity: f64,
        h_ext: f64,
    },
}

impl SolAirInput {
    pub fn model(input: Option<&Self>) -> Result<SolAirModel, ConfigurationError> {
        match input {
            None => Ok(SolAirModel::default()),
            Some(Self::WindDependent {
                absorptivity,
                emissivity,
                h_conv_base,
                h_conv_wind,
                long_wave_flux,
            }) => SolAirModel::wind_dependent(
                *absorptivity,
                *emissivity,
                h_conv_base.unwrap_or(H_CONV_BASE),
                h_conv_wind.unwrap_or(H_CONV_WIND),
                long_wave_flux.unwrap_or(LONG_WAVE_FLUX),
            ),
            Some(Self::FixedCoefficient {
                absorptivity,
                h_ext,
            }) => SolAirModel::fixed_coefficient(*absorptivity, *h_ext),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SetpointsInput {
    /// in K
    #[validate(exclusive_minimum = 0.)]
    pub heating: f64,
    /// in K
    #[validate(exclusive_minimum = 0.)]
    pub cooling: f64,
}

impl SetpointsInput {
    pub fn setpoints(&self) -> Result<Setpoints, ConfigurationError> {
        Setpoints::new(self.heating, self.cooling)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FluidPropertiesInput {
    pub air_density: f64,
    pub air_specific_heat_capacity: f64,
    pub water_density: f64,
    pub water_specific_heat_capacity: f64,
}

impl FluidPropertiesInput {
    pub fn fluid_properties(input: Option<&Self>) -> Result<FluidProperties, ConfigurationError> {
        match input {
            None => Ok(FluidProperties::default()),
            Some(fluids) => FluidProperties::new(
                MaterialProperties::new(fluids.air_density, fluids.air_specific_heat_capacity),
                MaterialProperties::new(fluids.water_density, fluids.water_specific_heat_capacity),
            ),
        }
    }
}
