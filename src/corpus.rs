// This module wires the greenhouse model together from its inputs and runs it over the
// simulated period.

use crate::core::envelope::{EnvelopeFluxModel, FluxComponents, HourlyConditions};
use crate::core::load::{LoadClassification, LoadClassifier, OperatingMode, Setpoints};
use crate::core::material_properties::FluidProperties;
use crate::core::sol_air::SolAirModel;
use crate::core::thermal_state::{is_plausible_indoor_temperature, ThermalMass};
use crate::core::units::SECONDS_PER_HOUR;
use crate::errors::{ensure_positive, GhlError};
use crate::external_conditions::ExternalConditions;
use crate::input::{FluidPropertiesInput, Input, SolAirInput};
use crate::read_weather_file::WeatherSeries;
use crate::simulation_time::SimulationTime;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub struct Corpus {
    simulation_time: SimulationTime,
    external_conditions: ExternalConditions,
    sol_air_model: SolAirModel,
    flux_model: EnvelopeFluxModel,
    thermal_mass: ThermalMass,
    classifier: LoadClassifier,
    initial_indoor_temperature: f64,
    ground_temperature: f64,
    fluid_properties: FluidProperties,
}

impl Corpus {
    /// Build the model from parsed input and a weather series.
    ///
    /// Configuration is checked first, then the weather series is checked against the
    /// simulated period. No hour is simulated if either is rejected.
    #[instrument(skip_all)]
    pub fn from_inputs(input: &Input, weather: WeatherSeries) -> Result<Self, GhlError> {
        let simulation_time = input.simulation_time.validate()?;
        let step_seconds = simulation_time.step_in_seconds();

        let fluid_properties =
            FluidPropertiesInput::fluid_properties(input.fluid_properties.as_ref())?;
        let geometry = input.building.geometry()?;
        let envelope = input.envelope.envelope(&geometry)?;
        let sol_air_model = SolAirInput::model(input.sol_air.as_ref())?;
        let setpoints = input.setpoints.setpoints()?;
        let initial_indoor_temperature =
            ensure_positive("initial indoor temperature", input.initial_indoor_temperature)?;
        let ground_temperature = ensure_positive("ground temperature", input.ground_temperature)?;

        let flux_model = EnvelopeFluxModel::new(geometry, envelope, &fluid_properties.air);
        let thermal_mass = ThermalMass::new(
            geometry.air_mass(&fluid_properties.air),
            fluid_properties.air.specific_heat_capacity(),
            geometry.floor_area(),
            input.building.areal_heat_capacity()?,
        )?;

        let stability_ratio =
            thermal_mass.stability_ratio(flux_model.total_conductance(), step_seconds);
        if stability_ratio > 1. {
            warn!(
                "Timestep is {stability_ratio:.2} times the thermal time constant of the building; \
                 the indoor temperature will overshoot and may oscillate. Use a shorter step or \
                 add areal heat capacity."
            );
        }
        debug!(
            capacity = thermal_mass.capacity(),
            conductance = flux_model.total_conductance(),
            "Set up thermal model"
        );

        let external_conditions = ExternalConditions::new(weather, &simulation_time)?;
        debug!(
            weather_hours = external_conditions.hours(),
            timesteps = simulation_time.total_steps(),
            "Loaded external conditions"
        );

        Ok(Self {
            simulation_time,
            external_conditions,
            sol_air_model,
            flux_model,
            thermal_mass,
            classifier: LoadClassifier::new(
                setpoints,
                input.load_policy,
                thermal_mass,
                step_seconds,
            ),
            initial_indoor_temperature,
            ground_temperature,
            fluid_properties,
        })
    }

    pub fn simulation_time(&self) -> &SimulationTime {
        &self.simulation_time
    }

    pub fn fluid_properties(&self) -> &FluidProperties {
        &self.fluid_properties
    }

    pub fn flux_model(&self) -> &EnvelopeFluxModel {
        &self.flux_model
    }

    pub fn thermal_mass(&self) -> &ThermalMass {
        &self.thermal_mass
    }

    pub fn setpoints(&self) -> &Setpoints {
        self.classifier.setpoints()
    }

    /// Step through the simulated period.
    ///
    /// The indoor temperature of each step is advanced from the heat flows of the step before;
    /// the first step takes the initial indoor temperature as given.
    #[instrument(skip_all)]
    pub fn run(&self) -> SimulationState {
        let sol_air_temperatures = self
            .external_conditions
            .sol_air_temperatures(&self.sol_air_model);

        let state = self.simulation_time.iter().fold(
            SimulationState::with_capacity(self.simulation_time.total_steps()),
            |mut state, t_it| {
                let step_seconds = t_it.timestep * SECONDS_PER_HOUR as f64;
                let indoor_temperature = match state.previous_step() {
                    None => self.initial_indoor_temperature,
                    Some((prev_indoor_temperature, prev_total_flux)) => self
                        .thermal_mass
                        .next_indoor_temperature(
                            prev_indoor_temperature,
                            prev_total_flux,
                            step_seconds,
                        ),
                };

                let conditions = HourlyConditions {
                    outdoor_temperature: self.external_conditions.air_temp(&t_it),
                    sol_air_temperature: sol_air_temperatures[t_it.current_hour() as usize],
                    ground_temperature: self.ground_temperature,
                    solar_irradiance: self.external_conditions.solar_irradiance(&t_it),
                };
                let fluxes = self
                    .flux_model
                    .compute_fluxes(&conditions, indoor_temperature);
                let classification = self.classifier.classify(indoor_temperature, fluxes.total);

                if !is_plausible_indoor_temperature(indoor_temperature) {
                    if state.numeric_anomalies.is_empty() {
                        warn!(
                            "Indoor temperature left the plausible range at hour {} \
                             ({indoor_temperature} K); the simulation is likely unstable",
                            t_it.current_hour()
                        );
                    }
                    state.numeric_anomalies.push(t_it.index);
                }

                state.push(
                    t_it.time,
                    indoor_temperature,
                    &conditions,
                    self.external_conditions.vapour_pressure(&t_it),
                    fluxes,
                    classification,
                );
                state
            },
        );

        if !state.numeric_anomalies.is_empty() {
            warn!(
                "{} timesteps had an implausible indoor temperature",
                state.numeric_anomalies.len()
            );
        }
        info!(
            timesteps = state.len(),
            heating_hours = state.count_mode(OperatingMode::Heating),
            cooling_hours = state.count_mode(OperatingMode::Cooling),
            "Simulation complete"
        );

        state
    }
}

/// Per-timestep results of one run, in increasing time order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationState {
    /// hour of the year at the start of each timestep
    pub timestep: Vec<f64>,
    /// in K
    pub indoor_temperature: Vec<f64>,
    /// in K
    pub outdoor_temperature: Vec<f64>,
    /// in K
    pub sol_air_temperature: Vec<f64>,
    /// in Pa
    pub vapour_pressure: Vec<f64>,
    /// in W/m2
    pub solar_irradiance: Vec<f64>,
    pub flux_components: Vec<FluxComponents>,
    /// in W
    pub heating_load: Vec<f64>,
    /// in W
    pub cooling_load: Vec<f64>,
    pub operating_mode: Vec<OperatingMode>,
    /// indices of timesteps whose indoor temperature was implausible
    pub numeric_anomalies: Vec<usize>,
}

impl SimulationState {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            timestep: Vec::with_capacity(capacity),
            indoor_temperature: Vec::with_capacity(capacity),
            outdoor_temperature: Vec::with_capacity(capacity),
            sol_air_temperature: Vec::with_capacity(capacity),
            vapour_pressure: Vec::with_capacity(capacity),
            solar_irradiance: Vec::with_capacity(capacity),
            flux_components: Vec::with_capacity(capacity),
            heating_load: Vec::with_capacity(capacity),
            cooling_load: Vec::with_capacity(capacity),
            operating_mode: Vec::with_capacity(capacity),
            numeric_anomalies: Default::default(),
        }
    }

    fn previous_step(&self) -> Option<(f64, f64)> {
        Some((
            *self.indoor_temperature.last()?,
            self.flux_components.last()?.total,
        ))
    }

    fn push(
        &mut self,
        time: f64,
        indoor_temperature: f64,
        conditions: &HourlyConditions,
        vapour_pressure: f64,
        fluxes: FluxComponents,
        classification: LoadClassification,
    ) {
        self.timestep.push(time);
        self.indoor_temperature.push(indoor_temperature);
        self.outdoor_temperature.push(conditions.outdoor_temperature);
        self.sol_air_temperature.push(conditions.sol_air_temperature);
        self.vapour_pressure.push(vapour_pressure);
        self.solar_irradiance.push(conditions.solar_irradiance);
        self.flux_components.push(fluxes);
        self.heating_load.push(classification.heating_load);
        self.cooling_load.push(classification.cooling_load);
        self.operating_mode.push(classification.mode);
    }

    pub fn len(&self) -> usize {
        self.timestep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestep.is_empty()
    }

    pub fn count_mode(&self, mode: OperatingMode) -> usize {
        self.operating_mode.iter().filter(|m| **m == mode).count()
    }
}
