use crate::core::load::{LoadPolicy, OperatingMode};
use crate::corpus::{Corpus, SimulationState};
use crate::errors::{ConfigurationError, GhlError, InputError};
use crate::input::{ingest_for_processing, Input};
use crate::read_weather_file::WeatherSeries;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{json, Value};
use std::f64::consts::PI;

const HOURS: usize = 8760;

/// 10 x 10 x 3 m house with heavy floor, stable at an hourly step
#[fixture]
fn input_json() -> Value {
    json!({
        "SimulationTime": {"start": 0, "end": 8760, "step": 1},
        "Building": {
            "geometry": {"type": "Dimensions", "length": 10, "width": 10, "height": 3},
            "areal_heat_capacity": 100000
        },
        "Envelope": {
            "surfaces": {
                "convention": "Resistance",
                "roof": 2.0,
                "floor": 2.0,
                "side_wall": 2.0,
                "front_back_wall": 2.0
            },
            "window": {"transmittance": 0.8, "solar_fraction": 0.5},
            "ventilation": {"type": "AirChange", "air_changes_per_hour": 0.5}
        },
        "SolAir": {"type": "WindDependent", "absorptivity": 0.2, "emissivity": 0.9},
        "Setpoints": {"heating": 293, "cooling": 301},
        "InitialIndoorTemperature": 286,
        "GroundTemperature": 288
    })
}

fn ingest(value: &Value) -> Input {
    ingest_for_processing(value.to_string().as_bytes()).unwrap()
}

fn constant_weather(air_temperature: f64, wind_speed: f64, irradiance: f64) -> WeatherSeries {
    WeatherSeries {
        air_temperatures: vec![air_temperature; HOURS],
        wind_speeds: vec![wind_speed; HOURS],
        vapour_pressures: vec![600.; HOURS],
        solar_irradiances: vec![irradiance; HOURS],
    }
}

/// Daily cycle of temperature and sunshine around a seasonal mean
fn varying_weather() -> WeatherSeries {
    let hours = (0..HOURS).map(|hour| hour as f64).collect::<Vec<_>>();
    WeatherSeries {
        air_temperatures: hours
            .iter()
            .map(|h| {
                288. - 12. * (2. * PI * h / HOURS as f64).cos() - 5. * (2. * PI * h / 24.).cos()
            })
            .collect(),
        wind_speeds: hours
            .iter()
            .map(|h| 2. + (2. * PI * h / 72.).sin())
            .collect(),
        vapour_pressures: vec![900.; HOURS],
        solar_irradiances: hours
            .iter()
            .map(|h| (150. * -(2. * PI * h / 24.).cos()).max(0.))
            .collect(),
    }
}

fn run(input: &Input, weather: WeatherSeries) -> (Corpus, SimulationState) {
    let corpus = Corpus::from_inputs(input, weather).unwrap();
    let state = corpus.run();
    (corpus, state)
}

fn assert_modes_and_loads_are_consistent(state: &SimulationState) {
    for (k, mode) in state.operating_mode.iter().enumerate() {
        let (heating, cooling) = (state.heating_load[k], state.cooling_load[k]);
        assert!(heating >= 0. && cooling >= 0., "negative load at hour {k}");
        match mode {
            OperatingMode::Heating => assert!(
                heating > 0. && cooling == 0.,
                "heating hour {k} has loads {heating}/{cooling}"
            ),
            OperatingMode::Cooling => assert!(
                cooling > 0. && heating == 0.,
                "cooling hour {k} has loads {heating}/{cooling}"
            ),
            OperatingMode::Neutral => assert!(
                heating == 0. && cooling == 0.,
                "neutral hour {k} has loads {heating}/{cooling}"
            ),
        }
    }
}

#[rstest]
fn test_cold_year_needs_heating_every_hour(input_json: Value) {
    let (_, state) = run(&ingest(&input_json), constant_weather(250., 1., 0.));

    assert_eq!(state.len(), HOURS);
    assert_eq!(state.count_mode(OperatingMode::Heating), HOURS);
    assert!(state.heating_load.iter().all(|load| *load > 0.));
    assert!(state.cooling_load.iter().all(|load| *load == 0.));
    assert!(state.numeric_anomalies.is_empty());
    // the house cools towards its balance point and never overshoots it
    assert!(state
        .indoor_temperature
        .windows(2)
        .all(|pair| pair[1] <= pair[0]));
    assert!(state.indoor_temperature[HOURS - 1] > 250.);
}

#[rstest]
fn test_hot_year_eventually_needs_cooling(mut input_json: Value) {
    // no sky loss, so the sol-air temperature equals the outdoor temperature at night
    input_json["SolAir"]["emissivity"] = json!(0.);
    let (_, state) = run(&ingest(&input_json), constant_weather(310., 1., 0.));

    assert_eq!(state.operating_mode[0], OperatingMode::Heating);
    let first_cooling_hour = state
        .operating_mode
        .iter()
        .position(|mode| *mode == OperatingMode::Cooling)
        .unwrap();
    assert!(state.indoor_temperature[first_cooling_hour] > 301.);
    assert!(state.operating_mode[first_cooling_hour..]
        .iter()
        .all(|mode| *mode == OperatingMode::Cooling));
    assert!(state.cooling_load[first_cooling_hour..]
        .iter()
        .all(|load| *load > 0.));
    assert_modes_and_loads_are_consistent(&state);
}

#[rstest]
#[case(LoadPolicy::DeficitMagnitude)]
#[case(LoadPolicy::SetpointCorrection)]
fn test_modes_and_loads_are_mutually_exclusive(mut input_json: Value, #[case] policy: LoadPolicy) {
    input_json["LoadPolicy"] = json!(match policy {
        LoadPolicy::DeficitMagnitude => "DeficitMagnitude",
        LoadPolicy::SetpointCorrection => "SetpointCorrection",
    });
    let (_, state) = run(&ingest(&input_json), varying_weather());

    assert_modes_and_loads_are_consistent(&state);
    assert!(state.count_mode(OperatingMode::Heating) > 0);
    assert!(state.count_mode(OperatingMode::Neutral) > 0);
}

#[rstest]
fn test_first_hour_uses_initial_temperature(input_json: Value) {
    let (_, state) = run(&ingest(&input_json), varying_weather());
    assert_eq!(state.indoor_temperature[0], 286.);
}

#[rstest]
fn test_indoor_temperature_lags_heat_flow_by_one_step(input_json: Value) {
    let (corpus, state) = run(&ingest(&input_json), varying_weather());
    let capacity = corpus.thermal_mass().capacity();

    for k in 1..state.len() {
        assert_eq!(
            state.indoor_temperature[k],
            state.indoor_temperature[k - 1]
                + state.flux_components[k - 1].total * 3600. / capacity,
            "indoor temperature at hour {k} does not follow from hour {}",
            k - 1
        );
    }
}

#[rstest]
fn test_runs_are_deterministic(input_json: Value) {
    let input = ingest(&input_json);
    let (_, first) = run(&input, varying_weather());
    let (_, second) = run(&input, varying_weather());
    assert_eq!(first, second);
}

#[rstest]
fn test_sol_air_equals_outdoor_without_sun_or_sky_loss(mut input_json: Value) {
    input_json["SolAir"]["emissivity"] = json!(0.);
    let (_, state) = run(&ingest(&input_json), constant_weather(275., 4., 0.));
    assert_eq!(state.sol_air_temperature, state.outdoor_temperature);
}

#[rstest]
fn test_empty_weather_is_rejected_before_any_hour(input_json: Value) {
    let result = Corpus::from_inputs(&ingest(&input_json), WeatherSeries::default());
    assert!(matches!(
        result,
        Err(GhlError::Input(InputError::SeriesTooShort {
            required: 8760,
            actual: 0
        }))
    ));
}

#[rstest]
fn test_negative_wind_is_rejected(input_json: Value) {
    let mut weather = constant_weather(280., 2., 100.);
    weather.wind_speeds[4000] = -1.;
    assert!(matches!(
        Corpus::from_inputs(&ingest(&input_json), weather),
        Err(GhlError::Input(InputError::NegativeWindSpeed { hour: 4000, .. }))
    ));
}

#[rstest]
fn test_equal_setpoints_are_rejected(mut input_json: Value) {
    input_json["Setpoints"] = json!({"heating": 295, "cooling": 295});
    assert!(matches!(
        Corpus::from_inputs(&ingest(&input_json), constant_weather(280., 2., 0.)),
        Err(GhlError::Configuration(ConfigurationError::SetpointOrder { .. }))
    ));
}

#[rstest]
fn test_non_positive_geometry_is_rejected(mut input_json: Value) {
    input_json["Building"]["geometry"]["height"] = json!(0);
    assert!(matches!(
        Corpus::from_inputs(&ingest(&input_json), constant_weather(280., 2., 0.)),
        Err(GhlError::Configuration(ConfigurationError::NonPositive {
            name: "height",
            ..
        }))
    ));
}

#[rstest]
fn test_vanishing_step_is_rejected_at_setup(mut input_json: Value) {
    input_json["SimulationTime"]["step"] = json!(1e-15);
    assert!(matches!(
        Corpus::from_inputs(&ingest(&input_json), constant_weather(280., 2., 0.)),
        Err(GhlError::Configuration(ConfigurationError::StepTooShort { .. }))
    ));
}

#[rstest]
fn test_unstable_step_is_reported_but_not_fatal(mut input_json: Value) {
    // air-only thermal mass with light walls: the hourly step is several time constants long
    input_json["Building"]["areal_heat_capacity"] = json!(0);
    input_json["Envelope"]["surfaces"] = json!({
        "convention": "Resistance",
        "roof": 0.3,
        "floor": 2.0,
        "side_wall": 0.3,
        "front_back_wall": 0.3
    });
    input_json["SimulationTime"] = json!({"start": 0, "end": 48, "step": 1});
    let (corpus, state) = run(&ingest(&input_json), constant_weather(270., 2., 0.));

    assert!(
        corpus
            .thermal_mass()
            .stability_ratio(corpus.flux_model().total_conductance(), 3600.)
            > 2.
    );
    assert_eq!(state.len(), 48);
    assert!(!state.numeric_anomalies.is_empty());
}

#[rstest]
fn test_sub_hourly_step_reads_weather_by_hour(mut input_json: Value) {
    input_json["SimulationTime"] = json!({"start": 0, "end": 4, "step": 0.5});
    let mut weather = constant_weather(270., 2., 0.);
    weather.air_temperatures[1] = 272.;
    let (_, state) = run(&ingest(&input_json), weather);

    assert_eq!(state.timestep, vec![0., 0.5, 1., 1.5, 2., 2.5, 3., 3.5]);
    assert_eq!(
        state.outdoor_temperature,
        vec![270., 270., 272., 272., 270., 270., 270., 270.]
    );
}
