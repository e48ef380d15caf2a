// This module provides the outdoor conditions seen by the greenhouse, hour by hour, once the
// weather series has been checked against the simulated period.

use crate::core::sol_air::SolAirModel;
use crate::core::units::kelvin_to_celsius;
use crate::errors::InputError;
use crate::read_weather_file::WeatherSeries;
use crate::simulation_time::{SimulationTime, SimulationTimeIteration};
use rayon::prelude::*;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct ExternalConditions {
    air_temps: Vec<f64>,
    wind_speeds: Vec<f64>,
    vapour_pressures: Vec<f64>,
    solar_irradiances: Vec<f64>,
}

impl ExternalConditions {
    /// Check the weather series against the simulated period.
    ///
    /// Every hour the simulation reads must be present and physically valid. Rows beyond the
    /// simulated period are dropped with a warning.
    pub fn new(
        weather: WeatherSeries,
        simulation_time: &SimulationTime,
    ) -> Result<Self, InputError> {
        let WeatherSeries {
            mut air_temperatures,
            mut wind_speeds,
            mut vapour_pressures,
            mut solar_irradiances,
        } = weather;

        let actual = air_temperatures.len();
        if [
            wind_speeds.len(),
            vapour_pressures.len(),
            solar_irradiances.len(),
        ]
        .iter()
        .any(|len| *len != actual)
        {
            return Err(InputError::MismatchedColumns);
        }

        let required = simulation_time.required_weather_hours();
        if actual < required {
            return Err(InputError::SeriesTooShort { required, actual });
        }
        if actual > required {
            warn!(
                "Weather series has {actual} hours, only the first {required} are used; \
                 the rest are ignored"
            );
            air_temperatures.truncate(required);
            wind_speeds.truncate(required);
            vapour_pressures.truncate(required);
            solar_irradiances.truncate(required);
        }

        for hour in 0..required {
            validate_hour(
                hour,
                air_temperatures[hour],
                wind_speeds[hour],
                vapour_pressures[hour],
                solar_irradiances[hour],
            )?;
        }
        debug!("Validated {required} hours of weather data");

        Ok(Self {
            air_temps: air_temperatures,
            wind_speeds,
            vapour_pressures,
            solar_irradiances,
        })
    }

    pub fn hours(&self) -> usize {
        self.air_temps.len()
    }

    /// Outdoor air temperature, in K
    pub fn air_temp(&self, simulation_time: &SimulationTimeIteration) -> f64 {
        self.air_temps[simulation_time.current_hour() as usize]
    }

    /// in Pa
    pub fn vapour_pressure(&self, simulation_time: &SimulationTimeIteration) -> f64 {
        self.vapour_pressures[simulation_time.current_hour() as usize]
    }

    /// in W/m2
    pub fn solar_irradiance(&self, simulation_time: &SimulationTimeIteration) -> f64 {
        self.solar_irradiances[simulation_time.current_hour() as usize]
    }

    /// Sol-air temperature for every hour of the series, in K. Hours do not depend on each
    /// other so they are computed in parallel.
    pub fn sol_air_temperatures(&self, model: &SolAirModel) -> Vec<f64> {
        self.air_temps
            .par_iter()
            .zip(self.solar_irradiances.par_iter())
            .zip(self.wind_speeds.par_iter())
            .map(|((air_temp, irradiance), wind_speed)| {
                model.sol_air_temperature(*air_temp, *irradiance, *wind_speed)
            })
            .collect()
    }
}

fn validate_hour(
    hour: usize,
    air_temp: f64,
    wind_speed: f64,
    vapour_pressure: f64,
    solar_irradiance: f64,
) -> Result<(), InputError> {
    for (quantity, value) in [
        ("Outdoor temperature", air_temp),
        ("Wind speed", wind_speed),
        ("Vapour pressure", vapour_pressure),
        ("Solar irradiance", solar_irradiance),
    ] {
        if !value.is_finite() {
            return Err(InputError::NonFinite { hour, quantity });
        }
    }
    if let Err(error) = kelvin_to_celsius(air_temp) {
        return Err(InputError::BelowAbsoluteZero {
            hour,
            value: error.kelvin(),
        });
    }
    if wind_speed < 0. {
        return Err(InputError::NegativeWindSpeed {
            hour,
            value: wind_speed,
        });
    }
    if solar_irradiance < 0. {
        return Err(InputError::NegativeIrradiance {
            hour,
            value: solar_irradiance,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn simulation_time() -> SimulationTime {
        SimulationTime::new(0., 4., 1.)
    }

    #[fixture]
    fn weather() -> WeatherSeries {
        WeatherSeries {
            air_temperatures: vec![270., 271., 272., 273.],
            wind_speeds: vec![0., 1., 2., 3.],
            vapour_pressures: vec![500., 510., 520., 530.],
            solar_irradiances: vec![0., 0., 200., 400.],
        }
    }

    #[rstest]
    fn should_index_by_hour(weather: WeatherSeries, simulation_time: SimulationTime) {
        let conditions = ExternalConditions::new(weather, &simulation_time).unwrap();
        let iterations = simulation_time.iter().collect::<Vec<_>>();

        assert_eq!(conditions.hours(), 4);
        assert_eq!(conditions.air_temp(&iterations[2]), 272.);
        assert_eq!(conditions.vapour_pressure(&iterations[1]), 510.);
        assert_eq!(conditions.solar_irradiance(&iterations[3]), 400.);
    }

    #[rstest]
    fn should_compute_sol_air_for_every_hour(
        weather: WeatherSeries,
        simulation_time: SimulationTime,
    ) {
        let conditions = ExternalConditions::new(weather, &simulation_time).unwrap();
        let model = SolAirModel::fixed_coefficient(0.17, 17.).unwrap();
        let sol_air = conditions.sol_air_temperatures(&model);
        assert_eq!(sol_air.len(), 4);
        assert_eq!(sol_air[0], 270.);
        assert_relative_eq!(sol_air[3], 273. + 4., max_relative = 1e-12);
    }

    #[rstest]
    fn should_reject_short_series(weather: WeatherSeries) {
        assert_eq!(
            ExternalConditions::new(weather, &SimulationTime::default()).unwrap_err(),
            InputError::SeriesTooShort {
                required: 8760,
                actual: 4
            }
        );
    }

    #[rstest]
    fn should_reject_empty_series() {
        assert!(matches!(
            ExternalConditions::new(WeatherSeries::default(), &SimulationTime::default()),
            Err(InputError::SeriesTooShort { actual: 0, .. })
        ));
    }

    #[rstest]
    fn should_drop_extra_hours(weather: WeatherSeries) {
        let conditions =
            ExternalConditions::new(weather, &SimulationTime::new(0., 2., 1.)).unwrap();
        assert_eq!(conditions.hours(), 2);
    }

    #[rstest]
    fn should_reject_invalid_values(weather: WeatherSeries, simulation_time: SimulationTime) {
        let mut negative_wind = weather.clone();
        negative_wind.wind_speeds[2] = -0.5;
        assert_eq!(
            ExternalConditions::new(negative_wind, &simulation_time).unwrap_err(),
            InputError::NegativeWindSpeed {
                hour: 2,
                value: -0.5
            }
        );

        let mut negative_sun = weather.clone();
        negative_sun.solar_irradiances[1] = -1.;
        assert!(matches!(
            ExternalConditions::new(negative_sun, &simulation_time),
            Err(InputError::NegativeIrradiance { hour: 1, .. })
        ));

        let mut frozen = weather.clone();
        frozen.air_temperatures[0] = -3.;
        assert!(matches!(
            ExternalConditions::new(frozen, &simulation_time),
            Err(InputError::BelowAbsoluteZero { hour: 0, .. })
        ));

        let mut not_a_number = weather.clone();
        not_a_number.vapour_pressures[3] = f64::NAN;
        assert_eq!(
            ExternalConditions::new(not_a_number, &simulation_time).unwrap_err(),
            InputError::NonFinite {
                hour: 3,
                quantity: "Vapour pressure"
            }
        );

        let mut ragged = weather;
        ragged.wind_speeds.pop();
        assert_eq!(
            ExternalConditions::new(ragged, &simulation_time).unwrap_err(),
            InputError::MismatchedColumns
        );
    }
}
