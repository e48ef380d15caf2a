/// Annual aggregates and monthly profiles of a simulation run, with utility functions such as
/// calculation of percentiles.
use crate::core::envelope::FluxComponents;
use crate::core::load::OperatingMode;
use crate::core::units::{watts_over_hours_to_kwh, HOURS_PER_DAY, MONTHS_PER_YEAR};
use crate::corpus::SimulationState;
use crate::simulation_time::month_of_hour;
use statrs::statistics::{Data, OrderStatistics, Statistics};

pub fn percentile(numbers: &[f64], percentile: usize) -> f64 {
    let numbers = numbers.to_vec();
    let mut data = Data::new(numbers);

    data.percentile(percentile)
}

/// Index and value of the first largest element
fn first_max(values: &[f64]) -> Option<(usize, f64)> {
    values.iter().copied().enumerate().fold(None, |max, (i, value)| match max {
        Some((_, max_value)) if value <= max_value => max,
        _ => Some((i, value)),
    })
}

/// Index and value of the first smallest element
fn first_min(values: &[f64]) -> Option<(usize, f64)> {
    values.iter().copied().enumerate().fold(None, |min, (i, value)| match min {
        Some((_, min_value)) if value >= min_value => min,
        _ => Some((i, value)),
    })
}

/// A value of a series and the hour of the year it occurred at
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extreme {
    pub value: f64,
    pub time: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakHeating {
    /// in W
    pub load: f64,
    pub time: f64,
    /// in K
    pub indoor_temperature: f64,
    /// in K
    pub sol_air_temperature: f64,
}

/// The timestep with the lowest indoor temperature and the conditions it saw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColdestHour {
    /// in K
    pub indoor_temperature: f64,
    pub time: f64,
    /// in K
    pub outdoor_temperature: f64,
    /// in K
    pub sol_air_temperature: f64,
    /// in W
    pub heating_load: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnnualSummary {
    /// Sum of the magnitude of the net heat flow, in kWh
    pub total_heat_flow_magnitude: f64,
    /// in kWh
    pub heating_demand: f64,
    /// in kWh
    pub cooling_demand: f64,
    /// Sum of the magnitude of the ventilation heat flow, in kWh
    pub ventilation_magnitude: f64,
    /// Signed annual total of each heat flow, in kWh
    pub component_totals: FluxComponents,
    /// Mean of each heat flow over the timesteps, in W
    pub component_means: FluxComponents,
    /// in W
    pub component_maxima: FluxComponents,
    /// in W
    pub component_minima: FluxComponents,
    pub peak_heating: Option<PeakHeating>,
    /// 99th percentile of the hourly heating load, in W
    pub heating_load_99th_percentile: f64,
    /// in K
    pub min_outdoor_temperature: Option<Extreme>,
    /// in K
    pub min_sol_air_temperature: Option<Extreme>,
    /// in K
    pub indoor_temperature_mean: f64,
    pub indoor_temperature_max: f64,
    pub indoor_temperature_min: f64,
    pub coldest_hour: Option<ColdestHour>,
    pub heating_timesteps: usize,
    pub cooling_timesteps: usize,
    pub neutral_timesteps: usize,
    pub numeric_anomalies: usize,
}

impl AnnualSummary {
    pub fn from_state(state: &SimulationState, step_in_hours: f64) -> Self {
        let kwh = |values: &mut dyn Iterator<Item = f64>| -> f64 {
            values.map(|w| watts_over_hours_to_kwh(w, step_in_hours)).sum()
        };
        let fluxes = &state.flux_components;
        let per_component = |statistic: &dyn Fn(Vec<f64>) -> f64| {
            FluxComponents::from_values(std::array::from_fn(|i| {
                statistic(fluxes.iter().map(|f| f.values()[i]).collect())
            }))
        };

        let peak_heating = first_max(&state.heating_load)
            .filter(|(_, load)| *load > 0.)
            .map(|(i, load)| PeakHeating {
                load,
                time: state.timestep[i],
                indoor_temperature: state.indoor_temperature[i],
                sol_air_temperature: state.sol_air_temperature[i],
            });
        let extreme = |(i, value): (usize, f64)| Extreme {
            value,
            time: state.timestep[i],
        };

        Self {
            total_heat_flow_magnitude: kwh(&mut fluxes.iter().map(|f| f.total.abs())),
            heating_demand: kwh(&mut state.heating_load.iter().copied()),
            cooling_demand: kwh(&mut state.cooling_load.iter().copied()),
            ventilation_magnitude: kwh(&mut fluxes.iter().map(|f| f.ventilation.abs())),
            component_totals: per_component(&|values| kwh(&mut values.into_iter())),
            component_means: per_component(&|values| Statistics::mean(&values)),
            component_maxima: per_component(&|values| Statistics::max(&values)),
            component_minima: per_component(&|values| Statistics::min(&values)),
            peak_heating,
            heating_load_99th_percentile: if state.heating_load.is_empty() {
                0.
            } else {
                percentile(&state.heating_load, 99)
            },
            min_outdoor_temperature: first_min(&state.outdoor_temperature).map(extreme),
            min_sol_air_temperature: first_min(&state.sol_air_temperature).map(extreme),
            indoor_temperature_mean: Statistics::mean(state.indoor_temperature.iter()),
            indoor_temperature_max: Statistics::max(state.indoor_temperature.iter()),
            indoor_temperature_min: Statistics::min(state.indoor_temperature.iter()),
            coldest_hour: first_min(&state.indoor_temperature).map(|(i, indoor_temperature)| {
                ColdestHour {
                    indoor_temperature,
                    time: state.timestep[i],
                    outdoor_temperature: state.outdoor_temperature[i],
                    sol_air_temperature: state.sol_air_temperature[i],
                    heating_load: state.heating_load[i],
                }
            }),
            heating_timesteps: state.count_mode(OperatingMode::Heating),
            cooling_timesteps: state.count_mode(OperatingMode::Cooling),
            neutral_timesteps: state.count_mode(OperatingMode::Neutral),
            numeric_anomalies: state.numeric_anomalies.len(),
        }
    }
}

/// Mean value of a series for each hour of the day over one month
pub type DailyProfile = [Option<f64>; HOURS_PER_DAY as usize];

/// Mean daily profile of a series for each month of the year. Hours of the day with no
/// timestep in a month have no value.
///
/// Arguments:
/// * `times` - hour of the year at the start of each timestep
/// * `values` - one value per timestep
pub fn monthly_mean_daily_profiles(
    times: &[f64],
    values: &[f64],
) -> [DailyProfile; MONTHS_PER_YEAR as usize] {
    let mut sums = [[0.; HOURS_PER_DAY as usize]; MONTHS_PER_YEAR as usize];
    let mut counts = [[0usize; HOURS_PER_DAY as usize]; MONTHS_PER_YEAR as usize];

    for (time, value) in times.iter().zip(values) {
        let hour = time.floor() as u32;
        if let Some(month) = month_of_hour(hour) {
            let hour_of_day = (hour % HOURS_PER_DAY) as usize;
            sums[month as usize][hour_of_day] += value;
            counts[month as usize][hour_of_day] += 1;
        }
    }

    std::array::from_fn(|month| {
        std::array::from_fn(|hour_of_day| match counts[month][hour_of_day] {
            0 => None,
            count => Some(sums[month][hour_of_day] / count as f64),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn numbers() -> [f64; 10] {
        [9.0, 3.0, 3.0, 4.0, 5.0, 4.9, 8.0, 3.3, 2.0, 0.1]
    }

    #[rstest]
    fn test_percentile(numbers: [f64; 10]) {
        assert_relative_eq!(percentile(&numbers, 70), 4.95, epsilon = 1e-2);
        assert_relative_eq!(percentile(&numbers, 50), 3.65, epsilon = 1e-2);
    }

    #[rstest]
    fn test_first_extremes_prefer_earliest() {
        assert_eq!(first_max(&[1., 3., 3., 2.]), Some((1, 3.)));
        assert_eq!(first_min(&[4., 1., 5., 1.]), Some((1, 1.)));
        assert_eq!(first_max(&[]), None);
    }

    fn flux(total: f64, ventilation: f64) -> FluxComponents {
        FluxComponents {
            ventilation,
            total,
            ..Default::default()
        }
    }

    #[fixture]
    fn state() -> SimulationState {
        SimulationState {
            timestep: vec![0., 1., 2., 3.],
            indoor_temperature: vec![290., 291., 296., 303.],
            outdoor_temperature: vec![270., 268., 268., 275.],
            sol_air_temperature: vec![266., 265., 280., 290.],
            vapour_pressure: vec![500.; 4],
            solar_irradiance: vec![0., 0., 300., 600.],
            flux_components: vec![
                flux(-2000., -500.),
                flux(-3000., -600.),
                flux(500., 100.),
                flux(1000., 200.),
            ],
            heating_load: vec![2000., 3000., 0., 0.],
            cooling_load: vec![0., 0., 0., 1000.],
            operating_mode: vec![
                OperatingMode::Heating,
                OperatingMode::Heating,
                OperatingMode::Neutral,
                OperatingMode::Cooling,
            ],
            numeric_anomalies: vec![],
        }
    }

    #[rstest]
    fn test_annual_summary(state: SimulationState) {
        let summary = AnnualSummary::from_state(&state, 1.);

        assert_relative_eq!(summary.total_heat_flow_magnitude, 6.5, max_relative = 1e-12);
        assert_relative_eq!(summary.heating_demand, 5., max_relative = 1e-12);
        assert_relative_eq!(summary.cooling_demand, 1., max_relative = 1e-12);
        assert_relative_eq!(summary.ventilation_magnitude, 1.4, max_relative = 1e-12);
        assert_relative_eq!(summary.component_totals.total, -3.5, max_relative = 1e-12);
        assert_relative_eq!(
            summary.component_totals.ventilation,
            -0.8,
            max_relative = 1e-12
        );
        assert_eq!(
            summary.peak_heating,
            Some(PeakHeating {
                load: 3000.,
                time: 1.,
                indoor_temperature: 291.,
                sol_air_temperature: 265.,
            })
        );
        assert_eq!(
            summary.min_outdoor_temperature,
            Some(Extreme {
                value: 268.,
                time: 1.
            })
        );
        assert_eq!(
            summary.min_sol_air_temperature,
            Some(Extreme {
                value: 265.,
                time: 1.
            })
        );
        assert_relative_eq!(summary.component_means.total, -875., max_relative = 1e-12);
        assert_eq!(summary.component_maxima.total, 1000.);
        assert_eq!(summary.component_minima.total, -3000.);
        assert_eq!(summary.component_maxima.ventilation, 200.);
        assert_eq!(summary.component_minima.roof, 0.);
        assert_eq!(
            summary.coldest_hour,
            Some(ColdestHour {
                indoor_temperature: 290.,
                time: 0.,
                outdoor_temperature: 270.,
                sol_air_temperature: 266.,
                heating_load: 2000.,
            })
        );
        assert_relative_eq!(summary.indoor_temperature_mean, 295., max_relative = 1e-12);
        assert_eq!(summary.indoor_temperature_max, 303.);
        assert_eq!(summary.indoor_temperature_min, 290.);
        assert_eq!(
            (
                summary.heating_timesteps,
                summary.cooling_timesteps,
                summary.neutral_timesteps
            ),
            (2, 1, 1)
        );
    }

    #[rstest]
    fn test_energies_scale_with_step(state: SimulationState) {
        let summary = AnnualSummary::from_state(&state, 0.5);
        assert_relative_eq!(summary.heating_demand, 2.5, max_relative = 1e-12);
    }

    #[rstest]
    fn test_no_peak_without_heating(mut state: SimulationState) {
        state.heating_load = vec![0.; 4];
        assert_eq!(AnnualSummary::from_state(&state, 1.).peak_heating, None);
    }

    #[rstest]
    fn test_monthly_mean_daily_profiles() {
        // two days of January then the first hour of February
        let times = (0..48u32).chain([744]).map(f64::from).collect::<Vec<_>>();
        let values = (0..48)
            .map(|hour| if hour < 24 { 10. } else { 20. })
            .chain([7.])
            .collect::<Vec<f64>>();

        let profiles = monthly_mean_daily_profiles(&times, &values);

        assert_eq!(profiles[0][0], Some(15.));
        assert_eq!(profiles[0][23], Some(15.));
        assert_eq!(profiles[1][0], Some(7.));
        assert_eq!(profiles[1][1], None);
        assert_eq!(profiles[11][12], None);
    }
}
