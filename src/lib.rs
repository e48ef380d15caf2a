mod compare_floats;
pub mod core;
pub mod corpus;
pub mod errors;
mod external_conditions;
pub mod input;
pub mod output;
pub mod read_weather_file;
pub mod simulation_time;
pub mod statistics;
#[cfg(test)]
mod tests;

#[macro_use]
extern crate is_close;

use crate::core::envelope::FluxComponents;
use crate::corpus::{Corpus, SimulationState};
use crate::input::ingest_for_processing;
use crate::output::Output;
use crate::read_weather_file::WeatherSeries;
use crate::statistics::{monthly_mean_daily_profiles, AnnualSummary};
use bitflags::bitflags;
use csv::WriterBuilder;
use indexmap::IndexMap;
use itertools::izip;
use std::io::{Read, Write};
use tracing::{debug, instrument};

bitflags! {
    /// Which result files a run writes
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ProjectFlags: u8 {
        const HOURLY_OUTPUT = 0b1;
        const SUMMARY_OUTPUT = 0b10;
        const PROFILE_OUTPUT = 0b100;
    }
}

impl Default for ProjectFlags {
    fn default() -> Self {
        Self::HOURLY_OUTPUT | Self::SUMMARY_OUTPUT
    }
}

#[derive(Debug)]
pub struct RunResults {
    pub state: SimulationState,
    pub summary: AnnualSummary,
}

#[instrument(skip_all)]
pub fn run_project(
    input: impl Read,
    output: impl Output,
    weather: WeatherSeries,
    flags: &ProjectFlags,
) -> Result<RunResults, anyhow::Error> {
    let input = ingest_for_processing(input)?;

    let corpus = Corpus::from_inputs(&input, weather)?;
    let state = corpus.run();
    let summary = AnnualSummary::from_state(&state, corpus.simulation_time().step_in_hours());

    if !output.is_noop() {
        if flags.contains(ProjectFlags::HOURLY_OUTPUT) {
            debug!("writing hourly results");
            write_hourly_output_file(output.writer_for_location_key("results", "csv")?, &state)?;
        }
        if flags.contains(ProjectFlags::SUMMARY_OUTPUT) {
            debug!("writing results summary");
            write_summary_output_file(
                output.writer_for_location_key("results_summary", "csv")?,
                &summary_rows(&summary, &corpus),
            )?;
        }
        if flags.contains(ProjectFlags::PROFILE_OUTPUT) {
            debug!("writing monthly profiles");
            write_profile_output_file(
                output.writer_for_location_key("results_profiles", "csv")?,
                &state,
            )?;
        }
    }

    Ok(RunResults { state, summary })
}

const HOURLY_HEADINGS: [(&str, &str); 17] = [
    ("Timestep", "[hour]"),
    ("Indoor temp", "[K]"),
    ("Outdoor temp", "[K]"),
    ("Sol-air temp", "[K]"),
    ("Vapour pressure", "[Pa]"),
    ("Solar irradiance", "[W/m2]"),
    ("Solar gain", "[W]"),
    ("Roof", "[W]"),
    ("Floor", "[W]"),
    ("Side wall", "[W]"),
    ("Front/back wall", "[W]"),
    ("Window", "[W]"),
    ("Ventilation", "[W]"),
    ("Total heat flow", "[W]"),
    ("Heating load", "[W]"),
    ("Cooling load", "[W]"),
    ("Mode", "[0 neutral, 1 heating, 2 cooling]"),
];

fn write_hourly_output_file(writer: impl Write, state: &SimulationState) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    // Write headings and units to output file
    writer.write_record(HOURLY_HEADINGS.iter().map(|(heading, _)| heading))?;
    writer.write_record(HOURLY_HEADINGS.iter().map(|(_, unit)| unit))?;

    let rows = izip!(
        &state.timestep,
        &state.indoor_temperature,
        &state.outdoor_temperature,
        &state.sol_air_temperature,
        &state.vapour_pressure,
        &state.solar_irradiance,
        &state.flux_components,
        &state.heating_load,
        &state.cooling_load,
        &state.operating_mode,
    );
    for columns in rows {
        let (time, indoor, outdoor, sol_air, vapour_pressure, irradiance) =
            (columns.0, columns.1, columns.2, columns.3, columns.4, columns.5);
        let (fluxes, heating, cooling, mode) = (columns.6, columns.7, columns.8, columns.9);
        let mut row = [
            *time,
            *indoor,
            *outdoor,
            *sol_air,
            *vapour_pressure,
            *irradiance,
            fluxes.solar_gain,
            fluxes.roof,
            fluxes.floor,
            fluxes.side_wall,
            fluxes.front_back,
            fluxes.window,
            fluxes.ventilation,
            fluxes.total,
            *heating,
            *cooling,
        ]
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>();
        row.push(mode.code().to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Quantity name to value and unit, in output order
type SummaryRows = IndexMap<String, (String, &'static str)>;

fn summary_rows(summary: &AnnualSummary, corpus: &Corpus) -> SummaryRows {
    let mut rows = SummaryRows::new();
    let mut number = |name: &str, value: f64, unit: &'static str| {
        rows.insert(name.to_string(), (value.to_string(), unit));
    };

    number(
        "Total heat flow magnitude",
        summary.total_heat_flow_magnitude,
        "[kWh]",
    );
    number("Heating demand", summary.heating_demand, "[kWh]");
    number("Cooling demand", summary.cooling_demand, "[kWh]");
    number(
        "Ventilation heat flow magnitude",
        summary.ventilation_magnitude,
        "[kWh]",
    );

    for (i, name) in FluxComponents::NAMES.iter().enumerate() {
        number(
            &format!("{name} total"),
            summary.component_totals.values()[i],
            "[kWh]",
        );
        number(
            &format!("{name} mean"),
            summary.component_means.values()[i],
            "[W]",
        );
        number(
            &format!("{name} maximum"),
            summary.component_maxima.values()[i],
            "[W]",
        );
        number(
            &format!("{name} minimum"),
            summary.component_minima.values()[i],
            "[W]",
        );
    }

    number(
        "Heating load 99th percentile",
        summary.heating_load_99th_percentile,
        "[W]",
    );
    number("Mean indoor temp", summary.indoor_temperature_mean, "[K]");
    number("Maximum indoor temp", summary.indoor_temperature_max, "[K]");
    number("Minimum indoor temp", summary.indoor_temperature_min, "[K]");

    let setpoints = corpus.setpoints();
    number("Heating setpoint", setpoints.heating(), "[K]");
    number("Cooling setpoint", setpoints.cooling(), "[K]");

    let geometry = corpus.flux_model().geometry();
    number("Floor area", geometry.floor_area(), "[m2]");
    number("Roof area", geometry.roof_area(), "[m2]");
    number("Wall area", geometry.envelope_wall_area(), "[m2]");
    number("Side wall area", geometry.side_wall_area(), "[m2]");
    number(
        "Front/back wall area",
        geometry.front_back_wall_area(),
        "[m2]",
    );
    number("Air volume", geometry.volume(), "[m3]");
    number(
        "Air heat capacity",
        corpus.flux_model().air_heat_capacity(),
        "[J/K]",
    );
    number(
        "Thermal capacity",
        corpus.thermal_mass().capacity(),
        "[J/K]",
    );
    number(
        "Total conductance",
        corpus.flux_model().total_conductance(),
        "[W/K]",
    );

    let fluids = corpus.fluid_properties();
    number("Air density", fluids.air.density(), "[kg/m3]");
    number(
        "Air specific heat capacity",
        fluids.air.specific_heat_capacity_kj(),
        "[kJ/kgK]",
    );
    number("Water density", fluids.water.density(), "[kg/m3]");
    number(
        "Water specific heat capacity",
        fluids.water.specific_heat_capacity_kj(),
        "[kJ/kgK]",
    );

    // quantities that only exist for some runs are written with an empty value
    let mut optional = |name: &str, value: Option<f64>, unit: &'static str| {
        let value = value.map(|v| v.to_string()).unwrap_or_default();
        rows.insert(name.to_string(), (value, unit));
    };

    let peak = summary.peak_heating.as_ref();
    optional("Peak heating load", peak.map(|p| p.load), "[W]");
    optional("Peak heating timestep", peak.map(|p| p.time), "[hour]");
    optional(
        "Indoor temp at peak heating",
        peak.map(|p| p.indoor_temperature),
        "[K]",
    );
    optional(
        "Sol-air temp at peak heating",
        peak.map(|p| p.sol_air_temperature),
        "[K]",
    );

    let coldest = summary.coldest_hour.as_ref();
    optional("Coldest indoor timestep", coldest.map(|c| c.time), "[hour]");
    optional(
        "Outdoor temp at coldest indoor",
        coldest.map(|c| c.outdoor_temperature),
        "[K]",
    );
    optional(
        "Sol-air temp at coldest indoor",
        coldest.map(|c| c.sol_air_temperature),
        "[K]",
    );
    optional(
        "Heating load at coldest indoor",
        coldest.map(|c| c.heating_load),
        "[W]",
    );

    let min_outdoor = summary.min_outdoor_temperature;
    optional("Minimum outdoor temp", min_outdoor.map(|e| e.value), "[K]");
    optional(
        "Minimum outdoor temp timestep",
        min_outdoor.map(|e| e.time),
        "[hour]",
    );
    let min_sol_air = summary.min_sol_air_temperature;
    optional("Minimum sol-air temp", min_sol_air.map(|e| e.value), "[K]");
    optional(
        "Minimum sol-air temp timestep",
        min_sol_air.map(|e| e.time),
        "[hour]",
    );

    let counts = [
        ("Heating timesteps", summary.heating_timesteps),
        ("Cooling timesteps", summary.cooling_timesteps),
        ("Neutral timesteps", summary.neutral_timesteps),
        ("Implausible indoor temp timesteps", summary.numeric_anomalies),
    ];
    for (name, count) in counts {
        rows.insert(name.to_string(), (count.to_string(), "[count]"));
    }

    rows
}

fn write_summary_output_file(writer: impl Write, rows: &SummaryRows) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(["Quantity", "Value", "Unit"])?;
    for (quantity, (value, unit)) in rows {
        writer.write_record([quantity.as_str(), value.as_str(), *unit])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_profile_output_file(writer: impl Write, state: &SimulationState) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record([
        "Month",
        "Hour of day",
        "Outdoor temp",
        "Indoor temp",
        "Heating load",
        "Cooling load",
    ])?;
    writer.write_record(["[1-12]", "[0-23]", "[K]", "[K]", "[W]", "[W]"])?;

    let profiles = [
        &state.outdoor_temperature,
        &state.indoor_temperature,
        &state.heating_load,
        &state.cooling_load,
    ]
    .map(|values| monthly_mean_daily_profiles(&state.timestep, values));

    for month in 0..profiles[0].len() {
        for hour_of_day in 0..profiles[0][month].len() {
            let means = profiles
                .iter()
                .map(|profile| profile[month][hour_of_day])
                .collect::<Vec<_>>();
            // skip hours the simulation did not cover
            if means.iter().all(Option::is_none) {
                continue;
            }
            let mut row = vec![(month + 1).to_string(), hour_of_day.to_string()];
            row.extend(
                means
                    .iter()
                    .map(|mean| mean.map(|m| m.to_string()).unwrap_or_default()),
            );
            writer.write_record(&row)?;
        }
    }

    writer.flush()?;
    Ok(())
}
