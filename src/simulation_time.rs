use crate::core::units::SECONDS_PER_HOUR;
use crate::errors::{ensure_positive, ConfigurationError};
use serde::Deserialize;

// # Define hours that start each month (and end next month). Note there are 13
// # values so that end of final month is handled correctly.
// # E.g. Jan is hours 0-743
const MONTH_START_END_HOURS: [u32; 13] = [
    0, 744, 1416, 2160, 2880, 3624, 4344, 5088, 5832, 6552, 7296, 8016, 8760,
];

/// Hours in the non-leap simulation year
pub const HOURS_IN_YEAR: u32 = MONTH_START_END_HOURS[12];

/// Shortest accepted timestep, one second, in hours
pub const MIN_STEP_HOURS: f64 = 1. / SECONDS_PER_HOUR as f64;

/// Simulated period, in hours of the year. `step` is the timestep in hours.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SimulationTime {
    #[serde(rename = "start")]
    start_time: f64,
    #[serde(rename = "end")]
    end_time: f64,
    step: f64,
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new(0., HOURS_IN_YEAR as f64, 1.)
    }
}

impl SimulationTime {
    pub fn new(start_time: f64, end_time: f64, step: f64) -> Self {
        Self {
            start_time,
            end_time,
            step,
        }
    }

    pub fn validate(self) -> Result<Self, ConfigurationError> {
        ensure_positive("time step", self.step)?;
        if self.step < MIN_STEP_HOURS {
            return Err(ConfigurationError::StepTooShort {
                step: self.step,
                minimum: MIN_STEP_HOURS,
            });
        }
        if !(self.start_time >= 0.
            && self.end_time > self.start_time
            && self.end_time.is_finite())
        {
            return Err(ConfigurationError::EmptySimulation {
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(self)
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// timestep, in hours
    pub fn step_in_hours(&self) -> f64 {
        self.step
    }

    pub fn step_in_seconds(&self) -> f64 {
        self.step * SECONDS_PER_HOUR as f64
    }

    pub fn total_steps(&self) -> usize {
        ((self.end_time - self.start_time) / self.step).ceil() as usize
    }

    /// Number of hourly weather rows needed to cover the simulation, counted from hour 0
    pub fn required_weather_hours(&self) -> usize {
        self.end_time.ceil() as usize
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator::from(*self)
    }
}

#[derive(Clone)]
pub struct SimulationTimeIterator {
    current_index: usize,
    current_time: f64,
    started: bool,
    simulation_time: SimulationTime,
}

impl SimulationTimeIterator {
    fn from(simulation_time: SimulationTime) -> Self {
        SimulationTimeIterator {
            current_index: 0,
            current_time: simulation_time.start_time,
            started: false,
            simulation_time,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationTimeIteration {
    pub index: usize,
    pub time: f64,
    pub timestep: f64,
}

impl SimulationTimeIteration {
    pub fn current_hour(&self) -> u32 {
        self.time.floor() as u32
    }
}

pub fn month_of_hour(hour: u32) -> Option<u32> {
    MONTH_START_END_HOURS
        .iter()
        .position(|end_hour| hour < *end_hour)
        .map(|i| (i - 1) as u32)
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started && self.simulation_time.start_time != self.simulation_time.end_time {
            self.started = true;
            return Some(SimulationTimeIteration {
                index: 0,
                time: self.simulation_time.start_time,
                timestep: self.simulation_time.step,
            });
        }
        match self.current_time < (self.simulation_time.end_time - self.simulation_time.step) {
            true => {
                self.current_index += 1;
                self.current_time += self.simulation_time.step;
                Some(SimulationTimeIteration {
                    index: self.current_index,
                    time: self.current_time,
                    timestep: self.simulation_time.step,
                })
            }
            false => None,
        }
    }
}
