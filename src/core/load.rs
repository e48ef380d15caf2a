// This module decides, hour by hour, whether the greenhouse needs heating or cooling and how
// much. Each hour is judged on its own: there is no thermostat memory, so the mode can flip
// between consecutive hours when the indoor temperature hovers around a setpoint.

use crate::compare_floats::max_of_2;
use crate::core::thermal_state::ThermalMass;
use crate::errors::ConfigurationError;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[repr(u8)]
pub enum OperatingMode {
    #[default]
    #[strum(serialize = "neutral")]
    Neutral = 0,
    #[strum(serialize = "heating")]
    Heating = 1,
    #[strum(serialize = "cooling")]
    Cooling = 2,
}

impl OperatingMode {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Heating and cooling setpoints, in K. The band between them is the neutral band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Setpoints {
    heating: f64,
    cooling: f64,
}

impl Setpoints {
    pub fn new(heating: f64, cooling: f64) -> Result<Self, ConfigurationError> {
        if !(heating < cooling) {
            return Err(ConfigurationError::SetpointOrder { heating, cooling });
        }
        Ok(Self { heating, cooling })
    }

    pub fn heating(&self) -> f64 {
        self.heating
    }

    pub fn cooling(&self) -> f64 {
        self.cooling
    }
}

/// How the required load is derived once an hour is known to need heating or cooling
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub enum LoadPolicy {
    /// The load is the magnitude of the net heat flow of the hour
    #[default]
    DeficitMagnitude,
    /// The load brings the indoor air back to the setpoint within the timestep, plus the net heat
    /// flow of the hour when that flow pushes further away from the setpoint
    SetpointCorrection,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadClassification {
    /// in W, never negative
    pub heating_load: f64,
    /// in W, never negative
    pub cooling_load: f64,
    pub mode: OperatingMode,
}

#[derive(Clone, Debug)]
pub struct LoadClassifier {
    setpoints: Setpoints,
    policy: LoadPolicy,
    thermal_mass: ThermalMass,
    step_seconds: f64,
}

impl LoadClassifier {
    pub fn new(
        setpoints: Setpoints,
        policy: LoadPolicy,
        thermal_mass: ThermalMass,
        step_seconds: f64,
    ) -> Self {
        Self {
            setpoints,
            policy,
            thermal_mass,
            step_seconds,
        }
    }

    pub fn setpoints(&self) -> &Setpoints {
        &self.setpoints
    }

    /// Power needed to move the indoor air to the setpoint within one timestep, in W
    fn setpoint_correction(&self, indoor_temperature: f64, setpoint: f64) -> f64 {
        self.thermal_mass.capacity() * (setpoint - indoor_temperature).abs() / self.step_seconds
    }

    /// Arguments:
    /// * `indoor_temperature` - indoor temperature of the hour, in K
    /// * `total_flux` - net heat flow into the building during the hour, in W
    pub fn classify(&self, indoor_temperature: f64, total_flux: f64) -> LoadClassification {
        if indoor_temperature < self.setpoints.heating {
            LoadClassification {
                heating_load: self.required_load(
                    indoor_temperature,
                    self.setpoints.heating,
                    max_of_2(-total_flux, 0.),
                    total_flux,
                ),
                cooling_load: 0.,
                mode: OperatingMode::Heating,
            }
        } else if indoor_temperature > self.setpoints.cooling {
            LoadClassification {
                heating_load: 0.,
                cooling_load: self.required_load(
                    indoor_temperature,
                    self.setpoints.cooling,
                    max_of_2(total_flux, 0.),
                    total_flux,
                ),
                mode: OperatingMode::Cooling,
            }
        } else {
            LoadClassification::default()
        }
    }

    /// `aggravating_flux` is the part of the net flow pushing away from the setpoint (zero when
    /// the flow helps).
    fn required_load(
        &self,
        indoor_temperature: f64,
        setpoint: f64,
        aggravating_flux: f64,
        total_flux: f64,
    ) -> f64 {
        let correction = self.setpoint_correction(indoor_temperature, setpoint);
        match self.policy {
            LoadPolicy::DeficitMagnitude => {
                let deficit = total_flux.abs();
                // an hour outside the band always carries a load
                if is_close!(deficit, 0., rel_tol = 1e-09, abs_tol = 1e-12) {
                    correction
                } else {
                    deficit
                }
            }
            LoadPolicy::SetpointCorrection => correction + aggravating_flux,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn setpoints() -> Setpoints {
        Setpoints::new(293., 301.).unwrap()
    }

    #[fixture]
    fn thermal_mass() -> ThermalMass {
        ThermalMass::new(3600., 1000., 100., 0.).unwrap()
    }

    fn classifier(policy: LoadPolicy) -> LoadClassifier {
        LoadClassifier::new(setpoints(), policy, thermal_mass(), 3600.)
    }

    #[rstest]
    fn test_setpoints_must_leave_a_neutral_band() {
        assert_eq!(
            Setpoints::new(293., 293.),
            Err(ConfigurationError::SetpointOrder {
                heating: 293.,
                cooling: 293.
            })
        );
        assert!(Setpoints::new(301., 293.).is_err());
        assert!(Setpoints::new(f64::NAN, 293.).is_err());
    }

    #[rstest]
    #[case(285., -4000., OperatingMode::Heating, 4000., 0.)]
    #[case(285., 2500., OperatingMode::Heating, 2500., 0.)]
    #[case(305., 1500., OperatingMode::Cooling, 0., 1500.)]
    #[case(305., -700., OperatingMode::Cooling, 0., 700.)]
    #[case(296., -9000., OperatingMode::Neutral, 0., 0.)]
    #[case(293., -9000., OperatingMode::Neutral, 0., 0.)]
    #[case(301., 9000., OperatingMode::Neutral, 0., 0.)]
    fn test_deficit_magnitude_policy(
        #[case] indoor_temperature: f64,
        #[case] total_flux: f64,
        #[case] mode: OperatingMode,
        #[case] heating_load: f64,
        #[case] cooling_load: f64,
    ) {
        let classification =
            classifier(LoadPolicy::DeficitMagnitude).classify(indoor_temperature, total_flux);
        assert_eq!(
            classification,
            LoadClassification {
                heating_load,
                cooling_load,
                mode
            }
        );
    }

    #[rstest]
    fn test_deficit_magnitude_falls_back_to_correction_without_flux() {
        // 3.6 MJ/K capacity, 3 K below setpoint over an hour
        let classification = classifier(LoadPolicy::DeficitMagnitude).classify(290., 0.);
        assert_eq!(classification.mode, OperatingMode::Heating);
        assert_relative_eq!(classification.heating_load, 3000., max_relative = 1e-12);
    }

    #[rstest]
    fn test_setpoint_correction_policy_adds_aggravating_losses() {
        let classifier = classifier(LoadPolicy::SetpointCorrection);

        let losing_heat = classifier.classify(290., -2000.);
        assert_eq!(losing_heat.mode, OperatingMode::Heating);
        assert_relative_eq!(losing_heat.heating_load, 3000. + 2000., max_relative = 1e-12);

        let gaining_heat = classifier.classify(290., 2000.);
        assert_relative_eq!(gaining_heat.heating_load, 3000., max_relative = 1e-12);

        let overheated = classifier.classify(303., 1000.);
        assert_eq!(overheated.mode, OperatingMode::Cooling);
        assert_relative_eq!(overheated.cooling_load, 2000. + 1000., max_relative = 1e-12);
        assert_eq!(overheated.heating_load, 0.);
    }

    #[rstest]
    fn test_mode_codes_and_names() {
        assert_eq!(OperatingMode::Neutral.code(), 0);
        assert_eq!(OperatingMode::Heating.code(), 1);
        assert_eq!(OperatingMode::Cooling.code(), 2);
        assert_eq!(OperatingMode::Cooling.to_string(), "cooling");
    }
}
