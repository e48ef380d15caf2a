use thiserror::Error;

pub const JOULES_PER_KILOJOULE: u32 = 1_000;
pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;
pub const MONTHS_PER_YEAR: u32 = 12;

/// 1 kcal/(m2.h.K) expressed in W/(m2.K). Greenhouse covering transmittances are commonly
/// tabulated in kcal/(m2.h.degC).
pub const WATTS_PER_KCAL_PER_HOUR: f64 = 1.163;

const ABSOLUTE_ZERO_CELSIUS: f64 = -273.15;

pub(crate) fn kelvin_to_celsius(temp_k: f64) -> Result<f64, BelowAbsoluteZeroError> {
    if temp_k < 0.0 {
        Err(BelowAbsoluteZeroError::from_k(temp_k))
    } else {
        Ok(temp_k + ABSOLUTE_ZERO_CELSIUS)
    }
}

/// Energy in kWh delivered by a constant power (in W) held for a number of hours.
pub(crate) fn watts_over_hours_to_kwh(power_w: f64, hours: f64) -> f64 {
    power_w * hours / WATTS_PER_KILOWATT as f64
}

pub(crate) fn kcal_per_hour_transmittance_to_watts(u_kcal: f64) -> f64 {
    u_kcal * WATTS_PER_KCAL_PER_HOUR
}

#[derive(Debug, Error)]
#[error(
    "A temperature of {k}ºK/{}ºC was encountered, which is less than absolute zero",
    k + ABSOLUTE_ZERO_CELSIUS
)]
pub(crate) struct BelowAbsoluteZeroError {
    k: f64,
}

impl BelowAbsoluteZeroError {
    fn from_k(k: f64) -> Self {
        Self { k }
    }

    pub(crate) fn kelvin(&self) -> f64 {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_do_correct_temperature_conversions() {
        assert_relative_eq!(kelvin_to_celsius(293.15).unwrap(), 20.0, max_relative = 1e-12);
        assert_eq!(
            kelvin_to_celsius(5.0).unwrap(),
            -268.15,
            "incorrect conversion of Kelvin near absolute zero"
        );
    }

    #[rstest]
    fn should_refuse_temperatures_below_absolute_zero() {
        let error = kelvin_to_celsius(-1.).unwrap_err();
        assert_eq!(error.kelvin(), -1.);
    }

    #[rstest]
    fn should_convert_hourly_power_to_energy() {
        assert_eq!(watts_over_hours_to_kwh(2500., 1.), 2.5);
        assert_eq!(watts_over_hours_to_kwh(2500., 0.5), 1.25);
    }

    #[rstest]
    fn should_convert_kcal_transmittance() {
        assert_relative_eq!(
            kcal_per_hour_transmittance_to_watts(5.7),
            6.6291,
            max_relative = 1e-9
        );
    }
}
