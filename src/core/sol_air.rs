// This module provides the sol-air temperature: a single equivalent outdoor temperature folding
// solar absorption and long-wave loss to the sky into the convective boundary condition of an
// opaque or glazed external surface.

use crate::errors::{ensure_fraction, ensure_non_negative, ensure_positive, ConfigurationError};

/// Empirical constant part of the external convective coefficient, in W/(m2.K)
pub const H_CONV_BASE: f64 = 5.7;
/// Wind-dependent part of the external convective coefficient, in W/(m2.K) per m/s
pub const H_CONV_WIND: f64 = 3.8;
/// Net long-wave radiation exchanged with the sky by a black horizontal surface, in W/m2
pub const LONG_WAVE_FLUX: f64 = 63.;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SolAirModel {
    /// h = h0 + h1 * wind speed, with a long-wave correction of emissivity * C_lw / h
    WindDependent {
        absorptivity: f64,
        emissivity: f64,
        h_conv_base: f64,
        h_conv_wind: f64,
        long_wave_flux: f64,
    },
    /// Constant combined external coefficient and no long-wave correction
    FixedCoefficient { absorptivity: f64, h_ext: f64 },
}

impl SolAirModel {
    /// Construct the wind-dependent model
    ///
    /// Arguments:
    /// * `absorptivity` - solar absorptivity of the external surface, 0 to 1
    /// * `emissivity` - long-wave emissivity of the external surface, 0 to 1
    /// * `h_conv_base` - convective coefficient in still air, in W/(m2.K)
    /// * `h_conv_wind` - increase of the convective coefficient per m/s of wind, in W/(m2.K)/(m/s)
    /// * `long_wave_flux` - long-wave loss to the sky, in W/m2
    pub fn wind_dependent(
        absorptivity: f64,
        emissivity: f64,
        h_conv_base: f64,
        h_conv_wind: f64,
        long_wave_flux: f64,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::WindDependent {
            absorptivity: ensure_fraction("surface absorptivity", absorptivity)?,
            emissivity: ensure_fraction("surface emissivity", emissivity)?,
            // a positive base coefficient keeps h away from zero for any valid wind speed
            h_conv_base: ensure_positive("still-air convective coefficient", h_conv_base)?,
            h_conv_wind: ensure_non_negative("wind convective coefficient", h_conv_wind)?,
            long_wave_flux: ensure_non_negative("long-wave flux", long_wave_flux)?,
        })
    }

    pub fn fixed_coefficient(absorptivity: f64, h_ext: f64) -> Result<Self, ConfigurationError> {
        Ok(Self::FixedCoefficient {
            absorptivity: ensure_fraction("surface absorptivity", absorptivity)?,
            h_ext: ensure_positive("external surface coefficient", h_ext)?,
        })
    }

    /// External surface heat transfer coefficient at the given wind speed, in W/(m2.K)
    pub fn h_ext(&self, wind_speed: f64) -> f64 {
        match *self {
            Self::WindDependent {
                h_conv_base,
                h_conv_wind,
                ..
            } => h_conv_base + h_conv_wind * wind_speed,
            Self::FixedCoefficient { h_ext, .. } => h_ext,
        }
    }

    /// Equivalent outdoor temperature, in the same unit as `outdoor_temp`
    ///
    /// Arguments:
    /// * `outdoor_temp` - outdoor air temperature, in K
    /// * `irradiance` - solar irradiance on the surface, in W/m2
    /// * `wind_speed` - wind speed, in m/s (not negative)
    pub fn sol_air_temperature(&self, outdoor_temp: f64, irradiance: f64, wind_speed: f64) -> f64 {
        let h = self.h_ext(wind_speed);
        match *self {
            Self::WindDependent {
                absorptivity,
                emissivity,
                long_wave_flux,
                ..
            } => outdoor_temp + absorptivity * irradiance / h - emissivity * long_wave_flux / h,
            Self::FixedCoefficient { absorptivity, .. } => {
                outdoor_temp + absorptivity * irradiance / h
            }
        }
    }
}

impl Default for SolAirModel {
    fn default() -> Self {
        Self::WindDependent {
            absorptivity: 0.2,
            emissivity: 0.9,
            h_conv_base: H_CONV_BASE,
            h_conv_wind: H_CONV_WIND,
            long_wave_flux: LONG_WAVE_FLUX,
        }
    }
}
