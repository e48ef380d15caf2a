use crate::errors::{ensure_positive, ConfigurationError};

/// A homogeneous layer of a construction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layer {
    /// in m
    pub thickness: f64,
    /// in W/(m.K)
    pub thermal_conductivity: f64,
}

impl Layer {
    pub fn new(thickness: f64, thermal_conductivity: f64) -> Result<Self, ConfigurationError> {
        Ok(Self {
            thickness: ensure_positive("layer thickness", thickness)?,
            thermal_conductivity: ensure_positive(
                "layer thermal conductivity",
                thermal_conductivity,
            )?,
        })
    }

    pub fn thermal_resistance(&self) -> f64 {
        self.thickness / self.thermal_conductivity
    }
}

/// A construction made of layers in series between an internal and an external surface film.
#[derive(Clone, Debug, PartialEq)]
pub struct LayeredConstruction {
    h_in: f64,
    h_out: Option<f64>,
    layers: Vec<Layer>,
}

impl LayeredConstruction {
    /// Arguments:
    /// * `h_in` - internal surface heat transfer coefficient, in W/(m2.K)
    /// * `h_out` - external surface heat transfer coefficient, in W/(m2.K); None for
    ///             constructions in contact with the ground
    /// * `layers` - layers from inside to outside
    pub fn new(
        h_in: f64,
        h_out: Option<f64>,
        layers: Vec<Layer>,
    ) -> Result<Self, ConfigurationError> {
        ensure_positive("internal surface coefficient", h_in)?;
        if let Some(h_out) = h_out {
            ensure_positive("external surface coefficient", h_out)?;
        }
        Ok(Self {
            h_in,
            h_out,
            layers,
        })
    }

    /// Total thermal resistance surface to surface including films, in (m2.K)/W
    pub fn thermal_resistance(&self) -> f64 {
        let r_layers: f64 = self.layers.iter().map(Layer::thermal_resistance).sum();
        1. / self.h_in + r_layers + self.h_out.map_or(0., |h_out| 1. / h_out)
    }
}
