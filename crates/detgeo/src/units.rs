//! System of units used throughout the crate.
//!
//! Internal units follow the usual Monte Carlo convention: millimetre, MeV,
//! nanosecond and radian are all `1.0`. Pressure uses the bar as its base.
//! Multiply a number by a unit to store it, divide by a unit to read it back.
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const NM: f64 = 1.0e-6;
pub const UM: f64 = 1.0e-3;
pub const MM: f64 = 1.0;
pub const CM: f64 = 10.0;
pub const M: f64 = 1000.0;

pub const EV: f64 = 1.0e-6;
pub const KEV: f64 = 1.0e-3;
pub const MEV: f64 = 1.0;
pub const GEV: f64 = 1.0e3;

pub const RAD: f64 = 1.0;
pub const MRAD: f64 = 1.0e-3;
pub const DEG: f64 = PI / 180.0;

pub const NS: f64 = 1.0;
pub const US: f64 = 1.0e3;
pub const MS: f64 = 1.0e6;
pub const S: f64 = 1.0e9;

pub const BAR: f64 = 1.0;
pub const ATM: f64 = 1.01325;
pub const PASCAL: f64 = 1.0e-5;

/// Physical dimension of a quantity.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Dimensionless,
    Length,
    Energy,
    Angle,
    Time,
    Pressure,
}

impl Dimension {
    /// Unit symbols accepted for this dimension, used in error messages.
    pub fn symbols(self) -> Vec<&'static str> {
        UNIT_TABLE
            .iter()
            .filter(|(_, _, d)| *d == self)
            .map(|(s, _, _)| *s)
            .collect()
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dimension::Dimensionless => "dimensionless",
            Dimension::Length => "length",
            Dimension::Energy => "energy",
            Dimension::Angle => "angle",
            Dimension::Time => "time",
            Dimension::Pressure => "pressure",
        };
        f.write_str(name)
    }
}

const UNIT_TABLE: &[(&str, f64, Dimension)] = &[
    ("nm", NM, Dimension::Length),
    ("um", UM, Dimension::Length),
    ("mm", MM, Dimension::Length),
    ("cm", CM, Dimension::Length),
    ("m", M, Dimension::Length),
    ("eV", EV, Dimension::Energy),
    ("keV", KEV, Dimension::Energy),
    ("MeV", MEV, Dimension::Energy),
    ("GeV", GEV, Dimension::Energy),
    ("rad", RAD, Dimension::Angle),
    ("mrad", MRAD, Dimension::Angle),
    ("deg", DEG, Dimension::Angle),
    ("ns", NS, Dimension::Time),
    ("us", US, Dimension::Time),
    ("ms", MS, Dimension::Time),
    ("s", S, Dimension::Time),
    ("bar", BAR, Dimension::Pressure),
    ("atm", ATM, Dimension::Pressure),
    ("pascal", PASCAL, Dimension::Pressure),
];

/// Look up a unit symbol, returning its scale factor and dimension.
pub fn lookup(symbol: &str) -> Option<(f64, Dimension)> {
    UNIT_TABLE
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, factor, dim)| (*factor, *dim))
}

/// Preferred display unit for a dimension.
pub(crate) fn display_unit(dimension: Dimension) -> (&'static str, f64) {
    match dimension {
        Dimension::Dimensionless => ("", 1.0),
        Dimension::Length => ("mm", MM),
        Dimension::Energy => ("MeV", MEV),
        Dimension::Angle => ("rad", RAD),
        Dimension::Time => ("ns", NS),
        Dimension::Pressure => ("bar", BAR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_symbols() {
        assert_eq!(lookup("cm"), Some((10.0, Dimension::Length)));
        assert_eq!(lookup("keV"), Some((1.0e-3, Dimension::Energy)));
        assert!(lookup("furlong").is_none());
    }

    #[test]
    fn symbols_are_grouped_by_dimension() {
        let lengths = Dimension::Length.symbols();
        assert!(lengths.contains(&"mm"));
        assert!(!lengths.contains(&"MeV"));
    }

    #[test]
    fn degrees_convert_to_radians() {
        assert!((180.0 * DEG - PI).abs() < 1e-12);
    }
}
