//! Typed configuration parameters addressed by dotted paths.
//!
//! A [`ParameterSet`] maps paths such as `geometry.xe_box.length` to typed
//! [`ParamValue`]s. It can be filled programmatically or parsed from lines of
//! the form `path value [unit]`:
//!
//! ```text
//! # comments and blank lines are ignored
//! geometry.xe_box.length   10 cm
//! geometry.xe_box.liquid   false
//! geometry.black_box.specific_vertex  0 0 -30 cm
//! ```
//!
//! Recipes read their own prefix through a [`ParamScope`], which checks the
//! dimension of every value and rejects keys nobody asked for.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::{self, Dimension};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// A number in internal units.
    Quantity { value: f64, dimension: Dimension },
    Integer(i64),
    Text(String),
    Flag(bool),
    /// A 3-vector in internal units.
    Vector { value: DVec3, dimension: Dimension },
}

impl ParamValue {
    pub fn quantity(value: f64, dimension: Dimension) -> Self {
        ParamValue::Quantity { value, dimension }
    }

    pub fn length(value: f64) -> Self {
        Self::quantity(value, Dimension::Length)
    }

    pub fn energy(value: f64) -> Self {
        Self::quantity(value, Dimension::Energy)
    }

    pub fn angle(value: f64) -> Self {
        Self::quantity(value, Dimension::Angle)
    }

    pub fn pressure(value: f64) -> Self {
        Self::quantity(value, Dimension::Pressure)
    }

    pub fn text(value: impl Into<String>) -> Self {
        ParamValue::Text(value.into())
    }

    pub fn vector_length(value: DVec3) -> Self {
        ParamValue::Vector {
            value,
            dimension: Dimension::Length,
        }
    }

    /// Parse the value part of a `path value [unit]` line.
    pub fn parse(field: &str, text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let numbers: Vec<f64> = tokens
            .iter()
            .map_while(|t| t.parse::<f64>().ok())
            .collect();
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(Error::invalid_config(field, text, "finite numbers"));
        }
        let rest = &tokens[numbers.len()..];

        let unit = match rest {
            [] => None,
            [symbol] if !numbers.is_empty() => Some(units::lookup(symbol).ok_or_else(|| {
                Error::invalid_config(
                    field,
                    text,
                    "a known unit symbol after the number",
                )
            })?),
            _ => None,
        };

        match (numbers.as_slice(), rest.len(), unit) {
            ([], 1, _) => Ok(match rest[0] {
                "true" => ParamValue::Flag(true),
                "false" => ParamValue::Flag(false),
                other => ParamValue::Text(other.to_owned()),
            }),
            ([n], 0, None) => Ok(match tokens[0].parse::<i64>() {
                Ok(i) => ParamValue::Integer(i),
                Err(_) => ParamValue::quantity(*n, Dimension::Dimensionless),
            }),
            ([n], 1, Some((factor, dimension))) => Ok(ParamValue::quantity(n * factor, dimension)),
            ([x, y, z], 0, None) => Ok(ParamValue::Vector {
                value: DVec3::new(*x, *y, *z),
                dimension: Dimension::Dimensionless,
            }),
            ([x, y, z], 1, Some((factor, dimension))) => Ok(ParamValue::Vector {
                value: DVec3::new(*x, *y, *z) * factor,
                dimension,
            }),
            _ => Err(Error::invalid_config(
                field,
                text,
                "a flag, a word, an integer, or 1 or 3 numbers with an optional unit",
            )),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Quantity { value, dimension } => {
                let (symbol, factor) = units::display_unit(*dimension);
                if symbol.is_empty() {
                    write!(f, "{value}")
                } else {
                    write!(f, "{} {symbol}", value / factor)
                }
            }
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Flag(b) => write!(f, "{b}"),
            ParamValue::Vector { value, dimension } => {
                let (symbol, factor) = units::display_unit(*dimension);
                let v = *value / factor;
                write!(f, "{} {} {}", v.x, v.y, v.z)?;
                if !symbol.is_empty() {
                    write!(f, " {symbol}")?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered map from dotted paths to values.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, returning the previous one at that path.
    pub fn set(&mut self, path: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.values.insert(path.into(), value)
    }

    pub fn with(mut self, path: impl Into<String>, value: ParamValue) -> Self {
        self.set(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<&ParamValue> {
        self.values.get(path)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a single `path value [unit]` line into the set.
    pub fn parse_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        let (path, value) = match line.split_once(char::is_whitespace) {
            Some((path, value)) if !value.trim().is_empty() => (path, value.trim()),
            _ => return Err(Error::invalid_config(line, "", "a value after the path")),
        };
        let parsed = ParamValue::parse(path, value)?;
        self.set(path, parsed);
        Ok(())
    }

    /// Parse a block of lines. `#` starts a comment; blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut set = Self::new();
        for raw in text.lines() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            set.parse_line(line)?;
        }
        Ok(set)
    }

    /// View of all paths under `prefix` (without the trailing dot).
    pub fn scope(&self, prefix: &str) -> ParamScope<'_> {
        ParamScope {
            prefix: prefix.to_owned(),
            params: self,
            known: BTreeSet::new(),
        }
    }
}

impl FromIterator<(String, ParamValue)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Typed, validated access to the parameters of one recipe.
#[derive(Debug)]
pub struct ParamScope<'a> {
    prefix: String,
    params: &'a ParameterSet,
    known: BTreeSet<&'static str>,
}

impl<'a> ParamScope<'a> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn path(&self, key: &str) -> String {
        format!("{}.{key}", self.prefix)
    }

    fn lookup(&mut self, key: &'static str) -> Option<&'a ParamValue> {
        self.known.insert(key);
        self.params.get(&self.path(key))
    }

    fn mismatch(&self, key: &str, value: &ParamValue, expected: impl Into<String>) -> Error {
        Error::invalid_config(self.path(key), value, expected)
    }

    /// A quantity of the given dimension, in internal units.
    pub fn quantity(&mut self, key: &'static str, dimension: Dimension, default: f64) -> Result<f64> {
        match self.lookup(key) {
            None => Ok(default),
            Some(ParamValue::Quantity { value, dimension: d }) if *d == dimension => {
                if value.is_finite() {
                    Ok(*value)
                } else {
                    let given = ParamValue::quantity(*value, dimension);
                    Err(self.mismatch(key, &given, "a finite number"))
                }
            }
            Some(other) => Err(self.mismatch(
                key,
                other,
                format!("a {dimension} with unit, one of {:?}", dimension.symbols()),
            )),
        }
    }

    pub fn length(&mut self, key: &'static str, default: f64) -> Result<f64> {
        self.quantity(key, Dimension::Length, default)
    }

    /// A length that must be strictly positive.
    pub fn positive_length(&mut self, key: &'static str, default: f64) -> Result<f64> {
        let value = self.length(key, default)?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Error::invalid_config(
                self.path(key),
                ParamValue::length(value),
                format!("{key} > 0"),
            ))
        }
    }

    /// A length that must not be negative.
    pub fn non_negative_length(&mut self, key: &'static str, default: f64) -> Result<f64> {
        let value = self.length(key, default)?;
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Error::invalid_config(
                self.path(key),
                ParamValue::length(value),
                format!("{key} >= 0"),
            ))
        }
    }

    pub fn energy(&mut self, key: &'static str, default: f64) -> Result<f64> {
        self.quantity(key, Dimension::Energy, default)
    }

    pub fn angle(&mut self, key: &'static str, default: f64) -> Result<f64> {
        self.quantity(key, Dimension::Angle, default)
    }

    pub fn pressure(&mut self, key: &'static str, default: f64) -> Result<f64> {
        self.quantity(key, Dimension::Pressure, default)
    }

    /// Whether `key` was given at all; marks it as known.
    pub fn is_set(&mut self, key: &'static str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn flag(&mut self, key: &'static str, default: bool) -> Result<bool> {
        match self.lookup(key) {
            None => Ok(default),
            Some(ParamValue::Flag(b)) => Ok(*b),
            Some(other) => Err(self.mismatch(key, other, "true or false")),
        }
    }

    /// A non-negative integer no smaller than `min`.
    pub fn count(&mut self, key: &'static str, default: u32, min: u32) -> Result<u32> {
        let value = match self.lookup(key) {
            None => default,
            Some(ParamValue::Integer(i)) => u32::try_from(*i).map_err(|_| {
                Error::invalid_config(self.path(key), i, format!("an integer >= {min}"))
            })?,
            Some(other) => return Err(self.mismatch(key, other, "an integer")),
        };
        if value < min {
            return Err(Error::invalid_config(
                self.path(key),
                value,
                format!("an integer >= {min}"),
            ));
        }
        Ok(value)
    }

    /// One word out of a closed set.
    pub fn choice(
        &mut self,
        key: &'static str,
        default: &'static str,
        accepted: &[&'static str],
    ) -> Result<&'static str> {
        match self.lookup(key) {
            None => Ok(default),
            Some(ParamValue::Text(s)) => accepted
                .iter()
                .copied()
                .find(|a| *a == s.as_str())
                .ok_or_else(|| {
                    Error::invalid_config(self.path(key), s, format!("one of {accepted:?}"))
                }),
            Some(other) => Err(self.mismatch(key, other, format!("one of {accepted:?}"))),
        }
    }

    /// A free-form word, if given.
    pub fn text(&mut self, key: &'static str) -> Result<Option<String>> {
        match self.lookup(key) {
            None => Ok(None),
            Some(ParamValue::Text(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mismatch(key, other, "a word")),
        }
    }

    pub fn vector_length(&mut self, key: &'static str, default: DVec3) -> Result<DVec3> {
        match self.lookup(key) {
            None => Ok(default),
            Some(ParamValue::Vector {
                value,
                dimension: Dimension::Length,
            }) if value.is_finite() => Ok(*value),
            Some(other @ ParamValue::Vector {
                dimension: Dimension::Length,
                ..
            }) => Err(self.mismatch(key, other, "three finite numbers")),
            Some(other) => Err(self.mismatch(key, other, "three numbers followed by a length unit")),
        }
    }

    /// Fail on any path under this prefix that no accessor asked for.
    pub fn finish(self) -> Result<()> {
        let head = format!("{}.", self.prefix);
        for (path, value) in self.params.iter() {
            let Some(key) = path.strip_prefix(&head) else {
                continue;
            };
            if !self.known.contains(key) {
                return Err(Error::invalid_config(
                    path,
                    value,
                    format!("a parameter of {}: {:?}", self.prefix, self.known),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{ATM, CM, MEV, MM};

    #[test]
    fn parses_each_value_kind() {
        let set = ParameterSet::parse(
            "# lab setup\n\
             geometry.xe_box.length 10 cm\n\
             geometry.xe_box.liquid false   # gas\n\
             \n\
             geometry.optical_fibre.core_mat Y11\n\
             geometry.optical_fibre.num_fibers 9\n\
             geometry.black_box.specific_vertex 0 0 -30 cm\n\
             generator.alpha.energy_low 1.5 MeV\n",
        )
        .unwrap();

        assert_eq!(set.len(), 6);
        assert_eq!(set.get("geometry.xe_box.length"), Some(&ParamValue::length(10.0 * CM)));
        assert_eq!(set.get("geometry.xe_box.liquid"), Some(&ParamValue::Flag(false)));
        assert_eq!(
            set.get("geometry.optical_fibre.core_mat"),
            Some(&ParamValue::text("Y11"))
        );
        assert_eq!(
            set.get("geometry.optical_fibre.num_fibers"),
            Some(&ParamValue::Integer(9))
        );
        assert_eq!(
            set.get("geometry.black_box.specific_vertex"),
            Some(&ParamValue::vector_length(DVec3::new(0.0, 0.0, -300.0)))
        );
        assert_eq!(
            set.get("generator.alpha.energy_low"),
            Some(&ParamValue::energy(1.5 * MEV))
        );
    }

    #[test]
    fn rejects_unknown_units_and_missing_values() {
        let mut set = ParameterSet::new();
        assert!(matches!(
            set.parse_line("geometry.xe_box.length 10 furlong"),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(set.parse_line("geometry.xe_box.length").is_err());
        assert!(set.parse_line("geometry.xe_box.length 1 2 mm").is_err());
    }

    #[test]
    fn scope_checks_dimensions() {
        let set = ParameterSet::new()
            .with("geometry.xe_box.length", ParamValue::energy(1.0))
            .with("geometry.xe_box.pressure", ParamValue::pressure(2.0 * ATM));
        let mut scope = set.scope("geometry.xe_box");
        assert!((scope.pressure("pressure", ATM).unwrap() - 2.0 * ATM).abs() < 1e-12);
        let err = scope.length("length", 1.0).unwrap_err();
        match err {
            Error::InvalidConfig { field, value, .. } => {
                assert_eq!(field, "geometry.xe_box.length");
                assert_eq!(value, "1 MeV");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn scope_rejects_unread_keys() {
        let set = ParameterSet::new()
            .with("geometry.xe_box.length", ParamValue::length(5.0 * MM))
            .with("geometry.xe_box.lenght", ParamValue::length(5.0 * MM))
            .with("geometry.other.length", ParamValue::length(1.0));
        let mut scope = set.scope("geometry.xe_box");
        scope.length("length", 1.0).unwrap();
        let err = scope.finish().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref field, .. } if field == "geometry.xe_box.lenght"));
    }

    #[test]
    fn choice_and_count_validate_ranges() {
        let set = ParameterSet::new()
            .with("g.shape", ParamValue::text("hexagon"))
            .with("g.num", ParamValue::Integer(0));
        let mut scope = set.scope("g");
        assert!(scope.choice("shape", "round", &["round", "square"]).is_err());
        assert!(scope.count("num", 1, 1).is_err());
        assert_eq!(scope.count("other", 4, 1).unwrap(), 4);
    }

    #[test]
    fn positive_length_rejects_zero() {
        let set = ParameterSet::new().with("g.radius", ParamValue::length(0.0));
        let mut scope = set.scope("g");
        let err = scope.positive_length("radius", 1.0).unwrap_err();
        assert!(err.to_string().contains("radius > 0"));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for text in ["nan mm", "inf deg", "-infinity", "nan 0 0 mm", "1e400 m"] {
            assert!(
                matches!(ParamValue::parse("g.x", text), Err(Error::InvalidConfig { .. })),
                "{text} was accepted"
            );
        }

        let set = ParameterSet::new()
            .with("g.hole_x", ParamValue::length(f64::NAN))
            .with("g.rotation", ParamValue::angle(f64::INFINITY))
            .with("g.vertex", ParamValue::vector_length(DVec3::new(f64::NAN, 0.0, 0.0)));
        let mut scope = set.scope("g");
        assert!(scope.length("hole_x", 0.0).is_err());
        assert!(scope.angle("rotation", 0.0).is_err());
        let err = scope.vector_length("vertex", DVec3::ZERO).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn display_round_trips_through_the_parser() {
        let value = ParamValue::length(12.5);
        let reparsed = ParamValue::parse("x", &value.to_string()).unwrap();
        assert_eq!(reparsed, value);
    }
}
