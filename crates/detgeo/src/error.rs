//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Every
//! variant is fatal for the current run: each one reports a configuration or
//! programming mistake together with the accepted set or the violated constraint.
use thiserror::Error;

use crate::geometry::Lifecycle;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {field} = {value} (expected {expected})")]
    InvalidConfig {
        field: String,
        value: String,
        expected: String,
    },

    #[error("unknown region '{region}' for {owner} (accepted: {accepted:?})")]
    UnknownRegion {
        owner: String,
        region: String,
        accepted: Vec<String>,
    },

    #[error("degenerate {shape}: {dimension} = {value} (must be {constraint})")]
    DegenerateShape {
        shape: &'static str,
        dimension: &'static str,
        value: f64,
        constraint: &'static str,
    },

    #[error("no {kind} registered under '{name}' (available: {available:?})")]
    NotFound {
        kind: &'static str,
        name: String,
        available: Vec<String>,
    },

    #[error("{kind} '{name}' is already registered")]
    DuplicateRegistration { kind: &'static str, name: String },

    #[error("{operation} is not allowed while {state}")]
    Lifecycle {
        operation: &'static str,
        state: Lifecycle,
    },
}

impl Error {
    pub(crate) fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        Error::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    pub(crate) fn unknown_region(owner: &str, region: &str, accepted: &[&str]) -> Self {
        Error::UnknownRegion {
            owner: owner.to_owned(),
            region: region.to_owned(),
            accepted: accepted.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    pub(crate) fn degenerate(
        shape: &'static str,
        dimension: &'static str,
        value: f64,
        constraint: &'static str,
    ) -> Self {
        Error::DegenerateShape {
            shape,
            dimension,
            value,
            constraint,
        }
    }
}
