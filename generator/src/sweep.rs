use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use thiserror::Error;


/// Named dimensions a sweep can span
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    /// number of simulated vehicles handed to the target
    Vehicles,
    /// number of nodes requested from the scheduler
    Nodes,
    /// number of ranks requested from the scheduler
    Workers,
}

impl Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vehicles => "vehicles",
            Self::Nodes => "nodes",
            Self::Workers => "workers",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("A sweep needs at least one axis")]
    NoAxes,
    #[error("Axis {0} has no values")]
    EmptyAxis(Axis),
    #[error("Axis {0} is defined more than once")]
    DuplicateAxis(Axis),
    #[error("Axis {axis} lists {value} more than once")]
    DuplicateValue { axis: Axis, value: u32 },
    #[error("Axis {0} contains 0, all values must be at least 1")]
    ZeroValue(Axis),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SweepAxis {
    pub axis: Axis,
    pub values: Vec<u32>,
}

impl SweepAxis {
    pub fn new(axis: Axis, values: Vec<u32>) -> Self {
        Self { axis, values }
    }
}

/// One point of the cartesian product, values are kept in axis order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawConfiguration {
    values: Vec<(Axis, u32)>,
}

impl RawConfiguration {
    pub fn get(&self, axis: Axis) -> Option<u32> {
        self.values
            .iter()
            .find(|(name, _)| *name == axis)
            .map(|(_, value)| *value)
    }
}

impl Display for RawConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .values
            .iter()
            .map(|(axis, value)| format!("{axis}={value}"))
            .join(", ");

        write!(f, "({joined})")
    }
}

/// Validated set of axes, enumerated row-major with the first axis varying slowest
#[derive(Clone, Debug)]
pub struct Sweep<'a> {
    axes: &'a [SweepAxis],
}

impl<'a> Sweep<'a> {
    /// collect every problem with the given axes instead of stopping at the first one
    pub fn check(axes: &[SweepAxis]) -> Vec<SweepError> {
        let mut errors = Vec::new();

        if axes.is_empty() {
            errors.push(SweepError::NoAxes);
        }

        for axis in axes.iter().map(|axis| axis.axis).duplicates() {
            errors.push(SweepError::DuplicateAxis(axis));
        }

        for axis in axes {
            if axis.values.is_empty() {
                errors.push(SweepError::EmptyAxis(axis.axis));
            }

            if axis.values.contains(&0) {
                errors.push(SweepError::ZeroValue(axis.axis));
            }

            // a repeated value would produce two configurations with the same job name
            for value in axis.values.iter().duplicates() {
                errors.push(SweepError::DuplicateValue {
                    axis: axis.axis,
                    value: *value,
                });
            }
        }

        errors
    }

    pub fn new(axes: &'a [SweepAxis]) -> Result<Self, SweepError> {
        match Self::check(axes).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(Self { axes }),
        }
    }

    /// number of raw configurations the sweep enumerates
    pub fn cardinality(&self) -> usize {
        self.axes.iter().map(|axis| axis.values.len()).product()
    }

    /// lazily enumerate the full cartesian product, every call starts from the beginning
    pub fn iter(&self) -> impl Iterator<Item = RawConfiguration> + Send + 'a {
        self.axes
            .iter()
            .map(|axis| axis.values.iter().map(move |value| (axis.axis, *value)))
            .multi_cartesian_product()
            .map(|values| RawConfiguration { values })
    }
}
