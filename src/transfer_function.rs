use std::ops::RangeInclusive;

use rayon::prelude::*;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TransferFunctionError {
    #[error("Transfer function needs at least one control point")]
    Empty,

    #[error("Control point {index} has a non-finite scalar value")]
    NonFiniteScalar { index: usize },

    #[error("Control point {index} does not increase the scalar value")]
    NotIncreasing { index: usize },

    #[error("Control point {index} has output {value} outside [0, 1]")]
    OutputOutOfRange { index: usize, value: f32 },
}

/// A knot of a piecewise-linear function: a scalar value and `N` outputs in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint<const N: usize> {
    pub scalar: f32,
    pub outputs: [f32; N],
}

impl<const N: usize> ControlPoint<N> {
    pub const fn new(scalar: f32, outputs: [f32; N]) -> Self {
        Self { scalar, outputs }
    }
}

// serde only implements arrays up to fixed lengths, so go through a slice.
impl<const N: usize> Serialize for ControlPoint<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ControlPoint", 2)?;
        state.serialize_field("scalar", &self.scalar)?;
        state.serialize_field("outputs", &self.outputs[..])?;
        state.end()
    }
}

/// Ordered control points evaluated by piecewise-linear interpolation.
///
/// Queries below the first knot or above the last one clamp to that knot's
/// outputs. Each output channel is interpolated independently.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransferFunction<const N: usize> {
    points: Vec<ControlPoint<N>>,
}

/// Maps scalar values to RGB.
pub type ColorTransferFunction = TransferFunction<3>;

/// Maps scalar values (or gradient magnitudes) to a single opacity.
pub type PiecewiseFunction = TransferFunction<1>;

impl<const N: usize> TransferFunction<N> {
    pub fn new(points: Vec<ControlPoint<N>>) -> Result<Self, TransferFunctionError> {
        Self::validate(&points)?;
        Ok(Self { points })
    }

    /// Built-in presets skip validation; their knots are checked by tests.
    pub(crate) fn from_static(points: &[ControlPoint<N>]) -> Self {
        debug_assert!(Self::validate(points).is_ok());
        Self {
            points: points.to_vec(),
        }
    }

    fn validate(points: &[ControlPoint<N>]) -> Result<(), TransferFunctionError> {
        if points.is_empty() {
            return Err(TransferFunctionError::Empty);
        }

        for (index, point) in points.iter().enumerate() {
            if !point.scalar.is_finite() {
                return Err(TransferFunctionError::NonFiniteScalar { index });
            }
            if let Some(&value) = point.outputs.iter().find(|v| !(0.0..=1.0).contains(*v)) {
                return Err(TransferFunctionError::OutputOutOfRange { index, value });
            }
            if index > 0 && point.scalar <= points[index - 1].scalar {
                return Err(TransferFunctionError::NotIncreasing { index });
            }
        }
        Ok(())
    }

    pub fn points(&self) -> &[ControlPoint<N>] {
        &self.points
    }

    pub fn first(&self) -> &ControlPoint<N> {
        &self.points[0]
    }

    pub fn last(&self) -> &ControlPoint<N> {
        &self.points[self.points.len() - 1]
    }

    /// Scalar values of the first and last knots.
    pub fn scalar_range(&self) -> RangeInclusive<f32> {
        self.first().scalar..=self.last().scalar
    }

    /// Evaluate the function at `scalar`.
    ///
    /// NaN is treated as lying below the first knot.
    pub fn sample(&self, scalar: f32) -> [f32; N] {
        let first = self.first();
        let last = self.last();

        if scalar.is_nan() || scalar <= first.scalar {
            return first.outputs;
        }
        if scalar >= last.scalar {
            return last.outputs;
        }

        // first knot strictly above the query; never 0 or len here
        let upper = self.points.partition_point(|p| p.scalar <= scalar);
        let lo = &self.points[upper - 1];
        let hi = &self.points[upper];

        let t = (scalar - lo.scalar) / (hi.scalar - lo.scalar);
        std::array::from_fn(|i| lo.outputs[i] + t * (hi.outputs[i] - lo.outputs[i]))
    }

    /// Sample `len` evenly spaced values across `range`, endpoints included.
    ///
    /// Suitable for uploading as a 1D lookup texture.
    pub fn lookup_table(&self, len: usize, range: RangeInclusive<f32>) -> Vec<[f32; N]> {
        let (start, end) = (*range.start(), *range.end());
        match len {
            0 => Vec::new(),
            1 => vec![self.sample(start)],
            _ => {
                let step = (end - start) / (len - 1) as f32;
                (0..len)
                    .into_par_iter()
                    .map(|i| self.sample(start + step * i as f32))
                    .collect()
            }
        }
    }
}

impl TransferFunction<1> {
    pub fn value_at(&self, scalar: f32) -> f32 {
        self.sample(scalar)[0]
    }
}

pub(crate) const COLOR_POINTS: [ControlPoint<3>; 4] = [
    ControlPoint::new(0.0, [0.0, 0.0, 0.0]),
    ControlPoint::new(500.0, [1.0, 0.5, 0.3]),
    ControlPoint::new(1000.0, [1.0, 0.5, 0.3]),
    ControlPoint::new(1150.0, [1.0, 1.0, 0.9]),
];

pub(crate) const SCALAR_OPACITY_POINTS: [ControlPoint<1>; 4] = [
    ControlPoint::new(0.0, [0.0]),
    ControlPoint::new(500.0, [1.0]),
    ControlPoint::new(1000.0, [0.7]),
    ControlPoint::new(1150.0, [0.03]),
];

pub(crate) const GRADIENT_OPACITY_POINTS: [ControlPoint<1>; 3] = [
    ControlPoint::new(0.0, [0.0]),
    ControlPoint::new(90.0, [0.5]),
    ControlPoint::new(100.0, [1.0]),
];
