//! Distance and travel time matrices.

mod matrix;

pub use matrix::DistanceMatrix;
