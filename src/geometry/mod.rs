//! # geometry
//!
//! Geometric operations for scene conversion.

/// Camera models.
pub mod camera;
/// Geometric algorithms for polytopes.
pub mod polytope;
/// Special Euclidean Group 3.
pub mod se3;
/// Special Orthogonal Group 3.
pub mod so3;
