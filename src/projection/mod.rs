//! Spatial references and reprojection between them

pub mod reference;
pub mod registry;
pub mod reproject;

pub use reference::{FullExtent, Projection, SpatialReference, SpatialReferenceOptions};
pub use registry::reference_for;
pub use reproject::Reprojector;
