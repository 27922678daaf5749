//! Deterministic placement of repeated sub-structures.
//!
//! - [`hex_mesh`]: hexagonal cells packed inside a circular boundary
//! - [`lattice`]: square-grid or linear arrangements of identical elements
pub mod hex_mesh;
pub mod lattice;

pub use hex_mesh::HexMeshTiler;
pub use lattice::{
    perfect_square_root, Arrangement, ElementIndex, LatticeDescriptor, RepeatedElementPlacer,
};
