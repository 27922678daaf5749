//! Hexagonal mesh tiling of a disk.
use glam::DVec2;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sampling::hex_prism_sampler::hex_corner;

/// Axial neighbour steps, in the order a ring is walked.
const AXIAL_STEPS: [(i64, i64); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

const BOUNDARY_EPS: f64 = 1e-9;

/// Enumerates centers of pointy-top hexagonal cells that fit entirely inside a
/// circle of radius `boundary_radius`.
///
/// Cells sit on the lattice spanned by `(w, 0)` and `(w/2, w*sqrt(3)/2)` with
/// `w = sqrt(3) * circumradius`, so neighbouring cells share an edge. Rings
/// are visited outward from the origin and the walk stops at the first ring
/// that contributes no cell: every cell of ring `k + 1` is at least as far
/// from the origin as the nearest cell of ring `k`'s hull, so an empty ring
/// cannot be followed by a non-empty one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexMeshTiler {
    boundary_radius: f64,
    circumradius: f64,
}

impl HexMeshTiler {
    pub fn new(boundary_radius: f64, circumradius: f64) -> Result<Self> {
        if !boundary_radius.is_finite() || boundary_radius <= 0.0 {
            return Err(Error::degenerate(
                "hexagonal mesh",
                "boundary_radius",
                boundary_radius,
                "finite and > 0",
            ));
        }
        if !circumradius.is_finite() || circumradius <= 0.0 {
            return Err(Error::degenerate(
                "hexagonal mesh",
                "circumradius",
                circumradius,
                "finite and > 0",
            ));
        }
        Ok(Self {
            boundary_radius,
            circumradius,
        })
    }

    pub fn boundary_radius(&self) -> f64 {
        self.boundary_radius
    }

    pub fn circumradius(&self) -> f64 {
        self.circumradius
    }

    /// Center-to-center distance between neighbouring cells.
    pub fn pitch(&self) -> f64 {
        3f64.sqrt() * self.circumradius
    }

    /// Distance from the origin to the farthest corner of a cell centered at `center`.
    pub fn farthest_vertex_distance(&self, center: DVec2) -> f64 {
        (0..6)
            .map(|k| (center + hex_corner(self.circumradius, k)).length())
            .fold(0.0, f64::max)
    }

    fn accepts(&self, center: DVec2) -> bool {
        self.farthest_vertex_distance(center) <= self.boundary_radius + BOUNDARY_EPS
    }

    fn axial_to_point(&self, q: i64, r: i64) -> DVec2 {
        let w = self.pitch();
        let a = DVec2::new(w, 0.0);
        let b = DVec2::new(0.5 * w, 0.5 * 3f64.sqrt() * w);
        a * q as f64 + b * r as f64
    }

    /// Accepted cell centers, ring by ring, in a fixed walk order.
    ///
    /// A circumradius at or above the boundary radius yields an empty tiling.
    pub fn centers(&self) -> Vec<DVec2> {
        let mut centers = Vec::new();
        if self.circumradius >= self.boundary_radius {
            debug!(
                "Hex cell circumradius {} does not fit boundary {}; empty mesh.",
                self.circumradius, self.boundary_radius
            );
            return centers;
        }

        let origin = DVec2::ZERO;
        if !self.accepts(origin) {
            return centers;
        }
        centers.push(origin);

        let mut ring = 1i64;
        loop {
            let before = centers.len();
            let (dq, dr) = AXIAL_STEPS[4];
            let (mut q, mut r) = (dq * ring, dr * ring);
            for &(sq, sr) in AXIAL_STEPS.iter() {
                for _ in 0..ring {
                    let p = self.axial_to_point(q, r);
                    if self.accepts(p) {
                        centers.push(p);
                    }
                    q += sq;
                    r += sr;
                }
            }
            if centers.len() == before {
                break;
            }
            ring += 1;
        }

        debug!(
            "Tiled {} hex cells (rings: {}) inside radius {}.",
            centers.len(),
            ring,
            self.boundary_radius
        );
        centers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiling_of_radius_ten_with_unit_cells() {
        let tiler = HexMeshTiler::new(10.0, 1.0).unwrap();
        let centers = tiler.centers();
        assert!(!centers.is_empty());
        assert_eq!(centers[0], DVec2::ZERO);
        for c in &centers {
            assert!(tiler.farthest_vertex_distance(*c) <= 10.0 + 1e-9);
        }
        // Reproducible including order.
        assert_eq!(centers, tiler.centers());
    }

    #[test]
    fn cells_do_not_overlap() {
        let tiler = HexMeshTiler::new(10.0, 1.0).unwrap();
        let centers = tiler.centers();
        let min_dist = tiler.pitch() - 1e-9;
        for (i, a) in centers.iter().enumerate() {
            for b in &centers[i + 1..] {
                assert!(a.distance(*b) >= min_dist);
            }
        }
    }

    #[test]
    fn tiling_is_maximal_on_the_lattice() {
        // Brute-force every lattice site in a generous window and compare.
        let tiler = HexMeshTiler::new(10.0, 1.0).unwrap();
        let mut brute = 0usize;
        for q in -20i64..=20 {
            for r in -20i64..=20 {
                if tiler.accepts(tiler.axial_to_point(q, r)) {
                    brute += 1;
                }
            }
        }
        assert_eq!(tiler.centers().len(), brute);
    }

    #[test]
    fn single_cell_when_only_the_center_fits() {
        let tiler = HexMeshTiler::new(1.5, 1.0).unwrap();
        assert_eq!(tiler.centers(), vec![DVec2::ZERO]);
    }

    #[test]
    fn oversized_cell_gives_empty_tiling() {
        assert!(HexMeshTiler::new(1.0, 1.0).unwrap().centers().is_empty());
        assert!(HexMeshTiler::new(1.0, 2.0).unwrap().centers().is_empty());
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert!(matches!(
            HexMeshTiler::new(0.0, 1.0),
            Err(Error::DegenerateShape {
                dimension: "boundary_radius",
                ..
            })
        ));
        assert!(HexMeshTiler::new(10.0, -1.0).is_err());
        assert!(HexMeshTiler::new(f64::INFINITY, 1.0).is_err());
    }
}
