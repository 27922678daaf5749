//! Square-grid or linear placement of identical elements (fiber bundles,
//! sensor rows) and the matching index-based selection.
use glam::{DVec2, DVec3};
use rand::RngCore;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sampling::uniform_index;
use crate::transform::Transform;

/// Integer square root of `n` when `n` is a perfect square.
///
/// Placement and sampling both go through this function so they always agree
/// on the arrangement kind.
pub fn perfect_square_root(n: u32) -> Option<u32> {
    let root = n.isqrt();
    (root * root == n).then_some(root)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arrangement {
    /// `side x side` grid in the XY plane.
    Square { side: u32 },
    /// A single row along Y.
    Linear,
}

impl Arrangement {
    pub fn for_count(count: u32) -> Self {
        match perfect_square_root(count) {
            Some(side) => Arrangement::Square { side },
            None => Arrangement::Linear,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeDescriptor {
    pub count: u32,
    pub pitch: f64,
    pub arrangement: Arrangement,
}

/// Position of one element inside the lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementIndex {
    Grid { i: u32, j: u32 },
    Line(u32),
}

/// Places `count` identical elements of radius `element_radius` separated by
/// `gap`.
///
/// A perfect-square count gives a centered square grid, any other count a
/// centered line along Y shifted by half the line margin. The optional offset
/// translates every element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepeatedElementPlacer {
    descriptor: LatticeDescriptor,
    element_radius: f64,
    gap: f64,
    line_margin: f64,
    offset: DVec3,
}

impl RepeatedElementPlacer {
    pub fn new(count: u32, element_radius: f64, gap: f64) -> Result<Self> {
        if count == 0 {
            return Err(Error::invalid_config("element count", count, ">= 1"));
        }
        if !element_radius.is_finite() || element_radius <= 0.0 {
            return Err(Error::degenerate(
                "element lattice",
                "element_radius",
                element_radius,
                "finite and > 0",
            ));
        }
        if !gap.is_finite() || gap < 0.0 {
            return Err(Error::degenerate(
                "element lattice",
                "gap",
                gap,
                "finite and >= 0",
            ));
        }
        Ok(Self {
            descriptor: LatticeDescriptor {
                count,
                pitch: 2.0 * element_radius + gap,
                arrangement: Arrangement::for_count(count),
            },
            element_radius,
            gap,
            line_margin: 0.0,
            offset: DVec3::ZERO,
        })
    }

    /// Extra room added along a linear arrangement; the row is shifted by half of it.
    pub fn with_line_margin(mut self, margin: f64) -> Self {
        self.line_margin = margin;
        self
    }

    pub fn with_offset(mut self, offset: DVec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn descriptor(&self) -> LatticeDescriptor {
        self.descriptor
    }

    pub fn count(&self) -> u32 {
        self.descriptor.count
    }

    pub fn pitch(&self) -> f64 {
        self.descriptor.pitch
    }

    pub fn arrangement(&self) -> Arrangement {
        self.descriptor.arrangement
    }

    pub fn element_radius(&self) -> f64 {
        self.element_radius
    }

    pub fn line_margin(&self) -> f64 {
        self.line_margin
    }

    pub fn offset(&self) -> DVec3 {
        self.offset
    }

    /// Full XY footprint of the arrangement, elements included.
    pub fn footprint(&self) -> DVec2 {
        let pitch = self.pitch();
        match self.arrangement() {
            Arrangement::Square { side } => {
                let edge = side as f64 * pitch - self.gap;
                DVec2::splat(edge)
            }
            Arrangement::Linear => DVec2::new(
                2.0 * self.element_radius,
                self.count() as f64 * pitch - self.gap + self.line_margin,
            ),
        }
    }

    fn centered(&self, i: u32, n: u32) -> f64 {
        ((n as f64 - 1.0) * 0.5 - i as f64) * self.pitch()
    }

    /// Transform of the element at `index`.
    pub fn placement_at(&self, index: ElementIndex) -> Result<Transform> {
        let local = match (self.arrangement(), index) {
            (Arrangement::Square { side }, ElementIndex::Grid { i, j }) if i < side && j < side => {
                DVec3::new(self.centered(i, side), self.centered(j, side), 0.0)
            }
            (Arrangement::Linear, ElementIndex::Line(i)) if i < self.count() => DVec3::new(
                0.0,
                self.centered(i, self.count()) + 0.5 * self.line_margin,
                0.0,
            ),
            _ => {
                return Err(Error::invalid_config(
                    "element index",
                    format!("{index:?}"),
                    format!("an index of the {:?} lattice", self.arrangement()),
                ))
            }
        };
        Ok(Transform::from_translation(local + self.offset))
    }

    /// Every element index in copy-number order.
    pub fn indices(&self) -> Vec<ElementIndex> {
        match self.arrangement() {
            Arrangement::Square { side } => (0..side)
                .flat_map(|i| (0..side).map(move |j| ElementIndex::Grid { i, j }))
                .collect(),
            Arrangement::Linear => (0..self.count()).map(ElementIndex::Line).collect(),
        }
    }

    /// All placements, paired with their index, in copy-number order.
    pub fn placements(&self) -> Vec<(ElementIndex, Transform)> {
        let out: Vec<_> = self
            .indices()
            .into_iter()
            .filter_map(|idx| self.placement_at(idx).ok().map(|t| (idx, t)))
            .collect();
        debug!(
            "Placed {} elements ({:?}, pitch {}).",
            out.len(),
            self.arrangement(),
            self.pitch()
        );
        out
    }

    /// Draw a uniformly distributed element index.
    pub fn sample_index(&self, rng: &mut dyn RngCore) -> ElementIndex {
        match self.arrangement() {
            Arrangement::Square { side } => {
                let i = uniform_index(rng, side as u64) as u32;
                let j = uniform_index(rng, side as u64) as u32;
                ElementIndex::Grid { i, j }
            }
            Arrangement::Linear => ElementIndex::Line(uniform_index(rng, self.count() as u64) as u32),
        }
    }

    /// Draw an element uniformly and return its placement.
    pub fn sample_placement(&self, rng: &mut dyn RngCore) -> Result<Transform> {
        let index = self.sample_index(rng);
        self.placement_at(index)
    }
}
