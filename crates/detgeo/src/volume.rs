//! Hierarchical volume tree produced by a recipe's `construct()`.
//!
//! Nodes are plain values: a name, a [`Solid`], an opaque material tag, the
//! placement relative to the parent and a copy number. Sibling volumes are
//! assumed not to overlap; nothing here checks it.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec3;

use crate::shape::Solid;
use crate::transform::Transform;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeNode {
    pub name: String,
    pub solid: Solid,
    pub material: String,
    pub placement: Transform,
    pub copy_number: u32,
    pub children: Vec<VolumeNode>,
}

impl VolumeNode {
    pub fn new(name: impl Into<String>, solid: impl Into<Solid>, material: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid: solid.into(),
            material: material.into(),
            placement: Transform::IDENTITY,
            copy_number: 0,
            children: Vec::new(),
        }
    }

    pub fn placed(mut self, placement: Transform) -> Self {
        self.placement = placement;
        self
    }

    pub fn at(self, translation: DVec3) -> Self {
        self.placed(Transform::from_translation(translation))
    }

    pub fn copy(mut self, copy_number: u32) -> Self {
        self.copy_number = copy_number;
        self
    }

    pub fn with_child(mut self, child: VolumeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = VolumeNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push_child(&mut self, child: VolumeNode) {
        self.children.push(child);
    }
}

/// Descriptor handed to an external hit-collection sink.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SensitiveDetector {
    /// Detector path, e.g. `/PMT_R7378A/Pmt`.
    pub name: String,
    /// Name of the volume the detector is attached to.
    pub volume: String,
    /// How many levels above the sensitive volume identify a hit.
    pub depth: u32,
    /// Time-bin width for hit histories, if binned.
    pub time_binning: Option<f64>,
}

/// A visited node together with its depth and world transform.
#[derive(Clone, Copy, Debug)]
pub struct VisitedNode<'a> {
    pub node: &'a VolumeNode,
    pub depth: usize,
    pub world: Transform,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeTree {
    pub root: VolumeNode,
    pub sensitive_detectors: Vec<SensitiveDetector>,
}

impl VolumeTree {
    pub fn new(root: VolumeNode) -> Self {
        Self {
            root,
            sensitive_detectors: Vec::new(),
        }
    }

    pub fn with_sensitive_detectors(
        mut self,
        detectors: impl IntoIterator<Item = SensitiveDetector>,
    ) -> Self {
        self.sensitive_detectors.extend(detectors);
        self
    }

    /// Depth-first, pre-order walk. Children are visited in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = VisitedNode<'_>> {
        let mut stack = vec![VisitedNode {
            node: &self.root,
            depth: 0,
            world: self.root.placement,
        }];
        std::iter::from_fn(move || {
            let visited = stack.pop()?;
            for child in visited.node.children.iter().rev() {
                stack.push(VisitedNode {
                    node: child,
                    depth: visited.depth + 1,
                    world: visited.world.then(&child.placement),
                });
            }
            Some(visited)
        })
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// First node with the given name in depth-first order.
    pub fn find(&self, name: &str) -> Option<&VolumeNode> {
        self.iter().map(|v| v.node).find(|n| n.name == name)
    }

    /// World transforms of every placed copy named `name`.
    pub fn placements_of(&self, name: &str) -> Vec<Transform> {
        self.iter()
            .filter(|v| v.node.name == name)
            .map(|v| v.world)
            .collect()
    }

    /// Whether a world-frame point lies inside any placed copy of `name`.
    pub fn point_in(&self, name: &str, p: DVec3) -> bool {
        self.iter()
            .filter(|v| v.node.name == name)
            .any(|v| v.node.solid.contains(v.world.inverse_transform_point(p)))
    }
}
