//! Plain dice board: a teflon board with a wavelength-shifting top coating,
//! wrapped in a thin liquid-xenon envelope. No sensors are mounted on it.
use glam::{DVec2, DVec3};

use crate::error::{Error, Result};
use crate::shape::BoxShape;
use crate::units::{CM, MM, UM};
use crate::volume::VolumeNode;

const BOARD_THICKNESS: f64 = 0.3 * MM;
const COATING_THICKNESS: f64 = 0.1 * UM;
const BORDER: f64 = 0.5 * MM;

/// Board footprint in the XY plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlainDice {
    size: DVec2,
}

impl Default for PlainDice {
    fn default() -> Self {
        Self {
            size: DVec2::splat(5.0 * CM),
        }
    }
}

impl PlainDice {
    pub fn new(size: DVec2) -> Result<Self> {
        if !(size.is_finite() && size.min_element() > 0.0) {
            return Err(Error::invalid_config(
                "plain_dice.size",
                format!("({}, {}) mm", size.x / MM, size.y / MM),
                "two positive lengths",
            ));
        }
        Ok(Self { size })
    }

    /// Full extent of the xenon envelope.
    pub fn dimensions(&self) -> DVec3 {
        self.size.extend(BOARD_THICKNESS + 2.0 * BORDER)
    }

    /// Builds the envelope with the board resting on its lower face and the
    /// coating on the board's upper face.
    pub fn build(&self) -> Result<VolumeNode> {
        let half = 0.5 * self.dimensions();

        let coating = VolumeNode::new(
            "DB_WLS_COATING",
            BoxShape::new(half.x, half.y, 0.5 * COATING_THICKNESS)?,
            "TPB",
        )
        .at(DVec3::new(0.0, 0.0, 0.5 * (BOARD_THICKNESS - COATING_THICKNESS)));

        let board = VolumeNode::new(
            "DICE_BOARD",
            BoxShape::new(half.x, half.y, 0.5 * BOARD_THICKNESS)?,
            "G4_TEFLON",
        )
        .at(DVec3::new(0.0, 0.0, -BORDER))
        .with_child(coating);

        Ok(VolumeNode::new("LXE_DICE", BoxShape::new(half.x, half.y, half.z)?, "G4_lXe")
            .with_child(board))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeTree;

    #[test]
    fn envelope_wraps_the_board_with_a_border() {
        let dice = PlainDice::default();
        assert_eq!(dice.dimensions(), DVec3::new(50.0, 50.0, 1.3));

        let tree = VolumeTree::new(dice.build().unwrap());
        assert_eq!(tree.node_count(), 3);
        // Board bottom is flush with the envelope, the top leaves a 1 mm gap.
        assert!(tree.point_in("DICE_BOARD", DVec3::new(24.0, -24.0, -0.64)));
        assert!(!tree.point_in("DICE_BOARD", DVec3::new(0.0, 0.0, -0.3)));
        assert!(tree.point_in("LXE_DICE", DVec3::new(0.0, 0.0, 0.6)));
    }

    #[test]
    fn coating_covers_the_top_of_the_board() {
        let tree = VolumeTree::new(PlainDice::default().build().unwrap());
        let coating = tree.placements_of("DB_WLS_COATING");
        assert_eq!(coating.len(), 1);
        let top = coating[0].translation.z + 0.5 * COATING_THICKNESS;
        assert!((top - (-BORDER + 0.5 * BOARD_THICKNESS)).abs() < 1e-12);
        assert_eq!(tree.find("DB_WLS_COATING").map(|n| n.material.as_str()), Some("TPB"));
    }

    #[test]
    fn footprint_follows_the_requested_size() {
        let dice = PlainDice::new(DVec2::new(30.0 * MM, 62.0 * MM)).unwrap();
        let Some(board) = dice.build().unwrap().children.into_iter().next() else {
            panic!("envelope has no board");
        };
        assert!(board.solid.contains(DVec3::new(14.9, 30.9, 0.0)));
        assert!(!board.solid.contains(DVec3::new(15.1, 0.0, 0.0)));

        assert!(PlainDice::new(DVec2::new(0.0, 10.0)).is_err());
        assert!(PlainDice::new(DVec2::new(f64::NAN, 10.0)).is_err());
    }
}
