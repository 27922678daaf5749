//! Built-in detector recipes.
//!
//! Each recipe owns a validated `*Config` record, a closed table of region
//! tags and the samplers it needs to answer them. Configuration happens once,
//! construction happens once, and vertex generation is read-only afterwards.
use tracing::info;

use crate::volume::VolumeTree;

pub mod black_box;
pub mod fiber_absorption;
pub mod fiber_efficiency;
pub mod optical_fibre;
pub mod plain_dice;
pub mod pmt_calib;
pub mod pmt_r7378a;
pub mod xe_box;

pub use black_box::{BlackBox, BlackBoxConfig};
pub use fiber_absorption::{FiberAbsorption, FiberAbsorptionConfig};
pub use fiber_efficiency::{FiberEfficiency, FiberEfficiencyConfig};
pub use optical_fibre::{FiberShape, OpticalFibre, OpticalFibreConfig};
pub use plain_dice::PlainDice;
pub use pmt_calib::PmtCalib;
pub use xe_box::{XeBox, XeBoxConfig};

fn log_constructed(recipe: &str, tree: &VolumeTree) {
    info!(
        "Constructed '{}' with {} volumes and {} sensitive detector(s).",
        recipe,
        tree.node_count(),
        tree.sensitive_detectors.len()
    );
}
