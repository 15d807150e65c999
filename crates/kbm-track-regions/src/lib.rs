//! Static side of keyboard/mouse-pad tracking: the template image, its
//! button regions and the key codes bound to them.
//!
//! Everything here is computed once at startup from the template asset and
//! the key-map table; nothing depends on live frames.
//!
//! ```no_run
//! use kbm_track_regions::{CropBounds, KeyBindings, KeyMap, RegionExtractor, TemplateModel};
//!
//! let template = TemplateModel::load("Resources/kbm_template.jpg", CropBounds::default())?;
//! let grid = RegionExtractor::default().extract(&template);
//! let keymap = KeyMap::load("Resources/keyMappings.csv")?;
//! let bindings = KeyBindings::bind(&keymap, &grid)?;
//! println!("{} regions, {} bound", grid.len(), bindings.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bindings;
mod extract;
mod grid;
mod keymap;
mod params;
mod template;

pub use bindings::{BindingError, KeyBindings};
pub use extract::{draw_region_overlay, RegionExtractor, ROW_COLORS};
pub use grid::{BoundingBox, ParseRegionIdError, RegionGrid, RegionId, RowLayout, ROW_COUNT};
pub use keymap::{KeyMap, KeyMapError};
pub use params::{CropBounds, RegionParams};
pub use template::{TemplateError, TemplateModel};
