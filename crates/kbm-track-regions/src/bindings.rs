use std::collections::HashMap;

use nalgebra::Point2;

use crate::{KeyMap, RegionGrid, RegionId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("key map label {label:?} (key {key}) is not a region label")]
    InvalidLabel { label: String, key: String },
    #[error("key map label {label:?} (key {key}) has no region in the template")]
    NoSuchRegion { label: String, key: String },
}

/// Key codes attached to concrete grid cells.
///
/// Every label of the key map must name an existing cell; the first one that
/// does not is reported and nothing is bound.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyBindings {
    by_region: HashMap<RegionId, String>,
}

impl KeyBindings {
    pub fn bind(keymap: &KeyMap, grid: &RegionGrid) -> Result<Self, BindingError> {
        let mut entries: Vec<(&str, &str)> = keymap.iter().collect();
        // Deterministic error reporting regardless of hash order.
        entries.sort_unstable();

        let mut by_region = HashMap::with_capacity(entries.len());
        for (label, key) in entries {
            let Some(id) = RegionId::parse_label(label) else {
                return Err(BindingError::InvalidLabel {
                    label: label.to_string(),
                    key: key.to_string(),
                });
            };
            if grid.get(id).is_none() {
                return Err(BindingError::NoSuchRegion {
                    label: label.to_string(),
                    key: key.to_string(),
                });
            }
            by_region.insert(id, key.to_string());
        }
        log::debug!("{} of {} regions bound to keys", by_region.len(), grid.len());
        Ok(Self { by_region })
    }

    pub fn key_for(&self, id: RegionId) -> Option<&str> {
        self.by_region.get(&id).map(String::as_str)
    }

    /// Key under a point given in template pixels.
    pub fn key_at(&self, grid: &RegionGrid, p: Point2<f32>) -> Option<&str> {
        grid.region_at(p).and_then(|id| self.key_for(id))
    }

    pub fn len(&self) -> usize {
        self.by_region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_region.is_empty()
    }
}
