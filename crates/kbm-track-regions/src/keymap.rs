use std::collections::HashMap;
use std::path::{Path, PathBuf};

const KEY_COLUMN: &str = "key";
const BUTTON_COLUMN: &str = "button";

#[derive(thiserror::Error, Debug)]
pub enum KeyMapError {
    #[error("failed to read key map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("key map has no {0:?} column")]
    MissingColumn(&'static str),
    #[error("key map is empty")]
    EmptyTable,
}

/// Split one CSV record. Fields may be double-quoted; `""` inside quotes is a
/// literal quote. Returns `None` for an unterminated quote.
fn split_record(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => quoted = false,
            ('"', false) if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    if quoted {
        return None;
    }
    fields.push(field);
    Some(fields)
}

/// Button label → logical key code table.
///
/// Loaded from a CSV with a `key` column (the key code) and a `button` column
/// holding one or more comma-separated region labels, e.g.
///
/// ```text
/// key,button
/// KeyQ,"A1, Alt1"
/// ShiftLeft,D1
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyMap {
    by_label: HashMap<String, String>,
}

impl KeyMap {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeyMapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| KeyMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::parse(&text)?;
        log::debug!("key map {}: {} labels", path.display(), map.len());
        Ok(map)
    }

    /// Parse CSV text. Rows without a key code or label are skipped with a
    /// warning; a missing header column is an error.
    pub fn parse(text: &str) -> Result<Self, KeyMapError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());
        let (_, header) = lines.next().ok_or(KeyMapError::EmptyTable)?;
        let header = split_record(header).ok_or(KeyMapError::EmptyTable)?;
        let column = |name: &'static str| {
            header
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
                .ok_or(KeyMapError::MissingColumn(name))
        };
        let key_col = column(KEY_COLUMN)?;
        let button_col = column(BUTTON_COLUMN)?;

        let mut by_label = HashMap::new();
        for (i, line) in lines {
            let line_no = i + 1;
            let Some(fields) = split_record(line) else {
                log::warn!("key map line {line_no}: unterminated quote, skipped");
                continue;
            };
            let (Some(key), Some(buttons)) = (fields.get(key_col), fields.get(button_col)) else {
                log::warn!("key map line {line_no}: expected {} fields, skipped", header.len());
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                log::warn!("key map line {line_no}: empty key code, skipped");
                continue;
            }
            for label in buttons.split(',').map(str::trim).filter(|l| !l.is_empty()) {
                if let Some(previous) = by_label.insert(label.to_string(), key.to_string()) {
                    log::warn!("key map line {line_no}: {label} remapped from {previous} to {key}");
                }
            }
        }
        Ok(Self { by_label })
    }

    /// Key code bound to `label`, `None` if the label is unmapped.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.by_label.get(label).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_label.iter().map(|(l, k)| (l.as_str(), k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

impl FromIterator<(String, String)> for KeyMap {
    /// Build from `(label, key code)` pairs.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            by_label: iter.into_iter().collect(),
        }
    }
}
