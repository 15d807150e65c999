use std::fmt;
use std::str::FromStr;

use imageproc::point::Point;
use imageproc::rect::Rect;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Number of key rows on the template.
pub const ROW_COUNT: usize = 5;

const ROW_LETTERS: [char; ROW_COUNT] = ['A', 'B', 'C', 'D', 'E'];

/// Axis-aligned integer rectangle in template pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Smallest box holding every point, inclusive of both extremes.
    pub fn enclosing(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn contains(&self, p: Point2<f32>) -> bool {
        let (x, y) = (self.x as f32, self.y as f32);
        p.x >= x && p.y >= y && p.x < x + self.width as f32 && p.y < y + self.height as f32
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            self.x as f32 + self.width as f32 * 0.5,
            self.y as f32 + self.height as f32 * 0.5,
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::at(self.x as i32, self.y as i32).of_size(self.width.max(1), self.height.max(1))
    }
}

/// `(row, column)` of a region; both zero-based.
///
/// Labelled `A1`..: row letter `A`–`E` followed by the one-based column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct RegionId {
    pub row: usize,
    pub col: usize,
}

impl RegionId {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// `None` if `row` is outside the grid.
    pub fn label(&self) -> Option<String> {
        ROW_LETTERS
            .get(self.row)
            .map(|letter| format!("{letter}{}", self.col + 1))
    }

    /// Inverse of [`label`](Self::label). Strict: upper-case row letter,
    /// column without leading zeros.
    pub fn parse_label(label: &str) -> Option<Self> {
        let mut chars = label.chars();
        let letter = chars.next()?;
        let row = ROW_LETTERS.iter().position(|&l| l == letter)?;
        let digits = chars.as_str();
        if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let col: usize = digits.parse().ok()?;
        Some(Self::new(row, col - 1))
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(&label),
            None => write!(f, "({}, {})", self.row, self.col),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid region label {0:?}")]
pub struct ParseRegionIdError(pub String);

impl FromStr for RegionId {
    type Err = ParseRegionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s).ok_or_else(|| ParseRegionIdError(s.to_string()))
    }
}

/// Evenly spaced row bands over the template height.
///
/// Row `i` is centred at `pad/2 + i·row_height` where
/// `row_height = ⌊(H − pad) / 5⌋` and `pad = pad_frac·H`; a region belongs to
/// a row when its top edge lies within `⌊row_height / 2⌋` of that centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowLayout {
    pub pad: f64,
    pub row_height: f64,
    pub radius: f64,
}

impl RowLayout {
    pub fn new(template_height: u32, pad_frac: f64) -> Self {
        let h = template_height as f64;
        let pad = pad_frac * h;
        let row_height = ((h - pad) / ROW_COUNT as f64).floor();
        Self {
            pad,
            row_height,
            radius: (row_height / 2.0).floor(),
        }
    }

    pub fn row_center(&self, row: usize) -> f64 {
        (self.pad / 2.0).floor() + self.row_height * row as f64
    }

    /// First row whose band contains `top`.
    pub fn row_of(&self, top: u32) -> Option<usize> {
        let y = top as f64;
        (0..ROW_COUNT).find(|&row| {
            let c = self.row_center(row);
            c - self.radius <= y && y <= c + self.radius
        })
    }
}

/// Button regions of the template, five rows ordered left to right.
///
/// Built once from the static template and never modified afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegionGrid {
    rows: [Vec<BoundingBox>; ROW_COUNT],
}

impl RegionGrid {
    /// Bucket `boxes` into rows; boxes outside every band are dropped.
    pub fn assign_rows(boxes: impl IntoIterator<Item = BoundingBox>, layout: &RowLayout) -> Self {
        let mut rows: [Vec<BoundingBox>; ROW_COUNT] = Default::default();
        let mut dropped = 0usize;
        for bbox in boxes {
            match layout.row_of(bbox.y) {
                Some(row) => rows[row].push(bbox),
                None => dropped += 1,
            }
        }
        for row in &mut rows {
            row.sort_by_key(|b| b.x);
        }
        if dropped > 0 {
            log::debug!("{dropped} regions outside every row band dropped");
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<BoundingBox>; ROW_COUNT] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[BoundingBox]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn get(&self, id: RegionId) -> Option<&BoundingBox> {
        self.rows.get(id.row)?.get(id.col)
    }

    /// First region containing `p`, scanning rows top to bottom and columns
    /// left to right.
    pub fn region_at(&self, p: Point2<f32>) -> Option<RegionId> {
        self.iter()
            .find(|(_, bbox)| bbox.contains(p))
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &BoundingBox)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, boxes)| {
            boxes
                .iter()
                .enumerate()
                .map(move |(col, bbox)| (RegionId::new(row, col), bbox))
        })
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
