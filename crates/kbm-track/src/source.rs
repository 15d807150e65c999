use std::collections::VecDeque;
use std::path::PathBuf;

use image::RgbImage;
use kbm_track_calib::FrameSource;

/// Frames read from image files, in order.
///
/// Unreadable files are skipped with a warning; `None` means the list is
/// exhausted.
#[derive(Clone, Debug, Default)]
pub struct ImageFileSource {
    pending: VecDeque<PathBuf>,
}

impl ImageFileSource {
    pub fn new<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            pending: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        while let Some(path) = self.pending.pop_front() {
            match image::open(&path) {
                Ok(img) => return Some(img.to_rgb8()),
                Err(err) => log::warn!("skipping frame {}: {err}", path.display()),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("frame.png");
        RgbImage::new(6, 4).save(&good).expect("write frame");
        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not a png").expect("write garbage");

        let mut source = ImageFileSource::new([garbage, dir.path().join("missing.png"), good]);
        assert_eq!(source.next_frame().map(|f| f.dimensions()), Some((6, 4)));
        assert!(source.next_frame().is_none());
        assert_eq!(source.remaining(), 0);
    }
}
