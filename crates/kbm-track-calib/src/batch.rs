use image::RgbImage;

/// Supplier of camera frames.
///
/// `None` means "no frame this cycle"; it is not an error and callers simply
/// try again later.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<RgbImage>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> Option<RgbImage>,
{
    fn next_frame(&mut self) -> Option<RgbImage> {
        self()
    }
}

/// Collects frames for one multi-frame calibration attempt.
///
/// Feed it one frame per cycle; once `target` frames have arrived the batch
/// is handed out and collection starts over.
#[derive(Clone, Debug)]
pub struct FrameBatch {
    target: usize,
    frames: Vec<RgbImage>,
}

impl FrameBatch {
    /// Batch of `target` frames (at least one).
    pub fn new(target: usize) -> Self {
        let target = target.max(1);
        Self {
            target,
            frames: Vec::with_capacity(target),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop everything collected so far.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Add a frame. Returns the full batch once `target` frames are in.
    pub fn push(&mut self, frame: Option<RgbImage>) -> Option<Vec<RgbImage>> {
        let frame = frame?;
        self.frames.push(frame);
        if self.frames.len() < self.target {
            log::debug!("collected {}/{} calibration frames", self.frames.len(), self.target);
            return None;
        }
        Some(std::mem::replace(
            &mut self.frames,
            Vec::with_capacity(self.target),
        ))
    }

    /// Pull one frame from `source`, see [`push`](Self::push).
    pub fn poll<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> Option<Vec<RgbImage>> {
        self.push(source.next_frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_is_released_when_full() {
        let mut batch = FrameBatch::new(3);
        let mut n = 0u32;
        let mut source = || {
            n += 1;
            // Every other cycle has no frame.
            (n % 2 == 1).then(|| RgbImage::new(4, 4))
        };

        let mut released = None;
        for _ in 0..5 {
            assert!(released.is_none());
            released = batch.poll(&mut source);
        }
        assert_eq!(released.map(|b| b.len()), Some(3));
        assert!(batch.is_empty());
    }

    #[test]
    fn zero_target_means_one() {
        let mut batch = FrameBatch::new(0);
        assert_eq!(batch.target(), 1);
        assert!(batch.push(None).is_none());
        assert_eq!(batch.push(Some(RgbImage::new(1, 1))).map(|b| b.len()), Some(1));
    }
}
