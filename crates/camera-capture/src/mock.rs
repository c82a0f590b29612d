//! Scripted frame source for tests and dry runs

use std::collections::VecDeque;

use crate::{CameraError, FrameSource, VideoFrame};

/// Plays back a fixed script of frames and acquisition failures.
///
/// `None` entries in the script are delivered as read failures. Once the
/// script runs out every read fails with [`CameraError::Exhausted`].
pub struct ScriptedSource {
    script: VecDeque<Option<VideoFrame>>,
    reads: usize,
    release_count: usize,
}

impl ScriptedSource {
    /// Create a source from an explicit script
    pub fn new(script: impl IntoIterator<Item = Option<VideoFrame>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            reads: 0,
            release_count: 0,
        }
    }

    /// Create a source that only delivers frames
    pub fn from_frames(frames: impl IntoIterator<Item = VideoFrame>) -> Self {
        Self::new(frames.into_iter().map(Some))
    }

    /// Append a frame to the end of the script
    pub fn push_frame(&mut self, frame: VideoFrame) {
        self.script.push_back(Some(frame));
    }

    /// Append a read failure to the end of the script
    pub fn push_failure(&mut self) {
        self.script.push_back(None);
    }

    /// Entries left in the script
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Number of reads attempted so far
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of times release was called
    pub fn release_count(&self) -> usize {
        self.release_count
    }
}

impl FrameSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn read_frame(&mut self) -> Result<VideoFrame, CameraError> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Some(mut frame)) => {
                frame.sequence = self.reads as u32 - 1;
                Ok(frame)
            }
            Some(None) => Err(CameraError::Read("scripted failure".to_string())),
            None => Err(CameraError::Exhausted),
        }
    }

    fn release(&mut self) {
        self.release_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_order() {
        let mut source = ScriptedSource::new(vec![
            Some(VideoFrame::solid(2, 2, [0, 0, 0])),
            None,
            Some(VideoFrame::solid(3, 3, [0, 0, 0])),
        ]);

        assert_eq!(source.read_frame().unwrap().width, 2);
        assert!(matches!(source.read_frame(), Err(CameraError::Read(_))));
        let last = source.read_frame().unwrap();
        assert_eq!(last.width, 3);
        assert_eq!(last.sequence, 2);
        assert!(matches!(source.read_frame(), Err(CameraError::Exhausted)));
        assert_eq!(source.reads(), 4);
    }
}
