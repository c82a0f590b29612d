//! Frame sources and device enumeration

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{CameraConfig, CameraError, VideoFrame};

/// File extensions decoded by the file-backed sources
const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// A producer of frames, polled once per control-loop iteration.
///
/// A failed read must leave the source usable: the caller is expected to
/// poll again after a short delay.
pub trait FrameSource: Send {
    /// Human-readable source name for logs
    fn name(&self) -> &str;

    /// Acquire the next frame
    fn read_frame(&mut self) -> Result<VideoFrame, CameraError>;

    /// Release the underlying device. Safe to call more than once.
    fn release(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_frame(&mut self) -> Result<VideoFrame, CameraError> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

fn now_ns() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn decode(path: &Path, sequence: u32) -> Result<VideoFrame, CameraError> {
    let image = image::open(path)?.to_rgb8();
    Ok(VideoFrame::from_image(image, now_ns(), sequence))
}

/// Polls an image file rewritten in place by an external grabber
pub struct SnapshotSource {
    path: PathBuf,
    name: String,
    sequence: u32,
    released: bool,
}

impl SnapshotSource {
    /// Open a snapshot file, verifying it decodes
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CameraError> {
        let path = path.into();
        if !path.is_file() {
            return Err(CameraError::Open(format!("{} is not a file", path.display())));
        }
        decode(&path, 0).map_err(|e| CameraError::Open(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            name: format!("snapshot:{}", path.display()),
            path,
            sequence: 0,
            released: false,
        })
    }
}

impl FrameSource for SnapshotSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_frame(&mut self) -> Result<VideoFrame, CameraError> {
        if self.released {
            return Err(CameraError::Released);
        }
        // A grabber mid-write leaves a truncated file; that read just fails.
        let frame = decode(&self.path, self.sequence)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }

    fn release(&mut self) {
        if !self.released {
            debug!("Releasing {}", self.name);
            self.released = true;
        }
    }
}

/// Replays a directory of recorded frames in lexical order
pub struct SequenceSource {
    frames: Vec<PathBuf>,
    name: String,
    index: usize,
    repeat: bool,
    sequence: u32,
    released: bool,
}

impl SequenceSource {
    /// Open a directory containing at least one frame image
    pub fn open(dir: impl AsRef<Path>, repeat: bool) -> Result<Self, CameraError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CameraError::Open(format!("{} is not a directory", dir.display())));
        }

        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(CameraError::Open(format!("{} holds no frames", dir.display())));
        }

        info!("Replaying {} frames from {}", frames.len(), dir.display());
        Ok(Self {
            frames,
            name: format!("sequence:{}", dir.display()),
            index: 0,
            repeat,
            sequence: 0,
            released: false,
        })
    }

    /// Number of frames in the recording
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; opening rejects empty directories
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for SequenceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_frame(&mut self) -> Result<VideoFrame, CameraError> {
        if self.released {
            return Err(CameraError::Released);
        }
        if self.index >= self.frames.len() {
            if !self.repeat {
                return Err(CameraError::Exhausted);
            }
            self.index = 0;
        }

        let path = &self.frames[self.index];
        self.index += 1;
        let frame = decode(path, self.sequence)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }

    fn release(&mut self) {
        if !self.released {
            debug!("Releasing {}", self.name);
            self.released = true;
        }
    }
}

/// Open the first configured device that is available.
///
/// Each device is tried with every backend that can serve it before moving
/// on to the next one.
pub fn open_first_available(config: &CameraConfig) -> Result<Box<dyn FrameSource>, CameraError> {
    let mut tried = Vec::with_capacity(config.devices.len());

    for device in &config.devices {
        tried.push(device.display().to_string());

        match SequenceSource::open(device, config.repeat_sequence) {
            Ok(source) => {
                info!("Camera initialized with {}", source.name());
                return Ok(Box::new(source));
            }
            Err(e) => debug!("Sequence backend rejected {}: {}", device.display(), e),
        }

        match SnapshotSource::open(device) {
            Ok(source) => {
                info!("Camera initialized with {}", source.name());
                return Ok(Box::new(source));
            }
            Err(e) => debug!("Snapshot backend rejected {}: {}", device.display(), e),
        }

        warn!("Camera device {} unavailable", device.display());
    }

    Err(CameraError::NoDevice(tried.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_frame(path: &Path, rgb: [u8; 3]) {
        RgbImage::from_pixel(8, 6, Rgb(rgb)).save(path).unwrap();
    }

    #[test]
    fn test_snapshot_rereads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_frame(&path, [10, 20, 30]);

        let mut source = SnapshotSource::open(&path).unwrap();
        let first = source.read_frame().unwrap();
        assert_eq!((first.width, first.height), (8, 6));
        assert_eq!(first.get_pixel(0, 0), Some([10, 20, 30]));

        write_frame(&path, [200, 0, 0]);
        let second = source.read_frame().unwrap();
        assert_eq!(second.get_pixel(0, 0), Some([200, 0, 0]));
        assert_eq!(second.sequence, 1);
    }

    #[test]
    fn test_snapshot_transient_failure_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_frame(&path, [1, 1, 1]);
        let mut source = SnapshotSource::open(&path).unwrap();

        std::fs::write(&path, b"truncated").unwrap();
        assert!(source.read_frame().is_err());

        write_frame(&path, [2, 2, 2]);
        assert!(source.read_frame().is_ok());
    }

    #[test]
    fn test_sequence_exhausts_without_repeat() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(&dir.path().join("000.png"), [1, 0, 0]);
        write_frame(&dir.path().join("001.png"), [2, 0, 0]);
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut source = SequenceSource::open(dir.path(), false).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.read_frame().unwrap().get_pixel(0, 0), Some([1, 0, 0]));
        assert_eq!(source.read_frame().unwrap().get_pixel(0, 0), Some([2, 0, 0]));
        assert!(matches!(source.read_frame(), Err(CameraError::Exhausted)));
        // Still pollable after failure
        assert!(matches!(source.read_frame(), Err(CameraError::Exhausted)));
    }

    #[test]
    fn test_sequence_repeats() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(&dir.path().join("a.png"), [5, 0, 0]);

        let mut source = SequenceSource::open(dir.path(), true).unwrap();
        for _ in 0..3 {
            assert_eq!(source.read_frame().unwrap().get_pixel(0, 0), Some([5, 0, 0]));
        }
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(&dir.path().join("a.png"), [5, 0, 0]);
        let mut source = SequenceSource::open(dir.path(), true).unwrap();
        source.release();
        source.release();
        assert!(matches!(source.read_frame(), Err(CameraError::Released)));
    }

    #[test]
    fn test_open_first_available_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("video2.png");
        write_frame(&live, [0, 0, 9]);

        let config = CameraConfig {
            devices: vec![
                dir.path().join("video0.png"),
                dir.path().join("missing-dir"),
                live,
            ],
            repeat_sequence: true,
        };
        let mut source = open_first_available(&config).unwrap();
        assert!(source.name().starts_with("snapshot:"));
        assert!(source.read_frame().is_ok());
    }

    #[test]
    fn test_open_first_available_no_device() {
        let dir = tempfile::tempdir().unwrap();
        let config = CameraConfig {
            devices: vec![dir.path().join("video0.png"), dir.path().join("video1.png")],
            repeat_sequence: true,
        };
        match open_first_available(&config) {
            Err(CameraError::NoDevice(tried)) => assert!(tried.contains("video1.png")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected no device"),
        }
    }
}
