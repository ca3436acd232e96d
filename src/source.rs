use image::{ImageFormat, ImageReader};
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{FrameError, ScanError};
use crate::models::Frame;

/// Result of a successful read.
#[derive(Debug)]
pub enum FrameRead {
    Frame(Frame),
    EndOfStream,
}

/// Sequential frame supplier. The controller owns the read loop and calls
/// `release` exactly once when it stops, whatever the reason.
pub trait FrameSource {
    fn read(&mut self) -> Result<FrameRead, FrameError>;

    fn release(&mut self);
}

/// Frames stored as individual image files in one directory, read in file
/// name order.
#[derive(Debug)]
pub struct ImageSequence {
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
    released: bool,
}

impl ImageSequence {
    pub fn open(dir: &Path) -> Result<Self, ScanError> {
        let open_err = |source: std::io::Error| ScanError::Open {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(open_err)? {
            let path = entry.map_err(open_err)?.path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                files.push(path);
            }
        }
        files.sort();

        debug!(dir = %dir.display(), frames = files.len(), "image sequence opened");
        Ok(Self {
            dir: dir.to_path_buf(),
            pending: files.into(),
            released: false,
        })
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequence {
    fn read(&mut self) -> Result<FrameRead, FrameError> {
        if self.released {
            return Ok(FrameRead::EndOfStream);
        }
        let Some(path) = self.pending.pop_front() else {
            return Ok(FrameRead::EndOfStream);
        };
        // Only failing to fetch the bytes is a device problem. Anything the
        // decoder reports, truncation included, is confined to this frame.
        let bytes = std::fs::read(&path)
            .map_err(|e| FrameError::Device(format!("{}: {}", path.display(), e)))?;
        decode_frame(bytes).map(FrameRead::Frame).map_err(|e| {
            FrameError::Corrupt(format!("{}: {}", path.display(), e))
        })
    }

    fn release(&mut self) {
        if !self.released {
            debug!(dir = %self.dir.display(), unread = self.pending.len(), "image sequence released");
        }
        self.pending.clear();
        self.released = true;
    }
}

fn decode_frame(bytes: Vec<u8>) -> image::ImageResult<Frame> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(img.into_rgb8())
}

/// In-memory source, mostly for frames decoded elsewhere and for tests.
#[derive(Debug, Default)]
pub struct FrameQueue {
    items: VecDeque<Result<Frame, FrameError>>,
    releases: usize,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.items.push_back(Ok(frame));
    }

    pub fn push_error(&mut self, error: FrameError) {
        self.items.push_back(Err(error));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// How many times `release` has been called.
    pub fn releases(&self) -> usize {
        self.releases
    }
}

impl FromIterator<Frame> for FrameQueue {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Ok).collect(),
            releases: 0,
        }
    }
}

impl FrameSource for FrameQueue {
    fn read(&mut self) -> Result<FrameRead, FrameError> {
        if self.releases > 0 {
            return Ok(FrameRead::EndOfStream);
        }
        match self.items.pop_front() {
            Some(Ok(frame)) => Ok(FrameRead::Frame(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(FrameRead::EndOfStream),
        }
    }

    fn release(&mut self) {
        self.items.clear();
        self.releases += 1;
    }
}
