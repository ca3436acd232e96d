use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::detection::{FrameAnalysis, GapDetector};
use crate::error::{ConfigError, FrameError, ScanError};
use crate::models::{DetectionResult, Frame};
use crate::source::{FrameRead, FrameSource};

/// Where the controller is in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Frames are counted but not processed.
    Warmup { remaining: usize },
    Scanning,
    /// The source has been released; no further reads happen.
    Finished,
}

/// What one call to [`FrameScanController::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Warmup { frame_index: usize },
    /// The frame went through the full cycle; `accepted` tells whether a gap was found.
    Analyzed(DetectionResult),
    /// The frame could not be decoded or preprocessed and was skipped.
    Corrupt { frame_index: usize },
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    FrameLimit,
    Stopped,
}

/// Totals for a finished scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub detections: Vec<DetectionResult>,
    pub frames_read: usize,
    pub frames_warmup: usize,
    pub frames_analyzed: usize,
    pub frames_corrupt: usize,
    /// Analyzed frames without an accepted gap.
    pub frames_rejected: usize,
    pub stop_reason: StopReason,
}

/// Cooperative cancellation flag, checked between frames.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Debug configuration for scan execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for per-detection images
    pub output_dir: PathBuf,
}

/// Drives one stream: warmup, per-frame detection, counters, termination.
pub struct FrameScanController {
    config: ScanConfig,
    detector: GapDetector,
    phase: ScanPhase,
    next_index: usize,
    skip_counter: usize,
    source_released: bool,
    debug: Option<DebugConfig>,
    stop: StopSignal,
}

impl FrameScanController {
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let detector = GapDetector::new(&config);
        let phase = warmup_phase(config.skipped_frames_count);
        Ok(Self {
            config,
            detector,
            phase,
            next_index: 0,
            skip_counter: 0,
            source_released: false,
            debug: None,
            stop: StopSignal::new(),
        })
    }

    /// Save stage images of every accepted frame under `output_dir`.
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self, ScanError> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(ScanError::Debug(format!(
                    "directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that stops the scan at the next frame boundary.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Frames since the last accepted detection (or the end of warmup).
    pub fn skip_counter(&self) -> usize {
        self.skip_counter
    }

    pub fn frames_read(&self) -> usize {
        self.next_index
    }

    /// Read and handle one frame. On end of stream or a fatal error the
    /// source is released before returning.
    pub fn step<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> Result<FrameOutcome, ScanError> {
        if self.phase == ScanPhase::Finished {
            return Ok(FrameOutcome::EndOfStream);
        }
        let outcome = self.advance(source);
        if matches!(outcome, Ok(FrameOutcome::EndOfStream) | Err(_)) {
            self.finish(source);
        }
        outcome
    }

    /// Process frames until the stream ends, the frame limit is reached or the
    /// stop signal fires. `on_detection` sees every accepted detection as it
    /// happens.
    pub fn run<S, F>(&mut self, source: &mut S, mut on_detection: F) -> Result<ScanSummary, ScanError>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&DetectionResult),
    {
        let mut detections = Vec::new();
        let (mut warmup, mut analyzed, mut corrupt, mut rejected) = (0, 0, 0, 0);

        let stop_reason = loop {
            if self.stop.is_stopped() {
                break StopReason::Stopped;
            }
            if self.config.max_frames.is_some_and(|max| self.next_index >= max) {
                break StopReason::FrameLimit;
            }
            match self.step(source)? {
                FrameOutcome::EndOfStream => break StopReason::EndOfStream,
                FrameOutcome::Warmup { .. } => warmup += 1,
                FrameOutcome::Corrupt { .. } => corrupt += 1,
                FrameOutcome::Analyzed(result) => {
                    analyzed += 1;
                    if result.accepted {
                        on_detection(&result);
                        detections.push(result);
                    } else {
                        rejected += 1;
                    }
                }
            }
        };
        self.finish(source);

        info!(
            frames = self.next_index,
            detections = detections.len(),
            corrupt,
            ?stop_reason,
            "scan finished"
        );

        Ok(ScanSummary {
            detections,
            frames_read: self.next_index,
            frames_warmup: warmup,
            frames_analyzed: analyzed,
            frames_corrupt: corrupt,
            frames_rejected: rejected,
            stop_reason,
        })
    }

    /// Release the source (once) and stop reading.
    pub fn finish<S: FrameSource + ?Sized>(&mut self, source: &mut S) {
        if !self.source_released {
            source.release();
            self.source_released = true;
        }
        self.phase = ScanPhase::Finished;
    }

    fn advance<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> Result<FrameOutcome, ScanError> {
        let frame_index = self.next_index;
        let frame = match source.read() {
            Ok(FrameRead::Frame(frame)) => frame,
            Ok(FrameRead::EndOfStream) => return Ok(FrameOutcome::EndOfStream),
            Err(FrameError::Corrupt(message)) => {
                self.next_index += 1;
                warn!(frame_index, %message, "skipping undecodable frame");
                self.skip_frame();
                return Ok(FrameOutcome::Corrupt { frame_index });
            }
            Err(FrameError::Device(message)) => {
                return Err(ScanError::Device {
                    frame_index,
                    message,
                });
            }
        };
        self.next_index += 1;

        if self.consume_warmup() {
            return Ok(FrameOutcome::Warmup { frame_index });
        }

        self.analyze(frame_index, &frame)
    }

    fn analyze(&mut self, frame_index: usize, frame: &Frame) -> Result<FrameOutcome, ScanError> {
        let analysis = match self.detector.detect(frame) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(frame_index, error = %e, "skipping malformed frame");
                self.skip_counter += 1;
                return Ok(FrameOutcome::Corrupt { frame_index });
            }
        };

        let verdict = analysis.verdict;
        if !verdict.accepted {
            self.skip_counter += 1;
            debug!(frame_index, candidate = ?verdict.candidate, skipped = self.skip_counter, "no gap");
            return Ok(FrameOutcome::Analyzed(DetectionResult {
                frame_index,
                gap_width: verdict.gap_width,
                accepted: false,
            }));
        }

        info!(frame_index, gap = verdict.gap_width, skipped = self.skip_counter, "gap detected");
        self.skip_counter = 0;

        if let Some(debug) = &self.debug {
            if let Err(e) = save_debug_output(&debug.output_dir, frame_index, &analysis) {
                warn!(frame_index, error = %e, "failed to write debug images");
            }
        }
        if self.config.rearm_warmup_on_detection {
            self.phase = warmup_phase(self.config.skipped_frames_count);
        }

        Ok(FrameOutcome::Analyzed(DetectionResult {
            frame_index,
            gap_width: verdict.gap_width,
            accepted: true,
        }))
    }

    /// A frame slot that produced nothing usable.
    fn skip_frame(&mut self) {
        if !self.consume_warmup() {
            self.skip_counter += 1;
        }
    }

    /// Count one frame against warmup. Returns false once scanning.
    fn consume_warmup(&mut self) -> bool {
        let ScanPhase::Warmup { remaining } = self.phase else {
            return false;
        };
        let remaining = remaining - 1;
        self.phase = if remaining == 0 {
            debug!(frame_index = self.next_index, "warmup complete");
            ScanPhase::Scanning
        } else {
            ScanPhase::Warmup { remaining }
        };
        true
    }
}

fn warmup_phase(frames: usize) -> ScanPhase {
    if frames == 0 {
        ScanPhase::Scanning
    } else {
        ScanPhase::Warmup { remaining: frames }
    }
}

/// Write the stage images of one accepted frame to `<root>/frame_<index>/`.
pub fn save_debug_output(root: &Path, frame_index: usize, analysis: &FrameAnalysis) -> Result<(), ScanError> {
    let frame_dir = root.join(format!("frame_{:06}", frame_index));
    std::fs::create_dir_all(&frame_dir)?;

    let silhouette = &analysis.silhouette;
    let mask = image::GrayImage::from_fn(silhouette.mask.width(), silhouette.mask.height(), |x, y| {
        image::Luma([silhouette.mask.get_pixel(x, y)[0].saturating_mul(255)])
    });
    let edges = silhouette.edges.to_visual();

    let mut border = image::DynamicImage::ImageLuma8(edges.clone()).into_rgb8();
    draw_curve(&mut border, analysis.border.columns());

    let save_err = |name: &str, e: image::ImageError| ScanError::Debug(format!("failed to save {}: {}", name, e));
    silhouette
        .gray
        .save(frame_dir.join("gray.png"))
        .map_err(|e| save_err("gray.png", e))?;
    mask.save(frame_dir.join("mask.png"))
        .map_err(|e| save_err("mask.png", e))?;
    edges
        .save(frame_dir.join("edges.png"))
        .map_err(|e| save_err("edges.png", e))?;
    border
        .save(frame_dir.join("border.png"))
        .map_err(|e| save_err("border.png", e))?;

    debug!(dir = %frame_dir.display(), "debug images saved");
    Ok(())
}

fn draw_curve(img: &mut RgbImage, columns: &[usize]) {
    for (row, &col) in columns.iter().enumerate() {
        let (x, y) = (col as u32, row as u32);
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, Rgb([255, 0, 0]));
        }
    }
}
