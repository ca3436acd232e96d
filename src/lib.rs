pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod source;

pub use config::{RoiBand, ScanConfig};
pub use detection::{BorderTracer, GapAnalyzer, GapDetector, GapVerdict, Preprocessor};
pub use error::{ConfigError, FrameError, PreprocessError, ScanError};
pub use models::{BorderCurve, DeltaProfile, DetectionResult, EdgeMap, Frame, GapCandidate};
pub use pipeline::{FrameOutcome, FrameScanController, ScanPhase, ScanSummary, StopReason, StopSignal};
pub use source::{FrameQueue, FrameRead, FrameSource, ImageSequence};
