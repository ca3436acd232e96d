#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from railgaps for tests
pub use railgaps::{
    BorderCurve, BorderTracer, DeltaProfile, DetectionResult, EdgeMap, FrameError, FrameOutcome,
    FrameQueue, FrameScanController, GapAnalyzer, ScanConfig, ScanError, ScanPhase, StopReason,
    StopSignal,
};
