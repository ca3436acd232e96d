pub mod gap;
pub mod preprocessing;
pub mod tracer;

pub use gap::{GapAnalyzer, GapVerdict};
pub use preprocessing::{Preprocessor, Silhouette};
pub use tracer::BorderTracer;

use crate::config::ScanConfig;
use crate::error::PreprocessError;
use crate::models::{BorderCurve, Frame};

/// Everything computed for one frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub silhouette: Silhouette,
    pub first_pass: BorderCurve,
    /// Second-pass curve; the one the verdict is based on.
    pub border: BorderCurve,
    pub verdict: GapVerdict,
}

/// Per-frame detector: silhouette, two tracing passes, gap analysis.
#[derive(Debug, Clone, Copy)]
pub struct GapDetector {
    pub preprocessor: Preprocessor,
    pub tracer: BorderTracer,
    pub analyzer: GapAnalyzer,
}

impl GapDetector {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            preprocessor: Preprocessor::new(config.roi),
            tracer: BorderTracer::from_config(config),
            analyzer: GapAnalyzer::from_config(config),
        }
    }

    pub fn detect(&self, frame: &Frame) -> Result<FrameAnalysis, PreprocessError> {
        let silhouette = self.preprocessor.process(frame)?;
        let first_pass = self.tracer.trace(&silhouette.edges, None);
        let border = self.tracer.trace(&silhouette.edges, Some(&first_pass));
        let verdict = self.analyzer.analyze(&border);
        Ok(FrameAnalysis {
            silhouette,
            first_pass,
            border,
            verdict,
        })
    }
}
