use std::time::Instant;

use va_core::FlowCondition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStage {
    WritingDeck,
    ClearingOutputs,
    Launching,
    Monitoring,
    Parsing,
    Slicing,
    Aggregating,
    Completed,
}

impl SweepStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::WritingDeck => "Writing setup file",
            Self::ClearingOutputs => "Clearing outputs",
            Self::Launching => "Launching solver",
            Self::Monitoring => "Solver running",
            Self::Parsing => "Parsing outputs",
            Self::Slicing => "Slicing Cp",
            Self::Aggregating => "Aggregating",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepProgressEvent {
    pub stage: SweepStage,
    pub batch: bool,
    /// Zero-based sweep point; `None` for whole-sweep stages and batch runs.
    pub point: Option<usize>,
    pub total_points: usize,
    pub flow: Option<FlowCondition>,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

/// Optional progress callback plus the context every event repeats.
pub(crate) struct ProgressReporter<'a> {
    callback: Option<&'a mut dyn FnMut(SweepProgressEvent)>,
    started: Instant,
    batch: bool,
    total_points: usize,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(
        callback: Option<&'a mut dyn FnMut(SweepProgressEvent)>,
        batch: bool,
        total_points: usize,
    ) -> Self {
        Self {
            callback,
            started: Instant::now(),
            batch,
            total_points,
        }
    }

    pub(crate) fn emit(
        &mut self,
        stage: SweepStage,
        point: Option<usize>,
        flow: Option<FlowCondition>,
        message: Option<String>,
    ) {
        if let Some(cb) = self.callback.as_deref_mut() {
            cb(SweepProgressEvent {
                stage,
                batch: self.batch,
                point,
                total_points: self.total_points,
                flow,
                elapsed_wall_s: self.started.elapsed().as_secs_f64(),
                message,
            });
        }
    }

    pub(crate) fn stage(&mut self, stage: SweepStage, message: &str) {
        self.emit(stage, None, None, Some(message.to_string()));
    }
}
