//! Sweep orchestration: write the deck, run the solver once per point (or
//! once for the whole batch), parse its outputs and aggregate the case ids
//! under a `VSPAERO_Wrapper` result.
//!
//! A kill observed after any monitor phase aborts the sweep with
//! [`AppError::SolverKilled`]. Records parsed for earlier points stay in the
//! store but no wrapper is created.

use std::path::Path;

use tracing::{info, warn};
use va_core::{FlowCondition, ResultId};
use va_parse::{HistoryParser, LoadParser, ResultFileParser, SliceParser, StabParser};
use va_results::{ResultStore, names};
use va_setup::{SweepVectors, WaitPolicy, remove_if_exists, wait_for_file, write_cuts_file};
use va_solver::{
    OutputSink, ProcessState, SolverArgs, command_line, executable_path, run_to_completion,
    slicer_args,
};

use crate::error::{AppError, AppResult};
use crate::progress::{ProgressReporter, SweepProgressEvent, SweepStage};
use crate::session::{AeroSession, id_strings};

/// Wait for one output file, then parse it. Failures are logged and the ids
/// of any cases read before the failure are kept.
fn read_into<P: ResultFileParser>(
    parser: &P,
    path: &Path,
    wait: WaitPolicy,
    store: &mut ResultStore,
    ids: &mut Vec<ResultId>,
) {
    if let Err(err) = wait_for_file(path, wait) {
        warn!(%err, "{} output not visible after wait", P::WHAT);
    }
    if let Err(err) = parser.read_file(path, store, ids) {
        warn!(file = %path.display(), %err, "{} output skipped", P::WHAT);
    }
}

impl AeroSession {
    /// Run the configured sweep and return the `VSPAERO_Wrapper` id.
    pub fn compute_solver(
        &mut self,
        sink: &mut dyn OutputSink,
        progress: Option<&mut dyn FnMut(SweepProgressEvent)>,
    ) -> AppResult<ResultId> {
        self.require_model()?;
        if self.control.is_running() {
            return Err(AppError::SweepInProgress);
        }
        self.update();

        let batch = self.settings.case.batch_mode;
        let sweep = self.sweep_vectors();
        let mut reporter = ProgressReporter::new(progress, batch, sweep.len());

        if self.settings.advanced.cp_slice_flag {
            self.clear_cp_slice_results();
        }

        reporter.stage(SweepStage::WritingDeck, "Writing setup file");
        self.create_setup_file()?;

        let mut ids = Vec::new();
        if batch {
            self.run_batch(&sweep, sink, &mut reporter, &mut ids)?;
        } else {
            for (point, flow) in sweep.flow_conditions().into_iter().enumerate() {
                self.run_point(point, flow, sink, &mut reporter, &mut ids)?;
            }
        }

        reporter.stage(SweepStage::Aggregating, "Collecting case results");
        let wrapper = self.results.create(names::WRAPPER);
        self.results.require_mut(wrapper)?.add("ResultsVec", id_strings(&ids));
        info!(cases = ids.len(), wrapper = %wrapper, "sweep complete");

        reporter.stage(SweepStage::Completed, "Sweep complete");
        Ok(wrapper)
    }

    fn run_point(
        &mut self,
        point: usize,
        flow: FlowCondition,
        sink: &mut dyn OutputSink,
        reporter: &mut ProgressReporter<'_>,
        ids: &mut Vec<ResultId>,
    ) -> AppResult<()> {
        reporter.emit(SweepStage::ClearingOutputs, Some(point), Some(flow), None);
        self.clear_solver_outputs();

        let args = SolverArgs::single(&self.settings, flow.mach, flow.alpha, flow.beta);
        reporter.emit(SweepStage::Launching, Some(point), Some(flow), None);
        reporter.emit(SweepStage::Monitoring, Some(point), Some(flow), None);
        self.launch_solver(args, sink)?;

        reporter.emit(SweepStage::Parsing, Some(point), Some(flow), None);
        self.read_solver_outputs(ids);
        if self.slicing_requested() {
            reporter.emit(SweepStage::Slicing, Some(point), Some(flow), None);
            self.compute_cp_slices(sink)?;
        }
        Ok(())
    }

    fn run_batch(
        &mut self,
        sweep: &SweepVectors,
        sink: &mut dyn OutputSink,
        reporter: &mut ProgressReporter<'_>,
        ids: &mut Vec<ResultId>,
    ) -> AppResult<()> {
        reporter.stage(SweepStage::ClearingOutputs, "Removing stale solver outputs");
        self.clear_solver_outputs();

        let args = SolverArgs::build(&self.settings, &sweep.mach, &sweep.alpha, &sweep.beta);
        reporter.stage(SweepStage::Launching, "Launching batch run");
        reporter.stage(SweepStage::Monitoring, "Solver running");
        self.launch_solver(args, sink)?;

        reporter.stage(SweepStage::Parsing, "Reading solver outputs");
        self.read_solver_outputs(ids);
        if self.slicing_requested() {
            reporter.stage(SweepStage::Slicing, "Running Cp slicer");
            self.compute_cp_slices(sink)?;
        }
        Ok(())
    }

    fn slicing_requested(&self) -> bool {
        self.settings.advanced.cp_slice_flag && !self.slices.is_empty()
    }

    fn clear_solver_outputs(&self) {
        for path in self.files.solver_outputs() {
            if let Err(e) = remove_if_exists(path) {
                warn!(path = %path.display(), error = %e, "could not remove stale output");
            }
        }
    }

    /// Run one process to completion, treating a kill as the end of the sweep.
    fn run_process(&self, program: &Path, args: &[String], sink: &mut dyn OutputSink) -> AppResult<()> {
        let cmd = command_line(program, args);
        info!(command = %cmd.trim_end(), "launching");
        sink.line(cmd.trim_end());

        let state = run_to_completion(program, args, None, sink, &self.control, self.poll)?;
        if state.is_killed() || self.control.is_kill_requested() {
            self.control.reset();
            return Err(AppError::SolverKilled);
        }
        if let ProcessState::Completed { code: Some(code) } = state
            && code != 0
        {
            warn!(program = %program.display(), code, "process exited with non-zero status");
        }
        Ok(())
    }

    fn launch_solver(&self, args: SolverArgs, sink: &mut dyn OutputSink) -> AppResult<()> {
        let program = executable_path(&self.settings.model, &self.settings.model.solver_exe);
        self.run_process(&program, args.as_slice(), sink)
    }

    fn read_solver_outputs(&mut self, ids: &mut Vec<ResultId>) {
        let method = self.settings.analysis_method;
        let wait = self.wait;
        let store = &mut self.results;
        read_into(&HistoryParser::new(method), &self.files.history, wait, store, ids);
        read_into(&LoadParser::new(method), &self.files.load, wait, store, ids);
        if self.settings.stability.enabled {
            let parser = StabParser::new(method, self.settings.stability.kind, self.groups.active_names());
            read_into(&parser, &self.files.stab, wait, store, ids);
        }
    }

    /// Write the cuts file, run the slicer on the latest `.adb` and parse
    /// its slices. Returns the `CpSlicer_Wrapper` id.
    pub fn compute_cp_slices(&mut self, sink: &mut dyn OutputSink) -> AppResult<ResultId> {
        self.require_model()?;

        if let Err(e) = write_cuts_file(&self.files.cuts, &self.slices, self.wait) {
            warn!(error = %e, "cuts file not available");
        }
        if wait_for_file(&self.files.adb, self.wait).is_err() {
            warn!(path = %self.files.adb.display(), "aerodynamic database file not found");
        }

        let program = executable_path(&self.settings.model, &self.settings.model.slicer_exe);
        self.run_process(&program, &slicer_args(&self.files.base_arg()), sink)?;

        let wrapper = self.results.create(names::SLICE_WRAPPER);
        let num_cuts = i64::try_from(self.slices.len()).unwrap_or(i64::MAX);
        self.results.require_mut(wrapper)?.add("Num_Cuts", num_cuts);

        let mut cases = Vec::new();
        read_into(
            &SliceParser::new(self.settings.analysis_method),
            &self.files.slice,
            self.wait,
            &mut self.results,
            &mut cases,
        );
        self.results
            .require_mut(wrapper)?
            .add("CpSlice_Case_ID_Vec", id_strings(&cases));
        Ok(wrapper)
    }
}
