//! One iteration per display refresh.

use elementum_host::HostError;
use tracing::{trace, warn};

use crate::controller::Controller;
use crate::platform::Platform;

/// Receives the simulation framebuffer each frame.
pub trait FrameSink {
    fn blit(&mut self, pixels: &[u8], width: u32, height: u32);
}

/// What one frame did, for tests and trace output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub dispatched: usize,
    pub completions: usize,
    pub views_rebuilt: bool,
    pub ticks: u32,
    pub blitted: bool,
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Input first, then background completions, then the host: canvas size
    /// sync, revalidate, draw, step unless paused, blit, peak.
    pub fn run_frame<P: Platform>(&mut self, ctl: &mut Controller<P>, sink: &mut dyn FrameSink) -> FrameReport {
        self.frames += 1;
        let mut report = FrameReport {
            dispatched: ctl.dispatch_input(),
            completions: ctl.poll_completions(),
            ..Default::default()
        };

        match Self::drive_host(ctl, sink, &mut report) {
            Ok(()) | Err(HostError::NotReady) => {}
            Err(e) => warn!(error = %e, frame = self.frames, "frame skipped"),
        }
        trace!(?report, "frame");
        report
    }

    fn drive_host<P: Platform>(
        ctl: &mut Controller<P>,
        sink: &mut dyn FrameSink,
        report: &mut FrameReport,
    ) -> Result<(), HostError> {
        let rebuilds = ctl.host.bridge().rebuild_count();
        ctl.host.sync_canvas()?;
        ctl.host.revalidate()?;
        report.views_rebuilt = ctl.host.bridge().rebuild_count() != rebuilds;

        ctl.host.engine()?.draw()?;
        let steps = std::mem::take(&mut ctl.pending_steps) + u32::from(!ctl.mode.paused);
        for _ in 0..steps {
            ctl.host.engine()?.tick()?;
        }
        report.ticks = steps;

        let (pixels, w, h) = ctl.host.framebuffer()?;
        sink.blit(pixels, w, h);
        report.blitted = true;

        let peak = ctl.host.engine()?.frame_peak()?;
        ctl.record_peak(peak);
        Ok(())
    }
}
