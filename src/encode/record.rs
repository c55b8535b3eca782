use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{GlowError, GlowResult};
use crate::lifecycle::controller::{FrameOutcome, LifecycleState, TrailAnimator};
use crate::lifecycle::host::{GeometryHost, ManualScheduler};

/// Summary of one [`record`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordStats {
    /// Frames pushed to the sink.
    pub frames_pushed: u64,
    /// Frames that kept the previous image because the animator skipped them.
    pub frames_repeated: u64,
}

/// Pump `frames` frame callbacks at a fixed rate and push every resulting frame to `sink`.
///
/// Mounts the animator if needed. A reduced-motion run yields its static frame once per
/// requested index. Timestamps start at `start_ms`.
pub fn record<H: GeometryHost>(
    animator: &mut TrailAnimator<H, ManualScheduler>,
    fps: Fps,
    frames: u64,
    start_ms: f64,
    sink: &mut dyn FrameSink,
) -> GlowResult<RecordStats> {
    if frames == 0 {
        return Err(GlowError::validation("record needs at least one frame"));
    }
    let state = animator.mount();
    if !matches!(
        state,
        LifecycleState::Running | LifecycleState::PausedReducedMotion
    ) {
        return Err(GlowError::host(format!(
            "animator could not start (state {state:?})"
        )));
    }

    let frame = animator.frame();
    sink.begin(SinkConfig {
        width: frame.width,
        height: frame.height,
        fps,
    })?;

    let mut stats = RecordStats::default();
    let step_ms = fps.frame_duration_ms();
    for i in 0..frames {
        let now_ms = start_ms + step_ms * i as f64;
        if let Some(id) = animator.scheduler_mut().take_due() {
            match animator.on_frame(id, now_ms) {
                FrameOutcome::Rendered => {}
                FrameOutcome::Skipped(reason) => {
                    tracing::debug!(frame = i, ?reason, "frame repeated");
                    stats.frames_repeated += 1;
                }
                FrameOutcome::Stale => stats.frames_repeated += 1,
            }
        }
        sink.push_frame(FrameIndex(i), animator.frame())?;
        stats.frames_pushed += 1;
    }
    sink.end()?;
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/record.rs"]
mod tests;
