//! Fixed-period tick loop.

use crate::controls::Controls;
use lattice_core::SchedulerConfig;
use lattice_world::{Renderer, Session, TickReport};
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{event, info, instrument, Level};

/// Drive `session` until cancelled or `max_ticks` is reached.
///
/// Each iteration reads the controls once, runs one tick and renders the
/// result before the next iteration may start. Returns the number of ticks
/// run by this call.
#[instrument(skip_all, fields(period_ms = config.period_ms))]
pub async fn run_scheduler<R>(
    mut session: Session,
    controls: Arc<Controls>,
    mut renderer: R,
    config: SchedulerConfig,
    cancel: CancellationToken,
) -> u64
where
    R: Renderer + Send,
{
    let mut ticker = interval(Duration::from_millis(config.period_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    renderer.render(session.grid(), session.ticks());
    info!("Scheduler started");

    let mut ran = 0u64;
    loop {
        if config.max_ticks.is_some_and(|max| ran >= max) {
            info!(ticks = ran, "Tick limit reached");
            break;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(ticks = ran, "Scheduler cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        let params = controls.snapshot();
        let report = session.tick(&params);
        renderer.render(session.grid(), session.ticks());
        ran += 1;

        if config.log_every_ticks > 0 && session.ticks() % config.log_every_ticks == 0 {
            emit_tick_summary(&session, &report, params.temperature, &params.move_method.to_string());
        }
    }

    ran
}

fn emit_tick_summary(session: &Session, report: &TickReport, temperature: f64, move_method: &str) {
    let occupied = session.grid().occupied_count();

    info!(
        event = "tick_summary",
        tick = session.ticks(),
        temperature = %format!("{:.2}", temperature),
        move_method = move_method,
        occupied = occupied,
        candidates = report.candidates,
        rejected = report.rejected(),
        committed = report.committed,
        reverted = report.reverted,
        "Tick summary"
    );

    event!(
        Level::INFO,
        gauge_name = "occupied_cells",
        gauge_value = occupied,
        tick = session.ticks(),
        "Occupied cells gauge"
    );

    event!(
        Level::INFO,
        gauge_name = "acceptance_ratio",
        gauge_value = report.acceptance_ratio(),
        tick = session.ticks(),
        "Acceptance ratio gauge"
    );
}
