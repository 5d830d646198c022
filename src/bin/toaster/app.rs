use std::time::Duration;

use async_channel::{TrySendError, bounded};
use chrono::Utc;
use tokio::signal;
use tokio::time::{Instant, sleep_until};
use toaster::clock::SystemClock;
use toaster::surface::headless::HeadlessSurface;
use toaster::surface::{Interaction, NodeId, TransitionId};
use toaster::telemetry::init_tracing;
use toaster::{ClearOptions, NotificationService, Result, SettingsOverrides};
use tracing::{info, warn};

use super::cli::Cli;

const EVENT_QUEUE_BOUND: usize = 64;
const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

type Service = NotificationService<HeadlessSurface, SystemClock>;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let global = SettingsOverrides::load(cli.config.as_deref())?;
    let mut service = NotificationService::new(HeadlessSurface::new());
    service.configure(global);

    let (tx, rx) = bounded(EVENT_QUEUE_BOUND);
    service.subscribe(move |event| match serde_json::to_string(event) {
        Ok(line) => match tx.try_send(line) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => {
                warn!(toast_id = %event.toast_id, "event queue full; dropping event");
            }
        },
        Err(err) => warn!(toast_id = %event.toast_id, error = %err, "failed to encode event"),
    });
    let printer = tokio::spawn(async move {
        while let Ok(line) = rx.recv().await {
            println!("{line}");
        }
    });

    let per_call = SettingsOverrides {
        timeout: cli.timeout,
        close_button: cli.close_button.then_some(true),
        progress_bar: cli.progress_bar.then_some(true),
        prevent_duplicates: cli.prevent_duplicates.then_some(true),
        ..SettingsOverrides::default()
    };
    let mut newest = None;
    for message in &cli.messages {
        let handle = service.notify(
            cli.kind,
            Some(message.as_str()),
            cli.title.as_deref(),
            Some(per_call.clone()),
        );
        if handle.is_displayed() {
            newest = handle.node;
        }
    }

    drive(&mut service, newest, cli.click_after).await;

    drop(service);
    if let Err(err) = printer.await {
        warn!(error = %err, "event printer terminated unexpectedly");
    }
    Ok(())
}

/// Run the service in real time until every toast is gone.
async fn drive(service: &mut Service, click_target: Option<NodeId>, click_after: Option<Duration>) {
    let started = Instant::now();
    let mut click_at = click_target.zip(click_after.map(|delay| started + delay));
    let mut transitions: Vec<(Instant, TransitionId)> = Vec::new();
    let mut interrupted = false;

    loop {
        collect_transitions(service, &mut transitions);
        if service.active_toasts().next().is_none() {
            break;
        }

        let mut wake = Instant::now() + REFRESH_INTERVAL;
        if let Some(deadline) = service.next_deadline() {
            let until = (deadline - Utc::now()).to_std().unwrap_or_default();
            wake = wake.min(Instant::now() + until);
        }
        if let Some(earliest) = transitions.iter().map(|(at, _)| *at).min() {
            wake = wake.min(earliest);
        }
        if let Some((_, at)) = click_at {
            wake = wake.min(at);
        }

        tokio::select! {
            biased;
            _ = signal::ctrl_c(), if !interrupted => {
                info!("interrupt received, clearing toasts");
                interrupted = true;
                service.clear(None, ClearOptions::forced());
            }
            () = sleep_until(wake) => {}
        }

        let now = Instant::now();
        if let Some((node, at)) = click_at {
            if at <= now {
                click_at = None;
                service.interact(node, Interaction::Click);
            }
        }
        let (due, pending): (Vec<_>, Vec<_>) =
            transitions.into_iter().partition(|(at, _)| *at <= now);
        transitions = pending;
        for (_, transition) in due {
            service.animation_complete(transition);
        }
        service.tick();
    }
}

fn collect_transitions(service: &mut Service, transitions: &mut Vec<(Instant, TransitionId)>) {
    let now = Instant::now();
    transitions.extend(
        service
            .backend_mut()
            .take_running()
            .into_iter()
            .map(|running| (now + running.transition.duration, running.id)),
    );
}
