/*
 * Lifecycle Module
 *
 * Backdrop owns a Simulation for one page view together with everything
 * around it: the observer subscriptions, the signal mailbox, the fixed-rate
 * frame pacer and the document-visibility gate. Mounting without a container
 * is a silent no-op, since the effect is decorative and must never get in
 * the way of the page. Teardown unsubscribes both observers; navigating to a
 * new page tears the old instance down before mounting the next one.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::flock::{FrameStats, Simulation};
use crate::params::FlockParams;
use crate::renderer::Surface;
use crate::signals::{Mailbox, PendingSignals, SubscriptionId, ThemeSource, VisibilitySource};

/// The element the canvas is mounted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub width: f32,
    pub height: f32,
}

/// Fixed-rate frame scheduling on top of a faster host loop.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    accumulator: Duration,
    last: Option<Instant>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, accumulator: Duration::ZERO, last: None }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Whether a frame should run at `now`. The first call always runs. A
    /// late host never gets a burst of catch-up frames.
    pub fn due(&mut self, now: Instant) -> bool {
        let Some(last) = self.last.replace(now) else {
            return true;
        };

        self.accumulator += now.saturating_duration_since(last);
        if self.accumulator < self.interval {
            return false;
        }

        self.accumulator -= self.interval;
        if self.accumulator >= self.interval {
            self.accumulator = Duration::ZERO;
        }
        true
    }
}

struct Observer<S: ?Sized> {
    source: Arc<S>,
    id: SubscriptionId,
}

pub struct Backdrop {
    simulation: Simulation,
    mailbox: Mailbox,
    trigger: Option<Observer<VisibilitySource>>,
    theme: Option<Observer<ThemeSource>>,
    pacer: FramePacer,
    document_visible: bool,
    running: bool,
}

impl Backdrop {
    /// Mount into `container`. Returns `None` when there is no container.
    /// Without a trigger the flock just keeps flocking.
    pub fn mount(
        container: Option<Container>,
        trigger: Option<Arc<VisibilitySource>>,
        theme: Arc<ThemeSource>,
        params: FlockParams,
    ) -> Option<Self> {
        let Some(container) = container else {
            debug!("no canvas container, backdrop not mounted");
            return None;
        };

        let pacer = FramePacer::new(params.frame_interval());
        let mut simulation = Simulation::new(params, container.width, container.height);
        simulation.set_theme(theme.current());

        let mailbox = PendingSignals::mailbox();

        let sink = Arc::clone(&mailbox);
        let theme_id = theme.subscribe(Box::new(move |t| PendingSignals::post_theme(&sink, t)));

        let trigger = match trigger {
            Some(source) => {
                // Report the current state like an intersection observer does
                // on first observe; applied on the first frame
                PendingSignals::post_visibility(&mailbox, source.current());
                let sink = Arc::clone(&mailbox);
                let id = source.subscribe(Box::new(move |v| PendingSignals::post_visibility(&sink, v)));
                Some(Observer { source, id })
            }
            None => {
                debug!("no trigger element, scatter/respawn disabled");
                None
            }
        };

        info!(
            width = container.width,
            height = container.height,
            boids = simulation.boids().len(),
            "backdrop mounted"
        );

        Some(Self {
            simulation,
            mailbox,
            trigger,
            theme: Some(Observer { source: theme, id: theme_id }),
            pacer,
            document_visible: true,
            running: true,
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    pub fn set_document_visible(&mut self, visible: bool) {
        self.document_visible = visible;
    }

    pub fn document_visible(&self) -> bool {
        self.document_visible
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        debug!(width, height, "canvas resized");
        self.simulation.resize(width, height);
    }

    pub fn set_params(&mut self, params: FlockParams) {
        self.pacer.set_interval(params.frame_interval());
        self.simulation.set_params(params);
    }

    /// Apply anything the observers posted since the last call.
    pub fn apply_signals(&mut self, now: Instant) {
        let pending = PendingSignals::drain(&self.mailbox);

        if let Some(theme) = pending.theme {
            self.simulation.set_theme(theme);
        }

        if self.trigger.is_some() {
            match pending.trigger_visible {
                Some(true) => self.simulation.trigger_respawn(now),
                Some(false) => self.simulation.trigger_scatter(),
                None => {}
            }
        }
    }

    /// Called from the host loop as often as it likes; runs a simulation
    /// frame at the configured rate while the document is visible.
    pub fn frame(&mut self, now: Instant, surface: &mut dyn Surface) -> Option<FrameStats> {
        if !self.running {
            return None;
        }

        self.apply_signals(now);

        if !self.pacer.due(now) || !self.document_visible {
            return None;
        }

        Some(self.simulation.tick(now, surface))
    }

    /// Stop the loop and disconnect both observers. Safe to call twice.
    pub fn teardown(&mut self) {
        if let Some(observer) = self.trigger.take() {
            observer.source.unsubscribe(observer.id);
        }
        if let Some(observer) = self.theme.take() {
            observer.source.unsubscribe(observer.id);
        }
        if self.running {
            self.running = false;
            info!("backdrop torn down");
        }
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Page navigation: tear down the current instance, then mount a fresh one
/// against the new page's elements.
pub fn navigate(
    current: &mut Option<Backdrop>,
    container: Option<Container>,
    trigger: Option<Arc<VisibilitySource>>,
    theme: Arc<ThemeSource>,
    params: FlockParams,
) {
    if let Some(mut previous) = current.take() {
        previous.teardown();
    }
    *current = Backdrop::mount(container, trigger, theme, params);
}
