//! Refresh scheduler: owns the published night overlay and keeps it current.
//!
//! ```text
//! STOPPED --start--> ARMED --tick--> ARMED --stop--> STOPPED
//! ```
//!
//! The scheduler runs on the host's event loop. The host either calls
//! [`RefreshScheduler::poll`] every frame, or takes a [`Trigger`] and fires it
//! later from its own timer. Every arm/disarm bumps a generation counter, so a
//! trigger taken before `stop` (or before a restart) can never publish.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::geo::Instant;
use crate::overlay::OverlaySnapshot;
use crate::solar::SolarPosition;
use crate::terminator::NightEngine;
use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::time::Duration;

/// Wall clock used for each tick's instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<F: Fn() -> Instant> Clock for F {
    fn now(&self) -> Instant {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Armed,
}

/// Token for one scheduled tick, valid only within the arming it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    generation: u64,
}

#[derive(Debug)]
pub enum TickOutcome {
    Published,
    /// Stopped scheduler or stale trigger; nothing was computed.
    Skipped,
    /// Upstream failure; the previous snapshot is still published.
    Kept(EngineError),
}

pub struct RefreshScheduler<S, C = SystemClock> {
    engine: NightEngine<S>,
    clock: C,
    period: Duration,
    state: SchedulerState,
    generation: u64,
    next_due: Option<std::time::Instant>,
    current: Option<Arc<OverlaySnapshot>>,
}

impl<S: SolarPosition> RefreshScheduler<S, SystemClock> {
    pub fn new(solar: S, config: &EngineConfig) -> EngineResult<Self> {
        Self::with_clock(solar, config, SystemClock)
    }
}

impl<S: SolarPosition, C: Clock> RefreshScheduler<S, C> {
    pub fn with_clock(solar: S, config: &EngineConfig, clock: C) -> EngineResult<Self> {
        Self::from_engine(NightEngine::new(solar, config)?, config.refresh_period, clock)
    }

    pub fn from_engine(engine: NightEngine<S>, period: Duration, clock: C) -> EngineResult<Self> {
        if period.is_zero() {
            return Err(EngineError::InvalidParameter(
                "refresh period must be longer than zero".to_string(),
            ));
        }
        Ok(Self {
            engine,
            clock,
            period,
            state: SchedulerState::Stopped,
            generation: 0,
            next_due: None,
            current: None,
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Currently published snapshot. Holders keep their `Arc` even after the
    /// scheduler replaces it.
    pub fn snapshot(&self) -> Option<Arc<OverlaySnapshot>> {
        self.current.clone()
    }

    pub fn next_due(&self) -> Option<std::time::Instant> {
        self.next_due
    }

    /// Publish a snapshot for `initial` synchronously, then arm the trigger.
    ///
    /// Starting an armed scheduler restarts it. If the initial computation
    /// fails the scheduler is left stopped.
    pub fn start(&mut self, initial: Instant) -> EngineResult<()> {
        if self.state == SchedulerState::Armed {
            self.stop();
        }

        let snapshot = self.engine.snapshot(initial)?;
        self.current = Some(Arc::new(snapshot));
        self.generation += 1;
        self.state = SchedulerState::Armed;
        self.next_due = Some(std::time::Instant::now() + self.period);
        info!(
            "Night overlay armed at {} (refresh every {:?})",
            initial, self.period
        );
        Ok(())
    }

    /// Disarm. Idempotent, and a no-op before `start`.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Stopped {
            return;
        }
        self.state = SchedulerState::Stopped;
        self.generation += 1;
        self.next_due = None;
        info!("Night overlay disarmed");
    }

    /// Recompute for the clock's current instant and replace the snapshot.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state == SchedulerState::Stopped {
            debug!("Tick on stopped scheduler ignored");
            return TickOutcome::Skipped;
        }

        let instant = self.clock.now();
        let started = std::time::Instant::now();
        match self.engine.snapshot(instant) {
            Ok(snapshot) => {
                self.current = Some(Arc::new(snapshot));
                trace!("Night overlay for {} built in {:?}", instant, started.elapsed());
                TickOutcome::Published
            }
            Err(e) => {
                warn!("Keeping previous night overlay, refresh for {} failed: {}", instant, e);
                TickOutcome::Kept(e)
            }
        }
    }

    /// Tick if armed and the period has elapsed by `now`. Returns `None` when
    /// nothing was due.
    pub fn poll(&mut self, now: std::time::Instant) -> Option<TickOutcome> {
        let due = self.next_due?;
        if self.state != SchedulerState::Armed || now < due {
            return None;
        }
        self.next_due = Some(now + self.period);
        Some(self.tick())
    }

    /// Token for the next scheduled tick of the current arming.
    pub fn trigger(&self) -> Option<Trigger> {
        match self.state {
            SchedulerState::Armed => Some(Trigger {
                generation: self.generation,
            }),
            SchedulerState::Stopped => None,
        }
    }

    /// Run a previously scheduled tick unless it was cancelled since.
    pub fn fire(&mut self, trigger: Trigger) -> TickOutcome {
        if trigger.generation != self.generation {
            debug!(
                "Stale trigger (generation {} != {}) dropped",
                trigger.generation, self.generation
            );
            return TickOutcome::Skipped;
        }
        self.next_due = Some(std::time::Instant::now() + self.period);
        self.tick()
    }
}
