use color_eyre::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Input for the control loop. `Tick` arrives every tick rate regardless of
/// key traffic; it is when finished scans are collected and the scheduler is
/// polled.
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
}

/// Fixed-deadline tick source for the input thread.
#[derive(Debug)]
struct TickClock {
    rate: Duration,
    last: Instant,
}

impl TickClock {
    fn new(rate: Duration, now: Instant) -> Self {
        Self { rate, last: now }
    }

    /// How long input polling may block before the next tick is due.
    fn timeout(&self, now: Instant) -> Duration {
        self.rate.saturating_sub(now.saturating_duration_since(self.last))
    }

    /// Whether a tick is due at `now`; if so the deadline moves on.
    fn take_due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) < self.rate {
            return false;
        }
        self.last = now;
        true
    }
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        // crossterm's poll/read block, so they get a thread of their own
        // instead of a slot on the async workers.
        tokio::task::spawn_blocking(move || {
            let mut clock = TickClock::new(tick_rate, Instant::now());
            loop {
                let input = match event::poll(clock.timeout(Instant::now())) {
                    Ok(true) => match event::read() {
                        // Windows reports releases too; only presses count.
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
                        Ok(CrosstermEvent::Resize(w, h)) => Some(Event::Resize(w, h)),
                        Ok(_) => None,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to read terminal event");
                            None
                        }
                    },
                    Ok(false) => None,
                    Err(e) => {
                        tracing::warn!(error = %e, "terminal event poll failed");
                        None
                    }
                };

                let tick = clock.take_due(Instant::now()).then_some(Event::Tick);
                for event in input.into_iter().chain(tick) {
                    if event_tx.send(event).is_err() {
                        return;
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| color_eyre::eyre::eyre!("Event channel closed"))
    }
}
