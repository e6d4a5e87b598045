use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval_at};
use tracing::debug;

use quiz_core::Countdown;

const TICK: Duration = Duration::from_secs(1);

/// One countdown step, carrying the seconds left after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub remaining_seconds: u32,
}

impl Tick {
    #[must_use]
    pub fn expired(self) -> bool {
        self.remaining_seconds == 0
    }
}

/// Background countdown that emits one [`Tick`] per elapsed second.
///
/// The final tick reports zero and then the channel closes. Stopping the
/// timer (or dropping it) cancels the task and closes the channel without
/// another tick.
#[derive(Debug)]
pub struct CountdownTimer {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// Spawn a countdown from `remaining_seconds`. Starting at zero yields a
    /// closed channel with no ticks.
    #[must_use]
    pub fn start(remaining_seconds: u32) -> (Self, mpsc::Receiver<Tick>) {
        let (tx, rx) = mpsc::channel(8);
        if remaining_seconds == 0 {
            return (Self { handle: None }, rx);
        }

        let handle = tokio::spawn(async move {
            let mut countdown = Countdown::new(remaining_seconds);
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            while !countdown.expired() {
                interval.tick().await;
                let tick = Tick {
                    remaining_seconds: countdown.tick(),
                };
                if tx.send(tick).await.is_err() {
                    debug!("countdown receiver dropped");
                    return;
                }
            }
            debug!("countdown reached zero");
        });

        (
            Self {
                handle: Some(handle),
            },
            rx,
        )
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
