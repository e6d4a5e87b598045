use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use quiz_core::model::{ExamId, Phase, QuizSession};
use quiz_core::reducer::Action;

use super::service::QuizSessionService;
use crate::timer::CountdownTimer;

/// Input forwarded from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Action(Action),
    Quit,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Finished(QuizSession),
    /// The user quit; the snapshot is gone.
    Quit { exam_id: ExamId },
    /// The command channel closed with the session still active; the snapshot
    /// is kept for the next launch.
    Closed(QuizSession),
    /// The session never reached an active phase (load error).
    NotStarted(QuizSession),
}

/// Drives one active session: timer ticks and user commands are applied in
/// arrival order on a single task.
pub struct QuizRunner {
    service: QuizSessionService,
    auto_submit: bool,
}

impl QuizRunner {
    #[must_use]
    pub fn new(service: QuizSessionService, auto_submit: bool) -> Self {
        Self {
            service,
            auto_submit,
        }
    }

    /// Run until the session finishes, the user quits, or `commands` closes.
    ///
    /// Every state change is published on `view`. The countdown is stopped
    /// before returning.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        view: watch::Sender<QuizSession>,
    ) -> RunOutcome {
        view.send_replace(self.service.session().clone());
        if !self.service.session().phase().is_active() {
            return RunOutcome::NotStarted(self.service.into_session());
        }

        let (mut timer, mut ticks) =
            CountdownTimer::start(self.service.session().remaining_seconds());
        let mut ticking = true;

        let outcome = loop {
            tokio::select! {
                tick = ticks.recv(), if ticking => match tick {
                    Some(tick) => {
                        self.service
                            .dispatch(Action::Tick { remaining_seconds: tick.remaining_seconds })
                            .await;
                        if tick.expired() {
                            info!(exam_id = %self.service.session().exam_id(), "exam time is up");
                            if self.auto_submit {
                                self.service.dispatch(Action::TimeUp).await;
                            }
                        }
                    }
                    None => ticking = false,
                },
                command = commands.recv() => match command {
                    Some(Command::Action(action)) => {
                        self.service.dispatch(action).await;
                    }
                    Some(Command::Quit) => {
                        timer.stop();
                        break RunOutcome::Quit { exam_id: self.service.quit().await };
                    }
                    None => {
                        debug!("command channel closed");
                        break RunOutcome::Closed(self.service.session().clone());
                    }
                },
            }

            let session = self.service.session();
            view.send_replace(session.clone());
            if session.phase() == Phase::Finished {
                break RunOutcome::Finished(session.clone());
            }
        };

        timer.stop();
        outcome
    }
}
