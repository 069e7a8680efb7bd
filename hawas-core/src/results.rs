//! Results presentation.
//!
//! Answering opens the results in two phases: a bare verdict flash, then the
//! detail panel once a fixed dwell has elapsed. [`ResultsSequencer`] owns the
//! one-shot timer; [`ResultsView`] is the content every client renders.

use crate::question::FactCheck;
use crate::round::Round;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const VERDICT_CORRECT: &str = "[ صَوَاب ]";
pub const VERDICT_WRONG: &str = "[ خَطَأ ]";
pub const CONTINUE_LABEL: &str = "[ التالي ]";
pub const FINISH_LABEL: &str = "[ إنهاء ]";
pub const END_ROUND_LABEL: &str = "[ إنهاء الجولة ]";
pub const EXPLANATION_HEADING: &str = "التفسير:";
pub const FACT_CHECK_HEADING: &str = "تحقق من المصدر";

/// Which half of the reveal is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsPhase {
    /// Verdict glyph only.
    Flash,
    /// Stats, explanation and fact check.
    Details,
}

/// Runs the flash → details transition on a single timer task.
///
/// Dropping or cancelling the sequencer aborts the timer, so a dismissed
/// results view never flips to details afterwards.
#[derive(Debug)]
pub struct ResultsSequencer {
    phase: watch::Receiver<ResultsPhase>,
    timer: Option<JoinHandle<()>>,
}

impl ResultsSequencer {
    /// Start in [`ResultsPhase::Flash`] and switch to details after `dwell`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(dwell: Duration) -> Self {
        let (tx, rx) = watch::channel(ResultsPhase::Flash);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            tracing::debug!(?dwell, "results details revealed");
            let _ = tx.send(ResultsPhase::Details);
        });
        Self {
            phase: rx,
            timer: Some(timer),
        }
    }

    pub fn phase(&self) -> ResultsPhase {
        *self.phase.borrow()
    }

    /// A receiver that observes phase changes.
    pub fn subscribe(&self) -> watch::Receiver<ResultsPhase> {
        self.phase.clone()
    }

    /// Wait until the details are showing. Returns the phase the sequencer
    /// settled in, which stays `Flash` if it was cancelled first.
    pub async fn wait_for_details(&mut self) -> ResultsPhase {
        let settled = match self.phase.wait_for(|p| *p == ResultsPhase::Details).await {
            Ok(phase) => Some(*phase),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.phase())
    }

    /// The timer hasn't fired and hasn't been cancelled.
    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Abort the pending transition, if any.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            if !timer.is_finished() {
                tracing::debug!("results timer cancelled");
            }
            timer.abort();
        }
    }
}

impl Drop for ResultsSequencer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Everything the results modal shows, derived from the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView<'a> {
    pub correct: bool,
    pub verdict: &'static str,
    pub verdict_line: &'static str,
    pub question_number: usize,
    pub questions_per_round: usize,
    pub score: u32,
    pub streak: u32,
    pub accuracy: u8,
    pub explanation: &'a str,
    pub fact_check: Option<&'a FactCheck>,
    pub continue_label: &'static str,
}

impl<'a> ResultsView<'a> {
    /// Build the view. `None` until the current question has been answered.
    pub fn from_round(round: &'a Round) -> Option<Self> {
        let state = round.state();
        let question = state.current_question.as_ref()?;
        let correct = round.last_answer_correct()?;

        Some(Self {
            correct,
            verdict: if correct { VERDICT_CORRECT } else { VERDICT_WRONG },
            verdict_line: if correct {
                "لقد أصبت مفصل الوهم"
            } else {
                "خُدعت بوهم ذكي"
            },
            question_number: round.question_number(),
            questions_per_round: round.questions_per_round(),
            score: state.score,
            streak: state.streak,
            accuracy: state.accuracy,
            explanation: &question.explanation,
            fact_check: state.current_fact_check.as_ref(),
            continue_label: if round.is_last_question() {
                FINISH_LABEL
            } else {
                CONTINUE_LABEL
            },
        })
    }

    /// "QUESTION n / N".
    pub fn progress_label(&self) -> String {
        format!(
            "QUESTION {} / {}",
            self.question_number, self.questions_per_round
        )
    }

    pub fn accuracy_label(&self) -> String {
        format!("{}%", self.accuracy)
    }
}
