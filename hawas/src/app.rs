//! Main application state and logic

use std::sync::{Arc, Mutex, MutexGuard};

use hawas_core::results::ResultsPhase;
use hawas_core::round::Continuation;
use hawas_core::{
    AidKind, FactCheck, FactCheckTicket, FactChecker, GameSession, Loader, OnboardingError,
    OnboardingFlow, OnboardingProfile, ResultsView, Round,
};
use tokio::sync::mpsc;

use crate::onboarding::OnboardingScreen;
use crate::ui::theme::HawasTheme;
use crate::ui::Overlay;
use crate::Setup;

/// Results of background work, delivered to the UI loop.
#[derive(Debug)]
pub enum WorkerResponse {
    OnboardingFinished(Result<OnboardingProfile, OnboardingError>),
    FactCheck {
        ticket: FactCheckTicket,
        result: Option<FactCheck>,
    },
}

/// Which full-screen view is up.
pub enum Screen {
    Onboarding(OnboardingScreen),
    Home,
    Playing,
}

/// Loader that publishes its message for the render loop.
#[derive(Debug, Clone, Default)]
pub struct StatusLoader {
    message: Arc<Mutex<Option<String>>>,
}

impl StatusLoader {
    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.message
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn message(&self) -> Option<String> {
        self.slot().clone()
    }
}

impl Loader for StatusLoader {
    fn show(&self, message: &str) {
        *self.slot() = Some(message.to_string());
    }

    fn hide(&self) {
        *self.slot() = None;
    }
}

/// Main application state
pub struct App {
    pub screen: Screen,
    pub session: GameSession,
    pub profile: Option<OnboardingProfile>,

    // UI state
    pub theme: HawasTheme,
    overlay: Option<Overlay>,
    reward_dismissed: bool,
    loader: StatusLoader,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // Animation
    pub animation_frame: u8,

    // Background work
    fact_checker: Arc<dyn FactChecker>,
    worker_tx: mpsc::Sender<WorkerResponse>,
    worker_rx: mpsc::Receiver<WorkerResponse>,
}

impl App {
    pub fn new(setup: Setup) -> Self {
        let loader = StatusLoader::default();
        let flow = OnboardingFlow::new(setup.username, setup.note_generator)
            .with_loader(Arc::new(loader.clone()));
        let (worker_tx, worker_rx) = mpsc::channel(16);

        Self {
            screen: Screen::Onboarding(OnboardingScreen::new(flow)),
            session: setup.session,
            profile: None,
            theme: HawasTheme::default(),
            overlay: None,
            reward_dismissed: false,
            loader,
            status_message: None,
            should_quit: false,
            animation_frame: 0,
            fact_checker: setup.fact_checker,
            worker_tx,
            worker_rx,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        self.session.round()
    }

    pub fn results_phase(&self) -> Option<ResultsPhase> {
        self.session.results_phase()
    }

    pub fn results_view(&self) -> Option<ResultsView<'_>> {
        self.session.round().and_then(ResultsView::from_round)
    }

    /// The aid reward picker is showing.
    pub fn reward_visible(&self) -> bool {
        !self.reward_dismissed
            && self.results_phase() == Some(ResultsPhase::Details)
            && self.round().is_some_and(Round::reward_pending)
    }

    pub fn loading_message(&self) -> Option<String> {
        self.loader.message()
    }

    // ========================================================================
    // Overlays and status
    // ========================================================================

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn toggle_help(&mut self) {
        self.overlay = match self.overlay {
            Some(Overlay::Help) => None,
            None => Some(Overlay::Help),
        };
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    // ========================================================================
    // Onboarding
    // ========================================================================

    /// Finalize onboarding on a worker task; the loader message shows while
    /// the note is generated.
    pub fn finish_onboarding(&mut self, mut flow: OnboardingFlow) {
        let tx = self.worker_tx.clone();
        tokio::spawn(async move {
            let result = flow.finish().await;
            let _ = tx.send(WorkerResponse::OnboardingFinished(result)).await;
        });
    }

    /// Apply everything background tasks have reported.
    pub fn drain_worker(&mut self) {
        while let Ok(response) = self.worker_rx.try_recv() {
            match response {
                WorkerResponse::OnboardingFinished(Ok(profile)) => {
                    tracing::debug!(fallback = profile.used_fallback_note(), "profile ready");
                    self.profile = Some(profile);
                    self.screen = Screen::Home;
                }
                WorkerResponse::OnboardingFinished(Err(e)) => {
                    tracing::warn!(error = %e, "onboarding finished twice");
                    self.screen = Screen::Home;
                }
                WorkerResponse::FactCheck { ticket, result } => {
                    self.session.set_fact_check(ticket, result)
                }
            }
        }
    }

    // ========================================================================
    // Rounds
    // ========================================================================

    pub fn start_round(&mut self) {
        match self.session.start_round() {
            Ok(_) => {
                self.screen = Screen::Playing;
                self.reward_dismissed = false;
                self.clear_status();
            }
            Err(e) => self.set_status(format!("Could not start round: {e}")),
        }
    }

    pub fn select_answer(&mut self, index: usize) {
        let Some(report) = self.session.select_answer(index) else {
            return;
        };
        self.reward_dismissed = false;
        if report.progression.leveled_up {
            self.set_status(format!("LEVEL UP → {}", self.session.player().level));
        } else if report.progression.xp_earned > 0 {
            self.set_status(format!("+{} XP", report.progression.xp_earned));
        } else {
            self.clear_status();
        }
        self.spawn_fact_check();
    }

    fn spawn_fact_check(&mut self) {
        let Some(ticket) = self.session.fact_check_ticket() else {
            return;
        };
        let Some(question) = self
            .session
            .round()
            .and_then(|round| round.state().current_question.clone())
        else {
            return;
        };
        self.session.set_fact_check(ticket, Some(FactCheck::Loading));

        let checker = Arc::clone(&self.fact_checker);
        let tx = self.worker_tx.clone();
        tokio::spawn(async move {
            let result = match checker.check(&question).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        question_number = ticket.question_number(),
                        "fact check failed"
                    );
                    None
                }
            };
            let _ = tx
                .send(WorkerResponse::FactCheck { ticket, result })
                .await;
        });
    }

    pub fn use_aid(&mut self, kind: AidKind) {
        if self.session.use_aid(kind).is_some() {
            self.clear_status();
            return;
        }
        let reason = self
            .round()
            .map(|round| round.aid_status(kind, self.session.player()));
        if let Some(Err(reason)) = reason {
            self.set_status(format!("{}: {reason}", kind.label()));
        }
    }

    pub fn claim_aid(&mut self, kind: AidKind) {
        if self.session.claim_aid(kind) {
            self.set_status(format!("+{} {}", self.session.config().aid_reward_amount, kind.label()));
        }
    }

    pub fn dismiss_reward(&mut self) {
        self.reward_dismissed = true;
    }

    /// Leave the results once the details are up.
    pub fn continue_round(&mut self, return_home: bool) {
        if self.results_phase() != Some(ResultsPhase::Details) {
            return;
        }
        match self.session.continue_round(return_home) {
            Ok(Continuation::NextQuestion { .. }) => {
                self.reward_dismissed = false;
                self.clear_status();
            }
            Ok(Continuation::RoundEnded(summary)) => {
                self.screen = Screen::Home;
                self.set_status(format!(
                    "{}/{} ({}%)",
                    summary.score, summary.questions_per_round, summary.accuracy
                ));
            }
            Err(e) => self.set_status(format!("Error: {e}")),
        }
    }

    pub fn end_round(&mut self) {
        if let Some(summary) = self.session.end_round() {
            self.screen = Screen::Home;
            self.set_status(format!(
                "{}/{} ({}%)",
                summary.score, summary.questions_per_round, summary.accuracy
            ));
        }
    }
}
