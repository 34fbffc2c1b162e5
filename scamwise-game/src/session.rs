//! The session state machine: scenario progression, answer evaluation, tool
//! dispatch, and lifecycle control.
//!
//! A `GameSession` owns its own ledger, active set, clock, and RNG streams,
//! constructed fresh per session; there is no process-wide shared state, so
//! parallel sessions (and parallel tests) cannot interfere.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::achievements::{self, AchievementId, definition};
use crate::config::{SessionConfig, select_active_set};
use crate::constants::{
    FALLBACK_ANALYSIS_URL, SPEED_BONUS_WINDOW, SPEED_BONUS_XP, TOOL_USE_XP, ZERO_ADDRESS,
};
use crate::data::{Presentation, Scenario, ScenarioData};
use crate::enrich::{DataProvenance, ToolEnrichment, enrich_or_baseline};
use crate::event::{EventKind, EventSeverity, SessionEvent};
use crate::ledger::{ProgressionLedger, SkillId};
use crate::results::{ResultsReport, summarize};
use crate::tools::{self, ToolId, ToolReport};

/// Monotonic time source for scenario and session timing.
///
/// The core never reads wall-clock time directly; shells supply whatever
/// their platform offers (performance.now on the web, `Instant` natively).
pub trait SessionClock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Standard clock backed by `std::time::Instant`.
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl SessionClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually-advanced clock for deterministic tests and replays. Clones share
/// the same underlying time.
#[derive(Clone, Default)]
pub struct ManualClock {
    millis: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn advance(&self, delta: Duration) {
        let millis = u64::try_from(delta.as_millis()).unwrap_or(u64::MAX);
        self.millis.set(self.millis.get().saturating_add(millis));
    }
}

impl SessionClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.get())
    }
}

/// Domain-separated RNG streams derived from the session seed, so active-set
/// selection and tool jitter stay independent and replayable.
pub struct RngStreams {
    shuffle: RefCell<ChaCha20Rng>,
    tools: RefCell<SmallRng>,
}

impl RngStreams {
    /// Construct the streams from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            shuffle: RefCell::new(ChaCha20Rng::seed_from_u64(derive_stream_seed(
                seed, b"shuffle",
            ))),
            tools: RefCell::new(SmallRng::seed_from_u64(derive_stream_seed(seed, b"tools"))),
        }
    }

    /// Access the active-set shuffle stream.
    #[must_use]
    pub fn shuffle(&self) -> RefMut<'_, ChaCha20Rng> {
        self.shuffle.borrow_mut()
    }

    /// Access the tool-jitter stream.
    #[must_use]
    pub fn tools(&self) -> RefMut<'_, SmallRng> {
        self.tools.borrow_mut()
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Sub-phase of an in-progress scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPhase {
    AwaitingAnswer,
    AwaitingAdvance,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Configuring,
    InProgress(AnswerPhase),
    Completed,
}

/// Recoverable rejections of session commands. None of these mutate state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session can only be configured before it starts")]
    NotConfiguring,
    #[error("quiz length must be at least one scenario")]
    InvalidQuizLength,
    #[error("session is not in progress")]
    NotInProgress,
    #[error("scenario already answered; advance to continue")]
    AlreadyAnswered,
    #[error("option `{0}` does not belong to the current scenario")]
    UnknownOption(String),
    #[error("no answered scenario to advance from")]
    AnswerPending,
}

/// Outcome of a single answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub scenario_id: u32,
    pub correct: bool,
    /// Scenario reward plus speed bonus; achievement XP is reported through
    /// `newly_unlocked`.
    pub xp_awarded: u32,
    pub speed_bonus: bool,
    pub elapsed: Duration,
    pub streak_broken: bool,
    pub newly_unlocked: Vec<AchievementId>,
}

/// Outcome of advancing past an answered scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The session moved to the scenario at this active-set index.
    NextScenario(usize),
    /// The active set is exhausted; results are available.
    Finished,
}

/// Outcome of an investigation tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub report: ToolReport,
    pub provenance: DataProvenance,
    pub newly_unlocked: Vec<AchievementId>,
}

/// One training session: configuration, scenario walk, and results.
pub struct GameSession {
    repository: ScenarioData,
    config: SessionConfig,
    /// Repository indices selected for this session, in play order.
    active: Vec<usize>,
    ledger: ProgressionLedger,
    phase: SessionPhase,
    seed: u64,
    rng: RngStreams,
    clock: Box<dyn SessionClock>,
    enrichment: Option<Box<dyn ToolEnrichment>>,
    events: Vec<SessionEvent>,
    session_started: Duration,
    scenario_started: Duration,
    report: Option<ResultsReport>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("seed", &self.seed)
            .field("active_len", &self.active.len())
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Create a session in the `Configuring` phase with the standard clock.
    #[must_use]
    pub fn new(repository: ScenarioData, seed: u64) -> Self {
        Self::with_clock(repository, seed, Box::new(SystemClock::default()))
    }

    /// Create a session with an injected clock.
    #[must_use]
    pub fn with_clock(repository: ScenarioData, seed: u64, clock: Box<dyn SessionClock>) -> Self {
        Self {
            repository,
            config: SessionConfig::default(),
            active: Vec::new(),
            ledger: ProgressionLedger::default(),
            phase: SessionPhase::Configuring,
            seed,
            rng: RngStreams::from_user_seed(seed),
            clock,
            enrichment: None,
            events: Vec::new(),
            session_started: Duration::ZERO,
            scenario_started: Duration::ZERO,
            report: None,
        }
    }

    /// Attach an enrichment provider for tool reports.
    pub fn set_enrichment(&mut self, provider: Box<dyn ToolEnrichment>) {
        self.enrichment = Some(provider);
    }

    /// Select quiz length and difficulty filter for the next start.
    ///
    /// # Errors
    ///
    /// Rejected outside the `Configuring` phase or with a zero quiz length.
    pub fn configure(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Configuring {
            return Err(SessionError::NotConfiguring);
        }
        if config.quiz_length == 0 {
            return Err(SessionError::InvalidQuizLength);
        }
        self.config = config;
        Ok(())
    }

    /// Begin training: derive the active set, reinitialize the ledger, and
    /// present the first scenario. An empty filtered set completes the
    /// session immediately with zero scenarios.
    ///
    /// # Errors
    ///
    /// Rejected outside the `Configuring` phase.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Configuring {
            return Err(SessionError::NotConfiguring);
        }

        self.active = select_active_set(&self.repository, &self.config, &mut *self.rng.shuffle());
        self.ledger.reset();
        self.events.clear();
        self.report = None;
        self.session_started = self.clock.now();
        self.scenario_started = self.session_started;

        self.push_event(
            EventKind::SessionStarted,
            EventSeverity::Info,
            serde_json::json!({
                "quiz_length": self.config.quiz_length,
                "difficulty": self.config.difficulty.as_str(),
                "active_len": self.active.len(),
            }),
        );

        if self.active.is_empty() {
            self.complete();
        } else {
            self.phase = SessionPhase::InProgress(AnswerPhase::AwaitingAnswer);
        }
        Ok(())
    }

    /// Scenario currently presented, if the session is in progress.
    #[must_use]
    pub fn current_scenario(&self) -> Option<&Scenario> {
        match self.phase {
            SessionPhase::InProgress(_) => self
                .active
                .get(self.ledger.scenario_index)
                .and_then(|&repo_index| self.repository.get(repo_index)),
            _ => None,
        }
    }

    /// Evaluate an answer for the current scenario.
    ///
    /// # Errors
    ///
    /// Rejected without any ledger mutation when no scenario is awaiting an
    /// answer, or when the option id does not belong to the scenario.
    pub fn submit_answer(&mut self, option_id: &str) -> Result<AnswerOutcome, SessionError> {
        match self.phase {
            SessionPhase::InProgress(AnswerPhase::AwaitingAnswer) => {}
            SessionPhase::InProgress(AnswerPhase::AwaitingAdvance) => {
                return Err(SessionError::AlreadyAnswered);
            }
            _ => return Err(SessionError::NotInProgress),
        }

        let active_index = self.ledger.scenario_index;
        let scenario = self
            .current_scenario()
            .ok_or(SessionError::NotInProgress)?;
        if !scenario.has_option(option_id) {
            return Err(SessionError::UnknownOption(option_id.to_string()));
        }

        let scenario_id = scenario.id;
        let correct = scenario.correct_option == option_id;
        let xp_reward = scenario.feedback.xp_reward;
        let skill = scenario.category.skill();
        let elapsed = self.clock.now().saturating_sub(self.scenario_started);

        let level_before = self.ledger.level;
        let skill_levels_before = self.skill_levels();

        let tally = self.ledger.record_answer(correct);
        let mut xp_awarded = 0;
        let mut speed_bonus = false;
        let mut newly_unlocked = Vec::new();

        if correct {
            self.ledger.add_xp(xp_reward, Some(skill));
            xp_awarded += xp_reward;

            if elapsed < SPEED_BONUS_WINDOW {
                self.ledger.add_xp(SPEED_BONUS_XP, None);
                xp_awarded += SPEED_BONUS_XP;
                speed_bonus = true;
                let speedrun = definition(AchievementId::Speedrun);
                if self.ledger.unlock(speedrun.id, speedrun.xp_reward) {
                    newly_unlocked.push(speedrun.id);
                }
            }
        }

        self.ledger.mark_completed(active_index);
        newly_unlocked.extend(achievements::evaluate(
            &mut self.ledger,
            &self.repository,
            &self.active,
        ));

        self.push_event(
            EventKind::AnswerEvaluated,
            if correct {
                EventSeverity::Info
            } else {
                EventSeverity::Warning
            },
            serde_json::json!({
                "scenario_id": scenario_id,
                "option": option_id,
                "correct": correct,
                "elapsed_ms": elapsed.as_millis() as u64,
                "xp_awarded": xp_awarded,
                "speed_bonus": speed_bonus,
                "streak": self.ledger.streak,
            }),
        );
        self.push_progress_events(level_before, skill_levels_before);
        self.push_unlock_events(&newly_unlocked);

        self.phase = SessionPhase::InProgress(AnswerPhase::AwaitingAdvance);
        Ok(AnswerOutcome {
            scenario_id,
            correct,
            xp_awarded,
            speed_bonus,
            elapsed,
            streak_broken: tally.streak_broken,
            newly_unlocked,
        })
    }

    /// Move past an answered scenario, completing the session when the
    /// active set is exhausted.
    ///
    /// # Errors
    ///
    /// Rejected when the current scenario has not been answered yet, or the
    /// session is not in progress.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        match self.phase {
            SessionPhase::InProgress(AnswerPhase::AwaitingAdvance) => {}
            SessionPhase::InProgress(AnswerPhase::AwaitingAnswer) => {
                return Err(SessionError::AnswerPending);
            }
            _ => return Err(SessionError::NotInProgress),
        }

        self.ledger.advance_scenario();
        if self.ledger.scenario_index >= self.active.len() {
            self.complete();
            Ok(AdvanceOutcome::Finished)
        } else {
            self.scenario_started = self.clock.now();
            self.phase = SessionPhase::InProgress(AnswerPhase::AwaitingAnswer);
            Ok(AdvanceOutcome::NextScenario(self.ledger.scenario_index))
        }
    }

    /// Run an investigation tool against the current scenario. Valid before
    /// or after answering; does not change the answer sub-phase.
    ///
    /// # Errors
    ///
    /// Rejected when the session is not in progress. Tool and enrichment
    /// failures never surface here; they degrade to simulated output.
    pub fn use_tool(&mut self, tool: ToolId) -> Result<ToolOutcome, SessionError> {
        let SessionPhase::InProgress(_) = self.phase else {
            return Err(SessionError::NotInProgress);
        };
        let scenario = self
            .current_scenario()
            .ok_or(SessionError::NotInProgress)?;
        let target = analysis_target(scenario);

        let level_before = self.ledger.level;
        let skill_levels_before = self.skill_levels();

        self.ledger.record_tool_use();
        self.ledger
            .add_xp(TOOL_USE_XP, Some(SkillId::TechnicalAuditing));

        let baseline = tools::analyze(tool, &target, &mut *self.rng.tools());
        let (report, provenance) = match self.enrichment.as_deref() {
            Some(provider) => enrich_or_baseline(provider, tool, baseline, &target),
            None => (baseline, DataProvenance::Simulated),
        };

        let newly_unlocked =
            achievements::evaluate(&mut self.ledger, &self.repository, &self.active);

        self.push_event(
            EventKind::ToolUsed,
            EventSeverity::Info,
            serde_json::json!({
                "tool": tool.as_str(),
                "target": target,
                "tier": report.tier.as_str(),
                "provenance": provenance.as_str(),
                "tools_used": self.ledger.tools_used,
            }),
        );
        self.push_progress_events(level_before, skill_levels_before);
        self.push_unlock_events(&newly_unlocked);

        Ok(ToolOutcome {
            report,
            provenance,
            newly_unlocked,
        })
    }

    /// Abandon or finish the session and return to configuration. The ledger
    /// and active set are discarded entirely; nothing partial survives.
    pub fn restart(&mut self) {
        self.active = Vec::new();
        self.ledger = ProgressionLedger::default();
        self.report = None;
        self.phase = SessionPhase::Configuring;
        self.events.clear();
        self.push_event(
            EventKind::SessionRestarted,
            EventSeverity::Info,
            serde_json::Value::Null,
        );
    }

    /// Deterministically reseed the session's RNG streams. Only meaningful
    /// while configuring; the active set of a running session is fixed.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = RngStreams::from_user_seed(seed);
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn ledger(&self) -> &ProgressionLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of scenarios selected for this session.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Repository indices of the active set, in play order.
    #[must_use]
    pub fn active_set(&self) -> &[usize] {
        &self.active
    }

    /// Event journal since the last start or restart.
    #[must_use]
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Results report, available once the session is completed.
    #[must_use]
    pub const fn results(&self) -> Option<&ResultsReport> {
        self.report.as_ref()
    }

    fn complete(&mut self) {
        let elapsed = self.clock.now().saturating_sub(self.session_started);
        let report = summarize(&self.ledger, self.active.len(), elapsed);
        self.push_event(
            EventKind::SessionCompleted,
            EventSeverity::Info,
            serde_json::json!({
                "accuracy": report.accuracy,
                "rank": report.rank,
                "elapsed_secs": report.elapsed_secs,
            }),
        );
        self.report = Some(report);
        self.phase = SessionPhase::Completed;
    }

    fn skill_levels(&self) -> [u32; 4] {
        let mut levels = [0; 4];
        for (slot, id) in SkillId::ALL.iter().enumerate() {
            levels[slot] = self.ledger.skills.track(*id).level;
        }
        levels
    }

    fn push_progress_events(&mut self, level_before: u32, skill_levels_before: [u32; 4]) {
        if self.ledger.level > level_before {
            let level = self.ledger.level;
            self.push_event(
                EventKind::LevelUp,
                EventSeverity::Info,
                serde_json::json!({ "level": level }),
            );
        }
        for (slot, id) in SkillId::ALL.iter().enumerate() {
            let level = self.ledger.skills.track(*id).level;
            if level > skill_levels_before[slot] {
                self.push_event(
                    EventKind::SkillLevelUp,
                    EventSeverity::Info,
                    serde_json::json!({ "skill": id.as_str(), "level": level }),
                );
            }
        }
    }

    fn push_unlock_events(&mut self, newly_unlocked: &[AchievementId]) {
        for id in newly_unlocked {
            let def = definition(*id);
            self.push_event(
                EventKind::AchievementUnlocked,
                EventSeverity::Info,
                serde_json::json!({
                    "id": def.id.as_str(),
                    "name": def.name,
                    "xp": def.xp_reward,
                }),
            );
        }
    }

    fn push_event(&mut self, kind: EventKind, severity: EventSeverity, payload: serde_json::Value) {
        let seq = u32::try_from(self.events.len()).unwrap_or(u32::MAX);
        self.events.push(SessionEvent {
            seq,
            kind,
            severity,
            payload,
        });
    }
}

/// Derive the investigation target from the current scenario's artifact:
/// URL or sender for email/website scenarios, recipient (or the zero
/// address) for transactions. Chat artifacts have no analyzable target; the
/// stubs surface the empty string as a format finding.
fn analysis_target(scenario: &Scenario) -> String {
    match &scenario.presentation {
        Presentation::Website { url, .. } => {
            if url.is_empty() {
                FALLBACK_ANALYSIS_URL.to_string()
            } else {
                url.clone()
            }
        }
        Presentation::Email { from, .. } => {
            if from.is_empty() {
                FALLBACK_ANALYSIS_URL.to_string()
            } else {
                from.clone()
            }
        }
        Presentation::Transaction { tx_data } => tx_data
            .to
            .clone()
            .unwrap_or_else(|| ZERO_ADDRESS.to_string()),
        Presentation::Chat { .. } => String::new(),
    }
}
