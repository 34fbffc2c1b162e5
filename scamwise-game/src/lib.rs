//! Scamwise Game Engine
//!
//! Platform-agnostic core logic for the Scamwise crypto-scam recognition
//! trainer. This crate drives scenario progression, answer evaluation,
//! XP/level/skill progression, achievements, investigation tool stubs, and
//! results — without UI or platform-specific dependencies. Rendering, audio,
//! and any live data fetching live in the consuming shell.

pub mod achievements;
pub mod config;
pub mod constants;
pub mod data;
pub mod enrich;
pub mod event;
pub mod ledger;
pub mod results;
pub mod session;
pub mod tools;

// Re-export commonly used types
pub use achievements::{AchievementDef, AchievementId, CATALOG, definition, evaluate};
pub use config::{DifficultyFilter, QUIZ_LENGTHS, SessionConfig, select_active_set};
pub use data::{
    AnswerOption, Category, ChatMessage, DataError, Difficulty, Feedback, Presentation, Scenario,
    ScenarioData, ToolList, TxField, TxSummary,
};
pub use enrich::{
    DataProvenance, EnrichedData, EnrichmentError, ToolEnrichment, enrich_or_baseline,
    merge_enrichment,
};
pub use event::{EventKind, EventSeverity, SessionEvent};
pub use ledger::{AnswerTally, ProgressionLedger, SkillId, SkillSet, SkillTrack, XpGrant};
pub use results::{Rank, ResultsReport, SkillProgress, summarize};
pub use session::{
    AdvanceOutcome, AnswerOutcome, AnswerPhase, GameSession, ManualClock, RngStreams,
    SessionClock, SessionError, SessionPhase, SystemClock, ToolOutcome,
};
pub use tools::{RiskTier, ToolId, ToolReport, analyze, is_address};

/// Trait for abstracting scenario data loading operations.
/// Platform-specific implementations should provide this.
pub trait ScenarioLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the scenario repository from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario data cannot be loaded.
    fn load_scenarios(&self) -> Result<ScenarioData, Self::Error>;
}

/// Entry point binding a scenario loader to session construction.
pub struct TrainingEngine<L>
where
    L: ScenarioLoader,
{
    loader: L,
}

impl<L> TrainingEngine<L>
where
    L: ScenarioLoader,
{
    /// Create a new engine with the provided scenario loader.
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load and validate the scenario repository, then build a configured
    /// session ready to start.
    ///
    /// # Errors
    ///
    /// Returns an error if scenario data cannot be loaded, fails validation,
    /// or the configuration is rejected.
    pub fn create_session(
        &self,
        config: SessionConfig,
        seed: u64,
    ) -> Result<GameSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let data = self.loader.load_scenarios().map_err(Into::into)?;
        data.validate()?;
        let mut session = GameSession::new(data, seed);
        session.configure(config)?;
        Ok(session)
    }
}
