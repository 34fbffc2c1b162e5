//! Centralized balance and tuning constants for the Scamwise core loop.
//!
//! These values define the deterministic math for scoring and progression.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

use std::time::Duration;

// Player progression --------------------------------------------------------
pub(crate) const LEVEL_XP_STEP: u32 = 500;
pub(crate) const SKILL_BASE_THRESHOLD: u32 = 100;

// Per-answer rewards --------------------------------------------------------
pub(crate) const SPEED_BONUS_XP: u32 = 50;
pub(crate) const SPEED_BONUS_WINDOW: Duration = Duration::from_secs(30);
pub(crate) const TOOL_USE_XP: u32 = 10;

// Session configuration -----------------------------------------------------
pub(crate) const DEFAULT_QUIZ_LENGTH: usize = 30;

// Investigation tool targets ------------------------------------------------
pub(crate) const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub(crate) const FALLBACK_ANALYSIS_URL: &str = "https://example.com";
