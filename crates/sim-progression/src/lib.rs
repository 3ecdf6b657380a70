#![deny(warnings)]

//! Progression layer for Market Hustle: achievements, daily challenges,
//! aspirations, prestige, the seasonal pass and player skills, bundled in
//! the [`ProgressionTracker`] resource.

pub mod achievements;
pub mod aspirations;
pub mod challenges;
pub mod prestige;
pub mod season;
pub mod skills;
pub mod tracker;

pub use achievements::Achievements;
pub use aspirations::{AspirationState, Aspirations};
pub use challenges::{ChallengeProgress, DailyChallenges};
pub use prestige::{claimed_slugs, store_bonus, stored_level, Prestige, PrestigeModifiers};
pub use season::SeasonPass;
pub use skills::{PlayerSkills, Skill, SkillKind, MAX_SKILL_LEVEL};
pub use tracker::ProgressionTracker;
