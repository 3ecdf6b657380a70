use serde::{Deserialize, Serialize};
use sim_core::{Notification, Outbox};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Highest level a skill can reach.
pub const MAX_SKILL_LEVEL: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    Charisma,
    Logistics,
    Negotiation,
    Handiness,
}

impl SkillKind {
    pub const ALL: [SkillKind; 4] = [
        SkillKind::Charisma,
        SkillKind::Logistics,
        SkillKind::Negotiation,
        SkillKind::Handiness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SkillKind::Charisma => "charisma",
            SkillKind::Logistics => "logistics",
            SkillKind::Negotiation => "negotiation",
            SkillKind::Handiness => "handiness",
        }
    }

    /// Experience granted by one use of the skill.
    pub fn use_experience(self) -> f32 {
        match self {
            SkillKind::Charisma => 10.0,
            SkillKind::Logistics => 15.0,
            SkillKind::Negotiation => 20.0,
            SkillKind::Handiness => 25.0,
        }
    }

    /// Gameplay bonus per level (charisma: satisfaction, logistics:
    /// efficiency, negotiation: deals, handiness: repair speed).
    pub fn bonus_per_level(self) -> f32 {
        match self {
            SkillKind::Charisma | SkillKind::Negotiation => 0.01,
            SkillKind::Logistics => 0.005,
            SkillKind::Handiness => 0.02,
        }
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SkillKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown skill: {s}"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub level: u32,
    pub experience: f32,
    pub experience_to_next: f32,
}

impl Default for Skill {
    fn default() -> Self {
        Self {
            level: 0,
            experience: 0.0,
            experience_to_next: 100.0,
        }
    }
}

/// The player's four developable skills.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSkills {
    skills: BTreeMap<SkillKind, Skill>,
    /// Multiplier from permanent bonuses.
    base_multiplier: f32,
    /// Additive bonus from the current home.
    gain_bonus: f32,
}

impl Default for PlayerSkills {
    fn default() -> Self {
        Self {
            skills: SkillKind::ALL.iter().map(|k| (*k, Skill::default())).collect(),
            base_multiplier: 1.0,
            gain_bonus: 0.0,
        }
    }
}

impl PlayerSkills {
    pub fn level(&self, kind: SkillKind) -> u32 {
        self.skills.get(&kind).map(|s| s.level).unwrap_or(0)
    }

    pub fn skill(&self, kind: SkillKind) -> Option<&Skill> {
        self.skills.get(&kind)
    }

    /// Sum of every skill level.
    pub fn total_level(&self) -> u32 {
        self.skills.values().map(|s| s.level).sum()
    }

    pub fn bonus(&self, kind: SkillKind) -> f32 {
        self.level(kind) as f32 * kind.bonus_per_level()
    }

    pub fn set_base_multiplier(&mut self, m: f32) {
        if m.is_finite() && m > 0.0 {
            self.base_multiplier = m;
        }
    }

    pub fn gain_bonus(&self) -> f32 {
        self.gain_bonus
    }

    pub fn set_gain_bonus(&mut self, bonus: f32) {
        self.gain_bonus = if bonus.is_finite() { bonus.max(0.0) } else { 0.0 };
    }

    /// Add experience scaled by `(base_multiplier + gain_bonus)`; returns
    /// how many levels were gained.
    pub fn gain_experience(&mut self, kind: SkillKind, amount: f32, outbox: &mut Outbox) -> u32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0;
        }
        let actual = amount * (self.base_multiplier + self.gain_bonus);
        let skill = self.skills.entry(kind).or_default();
        skill.experience += actual;
        let mut gained = 0;
        while skill.experience >= skill.experience_to_next && skill.level < MAX_SKILL_LEVEL {
            skill.experience -= skill.experience_to_next;
            skill.level += 1;
            skill.experience_to_next *= 1.2;
            gained += 1;
            outbox.push(Notification::SkillLeveledUp {
                skill: kind.name().to_string(),
                level: skill.level,
            });
        }
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_growing_curve() {
        let mut skills = PlayerSkills::default();
        let mut out = Outbox::default();
        assert_eq!(skills.gain_experience(SkillKind::Charisma, 100.0, &mut out), 1);
        let next = skills.skill(SkillKind::Charisma).map(|s| s.experience_to_next).unwrap_or(0.0);
        assert!((next - 120.0).abs() < 1e-3);
        assert_eq!(skills.gain_experience(SkillKind::Charisma, 119.0, &mut out), 0);
        assert_eq!(skills.gain_experience(SkillKind::Charisma, 2.0, &mut out), 1);
        assert_eq!(skills.total_level(), 2);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn home_bonus_speeds_gain() {
        let mut skills = PlayerSkills::default();
        let mut out = Outbox::default();
        skills.set_gain_bonus(0.25);
        assert_eq!(skills.gain_experience(SkillKind::Handiness, 80.0, &mut out), 1);
    }

    #[test]
    fn level_is_capped() {
        let mut skills = PlayerSkills::default();
        let mut out = Outbox::default();
        skills.gain_experience(SkillKind::Logistics, 1.0e30, &mut out);
        assert_eq!(skills.level(SkillKind::Logistics), MAX_SKILL_LEVEL);
    }

    #[test]
    fn parses_names() {
        assert_eq!("Negotiation".parse::<SkillKind>(), Ok(SkillKind::Negotiation));
        assert!("juggling".parse::<SkillKind>().is_err());
    }
}
