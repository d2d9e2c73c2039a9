use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::progress::CalendarDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Reading,
    Meditation,
    Fasting,
    Communion,
}

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Reading => "reading",
            ChallengeKind::Meditation => "meditation",
            ChallengeKind::Fasting => "fasting",
            ChallengeKind::Communion => "communion",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChallengeKind::Reading => "Reading",
            ChallengeKind::Meditation => "Meditation",
            ChallengeKind::Fasting => "Fasting",
            ChallengeKind::Communion => "Communion",
        }
    }
}

impl std::fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ChallengeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reading" => Ok(ChallengeKind::Reading),
            "meditation" => Ok(ChallengeKind::Meditation),
            "fasting" => Ok(ChallengeKind::Fasting),
            "communion" => Ok(ChallengeKind::Communion),
            _ => Err(anyhow::anyhow!("Unknown challenge kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Active,
    Completed,
    Canceled,
}

impl ChallengeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Active => "active",
            ChallengeStatus::Completed => "completed",
            ChallengeStatus::Canceled => "canceled",
        }
    }
}

impl FromStr for ChallengeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ChallengeStatus::Active),
            "completed" => Ok(ChallengeStatus::Completed),
            "canceled" => Ok(ChallengeStatus::Canceled),
            _ => Err(anyhow::anyhow!("Unknown challenge status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Active,
    Quit,
    Completed,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Active => "active",
            ParticipantStatus::Quit => "quit",
            ParticipantStatus::Completed => "completed",
        }
    }
}

impl FromStr for ParticipantStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ParticipantStatus::Active),
            "quit" => Ok(ParticipantStatus::Quit),
            "completed" => Ok(ParticipantStatus::Completed),
            _ => Err(anyhow::anyhow!("Unknown participant status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: i64,
    pub title: String,
    pub kind: ChallengeKind,
    pub duration_days: i64,
    pub start_date: CalendarDate,
    /// `start_date + duration_days`
    pub end_date: CalendarDate,
    pub status: ChallengeStatus,
    pub created_at: String,
}

/// The local user's membership in a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participation {
    pub challenge: Challenge,
    pub status: ParticipantStatus,
    pub joined_at: String,
    /// Number of days checked in so far
    pub progress: i64,
}
