use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::date::CalendarDate;
use super::error::ProgressError;
use super::streak::compute_streaks;
use crate::models::{ChallengeKind, Checkin, Participation};

/// A completed challenge as shown on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trophy {
    pub challenge_id: i64,
    pub title: String,
    pub kind: ChallengeKind,
    pub duration_days: i64,
    pub completed_at: String,
}

impl Trophy {
    pub fn from_participation(p: &Participation, completed_at: String) -> Self {
        Self {
            challenge_id: p.challenge.id,
            title: p.challenge.title.clone(),
            kind: p.challenge.kind,
            duration_days: p.challenge.duration_days,
            completed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProgress {
    pub active_days_total: u32,
    pub streak_current: u32,
    pub streak_best: u32,
    pub challenges_completed_total: u32,
    pub trophies_preview: Vec<Trophy>,
}

/// Folds the check-in history and completed challenges into one summary.
pub fn summarize<I, S>(
    date_keys: I,
    mut trophies: Vec<Trophy>,
    today: CalendarDate,
    preview_len: usize,
) -> Result<ProfileProgress, ProgressError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let streaks = compute_streaks(date_keys, today)?;

    // Newest first
    trophies.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    let total = trophies.len() as u32;
    trophies.truncate(preview_len);

    debug!(
        "profile summary: {} active days, streak {}/{}, {} trophies",
        streaks.active_days, streaks.current, streaks.best, total
    );

    Ok(ProfileProgress {
        active_days_total: streaks.active_days,
        streak_current: streaks.current,
        streak_best: streaks.best,
        challenges_completed_total: total,
        trophies_preview: trophies,
    })
}

/// Infers completed challenges from raw check-ins.
///
/// A challenge counts once it has at least `duration_days` distinct check-in
/// days. Its completion time is the latest check-in, or the challenge's end
/// date when no timestamp is available.
pub fn derive_trophies(participations: &[Participation], checkins: &[Checkin]) -> Vec<Trophy> {
    let mut days_by_challenge: HashMap<i64, BTreeSet<CalendarDate>> = HashMap::new();
    let mut last_by_challenge: HashMap<i64, &str> = HashMap::new();

    for c in checkins {
        days_by_challenge
            .entry(c.challenge_id)
            .or_default()
            .insert(c.date_key);
        let last = last_by_challenge
            .entry(c.challenge_id)
            .or_insert(c.completed_at.as_str());
        if c.completed_at.as_str() > *last {
            *last = c.completed_at.as_str();
        }
    }

    participations
        .iter()
        .filter_map(|p| {
            let id = p.challenge.id;
            let distinct = days_by_challenge.get(&id).map_or(0, |d| d.len()) as i64;
            if distinct < p.challenge.duration_days {
                return None;
            }
            let completed_at = last_by_challenge
                .get(&id)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .unwrap_or_else(|| p.challenge.end_date.to_string());
            Some(Trophy::from_participation(p, completed_at))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Challenge, ChallengeStatus, ParticipantStatus};

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn participation(id: i64, title: &str, days: i64) -> Participation {
        let start = date("2024-05-01");
        Participation {
            challenge: Challenge {
                id,
                title: title.to_string(),
                kind: ChallengeKind::Reading,
                duration_days: days,
                start_date: start,
                end_date: start.add_days(days).unwrap(),
                status: ChallengeStatus::Active,
                created_at: "2024-05-01T08:00:00Z".to_string(),
            },
            status: ParticipantStatus::Active,
            joined_at: "2024-05-01T08:00:00Z".to_string(),
            progress: 0,
        }
    }

    fn checkin(challenge_id: i64, day: &str, at: &str) -> Checkin {
        Checkin {
            id: None,
            challenge_id,
            date_key: date(day),
            completed_at: at.to_string(),
            day_index: None,
            reflection: None,
        }
    }

    fn trophy(id: i64, completed_at: &str) -> Trophy {
        Trophy {
            challenge_id: id,
            title: format!("challenge {id}"),
            kind: ChallengeKind::Fasting,
            duration_days: 3,
            completed_at: completed_at.to_string(),
        }
    }

    #[test]
    fn summary_combines_streaks_and_trophies() {
        let keys = ["2024-05-10", "2024-05-09", "2024-05-09", "2024-05-01"];
        let trophies = vec![
            trophy(1, "2024-04-01T10:00:00Z"),
            trophy(2, "2024-05-03T10:00:00Z"),
        ];
        let p = summarize(keys, trophies, date("2024-05-10"), 6).unwrap();
        assert_eq!(p.active_days_total, 3);
        assert_eq!(p.streak_current, 2);
        assert_eq!(p.streak_best, 2);
        assert_eq!(p.challenges_completed_total, 2);
        let ids: Vec<i64> = p.trophies_preview.iter().map(|t| t.challenge_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn preview_is_truncated_but_total_is_not() {
        let trophies = (1..=8)
            .map(|i| trophy(i, &format!("2024-05-{:02}T00:00:00Z", i)))
            .collect();
        let empty: [&str; 0] = [];
        let p = summarize(empty, trophies, date("2024-06-01"), 6).unwrap();
        assert_eq!(p.challenges_completed_total, 8);
        assert_eq!(p.trophies_preview.len(), 6);
        assert_eq!(p.trophies_preview[0].challenge_id, 8);
        assert_eq!((p.streak_current, p.streak_best, p.active_days_total), (0, 0, 0));
    }

    #[test]
    fn summary_propagates_bad_dates() {
        let err = summarize(["not-a-date"], vec![], date("2024-06-01"), 6).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidDate { .. }));
    }

    #[test]
    fn derives_trophy_when_distinct_days_reach_duration() {
        let parts = vec![participation(1, "Psalms", 2), participation(2, "Silence", 3)];
        let checkins = vec![
            checkin(1, "2024-05-01", "2024-05-01T07:00:00Z"),
            checkin(1, "2024-05-02", "2024-05-02T21:30:00Z"),
            checkin(2, "2024-05-01", "2024-05-01T07:05:00Z"),
            checkin(2, "2024-05-01", "2024-05-01T09:00:00Z"),
            checkin(2, "2024-05-02", "2024-05-02T07:05:00Z"),
        ];
        let trophies = derive_trophies(&parts, &checkins);
        assert_eq!(trophies.len(), 1);
        assert_eq!(trophies[0].challenge_id, 1);
        assert_eq!(trophies[0].title, "Psalms");
        assert_eq!(trophies[0].completed_at, "2024-05-02T21:30:00Z");
    }

    #[test]
    fn falls_back_to_end_date_without_timestamp() {
        let parts = vec![participation(5, "Fast", 1)];
        let checkins = vec![checkin(5, "2024-05-01", "")];
        let trophies = derive_trophies(&parts, &checkins);
        assert_eq!(trophies[0].completed_at, "2024-05-02");
    }
}
