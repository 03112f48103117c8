//! Pure aggregation of a user's sessions into an analytics report.
//!
//! Everything here works on already-loaded sessions; the service layer owns the
//! storage round-trips. Means are carried as `f64` until the report is assembled
//! and only then rounded half-up for presentation.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::insights::{HistoryInput, WEAKNESS_THRESHOLD, generate_insights};
use crate::model::{InterviewSession, JobRole, SessionCategory, SessionId, SessionStatus};
use crate::scoring::{mean, round_half_up};
use crate::time::{days_ago, months_ago};

pub const PROGRESS_WINDOW_MONTHS: u32 = 6;
pub const RECENT_SESSIONS_WINDOW_DAYS: i64 = 30;
pub const RECENT_SESSIONS_LIMIT: usize = 10;
pub const RECENT_ACTIVITY_WINDOW_DAYS: i64 = 7;

pub const WEAK_CATEGORY_IMPROVEMENT: &str = "Focus more on this area";

//
// ─── REPORT TYPES ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub mean: f64,
    pub max: u8,
    pub min: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_interviews: usize,
    pub completed_interviews: usize,
    /// Percentage of sessions completed, 0 when there are none.
    pub completion_rate: u8,
    pub avg_score: Option<u8>,
    pub highest_score: Option<u8>,
    pub lowest_score: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformance {
    pub category: SessionCategory,
    pub avg_score: u8,
    pub interviews_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePerformance {
    pub role: JobRole,
    pub avg_score: u8,
    pub interviews_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProgress {
    /// `YYYY-MM`
    pub month: String,
    pub avg_score: u8,
    pub interviews_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakCategory {
    pub category: SessionCategory,
    pub avg_score: u8,
    pub improvement: String,
}

/// Lightweight view of a recently created session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSession {
    pub id: SessionId,
    pub role: JobRole,
    pub category: SessionCategory,
    pub total_score: u8,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&InterviewSession> for RecentSession {
    fn from(session: &InterviewSession) -> Self {
        Self {
            id: session.id(),
            role: session.role(),
            category: session.category(),
            total_score: session.total_score(),
            status: session.status(),
            created_at: session.created_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub overview: Overview,
    pub category_performance: Vec<CategoryPerformance>,
    pub role_performance: Vec<RolePerformance>,
    pub progress_over_time: Vec<MonthlyProgress>,
    pub weak_categories: Vec<WeakCategory>,
    pub recent_activity_count: u64,
    pub recent_sessions: Vec<RecentSession>,
    pub insights: Vec<String>,
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
struct GroupStat<K> {
    key: K,
    mean: f64,
    count: usize,
}

fn group_scores<'a, K, F>(
    sessions: impl Iterator<Item = &'a InterviewSession>,
    key: F,
) -> Vec<GroupStat<K>>
where
    K: Ord + Copy,
    F: Fn(&InterviewSession) -> K,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for session in sessions {
        groups
            .entry(key(session))
            .or_default()
            .push(f64::from(session.total_score()));
    }
    groups
        .into_iter()
        .filter_map(|(key, scores)| {
            let count = scores.len();
            mean(scores).map(|mean| GroupStat { key, mean, count })
        })
        .collect()
}

/// Round a mean of scores in `0..=100` for presentation.
fn present(mean: f64) -> u8 {
    u8::try_from(round_half_up(mean).clamp(0, 100)).unwrap_or(0)
}

/// Share of completed sessions as a rounded percentage, 0 when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    present(completed as f64 * 100.0 / total as f64)
}

/// Mean, max and min `total_score` over completed sessions.
#[must_use]
pub fn score_stats(sessions: &[InterviewSession]) -> Option<ScoreStats> {
    let scores: Vec<u8> = sessions
        .iter()
        .filter(|s| s.is_completed())
        .map(InterviewSession::total_score)
        .collect();
    let mean = mean(scores.iter().copied().map(f64::from))?;
    Some(ScoreStats {
        mean,
        max: scores.iter().copied().max()?,
        min: scores.iter().copied().min()?,
    })
}

fn category_stats(sessions: &[InterviewSession]) -> Vec<GroupStat<SessionCategory>> {
    let mut stats = group_scores(
        sessions.iter().filter(|s| s.is_completed()),
        InterviewSession::category,
    );
    stats.sort_by(|a, b| {
        b.mean
            .total_cmp(&a.mean)
            .then_with(|| a.key.as_str().cmp(b.key.as_str()))
    });
    stats
}

fn role_stats(sessions: &[InterviewSession]) -> Vec<GroupStat<JobRole>> {
    let mut stats = group_scores(
        sessions.iter().filter(|s| s.is_completed()),
        InterviewSession::role,
    );
    stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.key.as_str().cmp(b.key.as_str()))
    });
    stats
}

fn monthly_progress(sessions: &[InterviewSession], now: DateTime<Utc>) -> Vec<MonthlyProgress> {
    let since = months_ago(now, PROGRESS_WINDOW_MONTHS);
    // BTreeMap ordering on (year, month) is chronological.
    group_scores(
        sessions
            .iter()
            .filter(|s| s.is_completed() && s.created_at() >= since),
        |s| (s.created_at().year(), s.created_at().month()),
    )
    .into_iter()
    .map(|stat| MonthlyProgress {
        month: format!("{:04}-{:02}", stat.key.0, stat.key.1),
        avg_score: present(stat.mean),
        interviews_count: stat.count,
    })
    .collect()
}

fn recent_sessions(sessions: &[InterviewSession], now: DateTime<Utc>) -> Vec<RecentSession> {
    let since = days_ago(now, RECENT_SESSIONS_WINDOW_DAYS);
    let mut recent: Vec<&InterviewSession> = sessions
        .iter()
        .filter(|s| s.created_at() >= since)
        .collect();
    recent.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    recent
        .into_iter()
        .take(RECENT_SESSIONS_LIMIT)
        .map(RecentSession::from)
        .collect()
}

/// Build the full report for one user's sessions.
///
/// `sessions` must all belong to the same user and may arrive in any order.
/// `recent_activity_count` is the number of activity records in the last
/// [`RECENT_ACTIVITY_WINDOW_DAYS`] days, counted by the caller.
#[must_use]
pub fn build_report(
    sessions: &[InterviewSession],
    recent_activity_count: u64,
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let total = sessions.len();
    let completed = sessions.iter().filter(|s| s.is_completed()).count();
    let stats = score_stats(sessions);
    let categories = category_stats(sessions);
    let roles = role_stats(sessions);

    let weak: Vec<&GroupStat<SessionCategory>> = categories
        .iter()
        .filter(|c| c.mean < WEAKNESS_THRESHOLD)
        .collect();

    let insights = generate_insights(&HistoryInput {
        total_interviews: total,
        average_score: stats.map(|s| s.mean),
        score_range: stats.map(|s| (s.max, s.min)),
        best_category: categories.first().map(|c| c.key),
        weak_categories: weak.iter().map(|c| c.key).collect(),
    });

    AnalyticsReport {
        overview: Overview {
            total_interviews: total,
            completed_interviews: completed,
            completion_rate: completion_rate(completed, total),
            avg_score: stats.map(|s| present(s.mean)),
            highest_score: stats.map(|s| s.max),
            lowest_score: stats.map(|s| s.min),
        },
        weak_categories: weak
            .iter()
            .map(|c| WeakCategory {
                category: c.key,
                avg_score: present(c.mean),
                improvement: WEAK_CATEGORY_IMPROVEMENT.to_string(),
            })
            .collect(),
        category_performance: categories
            .iter()
            .map(|c| CategoryPerformance {
                category: c.key,
                avg_score: present(c.mean),
                interviews_count: c.count,
            })
            .collect(),
        role_performance: roles
            .iter()
            .map(|r| RolePerformance {
                role: r.key,
                avg_score: present(r.mean),
                interviews_count: r.count,
            })
            .collect(),
        progress_over_time: monthly_progress(sessions, now),
        recent_activity_count,
        recent_sessions: recent_sessions(sessions, now),
        insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::FIRST_INTERVIEW_PROMPT;
    use crate::model::{SessionDraft, UserId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn session(
        id: u64,
        role: JobRole,
        category: SessionCategory,
        score: i64,
        status: SessionStatus,
        created_at: DateTime<Utc>,
    ) -> InterviewSession {
        let mut draft = SessionDraft::new(role, category, 30);
        draft.total_score = Some(score);
        let mut s = draft
            .validate(UserId::new(1), created_at)
            .unwrap()
            .assign_id(SessionId::new(id));
        s.set_status(status);
        s
    }

    fn completed(id: u64, category: SessionCategory, score: i64) -> InterviewSession {
        session(
            id,
            JobRole::SoftwareEngineer,
            category,
            score,
            SessionStatus::Completed,
            fixed_now() - Duration::days(1),
        )
    }

    #[test]
    fn empty_history() {
        let report = build_report(&[], 0, fixed_now());
        assert_eq!(report.overview.total_interviews, 0);
        assert_eq!(report.overview.completion_rate, 0);
        assert_eq!(report.overview.avg_score, None);
        assert!(report.category_performance.is_empty());
        assert!(report.progress_over_time.is_empty());
        assert_eq!(report.insights, [FIRST_INTERVIEW_PROMPT]);
    }

    #[test]
    fn completion_rate_rounds() {
        let sessions = [
            completed(1, SessionCategory::Technical, 70),
            session(
                2,
                JobRole::SoftwareEngineer,
                SessionCategory::Technical,
                0,
                SessionStatus::InProgress,
                fixed_now(),
            ),
            session(
                3,
                JobRole::SoftwareEngineer,
                SessionCategory::Technical,
                0,
                SessionStatus::Abandoned,
                fixed_now(),
            ),
        ];
        let report = build_report(&sessions, 0, fixed_now());
        assert_eq!(report.overview.completed_interviews, 1);
        assert_eq!(report.overview.completion_rate, 33);
        assert_eq!(completion_rate(2, 3), 67);
    }

    #[test]
    fn weak_category_detected() {
        let sessions = [
            completed(1, SessionCategory::Technical, 85),
            completed(2, SessionCategory::SystemDesign, 55),
        ];
        let report = build_report(&sessions, 0, fixed_now());
        assert_eq!(
            report.weak_categories,
            [WeakCategory {
                category: SessionCategory::SystemDesign,
                avg_score: 55,
                improvement: WEAK_CATEGORY_IMPROVEMENT.to_string(),
            }]
        );
        assert_eq!(
            report.category_performance[0].category,
            SessionCategory::Technical
        );
        assert!(
            report
                .insights
                .contains(&"You perform best in Technical interviews.".to_string())
        );
        assert!(
            report
                .insights
                .contains(&"Consider focusing more on: System Design".to_string())
        );
    }

    #[test]
    fn best_category_tie_breaks_by_name() {
        let sessions = [
            completed(1, SessionCategory::Technical, 80),
            completed(2, SessionCategory::Behavioral, 80),
        ];
        let report = build_report(&sessions, 0, fixed_now());
        assert_eq!(
            report.category_performance[0].category,
            SessionCategory::Behavioral
        );
    }

    #[test]
    fn score_stats_ignore_unfinished_sessions() {
        let sessions = [
            completed(1, SessionCategory::Dsa, 90),
            completed(2, SessionCategory::Dsa, 59),
            session(
                3,
                JobRole::SoftwareEngineer,
                SessionCategory::Dsa,
                5,
                SessionStatus::InProgress,
                fixed_now(),
            ),
        ];
        let report = build_report(&sessions, 0, fixed_now());
        assert_eq!(report.overview.avg_score, Some(75)); // 74.5 rounds up
        assert_eq!(report.overview.highest_score, Some(90));
        assert_eq!(report.overview.lowest_score, Some(59));
        assert!(report.insights.iter().any(|s| s.starts_with("Your performance varies")));
    }

    #[test]
    fn variance_remark_boundary() {
        let even = [
            completed(1, SessionCategory::Dsa, 90),
            completed(2, SessionCategory::Dsa, 60),
        ];
        let report = build_report(&even, 0, fixed_now());
        assert!(!report.insights.iter().any(|s| s.starts_with("Your performance varies")));

        let spread = [
            completed(1, SessionCategory::Dsa, 90),
            completed(2, SessionCategory::Dsa, 59),
        ];
        let report = build_report(&spread, 0, fixed_now());
        assert!(report.insights.iter().any(|s| s.starts_with("Your performance varies")));
    }

    #[test]
    fn roles_sorted_by_count() {
        let mk = |id, role, score| {
            session(
                id,
                role,
                SessionCategory::Technical,
                score,
                SessionStatus::Completed,
                fixed_now(),
            )
        };
        let sessions = [
            mk(1, JobRole::DataScientist, 95),
            mk(2, JobRole::BackendDeveloper, 60),
            mk(3, JobRole::BackendDeveloper, 70),
        ];
        let report = build_report(&sessions, 0, fixed_now());
        assert_eq!(report.role_performance[0].role, JobRole::BackendDeveloper);
        assert_eq!(report.role_performance[0].interviews_count, 2);
        assert_eq!(report.role_performance[0].avg_score, 65);
        assert_eq!(report.role_performance[1].role, JobRole::DataScientist);
    }

    #[test]
    fn monthly_progress_is_chronological_and_windowed() {
        let now = fixed_now(); // 2023-11-14
        let at = |days| now - Duration::days(days);
        let mk = |id, score, created| {
            session(
                id,
                JobRole::SoftwareEngineer,
                SessionCategory::Technical,
                score,
                SessionStatus::Completed,
                created,
            )
        };
        let sessions = [
            mk(1, 80, at(1)),
            mk(2, 60, at(40)),
            mk(3, 71, at(45)),
            mk(4, 99, at(400)),
        ];
        let report = build_report(&sessions, 0, now);
        let months: Vec<&str> = report
            .progress_over_time
            .iter()
            .map(|p| p.month.as_str())
            .collect();
        assert_eq!(months, ["2023-09", "2023-10", "2023-11"]);
        assert_eq!(report.progress_over_time[0].avg_score, 71);
        assert_eq!(report.progress_over_time[2].interviews_count, 1);
    }

    #[test]
    fn recent_sessions_newest_first_and_capped() {
        let sessions: Vec<InterviewSession> = (0..12)
            .map(|i| {
                session(
                    i,
                    JobRole::ProductManager,
                    SessionCategory::Behavioral,
                    50,
                    SessionStatus::InProgress,
                    fixed_now() - Duration::days(i64::try_from(i).unwrap()),
                )
            })
            .chain(std::iter::once(session(
                99,
                JobRole::ProductManager,
                SessionCategory::Behavioral,
                50,
                SessionStatus::InProgress,
                fixed_now() - Duration::days(31),
            )))
            .collect();
        let report = build_report(&sessions, 4, fixed_now());
        assert_eq!(report.recent_sessions.len(), RECENT_SESSIONS_LIMIT);
        assert_eq!(report.recent_sessions[0].id, SessionId::new(0));
        assert!(report.recent_sessions.iter().all(|s| s.id != SessionId::new(99)));
        assert_eq!(report.recent_activity_count, 4);
    }
}
