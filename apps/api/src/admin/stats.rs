//! Hiring pipeline statistics for the admin dashboard.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::models::application::ApplicationStatus;

/// Bucket for applications whose status column is NULL.
const UNKNOWN_STATUS: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_jobs: i64,
    pub total_applications: i64,
    pub hired_count: i64,
    pub rejected_count: i64,
    pub shortlisted_count: i64,
    pub interview_scheduled_count: i64,
    pub offer_sent_count: i64,
    pub status_breakdown: BTreeMap<String, i64>,
}

/// Folds per-status counts into the dashboard summary. Statuses without
/// applications are absent from the breakdown and count as 0.
pub fn build_stats(
    total_jobs: i64,
    total_applications: i64,
    status_counts: Vec<(Option<String>, i64)>,
) -> AdminStats {
    let mut status_breakdown = BTreeMap::new();
    for (status, count) in status_counts {
        let key = status.unwrap_or_else(|| UNKNOWN_STATUS.to_string());
        *status_breakdown.entry(key).or_insert(0) += count;
    }
    let count_of =
        |status: ApplicationStatus| status_breakdown.get(status.as_str()).copied().unwrap_or(0);

    AdminStats {
        total_jobs,
        total_applications,
        hired_count: count_of(ApplicationStatus::Hired),
        rejected_count: count_of(ApplicationStatus::Rejected),
        shortlisted_count: count_of(ApplicationStatus::Shortlisted),
        interview_scheduled_count: count_of(ApplicationStatus::InterviewScheduled),
        offer_sent_count: count_of(ApplicationStatus::OfferSent),
        status_breakdown,
    }
}

pub async fn load_stats(pool: &PgPool) -> sqlx::Result<AdminStats> {
    let total_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await?;
    let total_applications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications")
        .fetch_one(pool)
        .await?;
    let status_counts: Vec<(Option<String>, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM applications GROUP BY status")
            .fetch_all(pool)
            .await?;

    Ok(build_stats(total_jobs, total_applications, status_counts))
}
