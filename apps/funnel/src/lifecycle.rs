//! Job lifecycle state machine.
//!
//! `scraped → {qualified, disqualified} → generated → applied → {rejected, interview}`,
//! with an absorbing `error` state reachable from any stage. The store's
//! conditional updates (status guard, `generated_at IS NULL`) are the sole
//! concurrency primitive; this module only defines which transitions are legal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Just scraped, pending scoring.
    Scraped,
    /// Passed qualification, ready for document generation.
    Qualified,
    /// Failed qualification; never adjudicated or generated.
    Disqualified,
    /// Application documents generated.
    Generated,
    /// Application submitted.
    Applied,
    /// Application rejected.
    Rejected,
    /// Got an interview.
    Interview,
    /// Unhandled processing failure; operators may manually reset to retry.
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Scraped => "scraped",
            JobStatus::Qualified => "qualified",
            JobStatus::Disqualified => "disqualified",
            JobStatus::Generated => "generated",
            JobStatus::Applied => "applied",
            JobStatus::Rejected => "rejected",
            JobStatus::Interview => "interview",
            JobStatus::Error => "error",
        }
    }

    /// Returns true if moving from `self` to `to` is a legal lifecycle step.
    ///
    /// `Error` is reachable from any non-error state. Transitions to the same
    /// state are not legal; idempotent stages must no-op before transitioning.
    pub fn can_transition(&self, to: JobStatus) -> bool {
        if to == JobStatus::Error {
            return *self != JobStatus::Error;
        }
        matches!(
            (self, to),
            (JobStatus::Scraped, JobStatus::Qualified)
                | (JobStatus::Scraped, JobStatus::Disqualified)
                | (JobStatus::Qualified, JobStatus::Generated)
                | (JobStatus::Generated, JobStatus::Applied)
                | (JobStatus::Applied, JobStatus::Rejected)
                | (JobStatus::Applied, JobStatus::Interview)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scraped" => Ok(JobStatus::Scraped),
            "qualified" => Ok(JobStatus::Qualified),
            "disqualified" => Ok(JobStatus::Disqualified),
            "generated" => Ok(JobStatus::Generated),
            "applied" => Ok(JobStatus::Applied),
            "rejected" => Ok(JobStatus::Rejected),
            "interview" => Ok(JobStatus::Interview),
            "error" => Ok(JobStatus::Error),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Submitted,
    Failed,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Failed => "failed",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraped_branches_to_qualified_and_disqualified() {
        assert!(JobStatus::Scraped.can_transition(JobStatus::Qualified));
        assert!(JobStatus::Scraped.can_transition(JobStatus::Disqualified));
    }

    #[test]
    fn test_disqualified_never_generates() {
        assert!(!JobStatus::Disqualified.can_transition(JobStatus::Generated));
        assert!(!JobStatus::Disqualified.can_transition(JobStatus::Qualified));
    }

    #[test]
    fn test_generation_requires_qualified() {
        assert!(JobStatus::Qualified.can_transition(JobStatus::Generated));
        assert!(!JobStatus::Scraped.can_transition(JobStatus::Generated));
    }

    #[test]
    fn test_applied_branches() {
        assert!(JobStatus::Applied.can_transition(JobStatus::Rejected));
        assert!(JobStatus::Applied.can_transition(JobStatus::Interview));
        assert!(!JobStatus::Generated.can_transition(JobStatus::Interview));
    }

    #[test]
    fn test_error_reachable_from_any_stage() {
        for from in [
            JobStatus::Scraped,
            JobStatus::Qualified,
            JobStatus::Disqualified,
            JobStatus::Generated,
            JobStatus::Applied,
        ] {
            assert!(from.can_transition(JobStatus::Error), "from {from}");
        }
    }

    #[test]
    fn test_error_is_absorbing() {
        assert!(!JobStatus::Error.can_transition(JobStatus::Error));
        assert!(!JobStatus::Error.can_transition(JobStatus::Scraped));
        assert!(!JobStatus::Error.can_transition(JobStatus::Qualified));
    }

    #[test]
    fn test_self_transition_is_illegal() {
        assert!(!JobStatus::Generated.can_transition(JobStatus::Generated));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            JobStatus::Scraped,
            JobStatus::Qualified,
            JobStatus::Disqualified,
            JobStatus::Generated,
            JobStatus::Applied,
            JobStatus::Rejected,
            JobStatus::Interview,
            JobStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
    }
}
