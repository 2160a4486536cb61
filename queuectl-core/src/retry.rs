//! Retry/backoff/DLQ policy
//!
//! Pure decision function applied when a job execution fails. The store
//! writes whatever this function decides; the function itself touches no I/O
//! so the policy can be tested exhaustively.

use chrono::{DateTime, Duration, Utc};

use crate::domain::job::JobState;

/// Outcome of applying the retry policy to one failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    /// `Failed` while the retry budget holds, `Dead` once exhausted
    pub state: JobState,

    /// Attempt counter after this failure
    pub attempts: i64,

    /// When the job becomes claim-eligible again. For `Dead` this is `now`:
    /// immediately visible in the DLQ, inert until an operator retries it.
    pub next_run_at: DateTime<Utc>,
}

/// Applies one failure to a job's retry bookkeeping
///
/// Increments `attempts`; once `attempts > max_retries` the job goes to the
/// DLQ, otherwise it is rescheduled after `backoff_base^attempts` seconds.
/// The delay grows exponentially and is deliberately uncapped.
///
/// # Arguments
/// * `attempts` - Attempt count observed at claim time (before this failure)
/// * `max_retries` - The job's immutable retry budget
/// * `backoff_base` - Base of the exponential delay, resolved from config at
///   failure time
/// * `now` - The failure timestamp
pub fn on_failure(
    attempts: i64,
    max_retries: i64,
    backoff_base: i64,
    now: DateTime<Utc>,
) -> RetryOutcome {
    let attempts = attempts.saturating_add(1);

    if attempts > max_retries {
        return RetryOutcome {
            state: JobState::Dead,
            attempts,
            next_run_at: now,
        };
    }

    let exponent = u32::try_from(attempts).unwrap_or(u32::MAX);
    let delay_secs = backoff_base.max(0).saturating_pow(exponent);
    let delay = Duration::try_seconds(delay_secs).unwrap_or(Duration::MAX);

    RetryOutcome {
        state: JobState::Failed,
        attempts,
        next_run_at: now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn backoff_is_exponential_in_attempts() {
        let now = now();
        let mut deltas = Vec::new();
        for attempts in 0..4 {
            let outcome = on_failure(attempts, 10, 2, now);
            assert_eq!(outcome.state, JobState::Failed);
            deltas.push((outcome.next_run_at - now).num_seconds());
        }
        assert_eq!(deltas, vec![2, 4, 8, 16]);
    }

    #[test]
    fn exhausted_budget_goes_to_dlq() {
        let now = now();
        let outcome = on_failure(2, 2, 2, now);
        assert_eq!(outcome.state, JobState::Dead);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.next_run_at, now);
    }

    #[test]
    fn policy_holds_even_past_the_budget() {
        // A correct worker never issues this call, but the function must
        // still answer Dead for attempts already beyond max_retries.
        let outcome = on_failure(3, 2, 2, now());
        assert_eq!(outcome.state, JobState::Dead);
        assert_eq!(outcome.attempts, 4);
    }

    #[test]
    fn zero_budget_dies_on_first_failure() {
        let outcome = on_failure(0, 0, 2, now());
        assert_eq!(outcome.state, JobState::Dead);
        assert_eq!(outcome.attempts, 1);
    }

    #[test]
    fn huge_attempt_counts_saturate_instead_of_overflowing() {
        let outcome = on_failure(i64::MAX - 1, i64::MAX, 2, now());
        assert_eq!(outcome.state, JobState::Failed);
        assert_eq!(outcome.attempts, i64::MAX);
    }
}
