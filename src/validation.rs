use std::time::{Duration, Instant};

pub const QUIET_WINDOW_MS: u64 = 500;

const WICKETS_CEILING: u32 = 20;
const RUNS_CEILING: u32 = 500;

/// Debounced plausibility check over the two free-numeric draft fields.
///
/// Callers pass the clock in (`schedule`/`poll` take an `Instant`), so the
/// whole thing runs under test without real delays. Advisory only: the
/// result never gates submission.
#[derive(Debug, Default)]
pub struct DebouncedAdvisor {
    pending: Option<PendingCheck>,
    advisory: Option<String>,
}

#[derive(Debug)]
struct PendingCheck {
    due: Instant,
    highest_runs: String,
    total_wickets: String,
}

impl DebouncedAdvisor {
    /// Schedule a check one quiet window from `now`. A pending check is
    /// replaced, so only the latest keystroke's snapshot ever fires.
    pub fn schedule(&mut self, highest_runs: &str, total_wickets: &str, now: Instant) {
        self.pending = Some(PendingCheck {
            due: now + Duration::from_millis(QUIET_WINDOW_MS),
            highest_runs: highest_runs.to_string(),
            total_wickets: total_wickets.to_string(),
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Run the pending check if its quiet window has elapsed. Returns true
    /// when the advisory text changed (fired or cleared).
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self.pending.as_ref().is_some_and(|check| now >= check.due);
        if !due {
            return false;
        }
        let check = self.pending.take().expect("pending check verified above");
        let next = advisory_for(&check.highest_runs, &check.total_wickets);
        let changed = next != self.advisory;
        self.advisory = next;
        changed
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.advisory = None;
    }
}

fn advisory_for(highest_runs: &str, total_wickets: &str) -> Option<String> {
    let mut warnings = Vec::new();
    if total_wickets
        .parse::<u32>()
        .is_ok_and(|wickets| wickets > WICKETS_CEILING)
    {
        warnings.push(format!("Wickets > {WICKETS_CEILING} is unusual"));
    }
    if highest_runs
        .parse::<u32>()
        .is_ok_and(|runs| runs > RUNS_CEILING)
    {
        warnings.push(format!("Runs > {RUNS_CEILING} is unrealistic"));
    }
    if warnings.is_empty() {
        None
    } else {
        Some(warnings.join(" \u{2022} "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn later(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    #[test]
    fn fires_only_after_quiet_window() {
        let start = Instant::now();
        let mut advisor = DebouncedAdvisor::default();
        advisor.schedule("", "25", start);

        assert!(!advisor.poll(later(start, QUIET_WINDOW_MS - 1)));
        assert!(advisor.advisory().is_none());

        assert!(advisor.poll(later(start, QUIET_WINDOW_MS)));
        assert!(advisor.advisory().unwrap().contains("unusual"));
    }

    #[test]
    fn newer_edit_cancels_pending_check() {
        let start = Instant::now();
        let mut advisor = DebouncedAdvisor::default();
        advisor.schedule("", "25", start);
        // Second keystroke lands inside the window; the first snapshot
        // must never fire.
        advisor.schedule("", "15", later(start, 200));

        assert!(!advisor.poll(later(start, 600)));
        assert!(advisor.advisory().is_none());

        assert!(!advisor.poll(later(start, 200 + QUIET_WINDOW_MS)));
        assert!(advisor.advisory().is_none());
    }

    #[test]
    fn warnings_concatenate_and_clear() {
        let start = Instant::now();
        let mut advisor = DebouncedAdvisor::default();
        advisor.schedule("650", "25", start);
        advisor.poll(later(start, QUIET_WINDOW_MS));
        let text = advisor.advisory().unwrap().to_string();
        assert!(text.contains("unusual"));
        assert!(text.contains("unrealistic"));
        assert!(text.contains(" \u{2022} "));

        advisor.schedule("180", "12", later(start, 1000));
        assert!(advisor.poll(later(start, 1000 + QUIET_WINDOW_MS)));
        assert!(advisor.advisory().is_none());
    }

    #[test]
    fn boundary_values_do_not_warn() {
        let start = Instant::now();
        let mut advisor = DebouncedAdvisor::default();
        advisor.schedule("500", "20", start);
        advisor.poll(later(start, QUIET_WINDOW_MS));
        assert!(advisor.advisory().is_none());
    }
}
