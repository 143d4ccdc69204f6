//! Guarded decision of *when* to fetch the next page.
//!
//! `LoadTrigger` is a plain state machine: callers feed it events (a button
//! press, a visibility change, a completion) together with the sequencer's
//! current next offset, and it answers with a [`Decision`]. It never performs
//! I/O, so both the "load more" button and the scroll-driven variant share the
//! same guard and can be exercised without a terminal or runtime.

/// How the next fetch is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
  /// Discrete user action ("Load More").
  Button,
  /// Sentinel row scrolled into view.
  Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
  Idle,
  Fetching { offset: u64 },
  Exhausted,
}

/// Why a trigger did not start a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
  InFlight,
  Exhausted,
  NotVisible,
  /// Automatic variant already fired (or failed) since the last time it
  /// entered `Idle` successfully.
  Disarmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Fetch(u64),
  Ignore(Rejection),
}

impl Decision {
  pub fn offset(self) -> Option<u64> {
    match self {
      Decision::Fetch(offset) => Some(offset),
      Decision::Ignore(_) => None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct LoadTrigger {
  state: LoadState,
  armed: bool,
  visible: bool,
  error: Option<String>,
}

impl Default for LoadTrigger {
  fn default() -> Self {
    Self {
      state: LoadState::Idle,
      armed: true,
      visible: false,
      error: None,
    }
  }
}

impl LoadTrigger {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> LoadState {
    self.state
  }

  pub fn is_fetching(&self) -> bool {
    matches!(self.state, LoadState::Fetching { .. })
  }

  pub fn is_exhausted(&self) -> bool {
    self.state == LoadState::Exhausted
  }

  pub fn in_flight_offset(&self) -> Option<u64> {
    match self.state {
      LoadState::Fetching { offset } => Some(offset),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Explicit request: button press, initial load or manual retry.
  pub fn request(&mut self, next: Option<u64>) -> Decision {
    if let Some(rejection) = self.guard(next) {
      return Decision::Ignore(rejection);
    }
    self.begin(next)
  }

  /// Re-evaluate the automatic variant after the sentinel's visibility (or
  /// `next`) changed. Fires at most once per successful return to `Idle`;
  /// the sentinel leaving and re-entering the viewport re-arms it.
  pub fn observe(&mut self, visible: bool, next: Option<u64>) -> Decision {
    if visible && !self.visible {
      self.armed = true;
    }
    self.visible = visible;

    if let Some(rejection) = self.guard(next) {
      return Decision::Ignore(rejection);
    }
    if !visible {
      return Decision::Ignore(Rejection::NotVisible);
    }
    if !self.armed {
      return Decision::Ignore(Rejection::Disarmed);
    }
    self.begin(next)
  }

  /// A fetch finished successfully; `next` is the sequencer's answer with
  /// the new page already appended.
  pub fn complete(&mut self, next: Option<u64>) {
    if !self.is_fetching() {
      return;
    }
    self.error = None;
    match next {
      Some(_) => {
        self.state = LoadState::Idle;
        self.armed = true;
      }
      None => self.state = LoadState::Exhausted,
    }
  }

  /// A fetch failed. Pages are untouched, so the next request asks for the
  /// same offset again. The automatic variant stays disarmed.
  pub fn fail(&mut self, error: impl Into<String>) {
    if !self.is_fetching() {
      return;
    }
    self.state = LoadState::Idle;
    self.armed = false;
    self.error = Some(error.into());
  }

  /// The consumer went away mid-fetch; its result will never be applied.
  pub fn cancel(&mut self) {
    if self.is_fetching() {
      self.state = LoadState::Idle;
      self.armed = true;
    }
  }

  /// Forget the last visibility report, so the next visible report counts
  /// as the sentinel entering the viewport.
  pub fn hide(&mut self) {
    self.visible = false;
  }

  fn guard(&mut self, next: Option<u64>) -> Option<Rejection> {
    match self.state {
      LoadState::Fetching { .. } => Some(Rejection::InFlight),
      LoadState::Exhausted => Some(Rejection::Exhausted),
      LoadState::Idle if next.is_none() => {
        self.state = LoadState::Exhausted;
        Some(Rejection::Exhausted)
      }
      LoadState::Idle => None,
    }
  }

  fn begin(&mut self, next: Option<u64>) -> Decision {
    match next {
      Some(offset) => {
        self.state = LoadState::Fetching { offset };
        self.armed = false;
        self.error = None;
        Decision::Fetch(offset)
      }
      None => {
        self.state = LoadState::Exhausted;
        Decision::Ignore(Rejection::Exhausted)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_request_starts_fetch() {
    let mut trigger = LoadTrigger::new();
    assert_eq!(trigger.request(Some(0)), Decision::Fetch(0));
    assert_eq!(trigger.state(), LoadState::Fetching { offset: 0 });
  }

  #[test]
  fn test_request_while_fetching_is_rejected() {
    let mut trigger = LoadTrigger::new();
    trigger.request(Some(0));
    assert_eq!(trigger.request(Some(0)), Decision::Ignore(Rejection::InFlight));
  }

  #[test]
  fn test_rapid_visibility_signals_fetch_once() {
    let mut trigger = LoadTrigger::new();
    let fetches: Vec<u64> = [true, true, false, true]
      .into_iter()
      .filter_map(|visible| trigger.observe(visible, Some(10)).offset())
      .collect();
    assert_eq!(fetches, vec![10]);
  }

  #[test]
  fn test_completion_rearms_automatic_variant() {
    let mut trigger = LoadTrigger::new();
    assert_eq!(trigger.observe(true, Some(10)), Decision::Fetch(10));
    trigger.complete(Some(20));
    assert_eq!(trigger.state(), LoadState::Idle);
    // Sentinel still visible after the page landed
    assert_eq!(trigger.observe(true, Some(20)), Decision::Fetch(20));
  }

  #[test]
  fn test_not_visible_does_not_fetch() {
    let mut trigger = LoadTrigger::new();
    assert_eq!(
      trigger.observe(false, Some(10)),
      Decision::Ignore(Rejection::NotVisible)
    );
    assert_eq!(trigger.state(), LoadState::Idle);
  }

  #[test]
  fn test_exhaustion_is_terminal() {
    let mut trigger = LoadTrigger::new();
    trigger.request(Some(20));
    trigger.complete(None);
    assert!(trigger.is_exhausted());
    assert_eq!(trigger.request(Some(30)), Decision::Ignore(Rejection::Exhausted));
    assert_eq!(trigger.observe(true, Some(30)), Decision::Ignore(Rejection::Exhausted));
  }

  #[test]
  fn test_idle_with_no_next_becomes_exhausted() {
    let mut trigger = LoadTrigger::new();
    assert_eq!(trigger.request(None), Decision::Ignore(Rejection::Exhausted));
    assert!(trigger.is_exhausted());
  }

  #[test]
  fn test_failure_keeps_offset_and_records_error() {
    let mut trigger = LoadTrigger::new();
    trigger.request(Some(10));
    trigger.fail("connection reset");
    assert_eq!(trigger.state(), LoadState::Idle);
    assert_eq!(trigger.error(), Some("connection reset"));
    // Nothing was appended, so the sequencer still says 10
    assert_eq!(trigger.request(Some(10)), Decision::Fetch(10));
    assert_eq!(trigger.error(), None);
  }

  #[test]
  fn test_failure_disarms_until_sentinel_reenters() {
    let mut trigger = LoadTrigger::new();
    trigger.observe(true, Some(10));
    trigger.fail("timeout");

    assert_eq!(trigger.observe(true, Some(10)), Decision::Ignore(Rejection::Disarmed));
    trigger.observe(false, Some(10));
    assert_eq!(trigger.observe(true, Some(10)), Decision::Fetch(10));
  }

  #[test]
  fn test_cancel_returns_to_idle() {
    let mut trigger = LoadTrigger::new();
    trigger.request(Some(10));
    trigger.cancel();
    assert_eq!(trigger.state(), LoadState::Idle);
    assert_eq!(trigger.request(Some(10)), Decision::Fetch(10));
  }

  #[test]
  fn test_hide_rearms_on_next_visible_report() {
    let mut trigger = LoadTrigger::new();
    trigger.observe(true, Some(0));
    trigger.fail("boom");
    trigger.hide();
    assert_eq!(trigger.observe(true, Some(0)), Decision::Fetch(0));
  }

  #[test]
  fn test_complete_without_fetch_is_ignored() {
    let mut trigger = LoadTrigger::new();
    trigger.complete(None);
    assert_eq!(trigger.state(), LoadState::Idle);
  }
}
