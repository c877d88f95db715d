//! Last-error slot with change-only notification.

use tokio::sync::watch;

use crate::signal::Signal;

/// A single slot holding the most recent error, or none.
///
/// The slot is cleared at the start of every new execution and set when one
/// fails. Subscribers are only notified when the value actually changes, so
/// the channel never emits the same value twice in a row; a subscriber
/// joining late immediately observes the current value.
pub struct ErrorChannel<E> {
  slot: Signal<Option<E>>,
}

impl<E: Clone + PartialEq> ErrorChannel<E> {
  /// Create an empty channel.
  pub fn new() -> Self {
    Self { slot: Signal::new(None) }
  }

  /// Record a failure. Returns whether subscribers were notified.
  pub fn set(&self, error: E) -> bool {
    self.slot.set_if_changed(Some(error))
  }

  /// Reset to none. Returns whether subscribers were notified.
  pub fn clear(&self) -> bool {
    self.slot.set_if_changed(None)
  }

  /// The current error, if any.
  pub fn current(&self) -> Option<E> {
    self.slot.get()
  }

  /// Subscribe to error transitions.
  pub fn subscribe(&self) -> watch::Receiver<Option<E>> {
    self.slot.subscribe()
  }
}

impl<E: Clone + PartialEq> Default for ErrorChannel<E> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_and_clear_notify_on_change() {
    let channel = ErrorChannel::new();
    let mut rx = channel.subscribe();
    rx.borrow_and_update();

    assert!(channel.set("boom"));
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), Some("boom"));

    assert!(channel.clear());
    assert_eq!(*rx.borrow_and_update(), None);
  }

  #[test]
  fn duplicate_values_do_not_notify() {
    let channel = ErrorChannel::new();
    let mut rx = channel.subscribe();
    rx.borrow_and_update();

    // Clearing an empty slot is invisible.
    assert!(!channel.clear());
    assert!(!rx.has_changed().unwrap());

    channel.set("boom");
    rx.borrow_and_update();
    assert!(!channel.set("boom"));
    assert!(!rx.has_changed().unwrap());
  }

  #[test]
  fn late_subscriber_sees_current_error() {
    let channel = ErrorChannel::new();
    channel.set("boom");

    let rx = channel.subscribe();
    assert_eq!(*rx.borrow(), Some("boom"));
  }
}
