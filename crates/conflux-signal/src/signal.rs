//! Shared last-value signals.

use tokio::sync::watch;

/// A shared signal holding one value.
///
/// Thin wrapper over a `tokio::sync::watch` channel: the owner writes, any
/// number of subscribers read. A subscriber joining late immediately observes
/// the current value via [`watch::Receiver::borrow`] rather than a stale
/// default, and follows subsequent updates via [`watch::Receiver::changed`].
///
/// When the signal is dropped, subscribers see the channel close - this is how
/// a fail-fast runner terminates its aggregate streams.
#[derive(Debug)]
pub struct Signal<T> {
  sender: watch::Sender<T>,
}

impl<T: Clone> Signal<T> {
  /// Create a signal with an initial value.
  pub fn new(initial: T) -> Self {
    let (sender, _) = watch::channel(initial);
    Self { sender }
  }

  /// Replace the current value, notifying all subscribers.
  pub fn set(&self, value: T) {
    self.sender.send_replace(value);
  }

  /// Replace the current value only when it differs.
  ///
  /// Returns whether subscribers were notified. This is what gives the busy
  /// and error signals their change-only contract.
  pub fn set_if_changed(&self, value: T) -> bool
  where
    T: PartialEq,
  {
    self.sender.send_if_modified(|current| {
      if *current == value {
        false
      } else {
        *current = value;
        true
      }
    })
  }

  /// Clone of the current value.
  pub fn get(&self) -> T {
    self.sender.borrow().clone()
  }

  /// Subscribe to the signal. The current value is immediately observable.
  pub fn subscribe(&self) -> watch::Receiver<T> {
    self.sender.subscribe()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn late_subscriber_sees_current_value() {
    let signal = Signal::new(0);
    signal.set(7);

    let rx = signal.subscribe();
    assert_eq!(*rx.borrow(), 7);
  }

  #[test]
  fn set_if_changed_skips_equal_values() {
    let signal = Signal::new(1);
    let mut rx = signal.subscribe();
    rx.borrow_and_update();

    assert!(!signal.set_if_changed(1));
    assert!(!rx.has_changed().unwrap());

    assert!(signal.set_if_changed(2));
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), 2);
  }

  #[tokio::test]
  async fn subscribers_observe_updates() {
    let signal = Signal::new("idle");
    let mut rx = signal.subscribe();

    signal.set("running");
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), "running");
  }
}
