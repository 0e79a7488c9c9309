//! Progress feedback relay.
//!
//! The caller may hand a progress callback plus two opaque user tokens to
//! [`compress_texture`]. The engine passes all three through to every codec
//! instance unchanged. When compression runs on multiple row-band workers the
//! same callback is shared by all of them and may be invoked concurrently —
//! the callback must therefore be reentrant. That requirement is part of the
//! caller's contract; the engine does not serialize calls into it.
//!
//! [`compress_texture`]: crate::compress_texture

/// Caller-supplied progress/cancellation hook.
///
/// Wraps the callback together with the two opaque user tokens that are
/// relayed verbatim on every invocation. Returning `true` from the callback
/// requests cancellation; the invoking codec stops and reports
/// [`CodecOutcome::Aborted`].
///
/// [`CodecOutcome::Aborted`]: crate::codec::CodecOutcome::Aborted
#[derive(Clone, Copy)]
pub struct Feedback<'a> {
    callback: &'a (dyn Fn(f32, usize, usize) -> bool + Sync),
    user1: usize,
    user2: usize,
}

impl<'a> Feedback<'a> {
    /// Create a feedback relay from a callback and two opaque user tokens.
    pub fn new(callback: &'a (dyn Fn(f32, usize, usize) -> bool + Sync), user1: usize, user2: usize) -> Self {
        Self {
            callback,
            user1,
            user2,
        }
    }

    /// Report progress as a percentage in `0.0..=100.0`.
    ///
    /// Returns `true` if the caller requested cancellation.
    pub fn report(&self, percent: f32) -> bool {
        (self.callback)(percent.clamp(0.0, 100.0), self.user1, self.user2)
    }
}

impl std::fmt::Debug for Feedback<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feedback")
            .field("user1", &self.user1)
            .field("user2", &self.user2)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_report_relays_user_tokens() {
        let calls = AtomicUsize::new(0);
        let callback = |percent: f32, user1: usize, user2: usize| {
            assert!((0.0..=100.0).contains(&percent));
            assert_eq!(user1, 7);
            assert_eq!(user2, 9);
            calls.fetch_add(1, Ordering::Relaxed);
            false
        };
        let feedback = Feedback::new(&callback, 7, 9);

        assert!(!feedback.report(50.0));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_report_clamps_percent() {
        let callback = |percent: f32, _: usize, _: usize| {
            assert!((0.0..=100.0).contains(&percent));
            false
        };
        let feedback = Feedback::new(&callback, 0, 0);

        feedback.report(-5.0);
        feedback.report(150.0);
    }

    #[test]
    fn test_report_propagates_abort() {
        let callback = |_: f32, _: usize, _: usize| true;
        let feedback = Feedback::new(&callback, 0, 0);
        assert!(feedback.report(10.0));
    }

    #[test]
    fn test_feedback_is_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<Feedback<'_>>();
    }
}
