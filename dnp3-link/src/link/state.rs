//! Per-remote link state tracking
//!
//! The frame count bit alternates on confirmed transfers so a retried frame
//! can be told apart from a new one. The expectation is kept per remote
//! station and direction; it is the only state that survives across frames.

use std::collections::HashMap;

/// Expected frame count bit immediately after a link reset
const INITIAL_FCB: bool = true;

/// Mutable link state for one (remote station, direction) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryLinkState {
    expected_fcb: bool,
    is_reset: bool,
}

impl SecondaryLinkState {
    fn new() -> Self {
        Self {
            expected_fcb: INITIAL_FCB,
            is_reset: false,
        }
    }

    /// The frame count bit the next confirmed transfer must carry
    pub fn expected_fcb(&self) -> bool {
        self.expected_fcb
    }

    /// Whether the logical link has been reset since the last state change
    pub fn is_reset(&self) -> bool {
        self.is_reset
    }
}

impl Default for SecondaryLinkState {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks link state for every (remote station, direction) pair seen on the
/// channel
///
/// Owned by the channel's parser; channels never share a tracker. Mutation
/// happens only after a frame has fully passed validation.
#[derive(Debug, Default)]
pub struct LinkStateTracker {
    states: HashMap<(u16, bool), SecondaryLinkState>,
}

impl LinkStateTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame count bit currently expected from `source` in direction `dir`
    pub fn expected_fcb(&self, source: u16, dir: bool) -> bool {
        self.states
            .get(&(source, dir))
            .map(|state| state.expected_fcb)
            .unwrap_or(INITIAL_FCB)
    }

    /// The tracked state for `source`/`dir`, with defaults for stations not
    /// yet seen
    pub fn state(&self, source: u16, dir: bool) -> SecondaryLinkState {
        self.states
            .get(&(source, dir))
            .copied()
            .unwrap_or_default()
    }

    /// Apply a successful reset-link-states frame
    ///
    /// Unconditional: reset frames carry no frame count expectation of their
    /// own.
    pub fn reset(&mut self, source: u16, dir: bool) {
        let state = self
            .states
            .entry((source, dir))
            .or_insert_with(SecondaryLinkState::new);
        state.is_reset = true;
        state.expected_fcb = INITIAL_FCB;
    }

    /// Apply a successful confirmed user data frame: flip the expectation for
    /// the next transfer
    pub fn toggle_expected_fcb(&mut self, source: u16, dir: bool) {
        let state = self
            .states
            .entry((source, dir))
            .or_insert_with(SecondaryLinkState::new);
        state.expected_fcb = !state.expected_fcb;
    }

    /// Drop all tracked state
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_before_first_frame() {
        let tracker = LinkStateTracker::new();
        assert!(tracker.expected_fcb(7, true));
        assert!(!tracker.state(7, true).is_reset());
    }

    #[test]
    fn test_toggle() {
        let mut tracker = LinkStateTracker::new();
        tracker.toggle_expected_fcb(7, true);
        assert!(!tracker.expected_fcb(7, true));
        tracker.toggle_expected_fcb(7, true);
        assert!(tracker.expected_fcb(7, true));
    }

    #[test]
    fn test_reset_restores_initial_expectation() {
        let mut tracker = LinkStateTracker::new();
        tracker.toggle_expected_fcb(7, true);
        tracker.reset(7, true);
        assert!(tracker.expected_fcb(7, true));
        assert!(tracker.state(7, true).is_reset());
    }

    #[test]
    fn test_stations_and_directions_independent() {
        let mut tracker = LinkStateTracker::new();
        tracker.toggle_expected_fcb(7, true);
        assert!(!tracker.expected_fcb(7, true));
        assert!(tracker.expected_fcb(7, false));
        assert!(tracker.expected_fcb(8, true));
    }
}
