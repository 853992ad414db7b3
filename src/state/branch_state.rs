/// Branch state definitions for tracking traversal progress
///
/// This module defines every state a discovery branch can be in while the
/// traverser fetches and expands one thread.
use crate::TrailError;
use std::fmt;

/// Represents the current state of one discovery branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchState {
    // ===== Active States =====
    /// Id has been seen as a link target but nothing was fetched yet
    Unvisited,

    /// Pages of the thread are being fetched
    Fetching,

    /// Thread was assembled and is waiting to be expanded
    Assembled,

    /// Neighbour links of the thread are being followed
    Expanding,

    // ===== Terminal States =====
    /// Branch finished, either expanded or short-circuited as already known
    Done,

    /// Thread could not be assembled
    Failed,
}

impl BranchState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this is an active state (branch may still progress)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// `Unvisited -> Done` is the short-circuit taken when an id has already
    /// been claimed by another branch.
    pub fn can_transition_to(&self, next: BranchState) -> bool {
        matches!(
            (self, next),
            (Self::Unvisited, Self::Fetching)
                | (Self::Unvisited, Self::Done)
                | (Self::Fetching, Self::Assembled)
                | (Self::Fetching, Self::Failed)
                | (Self::Assembled, Self::Expanding)
                | (Self::Expanding, Self::Done)
        )
    }

    /// Moves to `next`, or reports the illegal transition
    pub fn transition(&mut self, next: BranchState) -> Result<(), TrailError> {
        if !self.can_transition_to(next) {
            return Err(TrailError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        tracing::trace!("Branch state {} -> {}", self, next);
        *self = next;
        Ok(())
    }

    /// Returns the lowercase name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unvisited => "unvisited",
            Self::Fetching => "fetching",
            Self::Assembled => "assembled",
            Self::Expanding => "expanding",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
