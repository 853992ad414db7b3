//! State module for tracking traversal progress
//!
//! Every thread id discovered during a traversal gets a `BranchState`. The
//! traverser keeps one state per id, which doubles as its visited set.

mod branch_state;

pub use branch_state::BranchState;
