//! Dashboard engine
//!
//! Turns analyses into the dashboard profile and keeps it consistent with the
//! chat transcript:
//! - `reducer` - pure fold of one analysis into the state
//! - `reconstruction` - rebuild the state by replaying the transcript
//! - `store` - the live state, persisted after every change
//!
//! The state is always derivable as a left fold of the transcript through the
//! reducer, which is what makes the snapshot disposable.

pub mod reconstruction;
pub mod reducer;
pub mod store;

#[cfg(test)]
mod tests;

pub use reconstruction::{find_user_company, reconstruct, reconstruct_with, ReconstructionMode};
pub use reducer::{reduce, reduce_at};
pub use store::{BootstrapSource, DashboardStore};
