// Interview sessions: the view state machine, where sessions are kept, and
// the HTTP surface that drives them.

pub mod handlers;
pub mod inflight;
pub mod machine;
pub mod store;
