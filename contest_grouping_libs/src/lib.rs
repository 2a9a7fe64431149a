pub mod cache;
pub mod classify;
pub mod clock;
pub mod codeforces;
pub mod contest;
pub mod grouping;
pub mod message;
pub mod options;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{classify, Label, ParticipantType, SubmissionClassificationInput};
pub use contest::ContestId;
pub use service::ContestService;
