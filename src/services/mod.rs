//! Contracts for the collaborators at the edge of a run.
//!
//! [`ReadingSource`] retrieves raw readings for a device and time range.
//! [`Publisher`] pushes a finished artifact to remote storage.

pub mod publisher;
pub mod reading_source;

pub use publisher::Publisher;
pub use reading_source::ReadingSource;
