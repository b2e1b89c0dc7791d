//! Authorship Builder: one edge per primary-source mention.

pub mod builder;
pub mod error;

pub use builder::{
    edges_for_paper, AuthorshipBuild, AuthorshipBuilder, AuthorshipSummary, IncrementalBuild,
};
pub use error::{PaperIssue, PaperIssueReason};
