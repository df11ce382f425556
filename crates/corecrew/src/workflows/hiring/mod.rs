pub mod catalog;
pub mod identity;
pub mod questions;
pub mod wizard;

pub use catalog::{PositionCatalog, PositionRecord};
pub use identity::{IdentityError, IdentityProfile, IdentityProvider, PendingAuthorization};
pub use questions::{normalize_position, InterviewQuestion, QuestionBank, QuestionSet};
