//! Visitor-facing forms outside the wizard: contact, newsletter, quick apply.

pub mod router;
pub mod service;

pub use router::{outreach_router, OutreachState};
pub use service::{ContactMessage, NewsletterSignup, OutreachDesk, QuickApplication};
