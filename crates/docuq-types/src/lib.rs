//! Shared types for the DocuQ document question-answering service.

mod qa;
mod session;

pub use qa::*;
pub use session::*;
