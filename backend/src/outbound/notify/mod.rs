//! Outbound transactional email adapters.

mod logging;
mod resend;

pub use logging::LoggingMailNotifier;
pub use resend::{DEFAULT_RESEND_ENDPOINT, ResendMailNotifier};
