pub mod continuation;
pub mod session_service;

pub use continuation::{continuation_stream, ContinuationOptions, END_OF_OUTPUT};
pub use session_service::SessionService;
