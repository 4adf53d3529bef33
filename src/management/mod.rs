mod attempt;
mod session;

pub use attempt::AttemptManager;
pub use session::SessionError;
pub use session::SessionManager;
