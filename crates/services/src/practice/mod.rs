mod session;
mod snapshot;

pub use session::PracticeSession;
pub use snapshot::PracticeSnapshot;
