mod persistence;
mod session;

pub use persistence::SessionSnapshot;
pub use session::{ActionResult, Session};
