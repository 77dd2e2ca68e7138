//! Browser module - the capability surface and its agent-browser
//! backed implementation.

pub mod page;
pub mod session;

pub use page::Page;
pub use session::BrowserSession;
