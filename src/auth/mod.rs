pub mod session;
pub mod store;
pub mod token;

// Re-export necessary items
pub use session::Session;
pub use store::{SessionStore, PUBLIC_VIEWS};
pub use token::{decode_claims, Claims};
