pub mod extractor;
pub mod handlers;
pub mod identity;

pub use extractor::CurrentUser;
pub use identity::IdentityClient;
