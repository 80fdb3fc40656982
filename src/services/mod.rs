pub mod identity;
pub mod lifecycle;

pub use identity::{CredentialIssuer, IdentityClient};
