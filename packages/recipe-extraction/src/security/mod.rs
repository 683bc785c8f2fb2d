//! Secret handling for model keys and platform logins.

pub mod credentials;

pub use credentials::{AICredentials, InstagramCredentials, SecretString};
