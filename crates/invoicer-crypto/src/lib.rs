/// Invoicer Crypto Library
///
/// CSRF protection for state-changing requests: tokens are a random nonce
/// plus its HMAC-SHA256 under a process key, so they verify without any
/// server-side token store.
pub mod csrf;

pub use csrf::CsrfService;
