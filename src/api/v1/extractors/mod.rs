/*
 * Responsibility
 * - handler / middleware から参照する extractor の公開口
 */
pub mod identity_ctx;

pub use identity_ctx::IdentityContext;
