/*!
 * Request-scoped identity context
 *
 * Responsibility:
 * - The resolved identity (or anonymous) for one request, attached by the identity middleware
 * - axum dependent extractor stays in core, the value type stays in types
 *
 * Public API:
 * - IdentityContext
 */

mod core;
mod types;

pub use types::IdentityContext;
