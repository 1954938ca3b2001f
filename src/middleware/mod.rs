/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: identity 解決 (identity) と route guard (guard)
 * - access_log / metrics: identity 解決後に読むだけの collaborator
 * - http: request id / panic recovery / heartbeat / timeout / content-type
 */
pub mod access_log;
pub mod auth;
pub mod http;
pub mod metrics;
