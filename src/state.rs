/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - validator: 共有 HTTP client を持つ session validator
 *   - admin_role: 起動時に一度だけ決まる admin role 名
 *   - metrics: 明示的に注入される collector
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::metrics::HttpMetrics;
use crate::services::rbac::AdminRole;
use crate::services::session::SessionValidator;

#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<dyn SessionValidator>,
    pub session_cookie_name: Arc<str>,
    pub admin_role: Arc<AdminRole>,
    pub metrics: Arc<HttpMetrics>,
}

impl AppState {
    pub fn new(
        validator: Arc<dyn SessionValidator>,
        session_cookie_name: impl Into<Arc<str>>,
        admin_role: AdminRole,
        metrics: Arc<HttpMetrics>,
    ) -> Self {
        Self {
            validator,
            session_cookie_name: session_cookie_name.into(),
            admin_role: Arc::new(admin_role),
            metrics,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session_cookie_name", &self.session_cookie_name)
            .field("admin_role", &self.admin_role)
            .finish_non_exhaustive()
    }
}
