// Application state shared across all modules

use std::sync::Arc;

use crate::auth::AuthService;

/// Application context constructed once at startup
///
/// Nothing in here mutates after construction; handlers receive it as an
/// `Extension<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}
