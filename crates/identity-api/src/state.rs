use std::sync::Arc;

use identity_core::services::GatewayService;
use identity_security::IdentityTokenService;
use identity_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayService>,
    pub tokens: Arc<IdentityTokenService>,
    pub config: AppConfig,
}
