use std::sync::Arc;

use actix_web::web;

use crate::database::TargetStore;
use crate::monitoring::StatusCache;

mod health;
mod status;
mod targets;

/// State shared with every request handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: StatusCache,
    pub store: Arc<dyn TargetStore>,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_route)
        .service(status::status_route)
        .service(targets::list_targets_route)
        .service(targets::create_target_route)
        .service(targets::update_target_route)
        .service(targets::delete_target_route);
}
