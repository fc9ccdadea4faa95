use crate::api::routes;
use crate::config::SharedConfig;
use crate::permission::DynPermission;
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub permission: DynPermission,
}

/// Bind the ask API to [`Config::api_bind_addr`][crate::config::Config::api_bind_addr],
/// returning the server future.
///
/// # Errors
///
/// Returns a [`hyper::Error`] if the bind address can't be bound.
pub fn new(
    config: SharedConfig,
    permission: DynPermission,
) -> hyper::Result<impl Future<Output = hyper::Result<()>>> {
    let server = axum::Server::try_bind(&config.api_bind_addr)?;
    Ok(server.serve(routes::new(AppState { config, permission }).into_make_service()))
}
