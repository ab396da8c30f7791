use super::error::*;
use super::handler;
use crate::application_port::AuthService;
use crate::domain_model::UserId;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(authorization_header())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh);

    let revoke = warp::post()
        .and(warp::path("revoke"))
        .and(warp::path::end())
        .and(authorization_header())
        .and(with(server.auth_service.clone()))
        .and_then(handler::revoke);

    let admin_reset = warp::post()
        .and(warp::path("admin"))
        .and(warp::path("reset"))
        .and(warp::path::end())
        .and(with(server.auth_service.clone()))
        .and_then(handler::reset_sessions);

    let me = warp::get()
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(with_authorization(server.auth_service.clone()))
        .and_then(handler::me);

    login.or(refresh).or(revoke).or(admin_reset).or(me)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn authorization_header()
-> impl Filter<Extract = (Option<String>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization")
}

/// Runs the full bearer-extraction + token-verification gate before the
/// handler sees the request. Every protected route goes through here.
fn with_authorization(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    authorization_header().and_then(move |header: Option<String>| {
        let auth_service = auth_service.clone();
        async move {
            auth_service
                .authorize(header.as_deref())
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}
