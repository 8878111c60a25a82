//! Routes and server loop for the HTTP bridge.

use crate::http_bridge::model::{SessionView, ValueRequest};
use anyhow::{Context, Result};
use kalmancore::{EstimatorError, TrackingSession};
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{
    http::StatusCode,
    reply::{Json, WithStatus},
    Filter, Rejection, Reply,
};

pub type SharedSession = Arc<RwLock<TrackingSession>>;

pub fn bridge_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

fn error_status(err: &EstimatorError) -> StatusCode {
    match err {
        EstimatorError::InvalidInput(_) | EstimatorError::DimensionMismatch { .. } => {
            StatusCode::BAD_REQUEST
        }
        EstimatorError::EmptySession => StatusCode::NOT_FOUND,
        EstimatorError::SingularInnovationCovariance | EstimatorError::FilterDivergence { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn estimate_reply(result: Result<f64, EstimatorError>) -> WithStatus<Json> {
    match result {
        Ok(estimate) => warp::reply::with_status(
            warp::reply::json(&json!({ "status": "ok", "estimate": estimate })),
            StatusCode::OK,
        ),
        Err(err) => warp::reply::with_status(
            warp::reply::json(&json!({ "status": "error", "message": err.to_string() })),
            error_status(&err),
        ),
    }
}

fn poisoned() -> WithStatus<Json> {
    error!("session lock poisoned");
    warp::reply::with_status(
        warp::reply::json(&json!({ "status": "error", "message": "session unavailable" })),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

/// Observations take the write lock; previews and snapshots share the read lock.
pub fn observe_value(session: &SharedSession, request: ValueRequest) -> WithStatus<Json> {
    match session.write() {
        Ok(mut guard) => estimate_reply(guard.observe(request.value)),
        Err(_) => poisoned(),
    }
}

pub fn peek_value(session: &SharedSession, request: ValueRequest) -> WithStatus<Json> {
    match session.read() {
        Ok(guard) => estimate_reply(guard.peek(request.value)),
        Err(_) => poisoned(),
    }
}

pub fn session_view(session: &SharedSession) -> WithStatus<Json> {
    match session.read() {
        Ok(guard) => warp::reply::with_status(
            warp::reply::json(&SessionView::from_session(&guard)),
            StatusCode::OK,
        ),
        Err(_) => poisoned(),
    }
}

pub fn routes(
    session: SharedSession,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let session_filter = warp::any().map(move || session.clone());

    let get_route = warp::path("session")
        .and(warp::get())
        .and(session_filter.clone())
        .map(|session: SharedSession| session_view(&session));

    let observe_route = warp::path("observe")
        .and(warp::post())
        .and(warp::body::json())
        .and(session_filter.clone())
        .map(|request: ValueRequest, session: SharedSession| observe_value(&session, request));

    let peek_route = warp::path("peek")
        .and(warp::post())
        .and(warp::body::json())
        .and(session_filter)
        .map(|request: ValueRequest, session: SharedSession| peek_value(&session, request));

    get_route.or(observe_route).or(peek_route)
}

/// Hosts a tracking session over HTTP on a background thread.
pub struct HttpBridge {
    session: SharedSession,
}

impl HttpBridge {
    pub fn new(session: TrackingSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    pub fn spawn(&self, address: SocketAddr) -> Result<thread::JoinHandle<()>> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building bridge runtime")?;
        let filter = routes(self.session.clone());
        info!("HTTP bridge listening on {}", address);
        let handle = thread::Builder::new()
            .name("http-bridge".into())
            .spawn(move || {
                runtime.block_on(async move {
                    warp::serve(filter).run(address).await;
                });
            })
            .context("spawning bridge thread")?;
        Ok(handle)
    }

    pub fn publish_status(&self, message: &str) {
        println!("[bridge] {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalmancore::SessionConfig;

    fn bridge() -> HttpBridge {
        HttpBridge::new(TrackingSession::new(SessionConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn observe_route_updates_session() {
        let bridge = bridge();
        let filter = routes(bridge.session());

        let response = warp::test::request()
            .method("POST")
            .path("/observe")
            .json(&ValueRequest { value: 4.5 })
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["estimate"], 4.5);
        assert_eq!(bridge.session().read().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn peek_route_leaves_session_untouched() {
        let bridge = bridge();
        bridge.session().write().unwrap().observe(1.0).unwrap();
        let filter = routes(bridge.session());

        let response = warp::test::request()
            .method("POST")
            .path("/peek")
            .json(&ValueRequest { value: 2.0 })
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(bridge.session().read().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn session_route_reports_latest() {
        let bridge = bridge();
        bridge.session().write().unwrap().observe(3.0).unwrap();
        let filter = routes(bridge.session());

        let response = warp::test::request()
            .method("GET")
            .path("/session")
            .reply(&filter)
            .await;
        let view: SessionView = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view.observations, 1);
        assert_eq!(view.last_variance, Some(100.0));
    }

    #[test]
    fn non_finite_value_maps_to_bad_request() {
        let bridge = bridge();
        let reply = observe_value(&bridge.session(), ValueRequest { value: f64::NAN });
        assert_eq!(reply.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
