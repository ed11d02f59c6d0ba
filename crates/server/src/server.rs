use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{bank_accounts, budgets, categories, expenses, subcategories, transactions, user};
use api_types::Envelope;
use engine::Engine;

static IDENTITY_SUBJECT: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-identity-subject");
static IDENTITY_EMAIL: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-identity-email");
static IDENTITY_NAME: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-identity-name");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Builds a `TypedHeader` for one identity header forwarded by the auth
/// proxy. The proxy has already verified the session; the service only
/// trusts the values.
macro_rules! identity_header {
    ($name:ident, $header:expr) => {
        #[derive(Debug)]
        struct $name(String);

        impl Header for $name {
            fn name() -> &'static axum::http::HeaderName {
                &$header
            }

            fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
            where
                Self: Sized,
                I: Iterator<Item = &'i axum::http::HeaderValue>,
            {
                let value = values.next().ok_or_else(AxumError::invalid)?;
                let Ok(value) = value.to_str() else {
                    return Err(AxumError::invalid());
                };
                let value = value.trim();
                if value.is_empty() {
                    return Err(AxumError::invalid());
                }
                Ok($name(value.to_string()))
            }

            fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
                match axum::http::HeaderValue::from_str(&self.0) {
                    Ok(value) => values.extend(std::iter::once(value)),
                    Err(_) => tracing::error!("failed to encode identity header"),
                }
            }
        }
    };
}

identity_header!(SubjectHeader, IDENTITY_SUBJECT);
identity_header!(EmailHeader, IDENTITY_EMAIL);
identity_header!(NameHeader, IDENTITY_NAME);

/// Resolves the identity headers into a `users::Model` request extension.
///
/// The user row is synced lazily: the first authenticated request creates it,
/// later requests just load it. A missing subject header is a 401.
async fn identity(
    subject: Option<TypedHeader<SubjectHeader>>,
    email: Option<TypedHeader<EmailHeader>>,
    name: Option<TypedHeader<NameHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(SubjectHeader(subject))) = subject else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let email = email.map(|TypedHeader(EmailHeader(value))| value);
    let (first_name, last_name) = match name {
        Some(TypedHeader(NameHeader(value))) => match value.split_once(' ') {
            Some((first, last)) => (Some(first.to_string()), Some(last.trim().to_string())),
            None => (Some(value), None),
        },
        None => (None, None),
    };

    let user = state
        .engine
        .sync_user(
            &subject,
            email.as_deref(),
            first_name.as_deref(),
            last_name.as_deref(),
        )
        .await
        .map_err(|err| {
            tracing::error!("user sync failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> Json<Envelope<String>> {
    Json(Envelope::ok("ok".to_string()))
}

fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route(
            "/bank-accounts",
            get(bank_accounts::list).post(bank_accounts::create),
        )
        .route(
            "/bank-accounts/{id}",
            get(bank_accounts::get)
                .put(bank_accounts::update)
                .delete(bank_accounts::remove),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route(
            "/subcategories",
            get(subcategories::list).post(subcategories::create),
        )
        .route(
            "/subcategories/{id}",
            get(subcategories::get)
                .put(subcategories::update)
                .delete(subcategories::remove),
        )
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::remove),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::remove),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/budgets/{id}",
            axum::routing::put(budgets::update).delete(budgets::remove),
        )
        .route("/user", get(user::get).put(user::update))
        .route_layer(middleware::from_fn_with_state(state.clone(), identity));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use http_body_util::BodyExt;
    use migration::{Migrator, MigratorTrait};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:")
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_router().await;
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_requires_identity_header() {
        let app = test_router().await;
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/categories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn identity_header_syncs_user_and_lists() {
        let app = test_router().await;
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/categories")
                    .header("x-identity-subject", "user-123")
                    .header("x-identity-name", "Ada Lovelace")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_category_round_trip() {
        let app = test_router().await;
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/categories")
                    .header("x-identity-subject", "user-123")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name": "Food"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["name"], "Food");
    }
}
