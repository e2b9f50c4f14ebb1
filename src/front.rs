use crate::authorization::AuthGateLayer;
use axum::Router;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::routing::get;
use tracing::info;

/// Routes of the service. Everything except `/health` sits behind `gate`.
pub fn router(gate: AuthGateLayer) -> Router {
    Router::new()
        .route("/events", get(events).post(publish))
        .route_layer(gate)
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}

async fn events() -> (StatusCode, String) {
    info!("event stream opened");
    (StatusCode::OK, String::from("event: ready\n\n"))
}

async fn publish(body: Bytes) -> (StatusCode, String) {
    info!(size = body.len(), "event published");
    (StatusCode::ACCEPTED, format!("accepted {} bytes", body.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{self, Body};
    use axum::http::{Request, header};
    use axum::response::Response;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AuthGateLayer::new("s3cr3t"))
    }

    async fn text(response: Response) -> String {
        let body = body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn events_with_query_token() {
        let request = Request::builder()
            .uri("/events?access_token=s3cr3t")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "event: ready\n\n");
    }

    #[tokio::test]
    async fn events_with_wrong_bearer() {
        let request = Request::builder()
            .uri("/events")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        insta::assert_snapshot!(text(response).await, @"Invalid Access Token");
    }

    #[tokio::test]
    async fn publish_receives_the_whole_form() {
        let form = "access_token=s3cr3t&event=ping";
        let request = Request::builder()
            .method("POST")
            .uri("/events")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(text(response).await, format!("accepted {} bytes", form.len()));
    }

    #[tokio::test]
    async fn health_is_open() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_gated() {
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
