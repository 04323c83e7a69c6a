use crate::{
    api::{attendance, employee},
    error::{json_error_handler, path_error_handler, query_error_handler},
};
use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_cors::Cors;
use actix_web::web;

/// Per-IP limiter shared by every worker.
pub fn rate_limiter(
    requests_per_min: u32,
) -> anyhow::Result<GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    GovernorConfigBuilder::default()
        .per_millisecond((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min} per minute"))
}

/// CORS for `CORS_ORIGIN`: `*` or a comma-separated list of origins. Any
/// method and header is allowed, and preflights are answered here.
pub fn cors(origins: &str) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if origins.trim() == "*" {
        return cors.allow_any_origin();
    }

    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));

    cfg.service(
        web::scope("/employees")
            // /employees
            .service(
                web::resource("")
                    .route(web::post().to(employee::add_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // GET by employee code, DELETE by internal id
            .service(
                web::resource("/{id}")
                    .route(web::get().to(employee::get_employee))
                    .route(web::delete().to(employee::delete_employee)),
            ),
    )
    .service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::post().to(attendance::mark_attendance))
                    .route(web::get().to(attendance::list_attendance)),
            )
            .service(
                web::resource("/dashboard/summary")
                    .route(web::get().to(attendance::dashboard_summary)),
            )
            .service(
                web::resource("/dashboard/stats").route(web::get().to(attendance::dashboard_stats)),
            )
            // /attendance/{employee_id}
            .service(
                web::resource("/{employee_id}")
                    .route(web::get().to(attendance::employee_attendance)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{
        App,
        http::{Method, StatusCode, header},
        test,
    };

    fn preflight(origin: &str) -> test::TestRequest {
        test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/employees")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
    }

    #[actix_web::test]
    async fn preflight_is_answered_for_any_origin() {
        let app = test::init_service(App::new().wrap(cors("*")).configure(configure)).await;

        let resp = test::call_service(&app, preflight("https://ui.example.com").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let headers = resp.headers();
        assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        let methods = headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(methods.contains("POST"), "allow-methods: {methods:?}");
        assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
    }

    #[actix_web::test]
    async fn preflight_echoes_listed_origin() {
        let app = test::init_service(
            App::new()
                .wrap(cors("https://a.example.com, https://ui.example.com"))
                .configure(configure),
        )
        .await;

        let resp = test::call_service(&app, preflight("https://ui.example.com").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://ui.example.com"
        );
    }

    #[::core::prelude::v1::test]
    fn limiter_accepts_configured_rates() {
        assert!(rate_limiter(1000).is_ok());
        assert!(rate_limiter(60).is_ok());
        // zero is clamped rather than rejected
        assert!(rate_limiter(0).is_ok());
    }
}
