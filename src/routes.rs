use crate::{
    api::{attendance, geofence, leave, manual_request},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/today").route(web::get().to(attendance::today_attendance)),
                    )
                    .service(web::resource("/history").route(web::get().to(attendance::my_history)))
                    // admin views
                    .service(web::resource("/all").route(web::get().to(attendance::all_attendance)))
                    .service(
                        web::resource("/date/{date}")
                            .route(web::get().to(attendance::attendance_by_date)),
                    )
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(attendance::employee_attendance)),
                    )
                    .service(
                        web::resource("/manual").route(web::post().to(attendance::manual_upsert)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/manual-request")
                    .service(
                        web::resource("")
                            .route(web::post().to(manual_request::submit_request))
                            .route(web::get().to(manual_request::my_requests)),
                    )
                    .service(
                        web::resource("/all").route(web::get().to(manual_request::all_requests)),
                    )
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(manual_request::pending_requests)),
                    )
                    .service(
                        web::resource("/{id}/process")
                            .route(web::put().to(manual_request::process_request)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(manual_request::cancel_request)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::post().to(leave::apply_leave))
                            .route(web::get().to(leave::my_leaves)),
                    )
                    .service(web::resource("/all").route(web::get().to(leave::all_leaves)))
                    .service(web::resource("/pending").route(web::get().to(leave::pending_leaves)))
                    .service(
                        web::resource("/{id}/status").route(web::put().to(leave::decide_leave)),
                    )
                    .service(web::resource("/{id}").route(web::delete().to(leave::cancel_leave))),
            )
            .service(
                web::scope("/geofence")
                    .service(
                        web::resource("")
                            .route(web::get().to(geofence::list_geofences))
                            .route(web::post().to(geofence::create_geofence)),
                    )
                    .service(
                        web::resource("/check").route(web::post().to(geofence::check_location)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(geofence::get_geofence))
                            .route(web::put().to(geofence::update_geofence))
                            .route(web::delete().to(geofence::delete_geofence)),
                    ),
            ),
    );
}
