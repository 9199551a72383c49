use crate::{
    api::{attendance, student},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
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

    let api_limiter = Arc::new(build_limiter(config.rate_api_per_min));

    cfg.service(
        web::scope("/student")
            .wrap(api_limiter.clone())
            .service(web::resource("/save").route(web::post().to(student::save_student)))
            .service(web::resource("/get").route(web::get().to(student::list_students)))
            .service(web::resource("/update/{id}").route(web::put().to(student::update_student)))
            .service(web::resource("/delete/{id}").route(web::delete().to(student::delete_student))),
    );

    cfg.service(
        web::scope("/attendance")
            .wrap(api_limiter)
            .service(web::resource("/save").route(web::post().to(attendance::save_attendance)))
            .service(web::resource("/get").route(web::get().to(attendance::list_attendance)))
            .service(
                web::resource("/student/{student_id}")
                    .route(web::get().to(attendance::list_attendance_by_student)),
            )
            .service(
                web::resource("/update/{id}").route(web::put().to(attendance::update_attendance)),
            )
            .service(
                web::resource("/delete/{id}").route(web::delete().to(attendance::delete_attendance)),
            ),
    );
}
