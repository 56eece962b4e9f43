// web-server/src/static_files.rs
use actix_files::Files;
use actix_web::web;
use common::StaticFilesConfig;

// Serve login page assets from the configured directory
pub fn configure(cfg: &mut web::ServiceConfig, config: StaticFilesConfig) {
    cfg.service(
        Files::new("/static", &config.path)
            .prefer_utf8(true)
            .use_etag(true)
            .use_last_modified(true),
    );
}
