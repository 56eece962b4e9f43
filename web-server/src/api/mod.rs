// web-server/src/api/mod.rs
pub mod auth;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::scope("/api/auth")
            .service(auth::issue_nonce)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::current_user)
    );
}
