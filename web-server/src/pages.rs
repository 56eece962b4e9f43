// web-server/src/pages.rs
use actix_files::NamedFile;
use actix_web::http::header;
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use common::Config;

use crate::access::{AccessDecision, AccessGate, GateError, RequestCredentials};

const PROTECTED_PAGE_HTML: &str = "<!DOCTYPE html>\n<html>\n  <head><title>Protected Page</title></head>\n  <body>\n    <h1>Protected Page</h1>\n    <p>You have access to this page</p>\n  </body>\n</html>\n";

// The protected page itself; everything interesting happens in the gate
#[get("/")]
pub async fn protected_page(
    req: HttpRequest,
    gate: web::Data<AccessGate>,
) -> Result<HttpResponse, GateError> {
    let creds = RequestCredentials::from_request(&req);

    match gate.evaluate(&creds).await? {
        AccessDecision::Allow => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(PROTECTED_PAGE_HTML)),
        AccessDecision::DenyWithRedirect {
            destination,
            permanent,
        } => Ok(redirect_response(&destination, permanent)),
    }
}

// Login page; its assets come from the static mount
#[get("/login")]
pub async fn login_page(req: HttpRequest, config: web::Data<Config>) -> Result<HttpResponse, Error> {
    let path = std::path::Path::new(&config.static_files.path).join(&config.static_files.index);
    let file = NamedFile::open(path)?;
    Ok(file.into_response(&req))
}

/// Map a deny decision to its HTTP shape: 307 for temporary, 308 for permanent
fn redirect_response(destination: &str, permanent: bool) -> HttpResponse {
    let mut builder = if permanent {
        HttpResponse::PermanentRedirect()
    } else {
        HttpResponse::TemporaryRedirect()
    };
    builder
        .insert_header((header::LOCATION, destination))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{OwnershipOracle, SessionResolver};
    use actix_web::http::StatusCode;
    use actix_web::{test as aw_test, App};
    use async_trait::async_trait;
    use common::models::principal::Principal;
    use common::models::token::TokenRecord;
    use solana_client::client_error::ClientErrorKind;
    use std::sync::Arc;

    struct StaticResolver(Option<Principal>);

    #[async_trait]
    impl SessionResolver for StaticResolver {
        async fn resolve(
            &self,
            _creds: &RequestCredentials,
        ) -> Result<Option<Principal>, GateError> {
            Ok(self.0.clone())
        }
    }

    struct StaticOracle(Option<Vec<TokenRecord>>);

    #[async_trait]
    impl OwnershipOracle for StaticOracle {
        async fn list_claimed(
            &self,
            _program_address: &str,
        ) -> Result<Option<Vec<TokenRecord>>, GateError> {
            Ok(self.0.clone())
        }
    }

    struct FaultyOracle;

    #[async_trait]
    impl OwnershipOracle for FaultyOracle {
        async fn list_claimed(
            &self,
            _program_address: &str,
        ) -> Result<Option<Vec<TokenRecord>>, GateError> {
            let err = ClientErrorKind::Custom("rpc unreachable".to_string());
            Err(GateError::Oracle(err.into()))
        }
    }

    fn gate_data(
        resolver: impl SessionResolver + 'static,
        oracle: impl OwnershipOracle + 'static,
    ) -> web::Data<AccessGate> {
        web::Data::new(AccessGate::new(
            Arc::new(resolver),
            Arc::new(oracle),
            "Drop111".to_string(),
        ))
    }

    #[actix_web::test]
    async fn test_visitor_without_session_is_redirected_to_login() {
        let app = aw_test::init_service(
            App::new()
                .app_data(gate_data(StaticResolver(None), StaticOracle(Some(vec![]))))
                .service(protected_page),
        )
        .await;

        let resp = aw_test::call_service(&app, aw_test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/login"
        );
    }

    #[actix_web::test]
    async fn test_claim_holder_sees_the_page() {
        let records = vec![TokenRecord {
            owner: "Wallet1".to_string(),
            amount: 1,
        }];
        let app = aw_test::init_service(
            App::new()
                .app_data(gate_data(
                    StaticResolver(Some(Principal::new("Wallet1".to_string()))),
                    StaticOracle(Some(records)),
                ))
                .service(protected_page),
        )
        .await;

        let resp = aw_test::call_service(&app, aw_test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = aw_test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("Protected Page"));
    }

    #[actix_web::test]
    async fn test_authenticated_non_holder_is_redirected() {
        let app = aw_test::init_service(
            App::new()
                .app_data(gate_data(
                    StaticResolver(Some(Principal::new("Wallet3".to_string()))),
                    StaticOracle(Some(vec![])),
                ))
                .service(protected_page),
        )
        .await;

        let resp = aw_test::call_service(&app, aw_test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[actix_web::test]
    async fn test_oracle_fault_is_a_server_error_not_a_redirect() {
        let app = aw_test::init_service(
            App::new()
                .app_data(gate_data(
                    StaticResolver(Some(Principal::new("Wallet1".to_string()))),
                    FaultyOracle,
                ))
                .service(protected_page),
        )
        .await;

        let resp = aw_test::call_service(&app, aw_test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn test_redirect_response_status_follows_permanence() {
        assert_eq!(
            redirect_response("/login", false).status(),
            StatusCode::TEMPORARY_REDIRECT
        );
        assert_eq!(
            redirect_response("/login", true).status(),
            StatusCode::PERMANENT_REDIRECT
        );
    }
}
