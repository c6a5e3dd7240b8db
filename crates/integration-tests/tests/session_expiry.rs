//! Session teardown on 401 and the startup profile refresh.

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use pomelo_client::ClientError;
use pomelo_integration_tests::TestShop;

#[tokio::test]
async fn test_401_tears_down_session() {
    let shop = TestShop::start().await;
    shop.seed_credentials(true);

    Mock::given(method("GET"))
        .and(path("/product-service/all"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&shop.server)
        .await;

    let mut manager = shop.manager();
    assert!(manager.is_authenticated());

    let result = manager.products().await;
    assert!(matches!(result, Err(ClientError::SessionExpired)));

    // Uniform teardown: state reset and credentials gone
    assert!(!manager.is_authenticated());
    assert!(manager.user().is_none());
    assert!(!shop.credentials_on_disk());
}

#[tokio::test]
async fn test_unauthenticated_call_is_session_expired() {
    let shop = TestShop::start().await;
    let mut manager = shop.manager();

    let result = manager.orders().await;
    assert!(matches!(result, Err(ClientError::SessionExpired)));
}

#[tokio::test]
async fn test_startup_refresh_completes_hydrated_token() {
    let shop = TestShop::start().await;
    shop.seed_credentials(false);
    shop.mock_profile(99.0).await;

    let mut manager = shop.manager();
    // Token without profile: not yet authenticated
    assert!(!manager.is_authenticated());

    manager.ensure_initialized().await.expect("refresh");
    assert!(manager.is_authenticated());
    assert_eq!(
        manager.user().expect("profile").point_amount,
        rust_decimal::Decimal::new(99, 0)
    );

    shop.cleanup();
}

#[tokio::test]
async fn test_startup_refresh_runs_at_most_once() {
    let shop = TestShop::start().await;
    shop.seed_credentials(false);

    Mock::given(method("GET"))
        .and(path("/user-service/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "ok",
            "data": pomelo_integration_tests::profile_json(0.0)
        })))
        .expect(1)
        .mount(&shop.server)
        .await;

    let mut manager = shop.manager();
    manager.ensure_initialized().await.expect("first");
    manager.ensure_initialized().await.expect("second is a no-op");

    shop.cleanup();
}

#[tokio::test]
async fn test_startup_refresh_failure_forces_logout() {
    let shop = TestShop::start().await;
    shop.seed_credentials(false);

    Mock::given(method("GET"))
        .and(path("/user-service/info"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&shop.server)
        .await;

    let mut manager = shop.manager();
    let result = manager.ensure_initialized().await;

    assert!(matches!(result, Err(ClientError::ProfileFetchFailed(_))));
    assert!(!manager.is_authenticated());
    assert!(manager.session().access_token.is_none());
    assert!(!shop.credentials_on_disk());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let shop = TestShop::start().await;
    shop.seed_credentials(true);

    let mut manager = shop.manager();
    manager.logout().expect("first logout");
    assert!(!manager.is_authenticated());
    assert!(!shop.credentials_on_disk());

    manager.logout().expect("second logout");
    assert!(!manager.is_authenticated());
}
