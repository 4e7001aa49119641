//! Integration tests for parkscan-coupon using mockito

use mockito::Matcher;
use parkscan_coupon::{CouponClient, CouponClientConfig, CouponError, CouponService};

const PAYLOAD: &str = "https://m.example.com/coupon?parkinglotcouponuser=42__X9KQ";
const CHECK_PATH: &str = "/parking/parkinglotcouponusers/42/parkinglot/lot-001/code/X9KQ/check";

fn client_for(host: String) -> CouponClient {
    CouponClient::new(CouponClientConfig {
        host,
        parkinglot: "lot-001".to_string(),
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
    })
    .expect("valid config")
}

fn coupon_body(check: bool) -> String {
    serde_json::json!({
        "parkinglot_coupon_name": "2h free parking",
        "parkinglot": "lot-001",
        "check": check,
        "used_at": "2015-03-7T14:05:00",
        "price": 0.0,
        "origin_price": 10.0,
        "desc": "Weekdays only"
    })
    .to_string()
}

// === inspect ===

#[tokio::test]
async fn test_inspect_success() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", CHECK_PATH)
        .match_query(Matcher::UrlEncoded("no_use".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(coupon_body(false))
        .create_async()
        .await;

    let client = client_for(server.url());
    let coupon = client.inspect(PAYLOAD).await.expect("inspect should succeed");

    assert_eq!(coupon.name(), "2h free parking");
    assert!(!coupon.check);
    assert!(coupon.used_at().is_some());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_inspect_not_found_maps_to_location_message() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", CHECK_PATH)
        .match_query(Matcher::UrlEncoded("no_use".into(), "1".into()))
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;

    let client = client_for(server.url());
    let err = client.inspect(PAYLOAD).await.expect_err("404 should fail");

    assert!(matches!(err, CouponError::Http { status: 404 }));
    assert_eq!(err.user_message(), "coupon not valid for this location");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_maps_to_status_message() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", CHECK_PATH)
        .with_status(500)
        .create_async()
        .await;

    let client = client_for(server.url());
    let err = client.redeem(PAYLOAD).await.expect_err("500 should fail");

    assert_eq!(err.user_message(), "error: 500");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_undecodable_body_is_unexpected() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", CHECK_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = client_for(server.url());
    let err = client.redeem(PAYLOAD).await.expect_err("bad body should fail");

    assert!(matches!(err, CouponError::Unexpected(_)));
    assert!(err.user_message().starts_with("unknown error: "));

    mock.assert_async().await;
}

// === redeem ===

#[tokio::test]
async fn test_redeem_posts_without_query() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", CHECK_PATH)
        .match_query(Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(coupon_body(true))
        .expect(1)
        .create_async()
        .await;

    let client = client_for(server.url());
    let coupon = client.redeem(PAYLOAD).await.expect("redeem should succeed");

    assert!(coupon.check);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_loosely_typed_body_is_accepted() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", CHECK_PATH)
        .match_query(Matcher::UrlEncoded("no_use".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"parkinglot_coupon_name":"2h free","check":null,"price":"2.50",
                "origin_price":"10.00","desc":"","parkinglot_coupon_desc":"Night rate",
                "used_at":"2015-03-25T10:11:12+08:00"}"#,
        )
        .create_async()
        .await;

    let client = client_for(server.url());
    let coupon = client.inspect(PAYLOAD).await.expect("inspect should succeed");

    assert!(!coupon.check);
    assert!((coupon.origin_price - 10.0).abs() < f64::EPSILON);
    assert_eq!(coupon.description(), "Night rate");
    assert!(coupon.used_at().is_some());
}

// === local validation ===

#[tokio::test]
async fn test_malformed_payloads_never_hit_the_network() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(server.url());
    let payloads = [
        "https://example.com/promo",
        "parkinglotcouponuser",
        "x?parkinglotcouponuser=42",
        "x?parkinglotcouponuser=1__2__3",
    ];

    for raw in payloads {
        let inspect = client.inspect(raw).await;
        assert!(
            matches!(inspect, Err(CouponError::MalformedPayload(_))),
            "inspect({raw}) = {inspect:?}"
        );

        let redeem = client.redeem(raw).await;
        assert!(
            matches!(redeem, Err(CouponError::MalformedPayload(_))),
            "redeem({raw}) = {redeem:?}"
        );
    }

    mock.assert_async().await;
}

// === transport failures ===

#[tokio::test]
async fn test_unreachable_host_maps_to_network_message() {
    // Grab a free port, then close it so the connection is refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = client_for(format!("http://{addr}"));
    let err = client.inspect(PAYLOAD).await.expect_err("should not connect");

    assert!(matches!(err, CouponError::NetworkUnreachable(_)), "{err:?}");
    assert_eq!(err.user_message(), "check network connection");
}
