//! Integration tests for `AdviceClient` using wiremock HTTP mocks.

use std::time::Duration;

use shopsense_advice::{AdviceClient, AdviceError, AdviceRequest};
use shopsense_core::{Currency, Language, ProductRecord, SiteId};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AdviceClient {
    AdviceClient::with_base_url(30, base_url).expect("client construction should not fail")
}

fn sample_request() -> AdviceRequest {
    AdviceRequest {
        product_data: ProductRecord {
            site: SiteId::Amazon,
            page_url: "https://www.amazon.com/dp/B0EXAMPLE1".to_string(),
            product_id: "B0EXAMPLE1".to_string(),
            title: "Widget Pro 64GB".to_string(),
            price: "19.99".parse().unwrap(),
            currency: Currency::Usd,
            image_url: Some("https://img.example.com/widget.jpg".to_string()),
            features: vec!["Fast charging".to_string()],
        },
        language: Language::En,
        currency: Currency::Usd,
    }
}

#[tokio::test]
async fn analyze_returns_parsed_advice() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "success": true,
        "salesAdvice": {
            "productOverview": {
                "description": "A compact 64GB widget.",
                "targetAudience": "Power users",
                "category": "Gadgets",
                "mainFeatures": ["Fast charging", "Compact"]
            },
            "buyingAdvice": {
                "isGoodTimeToBuy": "yes",
                "recommendation": "Buy now, price is near its floor.",
                "priceAssessment": "Fair",
                "waitForSale": false,
                "nextSaleDate": "Unknown",
                "expectedSalePrice": "Unknown"
            },
            "competitors": [
                { "name": "Gadgetron X", "price": "17.50", "comparison": "Slower charging" }
            ],
            "newModelTiming": { "expectedSoon": false, "shouldWait": false, "reasoning": "Released recently" }
        }
    });

    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_partial_json(serde_json::json!({
            "language": "en",
            "currency": "USD",
            "productData": { "title": "Widget Pro 64GB" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let advice = client
        .analyze(&sample_request())
        .await
        .expect("should parse advice");

    assert_eq!(advice.buying_advice.is_good_time_to_buy, "yes");
    assert_eq!(advice.competitors.len(), 1);
    assert_eq!(advice.competitors[0].name, "Gadgetron X");
    assert!(!advice.new_model_timing.should_wait);
}

#[tokio::test]
async fn unsuccessful_envelope_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": "model overloaded"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.analyze(&sample_request()).await.unwrap_err();
    match err {
        AdviceError::Api(message) => assert_eq!(message, "model overloaded"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_status_surfaces_the_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({ "error": "upstream provider down" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.analyze(&sample_request()).await.unwrap_err();
    match err {
        AdviceError::Api(message) => assert_eq!(message, "upstream provider down"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": true, "salesAdvice": {} }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client =
        AdviceClient::with_base_url(1, &server.uri()).expect("client construction should not fail");
    let err = client.analyze(&sample_request()).await.unwrap_err();
    assert!(matches!(err, AdviceError::Timeout));
}

#[tokio::test]
async fn garbage_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.analyze(&sample_request()).await.unwrap_err();
    assert!(matches!(err, AdviceError::Deserialize { .. }));
}
