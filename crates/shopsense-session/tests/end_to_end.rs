//! Full-pipeline scenario: classify and extract from a page snapshot, then
//! run the advice flow against a backend that never answers in time.

use std::sync::Arc;
use std::time::Duration;

use shopsense_advice::AdviceClient;
use shopsense_core::{Currency, Language, SiteId};
use shopsense_dom::{DomQuery, HtmlView};
use shopsense_extract::{classify, extract, ClassifyOptions};
use shopsense_session::{AdviceOutcome, FallbackReason, MemoryPrefStore, Orchestrator};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"
    <html><body>
      <span id="productTitle">Widget Pro 64GB</span>
      <span class="a-price"><span class="a-offscreen">$19.99</span></span>
      <button id="add-to-cart-button">Add to Cart</button>
    </body></html>
"#;

#[tokio::test]
async fn hover_to_fallback_when_the_backend_is_too_slow() {
    let url = "https://www.amazon.com/dp/B0WIDGET99";
    let dom = HtmlView::parse(PAGE);

    let site = classify(url, &dom, &ClassifyOptions::default()).expect("should classify");
    assert_eq!(site, SiteId::Amazon);

    let anchor = dom.query(None, "#add-to-cart-button");
    let record = extract(&dom, url, site, anchor).expect("should extract");
    assert_eq!(record.title, "Widget Pro 64GB");
    assert_eq!(record.price.to_string(), "19.99");
    assert_eq!(record.currency, Currency::Usd);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": true, "salesAdvice": {} }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryPrefStore::default());
    let client =
        AdviceClient::with_base_url(1, &server.uri()).expect("client construction should not fail");
    let orchestrator = Orchestrator::new(client, Arc::clone(&store), Language::En);

    match orchestrator.request_advice(&record).await {
        AdviceOutcome::Fallback {
            advice,
            usage,
            reason,
        } => {
            assert_eq!(reason, FallbackReason::Timeout);
            assert_eq!(usage.used, 0);
            assert_eq!(usage.remaining_free_uses, 5);
            // the fallback still carries a renderable payload
            assert!(!advice.buying_advice.recommendation.is_empty());
        }
        other => panic!("expected Fallback, got {other:?}"),
    }
    assert_eq!(store.current().used, 0);
}
