//! The process-wide configuration lives in its own test binary: it is
//! resolved once, and these tests change the environment it is read from.

use review_client::{ApiBase, ClientConfig, ReviewServiceClient};

#[test]
fn test_base_resolved_once_per_process() {
    std::env::set_var("REVIEW_API_BASE", "http://first.example:9000/");
    let first = ReviewServiceClient::from_env().unwrap();
    assert_eq!(first.review_url(), "http://first.example:9000/api/review");

    std::env::set_var("REVIEW_API_BASE", "http://second.example:9000");
    let second = ReviewServiceClient::from_env().unwrap();
    assert_eq!(second.review_url(), first.review_url());

    let config = ClientConfig::global().unwrap();
    assert_eq!(
        config.api_base,
        ApiBase::Override("http://first.example:9000".into())
    );
    assert!(std::ptr::eq(config, ClientConfig::global().unwrap()));
}
