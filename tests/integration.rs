//! Integration tests for the mock API transformer.

use mockapi_transformer::agent::{STATUS_INTERNAL_ERROR, STATUS_OK};
use mockapi_transformer::config::MessageStyle;
use mockapi_transformer::{DirectoryStore, MemoryStore, MockApiAgent, MockApiConfig};
use serde_json::{json, Value as JsonValue};
use std::path::PathBuf;
use std::sync::Arc;

fn fixtures_agent() -> MockApiAgent {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("__files");
    MockApiAgent::new(MockApiConfig::default(), Arc::new(DirectoryStore::new(dir))).unwrap()
}

fn efirc_adjustment_request() -> JsonValue {
    json!({
        "request-header": {
            "request-id": "REQ-20240101-0001",
            "service-name": "eFIRCAdjustment",
            "request-time": "2024-01-01T10:15:30",
            "request-source": "CBS"
        },
        "service-input": {
            "fircNumber": "ABC123",
            "adCode": "AD12345",
            "remitterCurrency": "USD",
            "adjustedAmount": "1500.00",
            "approvalBy": "A",
            "adjustmentDate": "01/02/2024",
            "reasonForAdjustment": "1",
            "adjustmentSeqNumber": "SEQ-0001",
            "recordIndicator": "1"
        }
    })
}

// =============================================================================
// Configuration Parsing Tests
// =============================================================================

#[test]
fn test_parse_minimal_config() {
    let yaml = r#"
version: "1"
services: []
"#;
    let config: MockApiConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.version, "1");
    assert!(config.services.is_empty());
    assert!(config.settings.builtin_services);
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
version: "1"
settings:
  fixtures_dir: "/srv/mock/__files"
  builtin_services: false
  max_body_size: 4096

services:
  - name: "softex-extension"
    description: "Softex extension"
    success_file: "softex-ok.json"
    fail_file: "softex-ko.json"
    exhaustive: true
    messages: detailed
    internal_error: "Softex transformer error"
    rules:
      - field: "exportType"
        exact_length: 1
        one_of: ["1", "2"]
      - field: "formNo"
        max_length: 20
        when:
          field: "exportType"
          equals: "2"
      - field: "letterDate"
        mandatory: false
        pattern: '\d{2}/\d{2}/\d{4}'
"#;
    let config: MockApiConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.settings.fixtures_dir, "/srv/mock/__files");
    assert_eq!(config.settings.max_body_size, 4096);

    let service = &config.services[0];
    assert_eq!(service.name, "softex-extension");
    assert_eq!(service.messages, MessageStyle::Detailed);
    assert_eq!(service.rules.len(), 3);
    assert_eq!(service.rules[0].one_of.as_ref().unwrap().len(), 2);
    assert_eq!(service.rules[2].pattern.as_deref(), Some(r"\d{2}/\d{2}/\d{4}"));

    let agent = MockApiAgent::new(config, Arc::new(MemoryStore::new())).unwrap();
    assert_eq!(agent.service_names(), vec!["softex-extension"]);
}

#[test]
fn test_parse_json_config() {
    let json_str = r#"{
        "version": "1",
        "services": [
            {
                "name": "json-service",
                "success_file": "ok.json",
                "fail_file": "ko.json",
                "rules": [{"field": "adCode", "exact_length": 7}]
            }
        ]
    }"#;
    let config: MockApiConfig = serde_json::from_str(json_str).unwrap();
    assert_eq!(config.services.len(), 1);
    assert!(!config.services[0].exhaustive);
    assert_eq!(config.services[0].messages, MessageStyle::Collapsed);
}

// =============================================================================
// eFIRC Adjustment End-to-End Tests
// =============================================================================

#[tokio::test]
async fn test_efirc_adjustment_success_echoes_header() {
    let agent = fixtures_agent();
    let body = efirc_adjustment_request().to_string();

    let response = agent.handle("efirc-adjustment", body.as_bytes()).await;

    assert_eq!(response.status, STATUS_OK);
    let header = &response.body["response-header"];
    assert_eq!(header["status"], "SUCCESS");
    assert_eq!(header["req-hdr-request-id"], "REQ-20240101-0001");
    assert_eq!(header["req-hdr-service-name"], "eFIRCAdjustment");
    assert_eq!(header["req-hdr-request-time"], "2024-01-01T10:15:30");
    assert_eq!(header["request-source"], "CBS");
    assert!(response.body["service-output"].get("error-code").is_none());
}

#[tokio::test]
async fn test_efirc_adjustment_missing_ad_code() {
    let agent = fixtures_agent();
    let mut request = efirc_adjustment_request();
    request["service-input"]
        .as_object_mut()
        .unwrap()
        .remove("adCode");

    let response = agent
        .handle("efirc-adjustment", request.to_string().as_bytes())
        .await;

    assert_eq!(response.status, STATUS_OK);
    assert_eq!(response.body["response-header"]["status"], "FAILURE");
    assert_eq!(
        response.body["response-header"]["req-hdr-request-id"],
        "REQ-20240101-0001"
    );

    let output = &response.body["service-output"];
    assert_eq!(output["error-code"], "EF_HDR_002");
    assert_eq!(output["error-desc"], "AD Code is mandatory.");
}

#[tokio::test]
async fn test_efirc_adjustment_aggregates_errors_in_rule_order() {
    let agent = fixtures_agent();
    let mut request = efirc_adjustment_request();
    request["service-input"]["fircNumber"] = json!("   ");
    request["service-input"]["remitterCurrency"] = json!("USDT");
    request["service-input"]["recordIndicator"] = json!(null);

    let response = agent
        .handle("efirc-adjustment", request.to_string().as_bytes())
        .await;

    let output = &response.body["service-output"];
    assert_eq!(output["error-code"], "EF_HDR_001,EF_HDR_003,EF_HDR_008");
    assert_eq!(
        output["error-desc"],
        "FIRC Number is mandatory. Closure Currency length should be <= 3. Record Indicator is mandatory."
    );
}

// =============================================================================
// Other Services
// =============================================================================

#[tokio::test]
async fn test_efirc_issuance_selects_fixture() {
    let agent = fixtures_agent();
    let request = json!({
        "service-input": {
            "irmNumber": "IRM0001",
            "irmAdCode": "AD12345",
            "fircFlag": "Y",
            "fircNumber": "FIRC0001",
            "fircIssueDate": "01/02/2024",
            "fircAmount": "2500.00",
            "recordIndicator": "1"
        }
    });

    let response = agent
        .handle("efirc-issuance", request.to_string().as_bytes())
        .await;
    assert_eq!(response.status, STATUS_OK);
    assert_eq!(response.body["response-header"]["status"], "SUCCESS");

    let mut bad = request;
    bad["service-input"]["irmAdCode"] = json!("AD1234");
    let response = agent
        .handle("efirc-issuance", bad.to_string().as_bytes())
        .await;
    assert_eq!(response.status, STATUS_OK);
    assert_eq!(response.body["response-header"]["status"], "FAILURE");
    // no error echo for this service
    assert!(response.body["service-output"].get("error-code").is_none());
}

#[tokio::test]
async fn test_shipping_bill_adjustment_unknown_export_type() {
    let agent = fixtures_agent();
    let request = json!({
        "service-input": {
            "exportType": "3",
            "portCode": "INMAA1",
            "leoDate": "01/01/2024",
            "adCode": "AD12345",
            "recordIndicator": "1",
            "ieCode": "0123456789",
            "writeoffReferenceNumber": "WO-1",
            "adjustmentIndicator": "1",
            "writeOffDate": "02/01/2024",
            "shipmentInd": "1",
            "shippingBillNo": "1234567",
            "shippingBillDate": "01/01/2024",
            "formNo": "FORM-1",
            "invoiceList": [{
                "invoiceSerialNo": "1",
                "invoiceNumber": "INV-1",
                "invoiceDate": "01/01/2024",
                "writeoffAmount": "100.0000",
                "invoiceClosureIndicator": "Y"
            }]
        }
    });

    let response = agent
        .handle("shipping-bill-adjustment", request.to_string().as_bytes())
        .await;
    assert_eq!(response.status, STATUS_OK);
    assert_eq!(response.body["response-header"]["status"], "FAILURE");
}

// =============================================================================
// Internal Fault Tests
// =============================================================================

#[tokio::test]
async fn test_malformed_body_for_every_service() {
    let agent = fixtures_agent();

    for service in agent.service_names() {
        let response = agent.handle(service, b"<xml>not json</xml>").await;
        assert_eq!(response.status, STATUS_INTERNAL_ERROR, "{}", service);
        let body = response.body.as_object().unwrap();
        assert_eq!(body.len(), 1);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_missing_fixture_is_internal_error() {
    let store = MemoryStore::new().with("efirc-adjustment-success.json", "{}");
    let agent = MockApiAgent::new(MockApiConfig::default(), Arc::new(store)).unwrap();

    let response = agent
        .handle("efirc-adjustment", br#"{"service-input": {}}"#)
        .await;
    assert_eq!(response.status, STATUS_INTERNAL_ERROR);
    assert_eq!(response.body, json!({"error": "Internal transformer error"}));
}

#[tokio::test]
async fn test_fixture_without_header_section_is_internal_error() {
    let store = MemoryStore::new().with("efirc-adjustment-success.json", r#"{"service-output": {}}"#);
    let agent = MockApiAgent::new(MockApiConfig::default(), Arc::new(store)).unwrap();

    let response = agent
        .handle("efirc-adjustment", efirc_adjustment_request().to_string().as_bytes())
        .await;
    assert_eq!(response.status, STATUS_INTERNAL_ERROR);
    assert_eq!(response.body, json!({"error": "Internal transformer error"}));
}

#[tokio::test]
async fn test_oversized_body_is_internal_error() {
    let yaml = r#"
settings:
  max_body_size: 16
"#;
    let agent = MockApiAgent::from_yaml(yaml, Arc::new(MemoryStore::new())).unwrap();
    let response = agent
        .handle("irm-extension", efirc_adjustment_request().to_string().as_bytes())
        .await;
    assert_eq!(response.status, STATUS_INTERNAL_ERROR);
    assert_eq!(
        response.body,
        json!({"error": "IRM Extension transformer error"})
    );
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_independent() {
    let agent = Arc::new(fixtures_agent());
    let mut handles = Vec::new();

    for i in 0..16 {
        let agent = Arc::clone(&agent);
        handles.push(tokio::spawn(async move {
            let mut request = efirc_adjustment_request();
            request["request-header"]["request-id"] = json!(format!("REQ-{}", i));
            if i % 2 == 1 {
                request["service-input"]
                    .as_object_mut()
                    .unwrap()
                    .remove("adCode");
            }
            let response = agent
                .handle("efirc-adjustment", request.to_string().as_bytes())
                .await;
            (i, response)
        }));
    }

    for handle in handles {
        let (i, response) = handle.await.unwrap();
        assert_eq!(response.status, STATUS_OK);
        assert_eq!(
            response.body["response-header"]["req-hdr-request-id"],
            format!("REQ-{}", i)
        );
        let expected = if i % 2 == 1 { "FAILURE" } else { "SUCCESS" };
        assert_eq!(response.body["response-header"]["status"], expected);
    }
}
