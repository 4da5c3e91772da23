use std::path::PathBuf;
use tempfile::TempDir;
use tenderwatch_mail::{build_message, MailError, Notification, NO_MATCH_BODY};

#[tokio::test]
async fn test_message_carries_html_body_and_attachments() {
    let tmp = TempDir::new().expect("create temp dir");
    let report = tmp.path().join("ppra_info_comm_tech.xlsx");
    let evidence = tmp.path().join("T-1.pdf");
    std::fs::write(&report, b"PK report").unwrap();
    std::fs::write(&evidence, b"%PDF-1.4").unwrap();

    let notification = Notification {
        subject: "PPRA Tender Report - 1 matches found".to_string(),
        html_body: "<p><b>Tender T-1</b> contains keywords <b>Bank</b></p>".to_string(),
        attachments: vec![report, evidence],
    };

    let message = build_message(&notification, "scraper@example.com", "team@example.com")
        .await
        .expect("message builds");
    let raw = String::from_utf8_lossy(&message.formatted()).into_owned();

    assert!(raw.contains("Subject: PPRA Tender Report - 1 matches found"));
    assert!(raw.contains("text/html"));
    assert!(raw.contains("filename=\"ppra_info_comm_tech.xlsx\""));
    assert!(raw.contains("filename=\"T-1.pdf\""));
    assert!(raw.contains("application/octet-stream"));
}

#[tokio::test]
async fn test_missing_attachment_is_reported() {
    let notification = Notification {
        subject: "PPRA Tender Report - No matches".to_string(),
        html_body: NO_MATCH_BODY.to_string(),
        attachments: vec![PathBuf::from("/nonexistent/report.xlsx")],
    };

    let err = build_message(&notification, "scraper@example.com", "team@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, MailError::Attachment { .. }));
}

#[tokio::test]
async fn test_bad_address_is_rejected() {
    let notification = Notification {
        subject: "s".to_string(),
        html_body: NO_MATCH_BODY.to_string(),
        attachments: Vec::new(),
    };

    let err = build_message(&notification, "not an address", "team@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, MailError::Address { .. }));
}
