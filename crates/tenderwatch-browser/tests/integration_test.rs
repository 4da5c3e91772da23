use tenderwatch_browser::actions::BrowserActions;
use tenderwatch_browser::{BrowserEngine, LaunchOptions};

async fn launch(dir: &std::path::Path) -> BrowserEngine {
    BrowserEngine::launch(LaunchOptions::new(dir))
        .await
        .expect("launch browser")
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_browser_engine_launch() {
    let tmp = tempfile::TempDir::new().unwrap();
    let engine = BrowserEngine::launch(LaunchOptions::new(tmp.path())).await;
    assert!(engine.is_ok(), "Failed to launch browser engine");
    engine.unwrap().close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_xpath_queries() {
    let tmp = tempfile::TempDir::new().unwrap();
    let engine = launch(tmp.path()).await;

    engine.navigate("https://example.com").await.unwrap();

    assert_eq!(engine.count("//h1").await.unwrap(), 1);
    let heading = engine.extract_text("//h1").await.unwrap();
    assert_eq!(heading, "Example Domain");

    let href = engine.attribute("//a", "href").await.unwrap();
    assert!(href.is_some());
    assert!(engine.click("//does-not-exist").await.is_err());

    engine.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation_rejects_invalid_url() {
    let tmp = tempfile::TempDir::new().unwrap();
    let engine = launch(tmp.path()).await;
    assert!(engine.navigate("not-a-url").await.is_err());
    engine.close().await.unwrap();
}
