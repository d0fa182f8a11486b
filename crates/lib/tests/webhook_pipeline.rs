//! End-to-end webhook tests: the gateway router served on a free port, with Papago
//! and the LINE reply API mocked by a single mockito server.

use base64::Engine;
use hmac::{Hmac, Mac};
use lingo::config::Config;
use lingo::gateway::{build_router, GatewayState};
use mockito::{Matcher, Server};
use serde_json::json;
use sha2::Sha256;

const CHANNEL_SECRET: &str = "channel-secret";
const DETECT_PATH: &str = "/v1/papago/detectLangs";
const TRANSLATE_PATH: &str = "/v1/papago/n2mt";
const REPLY_PATH: &str = "/v2/bot/message/reply";

fn config_for(mock_url: &str) -> Config {
    let mut config = Config::default();
    config.gateway.bind = "127.0.0.1".to_string();
    config.channels.line.channel_access_token = Some("line-token".to_string());
    config.channels.line.channel_secret = Some(CHANNEL_SECRET.to_string());
    config.channels.line.api_base = mock_url.to_string();
    config.papago.client_id = Some("naver-id".to_string());
    config.papago.client_secret = Some("naver-secret".to_string());
    config.papago.detect_url = format!("{}{}", mock_url, DETECT_PATH);
    config.papago.translate_url = format!("{}{}", mock_url, TRANSLATE_PATH);
    config
}

async fn spawn_gateway(config: Config) -> String {
    let state = GatewayState::from_config(&config).expect("gateway state");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, build_router(state)).await;
    });
    format!("http://{}", addr)
}

fn sign(body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(CHANNEL_SECRET.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

async fn post_webhook(base: &str, body: &serde_json::Value) -> reqwest::StatusCode {
    let body = body.to_string();
    reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("content-type", "application/json")
        .header("X-Line-Signature", sign(&body))
        .body(body)
        .send()
        .await
        .expect("post webhook")
        .status()
}

fn text_event(token: &str, text: &str) -> serde_json::Value {
    json!({
        "type": "message",
        "replyToken": token,
        "source": { "type": "user", "userId": "U1" },
        "message": { "type": "text", "id": "1", "text": text }
    })
}

async fn mock_detect(server: &mut Server, query: &str, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("POST", DETECT_PATH)
        .match_header("x-naver-client-id", "naver-id")
        .match_body(Matcher::UrlEncoded("query".into(), query.into()))
        .with_status(status)
        .with_body(body)
        .create_async()
        .await
}

fn translated(text: &str) -> String {
    json!({ "message": { "result": { "translatedText": text } } }).to_string()
}

async fn mock_reply(server: &mut Server, token: &str, text: &str) -> mockito::Mock {
    server
        .mock("POST", REPLY_PATH)
        .match_header("authorization", "Bearer line-token")
        .match_body(Matcher::Json(json!({
            "replyToken": token,
            "messages": [{ "type": "text", "text": text }]
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await
}

#[tokio::test]
async fn batch_with_detection_failure_still_replies_to_siblings() {
    let mut server = Server::new_async().await;
    let _d1 = mock_detect(&mut server, "안녕하세요.fr", 200, r#"{"langCode":"ko"}"#).await;
    let _d2 = mock_detect(&mut server, "broken", 500, r#"{"errorCode":"N2MT99"}"#).await;
    let _d3 = mock_detect(&mut server, "Hello", 200, r#"{"langCode":"en"}"#).await;
    let t1 = server
        .mock("POST", TRANSLATE_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("source".into(), "ko".into()),
            Matcher::UrlEncoded("target".into(), "fr".into()),
            Matcher::UrlEncoded("text".into(), "안녕하세요".into()),
        ]))
        .with_status(200)
        .with_body(translated("Bonjour"))
        .create_async()
        .await;
    let t3 = server
        .mock("POST", TRANSLATE_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("source".into(), "en".into()),
            Matcher::UrlEncoded("target".into(), "ko".into()),
            Matcher::UrlEncoded("text".into(), "Hello".into()),
        ]))
        .with_status(200)
        .with_body(translated("안녕하세요"))
        .create_async()
        .await;
    let r1 = mock_reply(&mut server, "r1", "Bonjour").await;
    let r3 = mock_reply(&mut server, "r3", "안녕하세요").await;
    let r2 = server
        .mock("POST", REPLY_PATH)
        .match_body(Matcher::PartialJson(json!({ "replyToken": "r2" })))
        .expect(0)
        .create_async()
        .await;

    let base = spawn_gateway(config_for(&server.url())).await;
    let status = post_webhook(
        &base,
        &json!({
            "destination": "Ubot",
            "events": [
                text_event("r1", "안녕하세요.fr"),
                text_event("r2", "broken"),
                text_event("r3", "Hello"),
            ]
        }),
    )
    .await;

    assert_eq!(status, reqwest::StatusCode::OK);
    t1.assert_async().await;
    t3.assert_async().await;
    r1.assert_async().await;
    r3.assert_async().await;
    r2.assert_async().await;
}

#[tokio::test]
async fn malformed_event_does_not_block_valid_siblings() {
    let mut server = Server::new_async().await;
    let _d1 = mock_detect(&mut server, "Hello", 200, r#"{"langCode":"en"}"#).await;
    let _d3 = mock_detect(&mut server, "Merci", 200, r#"{"langCode":"fr"}"#).await;
    let _t = server
        .mock("POST", TRANSLATE_PATH)
        .with_status(200)
        .with_body(translated("고마워요"))
        .create_async()
        .await;
    let r1 = mock_reply(&mut server, "r1", "고마워요").await;
    let r3 = mock_reply(&mut server, "r3", "고마워요").await;

    let base = spawn_gateway(config_for(&server.url())).await;
    let status = post_webhook(
        &base,
        &json!({
            "events": [
                text_event("r1", "Hello"),
                { "replyToken": "r2" },
                { "type": "message", "replyToken": "r2b", "message": "oops" },
                text_event("r3", "Merci"),
            ]
        }),
    )
    .await;

    assert_eq!(status, reqwest::StatusCode::OK);
    r1.assert_async().await;
    r3.assert_async().await;
}

#[tokio::test]
async fn gateway_state_requires_papago_credentials() {
    if std::env::var("NAVER_CLIENT_ID").is_ok() {
        return;
    }
    let mut config = config_for("http://127.0.0.1:9");
    config.papago.client_id = None;
    let err = GatewayState::from_config(&config).err().expect("missing credentials");
    assert!(err.to_string().contains("papago credentials"));
}

#[tokio::test]
async fn translation_failure_replies_with_fallback() {
    let mut server = Server::new_async().await;
    let _d = mock_detect(&mut server, "Xin chào", 200, r#"{"langCode":"vi"}"#).await;
    let _t = server
        .mock("POST", TRANSLATE_PATH)
        .with_status(400)
        .with_body(r#"{"errorMessage":"Unsupported source language"}"#)
        .create_async()
        .await;
    let fallback = mock_reply(&mut server, "r1", "번역할 수 없는 언어입니다.").await;

    let base = spawn_gateway(config_for(&server.url())).await;
    let status = post_webhook(&base, &json!({ "events": [text_event("r1", "Xin chào")] })).await;

    assert_eq!(status, reqwest::StatusCode::OK);
    fallback.assert_async().await;
}

#[tokio::test]
async fn non_message_events_make_no_outbound_calls() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let base = spawn_gateway(config_for(&server.url())).await;
    let status = post_webhook(
        &base,
        &json!({
            "events": [
                { "type": "follow", "replyToken": "r1", "source": { "type": "user", "userId": "U1" } },
                { "type": "message", "replyToken": "r2", "message": { "type": "image", "id": "2" } }
            ]
        }),
    )
    .await;

    assert_eq!(status, reqwest::StatusCode::OK);
    any.assert_async().await;
}

#[tokio::test]
async fn bad_signature_is_unauthorized() {
    let server = Server::new_async().await;
    let base = spawn_gateway(config_for(&server.url())).await;
    let resp = reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("X-Line-Signature", "bm90IHRoZSBzaWduYXR1cmU=")
        .body(r#"{"events":[]}"#)
        .send()
        .await
        .expect("post webhook");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let server = Server::new_async().await;
    let base = spawn_gateway(config_for(&server.url())).await;
    let body = "not json";
    let resp = reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("X-Line-Signature", sign(body))
        .body(body)
        .send()
        .await
        .expect("post webhook");
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}
