//! HTTP collaborator resolvers: plain GET, JSON POST, and the exchange
//! ticker lookup. Non-2xx statuses are resolver-level failures.

use crate::core::error::{FetchError, FetchResult};
use log::debug;
use serde_json::Value;

async fn read_success_body(
    response: reqwest::Response,
    action: &str,
    subject: &str,
) -> FetchResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::resolution(
            action,
            subject,
            format!("HTTP status {status}"),
        ));
    }
    response
        .text()
        .await
        .map_err(|err| FetchError::resolution(action, subject, err))
}

pub async fn get(client: &reqwest::Client, url: &str) -> FetchResult<Value> {
    debug!("http-get {url}");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| FetchError::resolution("send GET request", url, err))?;
    let body = read_success_body(response, "send GET request", url).await?;
    Ok(Value::String(body))
}

pub async fn post(client: &reqwest::Client, url: &str, body: &Value) -> FetchResult<Value> {
    debug!("http-post {url}");
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|err| FetchError::resolution("send POST request", url, err))?;
    let text = read_success_body(response, "send POST request", url).await?;
    Ok(Value::String(text))
}

pub async fn binance_ticker(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
) -> FetchResult<Value> {
    let url = format!(
        "{}/api/v3/ticker/price?symbol={symbol}",
        base_url.trim_end_matches('/')
    );
    debug!("binance ticker {url}");

    let subject = format!("symbol {symbol}");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|err| FetchError::resolution("fetch ticker price", &subject, err))?;
    let body = read_success_body(response, "fetch ticker price", &subject).await?;

    let payload: Value = serde_json::from_str(&body)
        .map_err(|err| FetchError::resolution("decode ticker price", &subject, err))?;
    payload.get("price").cloned().ok_or_else(|| {
        FetchError::resolution("decode ticker price", &subject, "response has no price field")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_returns_body_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data")
            .with_status(200)
            .with_body(r#"{"amount": "123456789"}"#)
            .create_async()
            .await;

        let value = get(&reqwest::Client::new(), &format!("{}/data", server.url()))
            .await
            .unwrap();
        assert_eq!(value, json!(r#"{"amount": "123456789"}"#));
    }

    #[tokio::test]
    async fn test_get_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data")
            .with_status(404)
            .create_async()
            .await;

        let err = get(&reqwest::Client::new(), &format!("{}/data", server.url()))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("failed to send GET request"));
        assert!(message.contains("HTTP status 404"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/submit")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({"q": "price"})))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let value = post(
            &reqwest::Client::new(),
            &format!("{}/submit", server.url()),
            &json!({"q": "price"}),
        )
        .await
        .unwrap();

        assert_eq!(value, json!("ok"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_binance_ticker_extracts_price() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v3/ticker/price")
            .match_query(mockito::Matcher::UrlEncoded(
                "symbol".into(),
                "BTCUSDT".into(),
            ))
            .with_status(200)
            .with_body(r#"{"symbol": "BTCUSDT", "price": "64000.12000000"}"#)
            .create_async()
            .await;

        let value = binance_ticker(&reqwest::Client::new(), &server.url(), "BTCUSDT")
            .await
            .unwrap();
        assert_eq!(value, json!("64000.12000000"));
    }

    #[tokio::test]
    async fn test_binance_ticker_missing_price_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v3/ticker/price?symbol=NOPEUSDT")
            .with_status(200)
            .with_body(r#"{"symbol": "NOPEUSDT"}"#)
            .create_async()
            .await;

        let err = binance_ticker(&reqwest::Client::new(), &server.url(), "NOPEUSDT")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no price field"));
    }
}
