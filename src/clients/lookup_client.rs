/// 案件查询 API 客户端
///
/// 封装所有与远程查询服务相关的调用逻辑
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Identifier, LookupResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 远程查询能力
///
/// 每次调用对应一个批次的一次请求。
#[async_trait]
pub trait LookupService: Send + Sync {
    async fn lookup(&self, identifiers: &[Identifier]) -> AppResult<Vec<LookupResult>>;
}

#[async_trait]
impl<T: LookupService + ?Sized> LookupService for Arc<T> {
    async fn lookup(&self, identifiers: &[Identifier]) -> AppResult<Vec<LookupResult>> {
        (**self).lookup(identifiers).await
    }
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    codigos: &'a [Identifier],
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(rename = "Automatizacion")]
    results: Vec<LookupResult>,
}

/// HTTP 查询客户端
pub struct LookupClient {
    http: Client,
    url: String,
}

impl LookupClient {
    /// 创建新的查询客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let url = config.lookup_url();
        let http = builder
            .build()
            .map_err(|e| AppError::api_request_failed(url.clone(), e))?;

        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LookupService for LookupClient {
    async fn lookup(&self, identifiers: &[Identifier]) -> AppResult<Vec<LookupResult>> {
        let body = LookupRequest {
            codigos: identifiers,
        };
        debug!("查询请求 Payload: {}", serde_json::to_string(&body)?);

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(self.url.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.ok().filter(|t| !t.is_empty());
            return Err(AppError::api_bad_response(
                self.url.clone(),
                status.as_u16(),
                text,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(self.url.clone(), e))?;
        let parsed: LookupResponse = serde_json::from_slice(&bytes)?;

        debug!("查询返回 {} 条结果", parsed.results.len());

        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ids(codes: &[&str]) -> Vec<Identifier> {
        codes.iter().filter_map(|c| Identifier::new(c)).collect()
    }

    fn client_for(server: &MockServer) -> LookupClient {
        let config = Config {
            lookup_api_base_url: server.uri(),
            ..Config::default()
        };
        LookupClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_posts_codigos_and_reads_automatizacion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/expedientes"))
            .and(body_json(json!({ "codigos": ["001", "002"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Automatizacion": [
                    { "codigo": "001", "fecha": "2024-03-01", "sumilla": "Auto" },
                    { "codigo": "002", "fecha": null, "sumilla": null }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server)
            .lookup(&ids(&["001", "002"]))
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![
                LookupResult::new("001", Some("2024-03-01"), Some("Auto")),
                LookupResult::new("002", None, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup(&ids(&["001"])).await.unwrap_err();

        match err {
            AppError::Api(ApiError::BadResponse { status, body, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(body.as_deref(), Some("boom"));
            }
            other => panic!("意外的错误类型: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_body_without_results_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Automatizacion": "n/a" })))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup(&ids(&["001"])).await.unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::JsonParseFailed { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_failure() {
        let config = Config {
            lookup_api_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let client = LookupClient::new(&config).unwrap();

        let err = client.lookup(&ids(&["001"])).await.unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::RequestFailed { .. })));
    }
}
