use chain_lambda::adapters::service_client::{ServiceClient, ServiceReply};
use chain_lambda::config::ProxyConfig;
use chain_lambda::handlers::proxy::handle_proxy_event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct HttpServiceClient {
    http_client: reqwest::Client,
}

impl ServiceClient for HttpServiceClient {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<ServiceReply, String> {
        let client = self.http_client.clone();
        let target_url = url.to_string();
        let request_body = body.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .post(target_url)
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(request_body)
                    .send()
                    .await
                    .map_err(|error| format!("request failed: {error}"))?;

                let status_code = response.status().as_u16();
                let body = response
                    .bytes()
                    .await
                    .map_err(|error| format!("failed to read response body: {error}"))?;

                Ok::<_, String>(ServiceReply {
                    status_code,
                    body: body.to_vec(),
                })
            })
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let config = ProxyConfig::from_env();
    let client = HttpServiceClient {
        http_client: reqwest::Client::new(),
    };

    let config = &config;
    let client = &client;
    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| async move {
        tracing::debug!(payload = %event.payload, "event received");
        handle_proxy_event(&event.payload, config, client).map_err(|error| {
            tracing::error!(kind = error.kind(), %error, "proxy call failed");
            Error::from(error)
        })
    }))
    .await
}
