use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Sends a request built by `build`, retrying on transport errors and on
/// `429` or `5xx` responses.
///
/// Runs at most `1 + retries` times. The last response is returned as is,
/// even if its status would have been retried.
pub async fn send_with_retry<F>(
    mut build: F,
    retries: usize,
    delay_ms: u64,
) -> Result<Response, reqwest::Error>
where
    F: FnMut() -> RequestBuilder,
{
    let mut attempt = 1;
    loop {
        let result = build().send().await;
        let retryable = match &result {
            Ok(response) => is_retryable(response.status()),
            Err(_) => true,
        };
        if !retryable || attempt > retries {
            return result;
        }
        match &result {
            Ok(response) => debug!(
                "Attempt {}/{} returned {}. Retrying...",
                attempt,
                retries,
                response.status()
            ),
            Err(err) => debug!("Attempt {}/{} failed: {}. Retrying...", attempt, retries, err),
        }
        attempt += 1;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let response = send_with_retry(|| client.get(server.uri()), 2, 0)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let response = send_with_retry(|| client.get(server.uri()), 3, 0)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let client = Client::new();
        let response = send_with_retry(|| client.get(server.uri()), 1, 0)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
