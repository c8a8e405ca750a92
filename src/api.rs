use color_eyre::Result;
use reqwest::Client;

use crate::models::TrackingPayload;

pub struct TrackingProvider {
    client: Client,
    base_url: String,
    order_id: String,
}

impl TrackingProvider {
    pub fn new(base_url: String, order_id: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap(),
            base_url,
            order_id,
        }
    }

    /// Fetches the current tracking payload for the configured shipment.
    pub async fn fetch_tracking(&self) -> Result<TrackingPayload> {
        let url = format!(
            "{}/api/shipments/{}/tracking",
            self.base_url.trim_end_matches('/'),
            self.order_id
        );

        let payload = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<TrackingPayload>()
            .await?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_payload_for_the_configured_shipment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/shipments/ORD-1042/tracking"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "origin_info": { "trackinfo": [
                    { "location": "Newark, NJ", "checkpoint_date": "2026-07-01 08:19" }
                ] },
                "status": "InTransit",
                "destination": "Boston, MA"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = TrackingProvider::new(server.uri(), "ORD-1042".into());
        let payload = provider.fetch_tracking().await.unwrap();

        assert_eq!(payload.origin_info.trackinfo.len(), 1);
        assert_eq!(payload.destination, "Boston, MA");
    }

    #[tokio::test]
    async fn backend_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = TrackingProvider::new(server.uri(), "ORD-missing".into());
        assert!(provider.fetch_tracking().await.is_err());
    }
}
