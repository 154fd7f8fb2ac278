use crate::deploy::DeployOperation;
use crate::flux::resources::{FluxImage, FluxWorkload, WorkloadId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thin adapter over one Flux daemon endpoint. Holds no session state
/// beyond the selected base URL; one request per operation, no retries.
#[derive(Clone)]
pub struct FluxClient {
    http: reqwest::Client,
    inner: Arc<RwLock<ClientState>>,
}

struct ClientState {
    base_url: Option<Url>,
}

impl FluxClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            inner: Arc::new(RwLock::new(ClientState { base_url: None })),
        }
    }

    pub async fn set_endpoint(&self, url: &str) -> Result<()> {
        let base =
            Url::parse(url).with_context(|| format!("Invalid Flux endpoint URL: {url}"))?;
        self.inner.write().await.base_url = Some(base);
        Ok(())
    }

    pub async fn endpoint(&self) -> Option<Url> {
        self.inner.read().await.base_url.clone()
    }

    async fn api_url(&self, path: &str) -> Result<Url> {
        let state = self.inner.read().await;
        let base = state
            .base_url
            .as_ref()
            .context("No Flux endpoint selected")?;
        base.join(path)
            .with_context(|| format!("Invalid API path: {path}"))
    }

    pub async fn ping(&self) -> Result<()> {
        let url = self.api_url("api/flux/v6/ping").await?;
        self.http
            .get(url)
            .send()
            .await
            .context("Failed to reach the Flux endpoint")?
            .error_for_status()
            .context("Flux endpoint rejected the ping")?;
        Ok(())
    }

    pub async fn list_workloads(&self) -> Result<Vec<FluxWorkload>> {
        let url = self.api_url("api/flux/v11/services").await?;
        let workloads = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to query Flux workloads")?
            .error_for_status()
            .context("Flux returned an error listing workloads")?
            .json()
            .await
            .context("Failed to decode the Flux workload list")?;
        Ok(workloads)
    }

    /// Image catalog for one workload, including the available versions of
    /// each of its containers.
    pub async fn list_images(&self, workload: &WorkloadId) -> Result<Vec<FluxImage>> {
        let mut url = self.api_url("api/flux/v10/images").await?;
        url.query_pairs_mut().append_pair("service", workload.as_str());
        let images = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to query Flux images")?
            .error_for_status()
            .context("Flux returned an error listing images")?
            .json()
            .await
            .context("Failed to decode the Flux image catalog")?;
        Ok(images)
    }

    /// Asks the daemon to release `image_id` for `workload`. Returns the
    /// job ID the daemon assigns to the release.
    pub async fn release_image(&self, workload: &WorkloadId, image_id: &str) -> Result<String> {
        let url = self.api_url("api/flux/v9/update-manifests").await?;
        let body = release_spec(workload, image_id);
        let job_id = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .context("Failed to submit the release to Flux")?
            .error_for_status()
            .context("Flux rejected the release")?
            .json::<String>()
            .await
            .context("Failed to decode the release job ID")?;
        tracing::info!(%workload, image = image_id, job = %job_id, "release submitted");
        Ok(job_id)
    }
}

impl Default for FluxClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeployOperation for FluxClient {
    async fn perform_deploy(&self, workload: &WorkloadId, container_id: &str) -> Result<()> {
        self.release_image(workload, container_id).await?;
        Ok(())
    }
}

fn release_spec(workload: &WorkloadId, image_id: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "image",
        "cause": {
            "Message": format!("Deploy {image_id}"),
            "User": "flux-dashboard",
        },
        "spec": {
            "ServiceSpecs": [workload.as_str()],
            "ImageSpec": image_id,
            "Kind": "execute",
            "Excludes": [],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_spec_targets_exactly_one_workload() {
        let body = release_spec(
            &WorkloadId::new("default:deployment/podinfo"),
            "stefanprodan/podinfo:3.2.0",
        );

        assert_eq!(body["type"], "image");
        assert_eq!(body["spec"]["Kind"], "execute");
        assert_eq!(body["spec"]["ImageSpec"], "stefanprodan/podinfo:3.2.0");
        assert_eq!(
            body["spec"]["ServiceSpecs"],
            serde_json::json!(["default:deployment/podinfo"])
        );
    }

    #[tokio::test]
    async fn requests_without_an_endpoint_fail() {
        let client = FluxClient::new();
        let err = client.api_url("api/flux/v6/ping").await.unwrap_err();
        assert!(err.to_string().contains("No Flux endpoint selected"));
    }

    #[tokio::test]
    async fn rejects_invalid_endpoint_urls() {
        let client = FluxClient::new();
        assert!(client.set_endpoint("not a url").await.is_err());
        assert!(client.endpoint().await.is_none());
    }

    #[tokio::test]
    async fn joins_api_paths_onto_the_endpoint() {
        let client = FluxClient::new();
        client.set_endpoint("http://localhost:3030").await.unwrap();
        let url = client.api_url("api/flux/v11/services").await.unwrap();
        assert_eq!(url.as_str(), "http://localhost:3030/api/flux/v11/services");
    }
}
