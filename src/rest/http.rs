//! Low-level HTTP helpers for the REST storage client.

use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{API_VERSION, RestClient, error::RestError};

impl RestClient {
    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&self.token)
            .header("x-request-id", Uuid::new_v4().to_string())
    }

    async fn settle(builder: RequestBuilder) -> Result<(StatusCode, Vec<u8>), RestError> {
        let response = builder
            .send()
            .await
            .map_err(|err| RestError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RestError::Transport(err.to_string()))?;
        Ok((status, body.to_vec()))
    }

    fn api_error(status: StatusCode, body: &[u8]) -> RestError {
        RestError::Api {
            status: status.as_u16(),
            message: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// GET returning `Ok(None)` on 404; any other failure status is an
    /// [`RestError::Api`].
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, RestError> {
        let (status, body) = Self::settle(self.decorate(self.http.get(url))).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|err| RestError::Decode(err.to_string()))
    }

    /// PUT of a creation body; returns the resource representation echoed by
    /// the provider, which carries the initial `provisioningState`.
    pub(super) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &B,
    ) -> Result<T, RestError> {
        let (status, body) = Self::settle(self.decorate(self.http.put(url)).json(payload)).await?;
        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }
        serde_json::from_slice(&body).map_err(|err| RestError::Decode(err.to_string()))
    }

    /// POST of an action body; the provider answers with an empty accepted
    /// response.
    pub(super) async fn post_json<B: Serialize>(
        &self,
        url: &str,
        payload: &B,
    ) -> Result<(), RestError> {
        let (status, body) = Self::settle(self.decorate(self.http.post(url)).json(payload)).await?;
        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }
        Ok(())
    }

    /// DELETE treating 404 as already gone.
    pub(super) async fn delete_url(&self, url: &str) -> Result<(), RestError> {
        let (status, body) = Self::settle(self.decorate(self.http.delete(url))).await?;
        if status == StatusCode::NOT_FOUND || status.is_success() {
            return Ok(());
        }
        Err(Self::api_error(status, &body))
    }
}
