//! HTTP link store client.
//!
//! Speaks the `/links` API from the payer side, so the transfer flow
//! can resolve links served by a remote VeilPay instance through the
//! same [`LinkStore`] trait the local stores implement.

use reqwest::StatusCode;

use super::{LinkStore, LinkStoreError, LinkTerms, validate_id};
use crate::api::types::{CreateLinkRequest, CreateLinkResponse, LinkResponse};

pub struct HttpLinkClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLinkClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl LinkStore for HttpLinkClient {
    async fn create(&self, terms: LinkTerms) -> Result<String, LinkStoreError> {
        terms.validate()?;

        let body = CreateLinkRequest {
            recipient: Some(terms.recipient.to_string()),
            token: Some(terms.token),
            amount: terms.amount,
            label: terms.label,
        };

        let resp = self
            .http
            .post(format!("{}/links", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| LinkStoreError::Storage(format!("link service unreachable: {}", e)))?;

        match resp.status() {
            StatusCode::OK => {
                let created: CreateLinkResponse = resp
                    .json()
                    .await
                    .map_err(|e| LinkStoreError::Storage(format!("malformed response: {}", e)))?;
                Ok(created.id)
            }
            StatusCode::BAD_REQUEST => Err(LinkStoreError::InvalidTerms(
                "link service rejected the terms".into(),
            )),
            status => Err(LinkStoreError::Storage(format!(
                "link service returned {}",
                status
            ))),
        }
    }

    async fn get(&self, id: &str) -> Result<LinkTerms, LinkStoreError> {
        validate_id(id)?;

        let resp = self
            .http
            .get(format!("{}/links", self.base_url))
            .query(&[("id", id)])
            .send()
            .await
            .map_err(|e| LinkStoreError::Storage(format!("link service unreachable: {}", e)))?;

        match resp.status() {
            StatusCode::OK => {
                let link: LinkResponse = resp
                    .json()
                    .await
                    .map_err(|e| LinkStoreError::Storage(format!("malformed response: {}", e)))?;
                let recipient = link
                    .recipient
                    .parse()
                    .map_err(|e| LinkStoreError::Storage(format!("malformed recipient: {}", e)))?;
                Ok(LinkTerms {
                    recipient,
                    token: link.token,
                    amount: link.amount,
                    label: link.label,
                })
            }
            StatusCode::NOT_FOUND => Err(LinkStoreError::NotFound),
            StatusCode::BAD_REQUEST => Err(LinkStoreError::InvalidId(id.to_string())),
            status => Err(LinkStoreError::Storage(format!(
                "link service returned {}",
                status
            ))),
        }
    }
}
