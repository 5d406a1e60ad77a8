// src/services/authenticator.rs
//! Certificate authentication service.
//!
//! Ties extraction, the registry client and scoring together. A certificate
//! without any recognisable field is reported as unmatched without asking the
//! registry.

use crate::matching::extraction::extract_certificate_fields;
use crate::matching::scoring::authenticate_certificate;
use crate::models::authentication::AuthenticationResult;
use crate::models::certificate::CertificateFields;
use crate::registry::listings_client::{ListingsClient, RegistryError};
use log::info;
use serde::Serialize;
use std::sync::Arc;

/// Extracted certificate paired with its authentication result.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CertificateCheck {
    pub certificate: CertificateFields,
    pub result: AuthenticationResult,
}

/// Authenticates certificates against the registry.
pub struct CertificateAuthenticator {
    listings_client: Arc<ListingsClient>,
}

impl CertificateAuthenticator {
    pub fn new(listings_client: Arc<ListingsClient>) -> Self {
        Self { listings_client }
    }

    /// Authenticates already extracted certificate fields.
    ///
    /// # Returns
    /// - [`AuthenticationResult::unmatched`] if the certificate carries no
    ///   field (no registry call is made)
    /// - otherwise the result for the best registry candidate
    ///
    /// # Errors
    /// Propagates [`RegistryError`] when the listings cannot be fetched.
    /// Failure to verify is *not* an error: it is a result with
    /// `authenticated == false`.
    pub async fn authenticate(
        &self,
        certificate: &CertificateFields,
    ) -> Result<AuthenticationResult, RegistryError> {
        if certificate.is_empty() {
            return Ok(AuthenticationResult::unmatched());
        }

        let listings = self.listings_client.fetch_listings().await?;
        let result = authenticate_certificate(certificate, &listings);

        info!(
            "certificate {:?} checked against {} listings: authenticated={} confidence={:.2}",
            certificate.project_name().unwrap_or("<unnamed>"),
            listings.len(),
            result.authenticated,
            result.confidence
        );
        Ok(result)
    }

    /// Extracts fields from certificate text and authenticates them.
    ///
    /// # Returns
    /// - `Ok(None)` if no field could be extracted (unprocessable certificate)
    /// - `Ok(Some(check))` otherwise, whatever the verdict
    pub async fn authenticate_text(
        &self,
        text: &str,
    ) -> Result<Option<CertificateCheck>, RegistryError> {
        let certificate = extract_certificate_fields(text);
        if certificate.is_empty() {
            info!("no certificate fields found in {} characters of text", text.len());
            return Ok(None);
        }

        let result = self.authenticate(&certificate).await?;
        Ok(Some(CertificateCheck { certificate, result }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::RegistrySettings;

    fn authenticator(base_url: &str) -> CertificateAuthenticator {
        let settings = RegistrySettings {
            base_url: base_url.to_string(),
            api_key: "cm_test_key".to_string(),
            timeout_secs: 5,
            cache_ttl_secs: 0,
        };
        CertificateAuthenticator::new(Arc::new(ListingsClient::new(&settings).unwrap()))
    }

    const LISTINGS: &str = r#"{"data": [
        {"creditId": "C-7", "project": {"name": "Amazon Rainforest", "vintage": 2023, "country": "Brazil", "methodology": "VCS"}}
    ]}"#;

    #[tokio::test]
    async fn test_authenticates_matching_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/listings")
            .with_status(200)
            .with_body(LISTINGS)
            .create_async()
            .await;

        let text = "Project Name: Amazon Rainforest\nVintage Year: 2023\nCountry: brazil\nMethodology: VCS\n";
        let check = authenticator(&server.url())
            .authenticate_text(text)
            .await
            .unwrap()
            .expect("fields should be extracted");

        assert_eq!(check.certificate.country.as_deref(), Some("brazil"));
        assert!(check.result.authenticated);
        assert_eq!(check.result.confidence, 1.0);
        assert_eq!(check.result.matched_credit_id.as_deref(), Some("C-7"));
    }

    #[tokio::test]
    async fn test_unprocessable_text_skips_registry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/listings")
            .with_status(200)
            .with_body(LISTINGS)
            .expect(0)
            .create_async()
            .await;

        let service = authenticator(&server.url());
        assert_eq!(service.authenticate_text("nothing labelled here").await.unwrap(), None);
        assert_eq!(
            service.authenticate(&CertificateFields::default()).await.unwrap(),
            AuthenticationResult::unmatched()
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_registry_failure_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/listings")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = authenticator(&server.url())
            .authenticate_text("Project Name: Anything")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Registry API error: upstream unavailable");
    }

    #[tokio::test]
    async fn test_empty_registry_gives_unmatched() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/listings")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let check = authenticator(&server.url())
            .authenticate_text("Project Name: Lonely Project")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(check.result, AuthenticationResult::unmatched());
    }
}
