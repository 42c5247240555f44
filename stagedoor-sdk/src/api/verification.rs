//! Identity document and phone verification.

use stagedoor_common::verification::{DocumentType, VerificationStatus};

use super::FileUpload;
use super::auth::Acknowledgement;
use crate::HttpClient;
use crate::envelope::Envelope;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct VerificationApi {
    client: HttpClient,
}

impl VerificationApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET verification/status`.
    pub async fn status(&self) -> Result<VerificationStatus> {
        let envelope: Envelope<VerificationStatus> =
            self.client.get_json("verification/status").await?;
        Ok(envelope.into_inner())
    }

    /// `POST verification/documents` (multipart: `document_type`, `document`).
    pub async fn submit_document(
        &self,
        document_type: DocumentType,
        file: FileUpload,
    ) -> Result<VerificationStatus> {
        let form = file
            .into_form("document")?
            .text("document_type", document_type.as_str());
        let envelope: Envelope<VerificationStatus> =
            self.client.upload("verification/documents", form).await?;
        Ok(envelope.into_inner())
    }

    /// `POST verification/phone/send`: texts a 6-digit code.
    pub async fn send_phone_code(&self, phone: &str) -> Result<Acknowledgement> {
        let body = serde_json::json!({ "phone": phone });
        let ack: Option<Acknowledgement> =
            self.client.post_json("verification/phone/send", &body).await?;
        Ok(ack.unwrap_or_default())
    }

    /// `POST verification/phone/confirm`.
    pub async fn confirm_phone(&self, phone: &str, code: &str) -> Result<VerificationStatus> {
        let body = serde_json::json!({ "phone": phone, "code": code });
        let envelope: Envelope<VerificationStatus> = self
            .client
            .post_json("verification/phone/confirm", &body)
            .await?;
        Ok(envelope.into_inner())
    }
}
