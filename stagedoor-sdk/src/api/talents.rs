//! `talent/*` endpoints (the signed-in talent's own profile) and public talent profiles.

use stagedoor_common::Id;
use stagedoor_common::talent::{
    Education, EducationInput, Experience, ExperienceInput, MediaItem, MediaType, NewSkill,
    ProfileUpdate, Skill, TalentProfile,
};

use super::FileUpload;
use crate::HttpClient;
use crate::envelope::Envelope;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct TalentsApi {
    client: HttpClient,
}

impl TalentsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET talent/profile`.
    pub async fn profile(&self) -> Result<TalentProfile> {
        self.get("talent/profile").await
    }

    /// `PUT talent/profile`. Returns the updated profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<TalentProfile> {
        let envelope: Envelope<TalentProfile> =
            self.client.put_json("talent/profile", update).await?;
        Ok(envelope.into_inner())
    }

    /// `POST talent/profile/avatar` (multipart, field `avatar`). Returns the new avatar URL.
    pub async fn upload_avatar(&self, file: FileUpload) -> Result<String> {
        let form = file.into_form("avatar")?;
        let envelope: Envelope<AvatarBody> =
            self.client.upload("talent/profile/avatar", form).await?;
        Ok(envelope.into_inner().avatar_url)
    }

    /// `GET talent/skills`.
    pub async fn skills(&self) -> Result<Vec<Skill>> {
        self.get("talent/skills").await
    }

    /// `POST talent/skills`.
    pub async fn add_skill(&self, skill: &NewSkill) -> Result<Skill> {
        let envelope: Envelope<Skill> = self.client.post_json("talent/skills", skill).await?;
        Ok(envelope.into_inner())
    }

    /// `DELETE talent/skills/{id}`.
    pub async fn remove_skill(&self, id: Id) -> Result<()> {
        self.client.delete(&format!("talent/skills/{id}")).await
    }

    /// `GET talent/experiences`.
    pub async fn experiences(&self) -> Result<Vec<Experience>> {
        self.get("talent/experiences").await
    }

    /// `POST talent/experiences`.
    pub async fn create_experience(&self, input: &ExperienceInput) -> Result<Experience> {
        let envelope: Envelope<Experience> =
            self.client.post_json("talent/experiences", input).await?;
        Ok(envelope.into_inner())
    }

    /// `PUT talent/experiences/{id}`.
    pub async fn update_experience(&self, id: Id, input: &ExperienceInput) -> Result<Experience> {
        let envelope: Envelope<Experience> = self
            .client
            .put_json(&format!("talent/experiences/{id}"), input)
            .await?;
        Ok(envelope.into_inner())
    }

    /// `DELETE talent/experiences/{id}`.
    pub async fn delete_experience(&self, id: Id) -> Result<()> {
        self.client.delete(&format!("talent/experiences/{id}")).await
    }

    /// `GET talent/education`.
    pub async fn education(&self) -> Result<Vec<Education>> {
        self.get("talent/education").await
    }

    /// `POST talent/education`.
    pub async fn create_education(&self, input: &EducationInput) -> Result<Education> {
        let envelope: Envelope<Education> =
            self.client.post_json("talent/education", input).await?;
        Ok(envelope.into_inner())
    }

    /// `PUT talent/education/{id}`.
    pub async fn update_education(&self, id: Id, input: &EducationInput) -> Result<Education> {
        let envelope: Envelope<Education> = self
            .client
            .put_json(&format!("talent/education/{id}"), input)
            .await?;
        Ok(envelope.into_inner())
    }

    /// `DELETE talent/education/{id}`.
    pub async fn delete_education(&self, id: Id) -> Result<()> {
        self.client.delete(&format!("talent/education/{id}")).await
    }

    /// `GET talent/media`.
    pub async fn media(&self) -> Result<Vec<MediaItem>> {
        self.get("talent/media").await
    }

    /// `POST talent/media` (multipart: `file`, `media_type`, optional `title`).
    pub async fn upload_media(
        &self,
        file: FileUpload,
        media_type: MediaType,
        title: Option<&str>,
    ) -> Result<MediaItem> {
        let mut form = file
            .into_form("file")?
            .text("media_type", media_type.as_str());
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            form = form.text("title", title.to_string());
        }
        let envelope: Envelope<MediaItem> = self.client.upload("talent/media", form).await?;
        Ok(envelope.into_inner())
    }

    /// `DELETE talent/media/{id}`.
    pub async fn delete_media(&self, id: Id) -> Result<()> {
        self.client.delete(&format!("talent/media/{id}")).await
    }

    /// `GET public/talents/{id}`: any talent's public profile.
    pub async fn public_profile(&self, id: Id) -> Result<TalentProfile> {
        self.get(&format!("public/talents/{id}")).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let envelope: Envelope<T> = self.client.get_json(path).await?;
        Ok(envelope.into_inner())
    }
}

#[derive(serde::Deserialize)]
struct AvatarBody {
    #[serde(alias = "url")]
    avatar_url: String,
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::test_support::signed_in_client;

    #[tokio::test]
    async fn skills_accept_both_envelopes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/talent/skills");
                then.status(200).json_body(json!({
                    "data": [{ "id": 1, "name": "Tap dance", "level": "advanced" }]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/talent/experiences");
                then.status(200).json_body(json!([]));
            })
            .await;

        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/profile");
        let api = client.talents();
        let skills = api.skills().await.unwrap();
        assert_eq!(skills[0].name, "Tap dance");
        assert!(api.experiences().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn avatar_upload_is_multipart() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/talent/profile/avatar")
                    .header_exists("content-type")
                    .body_includes("filename=\"me.png\"")
                    .body_includes("name=\"avatar\"");
                then.status(200)
                    .json_body(json!({ "data": { "avatar_url": "https://cdn.example.com/me.png" } }));
            })
            .await;

        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/profile");
        let url = client
            .talents()
            .upload_avatar(FileUpload::new("me.png", "image/png", vec![0x89, 0x50]))
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/me.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_profile_sends_only_set_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/v1/talent/profile")
                    .json_body(json!({ "headline": "Baritone" }));
                then.status(200).json_body(json!({
                    "id": 4, "user_id": 11, "first_name": "Kemi", "last_name": "Adeyemi",
                    "headline": "Baritone"
                }));
            })
            .await;

        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/profile");
        let update = ProfileUpdate {
            headline: Some("Baritone".into()),
            ..ProfileUpdate::default()
        };
        let profile = client.talents().update_profile(&update).await.unwrap();
        assert_eq!(profile.headline.as_deref(), Some("Baritone"));
        mock.assert_async().await;
    }
}
