//! Talent and recruiter profile reads and edits.
//!
//! Profile edits also refresh the session user (names, avatar) so the header and menus
//! update without a refetch of `auth/me`.

use stagedoor_common::talent::{
    Education, EducationInput, Experience, ExperienceInput, MediaItem, MediaType, NewSkill,
    ProfileUpdate, Skill, TalentProfile,
};
use stagedoor_common::recruiter::{RecruiterProfile, RecruiterProfileUpdate};
use stagedoor_common::{Id, UserPatch};

use super::Stagedoor;
use super::keys::{self, family};
use crate::api::FileUpload;
use crate::cross_log;
use crate::errors::Result;
use crate::query::{QueryKey, QueryResult};

/// Everything shown on a talent's own profile page.
fn profile_families() -> [QueryKey; 3] {
    [
        family(keys::TALENT_PROFILE),
        family(keys::PUBLIC_TALENTS),
        family(keys::TALENT_SEARCH),
    ]
}

impl Stagedoor {
    // === Reads ===

    pub async fn talent_profile(&self) -> QueryResult<TalentProfile> {
        let api = self.client.talents();
        self.query(keys::talent_profile(), async move { api.profile().await })
            .await
    }

    pub async fn skills(&self) -> QueryResult<Vec<Skill>> {
        let api = self.client.talents();
        self.query(keys::skills(), async move { api.skills().await }).await
    }

    pub async fn experiences(&self) -> QueryResult<Vec<Experience>> {
        let api = self.client.talents();
        self.query(keys::experiences(), async move { api.experiences().await })
            .await
    }

    pub async fn education(&self) -> QueryResult<Vec<Education>> {
        let api = self.client.talents();
        self.query(keys::education(), async move { api.education().await })
            .await
    }

    pub async fn media(&self) -> QueryResult<Vec<MediaItem>> {
        let api = self.client.talents();
        self.query(keys::media(), async move { api.media().await }).await
    }

    /// Another talent's public profile.
    pub async fn public_talent(&self, id: Id) -> QueryResult<TalentProfile> {
        let api = self.client.talents();
        self.query(keys::public_talent(id), async move { api.public_profile(id).await })
            .await
    }

    pub async fn recruiter_profile(&self) -> QueryResult<RecruiterProfile> {
        let api = self.client.recruiters();
        self.query(keys::recruiter_profile(), async move { api.profile().await })
            .await
    }

    // === Writes ===

    /// Save the profile and carry the new names into the session user.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<TalentProfile> {
        let api = self.client.talents();
        let profile = self
            .mutate(profile_families(), api.update_profile(update))
            .await?;
        self.refresh_session_user(&UserPatch::names(
            profile.first_name.clone(),
            profile.last_name.clone(),
        ));
        Ok(profile)
    }

    /// Upload a new avatar and show it in the session user. Returns its URL.
    pub async fn upload_avatar(&self, file: FileUpload) -> Result<String> {
        let api = self.client.talents();
        let url = self
            .mutate(profile_families(), api.upload_avatar(file))
            .await?;
        self.refresh_session_user(&UserPatch::avatar(url.clone()));
        Ok(url)
    }

    pub async fn add_skill(&self, skill: &NewSkill) -> Result<Skill> {
        let api = self.client.talents();
        self.mutate(skill_families(), api.add_skill(skill)).await
    }

    pub async fn remove_skill(&self, id: Id) -> Result<()> {
        let api = self.client.talents();
        self.mutate(skill_families(), api.remove_skill(id)).await
    }

    pub async fn create_experience(&self, input: &ExperienceInput) -> Result<Experience> {
        let api = self.client.talents();
        self.mutate(experience_families(), api.create_experience(input))
            .await
    }

    pub async fn update_experience(&self, id: Id, input: &ExperienceInput) -> Result<Experience> {
        let api = self.client.talents();
        self.mutate(experience_families(), api.update_experience(id, input))
            .await
    }

    pub async fn delete_experience(&self, id: Id) -> Result<()> {
        let api = self.client.talents();
        self.mutate(experience_families(), api.delete_experience(id))
            .await
    }

    pub async fn create_education(&self, input: &EducationInput) -> Result<Education> {
        let api = self.client.talents();
        self.mutate(education_families(), api.create_education(input))
            .await
    }

    pub async fn update_education(&self, id: Id, input: &EducationInput) -> Result<Education> {
        let api = self.client.talents();
        self.mutate(education_families(), api.update_education(id, input))
            .await
    }

    pub async fn delete_education(&self, id: Id) -> Result<()> {
        let api = self.client.talents();
        self.mutate(education_families(), api.delete_education(id))
            .await
    }

    pub async fn upload_media(
        &self,
        file: FileUpload,
        media_type: MediaType,
        title: Option<&str>,
    ) -> Result<MediaItem> {
        let api = self.client.talents();
        self.mutate(media_families(), api.upload_media(file, media_type, title))
            .await
    }

    pub async fn delete_media(&self, id: Id) -> Result<()> {
        let api = self.client.talents();
        self.mutate(media_families(), api.delete_media(id)).await
    }

    pub async fn update_recruiter_profile(
        &self,
        update: &RecruiterProfileUpdate,
    ) -> Result<RecruiterProfile> {
        let api = self.client.recruiters();
        self.mutate(
            [family(keys::RECRUITER_PROFILE)],
            api.update_profile(update),
        )
        .await
    }

    pub(super) fn refresh_session_user(&self, patch: &UserPatch) {
        if let Err(e) = self.session.update_user(patch) {
            cross_log!(debug, "No session user to refresh: {}", e);
        }
    }
}

fn skill_families() -> [QueryKey; 3] {
    [
        family(keys::SKILLS),
        family(keys::TALENT_PROFILE),
        family(keys::PUBLIC_TALENTS),
    ]
}

fn experience_families() -> [QueryKey; 3] {
    [
        family(keys::EXPERIENCES),
        family(keys::TALENT_PROFILE),
        family(keys::PUBLIC_TALENTS),
    ]
}

fn education_families() -> [QueryKey; 3] {
    [
        family(keys::EDUCATION),
        family(keys::TALENT_PROFILE),
        family(keys::PUBLIC_TALENTS),
    ]
}

fn media_families() -> [QueryKey; 3] {
    [
        family(keys::MEDIA),
        family(keys::TALENT_PROFILE),
        family(keys::PUBLIC_TALENTS),
    ]
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;
    use serde_json::json;
    use stagedoor_common::talent::SkillLevel;

    use super::*;
    use crate::test_support::signed_in_client;

    fn skill_json(id: u64, name: &str) -> serde_json::Value {
        json!({ "id": id, "name": name, "level": "advanced" })
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_request() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/talent/skills");
                then.status(200)
                    .delay(Duration::from_millis(150))
                    .json_body(json!({ "data": [skill_json(1, "Stage combat")] }));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/skills");
        let stagedoor = Stagedoor::new(client);

        let (a, b) = tokio::join!(stagedoor.skills(), stagedoor.skills());
        assert_eq!(a.unwrap()[0].name, "Stage combat");
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(list.hits_async().await, 1);
    }

    #[tokio::test]
    async fn adding_a_skill_forces_a_fresh_list() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/talent/skills");
                then.status(200).json_body(json!([skill_json(1, "Stage combat")]));
            })
            .await;
        let add = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/talent/skills")
                    .json_body(json!({ "name": "Tap dance", "level": "expert" }));
                then.status(201).json_body(json!({ "data": skill_json(2, "Tap dance") }));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/skills");
        let stagedoor = Stagedoor::new(client);

        stagedoor.skills().await.unwrap();
        stagedoor.skills().await.unwrap();
        assert_eq!(list.hits_async().await, 1);

        let skill = stagedoor
            .add_skill(&NewSkill {
                name: "Tap dance".into(),
                level: SkillLevel::Expert,
                years_of_experience: None,
            })
            .await
            .unwrap();
        assert_eq!(skill.id, 2);
        add.assert_async().await;

        stagedoor.skills().await.unwrap();
        assert_eq!(list.hits_async().await, 2);
    }

    #[tokio::test]
    async fn failed_write_keeps_the_cache() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/talent/skills");
                then.status(200).json_body(json!([]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/talent/skills/9");
                then.status(404).json_body(json!({ "message": "Skill not found" }));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/skills");
        let stagedoor = Stagedoor::new(client);

        stagedoor.skills().await.unwrap();
        assert!(stagedoor.remove_skill(9).await.is_err());
        stagedoor.skills().await.unwrap();
        assert_eq!(list.hits_async().await, 1);
    }

    #[tokio::test]
    async fn profile_edit_updates_the_session_user() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/v1/talent/profile");
                then.status(200).json_body(json!({
                    "data": {
                        "id": 3,
                        "user_id": 11,
                        "first_name": "Kemi",
                        "last_name": "Bello"
                    }
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/talent/profile/avatar");
                then.status(200)
                    .json_body(json!({ "avatar_url": "https://cdn.example.com/k.png" }));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/profile");
        let stagedoor = Stagedoor::new(client);

        let update = ProfileUpdate {
            last_name: Some("Bello".into()),
            ..ProfileUpdate::default()
        };
        stagedoor.update_profile(&update).await.unwrap();
        assert_eq!(stagedoor.session().user().unwrap().last_name, "Bello");

        let url = stagedoor
            .upload_avatar(FileUpload::new("k.png", "image/png", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(
            stagedoor.session().user().unwrap().avatar_url.as_deref(),
            Some(url.as_str())
        );
    }
}
