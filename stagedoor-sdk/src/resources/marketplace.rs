//! Projects, casting calls, applications, search, verification and reference data.

use stagedoor_common::application::{Application, ApplicationInput, ApplicationStatus};
use stagedoor_common::casting::{CastingCall, CastingCallInput, CastingCallStatus};
use stagedoor_common::project::{Project, ProjectInput, ProjectStatus};
use stagedoor_common::reference::ReferenceItem;
use stagedoor_common::search::{CastingCallFilters, TalentSearchFilters, TalentSummary};
use stagedoor_common::verification::{DocumentType, VerificationStatus};
use stagedoor_common::{Id, UserPatch};

use super::Stagedoor;
use super::keys::{self, family};
use crate::api::{Acknowledgement, CastingFormData, FileUpload};
use crate::envelope::Page;
use crate::errors::Result;
use crate::query::{QueryKey, QueryResult};

fn casting_families() -> [QueryKey; 2] {
    [
        family(keys::CASTING_CALLS),
        family(keys::CASTING_CALL_SEARCH),
    ]
}

/// An application changes both the listings and the call's `applications_count`, which
/// search results carry too.
fn application_families() -> [QueryKey; 3] {
    [
        family(keys::APPLICATIONS),
        family(keys::CASTING_CALLS),
        family(keys::CASTING_CALL_SEARCH),
    ]
}

impl Stagedoor {
    // === Projects ===

    pub async fn projects(
        &self,
        page: Option<u32>,
        status: Option<ProjectStatus>,
    ) -> QueryResult<Page<Project>> {
        let api = self.client.projects();
        self.query(keys::projects(page, status), async move {
            api.list(page, status).await
        })
        .await
    }

    pub async fn project(&self, id: Id) -> QueryResult<Project> {
        let api = self.client.projects();
        self.query(keys::project(id), async move { api.get(id).await })
            .await
    }

    pub async fn create_project(&self, input: &ProjectInput) -> Result<Project> {
        let api = self.client.projects();
        self.mutate([family(keys::PROJECTS)], api.create(input)).await
    }

    pub async fn update_project(&self, id: Id, input: &ProjectInput) -> Result<Project> {
        let api = self.client.projects();
        self.mutate([family(keys::PROJECTS)], api.update(id, input))
            .await
    }

    pub async fn delete_project(&self, id: Id) -> Result<()> {
        let api = self.client.projects();
        self.mutate([family(keys::PROJECTS)], api.delete(id)).await
    }

    // === Casting calls ===

    pub async fn casting_calls(&self, filters: &CastingCallFilters) -> QueryResult<Page<CastingCall>> {
        let api = self.client.casting_calls();
        let owned = filters.clone();
        self.query(keys::casting_calls(filters), async move {
            api.list(&owned).await
        })
        .await
    }

    pub async fn casting_call(&self, id: Id) -> QueryResult<CastingCall> {
        let api = self.client.casting_calls();
        self.query(keys::casting_call(id), async move { api.get(id).await })
            .await
    }

    /// The recruiter's own casting calls, drafts included.
    pub async fn my_casting_calls(
        &self,
        page: Option<u32>,
        status: Option<CastingCallStatus>,
    ) -> QueryResult<Page<CastingCall>> {
        let api = self.client.casting_calls();
        self.query(keys::my_casting_calls(page, status), async move {
            api.mine(page, status).await
        })
        .await
    }

    pub async fn create_casting_call(&self, input: &CastingCallInput) -> Result<CastingCall> {
        let api = self.client.casting_calls();
        self.mutate(casting_families(), api.create(input)).await
    }

    pub async fn update_casting_call(&self, id: Id, input: &CastingCallInput) -> Result<CastingCall> {
        let api = self.client.casting_calls();
        self.mutate(casting_families(), api.update(id, input)).await
    }

    /// Also drops the applications listed under the deleted call.
    pub async fn delete_casting_call(&self, id: Id) -> Result<()> {
        let api = self.client.casting_calls();
        let mut invalidates = casting_families().to_vec();
        invalidates.push(family(keys::APPLICATIONS));
        self.mutate(invalidates, api.delete(id)).await
    }

    pub async fn publish_casting_call(&self, id: Id) -> Result<CastingCall> {
        let api = self.client.casting_calls();
        self.mutate(casting_families(), api.publish(id)).await
    }

    pub async fn close_casting_call(&self, id: Id) -> Result<CastingCall> {
        let api = self.client.casting_calls();
        self.mutate(casting_families(), api.close(id)).await
    }

    // === Applications ===

    pub async fn my_applications(
        &self,
        page: Option<u32>,
        status: Option<ApplicationStatus>,
    ) -> QueryResult<Page<Application>> {
        let api = self.client.applications();
        self.query(keys::my_applications(page, status), async move {
            api.mine(page, status).await
        })
        .await
    }

    pub async fn casting_call_applications(
        &self,
        casting_call_id: Id,
        page: Option<u32>,
        status: Option<ApplicationStatus>,
    ) -> QueryResult<Page<Application>> {
        let api = self.client.applications();
        self.query(
            keys::casting_call_applications(casting_call_id, page, status),
            async move { api.for_casting_call(casting_call_id, page, status).await },
        )
        .await
    }

    pub async fn apply(&self, casting_call_id: Id, input: &ApplicationInput) -> Result<Application> {
        let api = self.client.applications();
        self.mutate(application_families(), api.apply(casting_call_id, input))
            .await
    }

    pub async fn withdraw_application(&self, id: Id) -> Result<()> {
        let api = self.client.applications();
        self.mutate(application_families(), api.withdraw(id)).await
    }

    /// Recruiter decision on an application.
    pub async fn update_application_status(
        &self,
        id: Id,
        status: ApplicationStatus,
        note: Option<&str>,
    ) -> Result<Application> {
        let api = self.client.applications();
        self.mutate(
            [family(keys::APPLICATIONS)],
            api.update_status(id, status, note),
        )
        .await
    }

    // === Search ===

    pub async fn search_talents(
        &self,
        filters: &TalentSearchFilters,
    ) -> QueryResult<Page<TalentSummary>> {
        let api = self.client.search();
        let owned = filters.clone();
        self.query(keys::talent_search(filters), async move {
            api.talents(&owned).await
        })
        .await
    }

    pub async fn search_casting_calls(
        &self,
        filters: &CastingCallFilters,
    ) -> QueryResult<Page<CastingCall>> {
        let api = self.client.search();
        let owned = filters.clone();
        self.query(keys::casting_call_search(filters), async move {
            api.casting_calls(&owned).await
        })
        .await
    }

    // === Verification ===

    pub async fn verification_status(&self) -> QueryResult<VerificationStatus> {
        let api = self.client.verification();
        self.query(keys::verification(), async move { api.status().await })
            .await
    }

    pub async fn submit_verification_document(
        &self,
        document_type: DocumentType,
        file: FileUpload,
    ) -> Result<VerificationStatus> {
        let api = self.client.verification();
        self.mutate(
            [family(keys::VERIFICATION)],
            api.submit_document(document_type, file),
        )
        .await
    }

    /// Text a code to `phone`. Nothing cached changes until it is confirmed.
    pub async fn send_phone_code(&self, phone: &str) -> Result<Acknowledgement> {
        self.client.verification().send_phone_code(phone).await
    }

    /// Confirm the texted code and record the phone on the session user.
    pub async fn confirm_phone(&self, phone: &str, code: &str) -> Result<VerificationStatus> {
        let api = self.client.verification();
        let status = self
            .mutate([family(keys::VERIFICATION)], api.confirm_phone(phone, code))
            .await?;
        let patch = UserPatch {
            phone: Some(Some(phone.to_string())),
            ..UserPatch::default()
        };
        self.refresh_session_user(&patch);
        Ok(status)
    }

    // === Reference data ===

    /// Dropdown data of the casting-call form, fetched in parallel and cached as one entry.
    pub async fn casting_form_data(&self) -> QueryResult<CastingFormData> {
        let api = self.client.reference();
        self.query(keys::reference("casting-form"), async move {
            api.casting_form_data().await
        })
        .await
    }

    pub async fn skill_options(&self) -> QueryResult<Vec<ReferenceItem>> {
        let api = self.client.reference();
        self.query(keys::reference("skills"), async move { api.skills().await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::test_support::signed_in_client;

    fn call_json(id: u64, count: u32) -> serde_json::Value {
        json!({
            "id": id,
            "recruiter_id": 2,
            "title": "Lead role",
            "status": "published",
            "applications_count": count
        })
    }

    #[tokio::test]
    async fn applying_refreshes_applications_and_the_call() {
        let server = MockServer::start_async().await;
        let call = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/casting-calls/4");
                then.status(200).json_body(json!({ "data": call_json(4, 0) }));
            })
            .await;
        let mine = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/applications");
                then.status(200).json_body(json!([]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/casting-calls/4/apply");
                then.status(201).json_body(json!({
                    "data": { "id": 30, "casting_call_id": 4, "talent_id": 11, "status": "pending" }
                }));
            })
            .await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/public/casting-calls/search");
                then.status(200).json_body(json!([call_json(4, 0)]));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/casting-calls/4");
        let stagedoor = Stagedoor::new(client);
        let filters = CastingCallFilters::default();

        stagedoor.casting_call(4).await.unwrap();
        stagedoor.my_applications(None, None).await.unwrap();
        stagedoor.search_casting_calls(&filters).await.unwrap();
        stagedoor
            .apply(4, &ApplicationInput::default())
            .await
            .unwrap();
        stagedoor.casting_call(4).await.unwrap();
        stagedoor.my_applications(None, None).await.unwrap();
        stagedoor.search_casting_calls(&filters).await.unwrap();

        assert_eq!(call.hits_async().await, 2);
        assert_eq!(mine.hits_async().await, 2);
        assert_eq!(search.hits_async().await, 2);
    }

    #[tokio::test]
    async fn deleting_a_call_drops_its_applications() {
        let server = MockServer::start_async().await;
        let listed = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/casting-calls/4/applications");
                then.status(200).json_body(json!([]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/casting-calls/4");
                then.status(204);
            })
            .await;
        let (client, _nav) =
            signed_in_client(&server.url("/api/v1/"), "tok", "/recruiter/casting-calls");
        let stagedoor = Stagedoor::new(client);

        stagedoor.casting_call_applications(4, None, None).await.unwrap();
        stagedoor.delete_casting_call(4).await.unwrap();
        stagedoor.casting_call_applications(4, None, None).await.unwrap();

        assert_eq!(listed.hits_async().await, 2);
    }

    #[tokio::test]
    async fn search_filters_are_part_of_the_key() {
        let server = MockServer::start_async().await;
        let dancers = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/public/talents/search")
                    .query_param("q", "dancer");
                then.status(200).json_body(json!([]));
            })
            .await;
        let singers = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/public/talents/search")
                    .query_param("q", "singer");
                then.status(200).json_body(json!([]));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/search");
        let stagedoor = Stagedoor::new(client);

        let dancer = TalentSearchFilters {
            query: Some("dancer".into()),
            ..TalentSearchFilters::default()
        };
        let singer = TalentSearchFilters {
            query: Some("singer".into()),
            ..TalentSearchFilters::default()
        };
        stagedoor.search_talents(&dancer).await.unwrap();
        stagedoor.search_talents(&singer).await.unwrap();
        stagedoor.search_talents(&dancer).await.unwrap();

        assert_eq!(dancers.hits_async().await, 1);
        assert_eq!(singers.hits_async().await, 1);
    }
}
