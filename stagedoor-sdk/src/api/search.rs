//! Public search over talents and casting calls.

use stagedoor_common::casting::CastingCall;
use stagedoor_common::search::{CastingCallFilters, TalentSearchFilters, TalentSummary};

use crate::HttpClient;
use crate::envelope::Page;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct SearchApi {
    client: HttpClient,
}

impl SearchApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET public/talents/search`.
    pub async fn talents(&self, filters: &TalentSearchFilters) -> Result<Page<TalentSummary>> {
        self.client
            .get_json_with_query("public/talents/search", filters.to_pairs())
            .await
    }

    /// `GET public/casting-calls/search`.
    pub async fn casting_calls(&self, filters: &CastingCallFilters) -> Result<Page<CastingCall>> {
        self.client
            .get_json_with_query("public/casting-calls/search", filters.to_pairs())
            .await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::test_support::test_client;

    #[tokio::test]
    async fn talent_search_sends_filters_and_reads_bare_arrays() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/public/talents/search")
                    .query_param("q", "dancer")
                    .query_param("skills", "tap,ballet");
                then.status(200).json_body(json!([
                    { "id": 1, "user_id": 2, "first_name": "Ife", "last_name": "Obi", "skills": ["tap"] }
                ]));
            })
            .await;

        let (client, _nav) = test_client(&server.url("/api/v1/"));
        let filters = TalentSearchFilters {
            query: Some("dancer".into()),
            skills: vec!["tap".into(), "ballet".into()],
            ..TalentSearchFilters::default()
        };
        let page = client.search().talents(&filters).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.meta.total, 1);
        mock.assert_async().await;
    }
}
