//! Entry resources: one REST collection per [`Category`](campus_core::Category).

use campus_core::{CoreError, Entry, ListRequest, Page};
use tracing::{debug, info};

use crate::error::ClientResult;
use crate::http::ApiClient;

impl ApiClient {
    /// `GET <resource>?startDate=..&endDate=..&unitId=..&page=..&size=..`
    pub async fn list_entries<E: Entry>(&self, request: &ListRequest) -> ClientResult<Page<E>> {
        request.filter.validate()?;
        let path = format!(
            "{}?{}",
            E::CATEGORY.resource_path(),
            request.to_query_string()
        );
        let page: Page<E> = self.get_json(&path).await?;
        debug!(
            category = %E::CATEGORY,
            page = page.number,
            total_pages = page.total_pages,
            count = page.content.len(),
            "Entries fetched"
        );
        Ok(page)
    }

    /// `POST <resource>`; the response body is not used.
    pub async fn create_entry<E: Entry>(&self, entry: &E) -> ClientResult<()> {
        self.post(E::CATEGORY.resource_path(), entry).await?;
        info!(category = %E::CATEGORY, "Entry submitted");
        Ok(())
    }

    /// `DELETE <resource>/{id}`.
    ///
    /// Fails without a request for categories that have no DELETE endpoint.
    pub async fn delete_entry<E: Entry>(&self, id: i64) -> ClientResult<()> {
        if !E::CATEGORY.supports_delete() {
            return Err(CoreError::DeleteNotSupported(E::CATEGORY).into());
        }
        self.delete(&format!("{}/{}", E::CATEGORY.resource_path(), id))
            .await?;
        info!(category = %E::CATEGORY, id, "Entry deleted");
        Ok(())
    }
}
