//! `PostgREST` implementation of [`NoteStore`].

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::NoteStore;
use crate::config::BackendConfig;
use crate::models::{Folder, FolderId, FolderPatch, NewFolder, NewNote, Note, NoteId, NotePatch};
use crate::util::backend_error_message;
use crate::{Error, Result};

const NOTES_TABLE: &str = "notes";
const FOLDERS_TABLE: &str = "folders";
const ORDER_BY_POSITION: &str = "position.asc";

/// Talks to `{supabase_url}/rest/v1/{table}`.
///
/// Requests carry the anon key as `apikey` and the user's access token as
/// the bearer. Without a token the anon key is the bearer, which only sees
/// rows the public policies allow (the shared view).
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    rest_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestStore {
    pub fn new(config: &BackendConfig, access_token: impl Into<String>) -> Result<Self> {
        let mut store = Self::anonymous(config)?;
        store.access_token = Some(access_token.into());
        Ok(store)
    }

    /// A store without a signed-in user
    pub fn anonymous(config: &BackendConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            rest_url: config.rest_url(),
            anon_key: config.supabase_anon_key.clone(),
            access_token: None,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, format!("{}/{table}", self.rest_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn select(&self, table: &str, column: &str, value: &str) -> RequestBuilder {
        self.request(Method::GET, table)
            .query(&[("select", "*"), (column, eq(value).as_str())])
    }

    fn select_owned(&self, table: &str, user_id: &str) -> RequestBuilder {
        self.select(table, "user_id", user_id)
            .query(&[("order", ORDER_BY_POSITION)])
    }

    fn insert<T: Serialize>(&self, table: &str, row: &T) -> RequestBuilder {
        self.request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(row)
    }

    fn update<T: Serialize>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        patch: &T,
    ) -> RequestBuilder {
        self.request(Method::PATCH, table)
            .query(&[(column, eq(value))])
            .json(patch)
    }

    fn delete(&self, table: &str, id: &str) -> RequestBuilder {
        self.request(Method::DELETE, table).query(&[("id", eq(id))])
    }
}

impl NoteStore for RestStore {
    async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        fetch_rows(self.select_owned(NOTES_TABLE, user_id)).await
    }

    async fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let rows: Vec<Note> = fetch_rows(self.select(NOTES_TABLE, "id", &id.as_str())).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_note(&self, note: &NewNote) -> Result<Note> {
        fetch_single(self.insert(NOTES_TABLE, note)).await
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        execute(self.update(NOTES_TABLE, "id", &id.as_str(), patch)).await
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        execute(self.delete(NOTES_TABLE, &id.as_str())).await
    }

    async fn detach_folder_notes(&self, folder_id: &FolderId) -> Result<()> {
        execute(self.update(
            NOTES_TABLE,
            "folder_id",
            &folder_id.as_str(),
            &NotePatch::folder(None),
        ))
        .await
    }

    async fn list_folders(&self, user_id: &str) -> Result<Vec<Folder>> {
        fetch_rows(self.select_owned(FOLDERS_TABLE, user_id)).await
    }

    async fn insert_folder(&self, folder: &NewFolder) -> Result<Folder> {
        fetch_single(self.insert(FOLDERS_TABLE, folder)).await
    }

    async fn update_folder(&self, id: &FolderId, patch: &FolderPatch) -> Result<()> {
        execute(self.update(FOLDERS_TABLE, "id", &id.as_str(), patch)).await
    }

    async fn delete_folder(&self, id: &FolderId) -> Result<()> {
        execute(self.delete(FOLDERS_TABLE, &id.as_str())).await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let (client, request) = request.build_split();
    let request = request?;
    tracing::debug!("{} {}", request.method(), request.url().path());

    let response = client.execute(request).await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = backend_error_message(status.as_u16(), &body);
    tracing::warn!("Backend request failed: {}", message);
    Err(Error::Backend(message))
}

async fn execute(request: RequestBuilder) -> Result<()> {
    send(request).await?;
    Ok(())
}

async fn fetch_rows<T: DeserializeOwned>(request: RequestBuilder) -> Result<Vec<T>> {
    Ok(send(request).await?.json::<Vec<T>>().await?)
}

async fn fetch_single<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    fetch_rows(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Backend("Insert did not return the new row".to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config() -> BackendConfig {
        BackendConfig::new("https://demo.supabase.co", "anon-key", None).unwrap()
    }

    fn header(request: &reqwest::Request, name: &str) -> String {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn owner_listing_filters_and_orders() {
        let store = RestStore::new(&config(), "user-token").unwrap();
        let request = store.select_owned(NOTES_TABLE, "user-1").build().unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://demo.supabase.co/rest/v1/notes?select=*&user_id=eq.user-1&order=position.asc"
        );
        assert_eq!(header(&request, "apikey"), "anon-key");
        assert_eq!(header(&request, "authorization"), "Bearer user-token");
    }

    #[test]
    fn anonymous_store_uses_anon_key_as_bearer() {
        let store = RestStore::anonymous(&config()).unwrap();
        let request = store.select(NOTES_TABLE, "id", "abc").build().unwrap();
        assert_eq!(header(&request, "authorization"), "Bearer anon-key");
    }

    #[test]
    fn inserts_ask_for_the_stored_row() {
        let store = RestStore::new(&config(), "t").unwrap();
        let request = store
            .insert(NOTES_TABLE, &NewNote::untitled("user-1", 1, None))
            .build()
            .unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(header(&request, "prefer"), "return=representation");
    }

    #[test]
    fn detach_targets_folder_column() {
        let store = RestStore::new(&config(), "t").unwrap();
        let folder = FolderId::new();
        let request = store
            .update(NOTES_TABLE, "folder_id", &folder.as_str(), &NotePatch::folder(None))
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::PATCH);
        assert_eq!(request.url().query(), Some(format!("folder_id=eq.{folder}").as_str()));
        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, br#"{"folder_id":null}"#);
    }

    #[test]
    fn delete_filters_by_id() {
        let store = RestStore::new(&config(), "t").unwrap();
        let request = store.delete(FOLDERS_TABLE, "f-1").build().unwrap();
        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(
            request.url().as_str(),
            "https://demo.supabase.co/rest/v1/folders?id=eq.f-1"
        );
    }
}
