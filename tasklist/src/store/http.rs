//! HTTP task store backed by the task server.

use std::time::Duration;

use reqwest::{Client, Response};
use tasklist_proto::api::{BulkUpdate, BulkUpdateResponse, ErrorBody, TASKS_PATH};
use tasklist_proto::task::{Task, TaskId};
use url::Url;

use super::{StoreError, TaskStore};

/// [`TaskStore`] that talks JSON to a task server.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: Client,
    tasks_url: Url,
}

impl HttpTaskStore {
    /// Creates a store for the server at `base_url` (e.g. `http://127.0.0.1:5000`).
    ///
    /// A path on `base_url` is kept as a prefix, so `http://host/portal`
    /// reaches the tasks at `http://host/portal/api/tasks`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUrl`] if `base_url` does not parse, or
    /// [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, StoreError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        let tasks_url = base.join(TASKS_PATH.trim_start_matches('/'))?;
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, tasks_url })
    }

    /// URL of a single task, with the id percent-encoded as a path segment.
    fn task_url(&self, id: &TaskId) -> Result<Url, StoreError> {
        let mut url = self.tasks_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id.as_str());
        Ok(url)
    }
}

/// Turns a non-success response into [`StoreError::Status`].
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

impl TaskStore for HttpTaskStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let response = self
            .client
            .get(self.tasks_url.clone())
            .query(&[("userId", user_id)])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create(&self, task: &Task) -> Result<Task, StoreError> {
        let response = self
            .client
            .post(self.tasks_url.clone())
            .json(task)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, task: &Task) -> Result<Task, StoreError> {
        let url = self.task_url(&task.id)?;
        let response = self.client.put(url).json(task).send().await?;
        match check(response).await {
            Err(StoreError::Status { status: 404, .. }) => Err(StoreError::NotFound(task.id.clone())),
            other => Ok(other?.json().await?),
        }
    }

    async fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        let url = self.task_url(id)?;
        let response = self.client.delete(url).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn replace_all(&self, tasks: &[Task]) -> Result<Vec<Task>, StoreError> {
        let body = BulkUpdate {
            tasks: tasks.to_vec(),
        };
        let response = self
            .client
            .put(self.tasks_url.clone())
            .json(&body)
            .send()
            .await?;
        let body: BulkUpdateResponse = check(response).await?.json().await?;
        Ok(body.tasks)
    }
}
