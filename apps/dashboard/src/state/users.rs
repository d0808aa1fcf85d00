//! User administration: paged user list, single-user lookup, account
//! changes and per-user activity.

use std::sync::RwLock;

use campus_client::{ActivityLogQuery, ApiBody, ApiClient};
use campus_core::{ActivityLogEntry, Page, PageCursor, User, UserForm};
use tracing::{info, warn};

use super::{ErrorSlot, LoadingFlag};

#[derive(Debug, Clone, Default)]
struct UserList {
    users: Vec<User>,
    cursor: PageCursor,
    size: u32,
}

pub struct UserStore {
    client: ApiClient,
    list: RwLock<UserList>,
    loading: LoadingFlag,
    error: ErrorSlot,
}

impl UserStore {
    pub fn new(client: ApiClient, page_size: u32) -> Self {
        UserStore {
            client,
            list: RwLock::new(UserList {
                size: page_size,
                ..Default::default()
            }),
            loading: LoadingFlag::default(),
            error: ErrorSlot::default(),
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.list.read().map(|l| l.users.clone()).unwrap_or_default()
    }

    pub fn cursor(&self) -> PageCursor {
        self.list.read().map(|l| l.cursor).unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    pub fn clear_error(&self) {
        self.error.clear();
    }

    fn fail(&self, action: &str, e: campus_client::ClientError) {
        warn!(action, error = %e, "User operation failed");
        self.error.set(e.user_message());
    }

    pub async fn fetch_all_users(&self, page: u32, size: u32) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.list_users(page, size).await {
            Ok(fetched) => {
                if let Ok(mut list) = self.list.write() {
                    list.cursor = fetched.cursor();
                    list.size = size;
                    list.users = fetched.content;
                }
                true
            }
            Err(e) => {
                self.fail("list", e);
                false
            }
        }
    }

    pub async fn fetch_single_user(&self, id: i64) -> Option<User> {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.get_user(id).await {
            Ok(user) => Some(user),
            Err(e) => {
                self.fail("get", e);
                None
            }
        }
    }

    pub async fn create_user(&self, form: &UserForm) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.create_user(form).await {
            Ok(()) => true,
            Err(e) => {
                self.fail("create", e);
                false
            }
        }
    }

    pub async fn update_user(&self, id: i64, form: &UserForm) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.update_user(id, form).await {
            Ok(()) => true,
            Err(e) => {
                self.fail("update", e);
                false
            }
        }
    }

    /// Deletes user `id`, then re-fetches the page currently shown.
    pub async fn delete_user(&self, id: i64) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.delete_user(id).await {
            Ok(()) => {
                let (page, size) = self
                    .list
                    .read()
                    .map(|l| (l.cursor.page, l.size))
                    .unwrap_or_default();
                self.fetch_all_users(page, size).await;
                true
            }
            Err(e) => {
                self.fail("delete", e);
                false
            }
        }
    }

    /// Returns whatever the server answered, typically the new password.
    pub async fn reset_password(&self, id: i64) -> Option<ApiBody> {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.reset_password(id).await {
            Ok(body) => Some(body),
            Err(e) => {
                self.fail("reset_password", e);
                None
            }
        }
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.change_password(old_password, new_password).await {
            Ok(()) => {
                info!("Own password changed");
                true
            }
            Err(e) => {
                self.fail("change_password", e);
                false
            }
        }
    }

    pub async fn fetch_user_activity(
        &self,
        user_id: i64,
        page: u32,
        size: u32,
    ) -> Option<Page<ActivityLogEntry>> {
        let _loading = self.loading.start();
        self.error.clear();

        match self
            .client
            .activity_log(&ActivityLogQuery::for_user(user_id, page, size))
            .await
        {
            Ok(activity) => Some(activity),
            Err(e) => {
                self.fail("activity", e);
                None
            }
        }
    }
}
