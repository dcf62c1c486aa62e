//! Cached client surface
//!
//! Reads run through the query cache (shared fetches, freshness tracking);
//! mutations run through the invalidation rules so dependent queries are
//! refetched on their next read.

use std::sync::Arc;

use backend::models::{AccountInfo, Session};
use backend::{Account, Avatars, BackendConfig, Databases, HttpClient, Storage};
use common::cache::QueryCache;
use common::error::{Error, Result};
use tracing::debug;

use crate::auth::AuthService;
use crate::models::{NewPost, NewUser, Post, SavedRecord, UpdatePost, UpdateUser, User};
use crate::repositories::UserRepository;
use crate::repositories::post::PostRepository;

pub mod keys;

pub use keys::QueryKey;

/// Data-access client for UI consumers
///
/// Reads are cached per [`QueryKey`] with de-duplication of concurrent
/// identical fetches; mutations mark the affected keys stale.
#[derive(Clone)]
pub struct Client {
    cache: QueryCache<QueryKey>,
    posts: PostRepository,
    users: UserRepository,
    auth: AuthService,
}

impl Client {
    /// Wire every service to the backend HTTP client
    pub fn new(config: BackendConfig) -> Self {
        let config = Arc::new(config);
        let http = Arc::new(HttpClient::new((*config).clone()));
        Self::with_services(config, http.clone(), http.clone(), http.clone(), http)
    }

    /// Dependency-injecting constructor used by tests and alternative
    /// transports
    pub fn with_services(
        config: Arc<BackendConfig>,
        databases: Arc<dyn Databases>,
        storage: Arc<dyn Storage>,
        account: Arc<dyn Account>,
        avatars: Arc<dyn Avatars>,
    ) -> Self {
        let users = UserRepository::new(config.clone(), databases.clone(), storage.clone());
        let posts = PostRepository::new(config, databases, storage);
        let auth = AuthService::new(account, avatars, users.clone());
        Self {
            cache: QueryCache::new(),
            posts,
            users,
            auth,
        }
    }

    /// Shared cache handle
    pub fn cache(&self) -> &QueryCache<QueryKey> {
        &self.cache
    }

    // QUERIES

    /// The newest posts (cached)
    pub async fn get_recent_posts(&self) -> Result<Vec<Post>> {
        self.cache
            .get_or_fetch(QueryKey::RecentPosts, || self.posts.get_recent_posts())
            .await
    }

    /// A post by id (cached); an empty id is rejected before any call
    pub async fn get_post_by_id(&self, post_id: &str) -> Result<Post> {
        if post_id.is_empty() {
            return Err(Error::Validation("missing post id".to_string()));
        }
        self.cache
            .get_or_fetch(QueryKey::PostById(post_id.to_string()), || {
                self.posts.get_post_by_id(post_id)
            })
            .await
    }

    /// Posts created by a user (cached); an empty id short-circuits to an
    /// empty list without fetching
    pub async fn get_user_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        if user_id.is_empty() {
            return Ok(Vec::new());
        }
        self.cache
            .get_or_fetch(QueryKey::UserPosts(user_id.to_string()), || {
                self.posts.get_user_posts(user_id)
            })
            .await
    }

    /// Caption search (cached per term); an empty term short-circuits to an
    /// empty list without fetching
    pub async fn search_posts(&self, term: &str) -> Result<Vec<Post>> {
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.cache
            .get_or_fetch(QueryKey::SearchPosts(term.to_string()), || {
                self.posts.search_posts(term)
            })
            .await
    }

    /// All users, newest first, optionally capped (cached)
    pub async fn get_users(&self, limit: Option<u32>) -> Result<Vec<User>> {
        self.cache
            .get_or_fetch(QueryKey::Users, || self.users.get_users(limit))
            .await
    }

    /// A user by id (cached); an empty id is rejected before any call
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        if user_id.is_empty() {
            return Err(Error::Validation("missing user id".to_string()));
        }
        self.cache
            .get_or_fetch(QueryKey::UserById(user_id.to_string()), || {
                self.users.get_user_by_id(user_id)
            })
            .await
    }

    /// Profile for the active session (cached); `Ok(None)` when logged out
    pub async fn get_current_user(&self) -> Result<Option<User>> {
        self.cache
            .get_or_fetch(QueryKey::CurrentUser, || self.auth.get_current_user())
            .await
    }

    /// Cursor-paginated feed handle
    pub fn post_feed(&self) -> PostFeed {
        PostFeed {
            posts: self.posts.clone(),
            cache: self.cache.clone(),
            pages: Vec::new(),
            cursor: None,
            exhausted: false,
            started: false,
        }
    }

    // MUTATIONS

    /// Sign up: backend account plus profile record
    pub async fn create_user_account(&self, user: NewUser) -> Result<User> {
        self.cache
            .mutate(self.auth.create_user_account(user), |_, _| {})
            .await
    }

    /// Start an email/password session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.cache
            .mutate(self.auth.sign_in(email, password), |_, _| {})
            .await
    }

    /// End the current session
    pub async fn sign_out(&self) -> Result<()> {
        self.cache.mutate(self.auth.sign_out(), |_, _| {}).await
    }

    /// The currently authenticated backend account (uncached)
    pub async fn get_account(&self) -> Result<AccountInfo> {
        self.auth.get_account().await
    }

    /// Create a post and mark the recent-posts listing stale
    pub async fn create_post(&self, post: NewPost) -> Result<Post> {
        self.cache
            .mutate(self.posts.create_post(post), |_, cache| {
                cache.invalidate(&[QueryKey::RecentPosts]);
            })
            .await
    }

    /// Update a post and mark its by-id entry stale
    pub async fn update_post(&self, post: UpdatePost) -> Result<Post> {
        self.cache
            .mutate(self.posts.update_post(post), |updated: &Post, cache| {
                cache.invalidate(&[QueryKey::PostById(updated.id.clone())]);
            })
            .await
    }

    /// Delete a post and mark the recent-posts listing stale
    pub async fn delete_post(&self, post_id: &str, image_id: &str) -> Result<bool> {
        self.cache
            .mutate(self.posts.delete_post(post_id, image_id), |_, cache| {
                cache.invalidate(&[QueryKey::RecentPosts]);
            })
            .await
    }

    /// Overwrite a post's likes and mark every listing that shows like
    /// state stale
    pub async fn like_post(&self, post_id: &str, likes: Vec<String>) -> Result<Post> {
        self.cache
            .mutate(self.posts.like_post(post_id, likes), |updated: &Post, cache| {
                cache.invalidate(&[
                    QueryKey::PostById(updated.id.clone()),
                    QueryKey::RecentPosts,
                    QueryKey::InfinitePosts,
                    QueryKey::CurrentUser,
                ]);
            })
            .await
    }

    /// Save a post for a user and mark the current-user entry stale
    pub async fn save_post(&self, user_id: &str, post_id: &str) -> Result<SavedRecord> {
        self.cache
            .mutate(self.posts.save_post(user_id, post_id), |_, cache| {
                cache.invalidate(&[QueryKey::CurrentUser]);
            })
            .await
    }

    /// Remove a saved-post record and mark the current-user entry stale
    pub async fn delete_saved_post(&self, saved_record_id: &str) -> Result<()> {
        self.cache
            .mutate(self.posts.delete_saved_post(saved_record_id), |_, cache| {
                cache.invalidate(&[QueryKey::CurrentUser]);
            })
            .await
    }

    /// Update a profile and mark the current-user and by-id entries stale
    pub async fn update_user(&self, update: UpdateUser) -> Result<User> {
        self.cache
            .mutate(self.users.update_user(update), |updated: &User, cache| {
                cache.invalidate(&[
                    QueryKey::CurrentUser,
                    QueryKey::UserById(updated.id.clone()),
                ]);
            })
            .await
    }
}

/// Cursor-based pagination over the feed, most recently updated first
///
/// `next_page` stops permanently once the backend returns an empty page.
/// Invalidating [`QueryKey::InfinitePosts`] resets the feed: the next call
/// starts over from the first page.
pub struct PostFeed {
    posts: PostRepository,
    cache: QueryCache<QueryKey>,
    pages: Vec<Vec<Post>>,
    cursor: Option<String>,
    exhausted: bool,
    started: bool,
}

impl PostFeed {
    /// Fetch the next page; `Ok(None)` once the feed is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<Post>>> {
        if self.started && !self.cache.is_fresh(&QueryKey::InfinitePosts) {
            debug!("feed cache went stale, restarting from the first page");
            self.pages.clear();
            self.cursor = None;
            self.exhausted = false;
            self.started = false;
        }
        if self.exhausted {
            return Ok(None);
        }

        let page = self.posts.get_posts_page(self.cursor.as_deref()).await?;
        self.started = true;
        if page.is_empty() {
            self.exhausted = true;
            self.cache.put(QueryKey::InfinitePosts, &self.pages)?;
            return Ok(None);
        }

        self.cursor = page.last().map(|post| post.id.clone());
        self.pages.push(page.clone());
        self.cache.put(QueryKey::InfinitePosts, &self.pages)?;
        Ok(Some(page))
    }

    /// Pages fetched so far
    pub fn pages(&self) -> &[Vec<Post>] {
        &self.pages
    }
}
