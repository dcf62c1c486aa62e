//! Cache-key taxonomy for the cached client
//!
//! Keys are opaque tuples of a named query plus optional discriminators
//! such as a record id or search term.

/// Cache key for one query result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    CurrentUser,
    RecentPosts,
    InfinitePosts,
    PostById(String),
    UserPosts(String),
    Users,
    UserById(String),
    SearchPosts(String),
}
