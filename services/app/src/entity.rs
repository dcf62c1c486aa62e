//! Entity factory: normalizes raw input into validated payloads
//!
//! Runs before any network call; uniqueness of emails and usernames is a
//! backend concern and is not checked here.

use common::error::{Error, Result};
use rand::Rng;

use crate::models::{NewPost, NewUser};

/// Validate and normalize a sign-up payload
///
/// Trims the name, lowercases and trims the email, and derives a username
/// from the name when none was supplied.
pub fn new_user(mut data: NewUser) -> Result<NewUser> {
    if data.name.trim().is_empty() || data.email.trim().is_empty() || data.password.is_empty() {
        return Err(Error::Validation(
            "name, email and password are required".to_string(),
        ));
    }

    data.name = data.name.trim().to_string();
    data.email = data.email.trim().to_lowercase();
    if data
        .username
        .as_deref()
        .is_none_or(|username| username.trim().is_empty())
    {
        data.username = Some(generate_username(&data.name));
    }

    Ok(data)
}

/// Validate and normalize a new-post payload
///
/// Tags remain a comma-separated string here; they are split into an array
/// at persistence time by [`split_tags`].
pub fn new_post(mut data: NewPost) -> Result<NewPost> {
    if data.user_id.is_empty() || data.caption.trim().is_empty() || data.files.is_empty() {
        return Err(Error::Validation(
            "user id, caption and a file are required".to_string(),
        ));
    }

    data.caption = data.caption.trim().to_string();
    data.tags = data
        .tags
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(data)
}

/// Split a tag string into the array persisted on the post record
///
/// Whitespace inside each segment is stripped, empty segments are dropped.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|tag| tag.split_whitespace().collect::<String>())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn generate_username(name: &str) -> String {
    let base = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let suffix = rand::thread_rng().gen_range(0..1000);
    format!("{base}{suffix}")
}
