//! User profile, social graph and per-user video endpoints.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::paginated::{PaginatedStream, PaginatedStreamBuilder};
use crate::client::ClientInner;
use crate::models::{UserFollower, UserInfo, Username, Video, USER_INFO_FIELDS, USER_VIDEO_FIELDS};
use crate::{Error, Result};

const USER_INFO_PATH: &str = "/v2/research/user/info/";
const USER_FOLLOWERS_PATH: &str = "/v2/research/user/followers/";
const USER_FOLLOWING_PATH: &str = "/v2/research/user/following/";
const USER_LIKED_VIDEOS_PATH: &str = "/v2/research/user/liked_videos/";
const USER_REPOSTED_VIDEOS_PATH: &str = "/v2/research/user/reposted_videos/";
const USER_PINNED_VIDEOS_PATH: &str = "/v2/research/user/pinned_videos/";

/// Service for user lookups.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use tiktok_research::Username;
///
/// # async fn example(client: tiktok_research::ResearchClient) -> tiktok_research::Result<()> {
/// let user = Username::new("tiktok");
///
/// let info = client.users().info(&user).await?;
/// println!("{:?} has {:?} followers", info.display_name, info.follower_count);
///
/// let mut followers = client.users().followers(&user, Some(1000))?;
/// while let Some(follower) = followers.next().await {
///     println!("{}", follower?.username);
/// }
/// # Ok(())
/// # }
/// ```
pub struct UsersService {
    inner: Arc<ClientInner>,
}

#[derive(Serialize)]
struct UserBody<'a> {
    username: &'a Username,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<i64>,
}

impl<'a> UserBody<'a> {
    fn new(username: &'a Username) -> Self {
        Self {
            username,
            cursor: None,
        }
    }

    /// Seed the initial cursor with a timestamp, as the liked/reposted
    /// endpoints page backwards in time from it.
    fn starting_from(mut self, starting_from: Option<DateTime<Utc>>) -> Self {
        self.cursor = starting_from.map(|t| t.timestamp());
        self
    }
}

impl UsersService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get a user's public profile.
    pub async fn info(&self, username: &Username) -> Result<UserInfo> {
        username.validate()?;
        self.inner
            .post(USER_INFO_PATH, &USER_INFO_FIELDS.join(","), &UserBody::new(username))
            .await
    }

    /// Stream the accounts following a user.
    ///
    /// The follower and following endpoints return a fixed record shape and
    /// take no `fields` parameter.
    pub fn followers(&self, username: &Username, max_count: Option<usize>) -> Result<PaginatedStream<UserFollower>> {
        self.graph(USER_FOLLOWERS_PATH, "user_followers", username, max_count)
    }

    /// Stream the accounts a user follows. Like [`followers`](Self::followers),
    /// no `fields` parameter is sent.
    pub fn following(&self, username: &Username, max_count: Option<usize>) -> Result<PaginatedStream<UserFollower>> {
        self.graph(USER_FOLLOWING_PATH, "user_following", username, max_count)
    }

    /// Stream the videos a user liked, optionally starting from a point in
    /// time.
    pub fn liked_videos(
        &self,
        username: &Username,
        starting_from: Option<DateTime<Utc>>,
        max_count: Option<usize>,
    ) -> Result<PaginatedStream<Video>> {
        self.user_videos(USER_LIKED_VIDEOS_PATH, "user_liked_videos", username, starting_from, max_count)
    }

    /// Stream the videos a user reposted, optionally starting from a point in
    /// time.
    pub fn reposted_videos(
        &self,
        username: &Username,
        starting_from: Option<DateTime<Utc>>,
        max_count: Option<usize>,
    ) -> Result<PaginatedStream<Video>> {
        self.user_videos(
            USER_REPOSTED_VIDEOS_PATH,
            "user_reposted_videos",
            username,
            starting_from,
            max_count,
        )
    }

    /// Get the videos pinned to a user's profile.
    ///
    /// This endpoint is not paginated.
    pub async fn pinned_videos(&self, username: &Username) -> Result<Vec<Video>> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(default)]
            pinned_videos_list: Option<Vec<Video>>,
        }

        username.validate()?;
        let response: Response = self
            .inner
            .post(
                USER_PINNED_VIDEOS_PATH,
                &USER_VIDEO_FIELDS.join(","),
                &UserBody::new(username),
            )
            .await?;
        Ok(response.pinned_videos_list.unwrap_or_default())
    }

    fn graph(
        &self,
        path: &'static str,
        list_key: &'static str,
        username: &Username,
        max_count: Option<usize>,
    ) -> Result<PaginatedStream<UserFollower>> {
        username.validate()?;

        Ok(
            PaginatedStreamBuilder::<UserFollower>::new(self.inner.clone(), path, list_key)
                .body(&UserBody::new(username))?
                .max_count(max_count)
                .build(),
        )
    }

    fn user_videos(
        &self,
        path: &'static str,
        list_key: &'static str,
        username: &Username,
        starting_from: Option<DateTime<Utc>>,
        max_count: Option<usize>,
    ) -> Result<PaginatedStream<Video>> {
        username.validate()?;
        if starting_from.is_some_and(|t| t.timestamp() < 0) {
            return Err(Error::InvalidInput(
                "starting time must not be before the Unix epoch".to_string(),
            ));
        }

        Ok(
            PaginatedStreamBuilder::<Video>::new(self.inner.clone(), path, list_key)
                .fields(USER_VIDEO_FIELDS.join(","))
                .body(&UserBody::new(username).starting_from(starting_from))?
                .max_count(max_count)
                .build(),
        )
    }
}
