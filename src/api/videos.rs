//! Video query and comment endpoints.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::BearerToken;
use crate::client::paginated::{PaginatedStream, PaginatedStreamBuilder};
use crate::client::{ClientInner, ResearchClient};
use crate::models::primitives::serialize_date;
use crate::models::{Comment, DateRange, Query, Video, VideoId, COMMENT_FIELDS, VIDEO_FIELDS};
use crate::{Error, Result};

const VIDEO_QUERY_PATH: &str = "/v2/research/video/query/";
const VIDEO_COMMENTS_PATH: &str = "/v2/research/video/comment/list/";

/// Service for video search and comments.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use futures_util::TryStreamExt;
/// use tiktok_research::models::{Condition, Query, QueryField, Video};
/// use tiktok_research::{DateRange, VideoQueryRequest};
///
/// # async fn example(client: tiktok_research::ResearchClient) -> tiktok_research::Result<()> {
/// let query = Query::builder()
///     .and(Condition::is_in(QueryField::RegionCode, ["JP", "US"]))
///     .and(Condition::eq(QueryField::Keyword, "animal"))
///     .build()?;
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
/// )?;
///
/// let videos: Vec<Video> = client
///     .videos()
///     .query(VideoQueryRequest::new(query, range).max_count(250))?
///     .try_collect()
///     .await?;
/// println!("{} videos", videos.len());
/// # Ok(())
/// # }
/// ```
pub struct VideosService {
    inner: Arc<ClientInner>,
}

/// Parameters for a video query.
#[derive(Debug, Clone)]
pub struct VideoQueryRequest {
    query: Query,
    range: DateRange,
    max_count: Option<usize>,
    is_random: bool,
    fields: Option<Vec<String>>,
}

impl VideoQueryRequest {
    /// Query videos matching `query` posted within `range`.
    pub fn new(query: Query, range: DateRange) -> Self {
        Self {
            query,
            range,
            max_count: None,
            is_random: false,
            fields: None,
        }
    }

    /// Stop after this many videos in total.
    pub fn max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Ask the API to return matching videos in random order.
    pub fn random(mut self, is_random: bool) -> Self {
        self.is_random = is_random;
        self
    }

    /// Override the requested fields. `id` is always requested as well.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// The filter being queried.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The date range being queried.
    pub fn range(&self) -> DateRange {
        self.range
    }
}

#[derive(Serialize)]
struct VideoQueryBody<'a> {
    query: &'a Query,
    #[serde(serialize_with = "serialize_date")]
    start_date: NaiveDate,
    #[serde(serialize_with = "serialize_date")]
    end_date: NaiveDate,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_random: bool,
}

#[derive(Serialize)]
struct CommentsBody {
    video_id: VideoId,
}

impl VideosService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Start a video query.
    ///
    /// The date range is checked before anything is sent: a start date after
    /// the end date fails with [`Error::InvalidInput`] and no request is
    /// made. The returned stream fetches lazily and stops after `max_count`
    /// videos when given.
    pub fn start_query(
        &self,
        query: Query,
        start_date: NaiveDate,
        end_date: NaiveDate,
        max_count: Option<usize>,
    ) -> Result<PaginatedStream<Video>> {
        let range = DateRange::new(start_date, end_date)?;
        let mut request = VideoQueryRequest::new(query, range);
        request.max_count = max_count;
        self.query(request)
    }

    /// Stream the videos matching a request.
    pub fn query(&self, request: VideoQueryRequest) -> Result<PaginatedStream<Video>> {
        self.query_as(request)
    }

    /// Stream the videos matching a request as a caller-chosen record type,
    /// e.g. `serde_json::Value` to keep every field the API returns.
    pub fn query_as<T>(&self, request: VideoQueryRequest) -> Result<PaginatedStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let fields = join_fields(request.fields.as_deref(), VIDEO_FIELDS)?;
        let body = VideoQueryBody {
            query: &request.query,
            start_date: request.range.start(),
            end_date: request.range.end(),
            is_random: request.is_random,
        };

        tracing::debug!(range = %request.range, max_count = ?request.max_count, "starting video query");

        Ok(
            PaginatedStreamBuilder::<T>::new(self.inner.clone(), VIDEO_QUERY_PATH, "videos")
                .fields(fields)
                .body(&body)?
                .max_count(request.max_count)
                .build(),
        )
    }

    /// Stream the comments on a video.
    pub fn comments(&self, video_id: VideoId, max_count: Option<usize>) -> Result<PaginatedStream<Comment>> {
        video_id.validate()?;

        Ok(
            PaginatedStreamBuilder::<Comment>::new(self.inner.clone(), VIDEO_COMMENTS_PATH, "comments")
                .fields(COMMENT_FIELDS.join(","))
                .body(&CommentsBody { video_id })?
                .max_count(max_count)
                .build(),
        )
    }
}

/// Start a video query with a bearer token and the default configuration.
///
/// Shorthand for building a [`ResearchClient`] and calling
/// [`VideosService::start_query`]. Validation errors are returned before any
/// network call.
///
/// ```no_run
/// use chrono::NaiveDate;
/// use futures_util::StreamExt;
/// use tiktok_research::models::{Condition, Query, QueryField};
///
/// # async fn example(token: tiktok_research::BearerToken) -> tiktok_research::Result<()> {
/// let query = Query::builder()
///     .and(Condition::eq(QueryField::HashtagName, "science"))
///     .build()?;
///
/// let mut videos = tiktok_research::start_query(
///     token,
///     query,
///     NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
///     Some(100),
/// )?;
/// while let Some(video) = videos.next().await {
///     println!("{:?}", video?.video_description);
/// }
/// # Ok(())
/// # }
/// ```
pub fn start_query(
    token: BearerToken,
    query: Query,
    start_date: NaiveDate,
    end_date: NaiveDate,
    max_count: Option<usize>,
) -> Result<PaginatedStream<Video>> {
    let range = DateRange::new(start_date, end_date)?;
    let mut request = VideoQueryRequest::new(query, range);
    request.max_count = max_count;
    ResearchClient::new(token)?.videos().query(request)
}

/// Join requested fields into the comma-separated `fields` parameter.
///
/// `id` is always requested, since every record is keyed by it.
pub(crate) fn join_fields(custom: Option<&[String]>, default: &[&str]) -> Result<String> {
    match custom {
        None => Ok(default.join(",")),
        Some([]) => Err(Error::InvalidInput("field list must not be empty".to_string())),
        Some(fields) => {
            if fields.iter().any(|f| f.trim().is_empty() || f.contains(',')) {
                return Err(Error::InvalidInput(format!("invalid field list: {:?}", fields)));
            }
            if fields.iter().any(|f| f == "id") {
                Ok(fields.join(","))
            } else {
                Ok(format!("id,{}", fields.join(",")))
            }
        }
    }
}
