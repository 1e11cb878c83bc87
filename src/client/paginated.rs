//! Paginated stream for lazy iteration over cursor-based results.
//!
//! The Research API returns results a page at a time. Each page carries a
//! cursor and a `has_more` flag; the next page is requested by sending the
//! same body again with that cursor. [`PaginatedStream`] hides this protocol
//! behind a `Stream` of records and a pull-based
//! [`next_batch`](PaginatedStream::next_batch).
//!
//! The stream is a small state machine: the last cursor, the number of pages
//! fetched, the number of records taken and a done flag. Pages depend on the
//! previous cursor, so at most one fetch is ever in flight.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::http::json_kind;
use super::ClientInner;
use crate::{Error, Result};

/// Continuation marker returned with every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Opaque position to resume from
    pub position: i64,
    /// Search session the position belongs to, when the endpoint issues one
    pub search_id: Option<String>,
    /// Whether the server has more pages after this one
    pub has_more: bool,
}

/// One fetched page of records.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Records in the order the server returned them.
    pub items: Vec<T>,
    /// Where to continue from.
    pub cursor: Cursor,
}

impl<T: DeserializeOwned> Page<T> {
    /// Parse the `data` member of a paged response, taking records from
    /// `list_key`.
    pub(crate) fn from_data(data: Value, list_key: &str) -> Result<Self> {
        let mut data = match data {
            Value::Object(map) => map,
            other => {
                return Err(Error::ResponseFormat(format!(
                    "expected page data to be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let has_more = data
            .get("has_more")
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::ResponseFormat("page has no boolean `has_more`".to_string()))?;

        let position = match data.get("cursor") {
            Some(value) => value.as_i64().ok_or_else(|| {
                Error::ResponseFormat(format!("`cursor` must be an integer, got {}", json_kind(value)))
            })?,
            None if has_more => {
                return Err(Error::ResponseFormat(
                    "page reports more results but has no `cursor`".to_string(),
                ))
            }
            None => 0,
        };

        let search_id = data
            .get("search_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let items = match data.remove(list_key) {
            Some(Value::Array(values)) => values
                .into_iter()
                .enumerate()
                .map(|(index, value)| {
                    T::deserialize(value).map_err(|e| {
                        Error::ResponseFormat(format!("{}[{}]: {}", list_key, index, e))
                    })
                })
                .collect::<Result<Vec<T>>>()?,
            Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(Error::ResponseFormat(format!(
                    "`{}` must be an array, got {}",
                    list_key,
                    json_kind(&other)
                )))
            }
            None => {
                return Err(Error::ResponseFormat(format!(
                    "page has no `{}` member",
                    list_key
                )))
            }
        };

        Ok(Self {
            items,
            cursor: Cursor {
                position,
                search_id,
                has_more,
            },
        })
    }
}

/// Progress of a [`PaginatedStream`].
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    cursor: Option<Cursor>,
    pages_fetched: u32,
    emitted: usize,
    done: bool,
}

impl PaginationState {
    /// Cursor from the last fetched page, if any.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Number of pages fetched successfully.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Number of records handed out or queued to be handed out.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Whether no further page will be requested.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Type alias for a boxed future used internally.
type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type FetchPage<T> = Box<dyn Fn(Option<Cursor>, u32) -> BoxFuture<'static, Result<Page<T>>> + Send + Sync>;

/// A stream that lazily fetches pages from a cursor-paginated endpoint.
///
/// Records are yielded in the order the server returns them. The stream
/// ends when the server reports no more pages or the optional maximum
/// record count is reached; in the latter case no further page is
/// requested. An error is yielded once, where it happened, and ends the
/// stream. Records yielded before it remain valid.
///
/// A stream cannot be restarted; call the endpoint again for a fresh one.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use tiktok_research::VideoId;
///
/// # async fn example(client: tiktok_research::ResearchClient) -> tiktok_research::Result<()> {
/// let mut comments = client.videos().comments(VideoId::new(7_301_234_567_890_123_456), Some(200))?;
///
/// while let Some(comment) = comments.next().await {
///     println!("{:?}", comment?.text);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PaginatedStream<T> {
    /// Fetches the page after the given cursor; the `u32` is the 1-based
    /// page attempt.
    fetch_page: FetchPage<T>,
    /// Upper bound on records yielded, if any.
    max_count: Option<usize>,
    state: PaginationState,
    /// Records of the current page not yet yielded.
    current_items: VecDeque<T>,
    /// Current in-flight fetch future.
    pending_fetch: Option<BoxFuture<'static, Result<Page<T>>>>,
}

impl<T> PaginatedStream<T>
where
    T: Send + 'static,
{
    /// Create a new paginated stream around a page-fetching function.
    pub fn new<F>(fetch_page: F) -> Self
    where
        F: Fn(Option<Cursor>, u32) -> BoxFuture<'static, Result<Page<T>>> + Send + Sync + 'static,
    {
        Self {
            fetch_page: Box::new(fetch_page),
            max_count: None,
            state: PaginationState::default(),
            current_items: VecDeque::new(),
            pending_fetch: None,
        }
    }

    /// Stop after `max_count` records. `None` means no limit.
    pub fn with_max_count(mut self, max_count: Option<usize>) -> Self {
        self.max_count = max_count;
        if max_count == Some(0) {
            self.state.done = true;
        }
        self
    }

    /// Progress so far.
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Pull the next batch of records.
    ///
    /// Returns the records still buffered from the current page if there
    /// are any, otherwise fetches the next page. Empty pages that report
    /// more results are skipped over. Returns `None` once the stream is
    /// exhausted.
    pub async fn next_batch(&mut self) -> Option<Result<Vec<T>>> {
        loop {
            if !self.current_items.is_empty() {
                return Some(Ok(self.current_items.drain(..).collect()));
            }

            let fetch = match self.pending_fetch.take() {
                Some(fetch) => fetch,
                None if self.state.done => return None,
                None => self.start_fetch(),
            };

            match fetch.await {
                Ok(page) => self.apply_page(page),
                Err(e) => {
                    self.state.done = true;
                    return Some(Err(e));
                }
            }
        }
    }

    fn start_fetch(&self) -> BoxFuture<'static, Result<Page<T>>> {
        let page_number = self.state.pages_fetched + 1;
        tracing::debug!(
            page = page_number,
            emitted = self.state.emitted,
            "fetching page"
        );
        (self.fetch_page)(self.state.cursor.clone(), page_number)
    }

    fn apply_page(&mut self, page: Page<T>) {
        let Page { mut items, cursor } = page;
        self.state.pages_fetched += 1;

        if let Some(max) = self.max_count {
            items.truncate(max.saturating_sub(self.state.emitted));
            if self.state.emitted + items.len() >= max {
                self.state.done = true;
            }
        }
        if !cursor.has_more {
            self.state.done = true;
        }

        self.state.emitted += items.len();
        self.state.cursor = Some(cursor);
        self.current_items.extend(items);
    }
}

impl<T> Stream for PaginatedStream<T>
where
    T: Send + 'static,
{
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            // If we have items in the current page, yield the next one
            if let Some(item) = this.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if let Some(ref mut fut) = this.pending_fetch {
                match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(page)) => {
                        this.pending_fetch = None;
                        this.apply_page(page);
                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        this.pending_fetch = None;
                        this.state.done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => {
                        return Poll::Pending;
                    }
                }
            }

            if this.state.done {
                return Poll::Ready(None);
            }

            this.pending_fetch = Some(this.start_fetch());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let buffered = self.current_items.len();
        if self.state.done && self.pending_fetch.is_none() {
            return (buffered, Some(buffered));
        }
        let upper = self
            .max_count
            .map(|max| max.saturating_sub(self.state.emitted) + buffered);
        (buffered, upper)
    }
}

impl<T> Unpin for PaginatedStream<T> {}

impl<T> std::fmt::Debug for PaginatedStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedStream")
            .field("state", &self.state)
            .field("max_count", &self.max_count)
            .field("buffered", &self.current_items.len())
            .finish()
    }
}

/// Builder for streams over a Research API endpoint.
pub(crate) struct PaginatedStreamBuilder<T> {
    inner: Arc<ClientInner>,
    path: &'static str,
    list_key: &'static str,
    fields: String,
    body: Map<String, Value>,
    max_count: Option<usize>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: DeserializeOwned + Send + 'static> PaginatedStreamBuilder<T> {
    /// Create a new builder for `path`, reading records from `list_key`.
    pub(crate) fn new(inner: Arc<ClientInner>, path: &'static str, list_key: &'static str) -> Self {
        Self {
            inner,
            path,
            list_key,
            fields: String::new(),
            body: Map::new(),
            max_count: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set the comma-separated list of requested fields.
    pub(crate) fn fields(mut self, fields: String) -> Self {
        self.fields = fields;
        self
    }

    /// Set the request body sent with every page.
    pub(crate) fn body<B: Serialize>(mut self, body: &B) -> Result<Self> {
        match serde_json::to_value(body)? {
            Value::Object(map) => {
                self.body = map;
                Ok(self)
            }
            other => Err(Error::InvalidInput(format!(
                "request body must serialize to an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Limit the total number of records.
    pub(crate) fn max_count(mut self, max_count: Option<usize>) -> Self {
        self.max_count = max_count;
        self
    }

    /// Build the stream. Nothing is sent until it is polled.
    pub(crate) fn build(self) -> PaginatedStream<T> {
        let inner = self.inner;
        let path = self.path;
        let list_key = self.list_key;
        let fields = self.fields;
        let mut body = self.body;
        let max_count = self.max_count;

        // Per-request size; there is no point asking for more than the total.
        let page_size = match max_count {
            Some(max) => (inner.config.page_size as usize).min(max.max(1)),
            None => inner.config.page_size as usize,
        };
        body.insert("max_count".to_string(), Value::from(page_size));

        PaginatedStream::new(move |cursor: Option<Cursor>, page: u32| {
            let inner = inner.clone();
            let fields = fields.clone();
            let mut body = body.clone();

            Box::pin(async move {
                if let Some(cursor) = cursor {
                    body.insert("cursor".to_string(), Value::from(cursor.position));
                    if let Some(search_id) = cursor.search_id {
                        body.insert("search_id".to_string(), Value::from(search_id));
                    }
                }

                let data = inner.post_data(path, &fields, &body, page).await?;
                let page = Page::<T>::from_data(data, list_key)?;
                tracing::debug!(
                    path,
                    records = page.items.len(),
                    has_more = page.cursor.has_more,
                    "page received"
                );
                Ok::<_, Error>(page)
            })
        })
        .with_max_count(max_count)
    }
}
