use async_trait::async_trait;
use quick_xml::{events::Event, reader::Reader};
use reqwest::{Client, StatusCode, header::ACCEPT};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    cache::ContentCache,
    classify::is_monitored_road,
    error::FeedError,
    model::ClosureEvent,
    provider::{FeedId, truncate_body},
};

use super::ClosureFeed;

const FEED: FeedId = FeedId::NationalHighways;

const SITUATION_TAG: &[u8] = b"situation";
const RECORD_TAG: &[u8] = b"sitRoadOrCarriagewayOrLaneManagement";
const MANAGEMENT_TYPE_TAG: &[u8] = b"roadOrCarriagewayOrLaneManagementType";

/// National Highways road closures feed (DATEX II XML).
#[derive(Clone)]
pub struct NationalHighwaysFeed {
    api_key: String,
    url: String,
    http: Client,
    cache: Arc<ContentCache<Vec<ClosureEvent>>>,
}

impl std::fmt::Debug for NationalHighwaysFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NationalHighwaysFeed")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl NationalHighwaysFeed {
    pub fn new(
        api_key: String,
        url: String,
        http: Client,
        cache: Arc<ContentCache<Vec<ClosureEvent>>>,
    ) -> Self {
        Self { api_key, url, http, cache }
    }

    async fn fetch_body(&self) -> Result<String, FeedError> {
        info!(url = %self.url, "fetching closures");

        let res = self
            .http
            .get(&self.url)
            .header("Ocp-Apim-Subscription-Key", self.api_key.as_str())
            .header(ACCEPT, "application/xml")
            .send()
            .await
            .map_err(|e| FeedError::transport(FEED, e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            debug!(
                status = status.as_u16(),
                body = %truncate_body(&body),
                "closures request rejected"
            );
            return Err(FeedError::Status {
                feed: FEED,
                status: status.as_u16(),
                message: status_message(status),
            });
        }

        let body = res.text().await.map_err(|e| FeedError::transport(FEED, e))?;
        if body.trim().is_empty() {
            return Err(FeedError::EmptyBody { feed: FEED });
        }

        debug!(bytes = body.len(), "closures response received");
        Ok(body)
    }
}

#[async_trait]
impl ClosureFeed for NationalHighwaysFeed {
    async fn fetch_events(&self) -> Result<Vec<ClosureEvent>, FeedError> {
        let body = self.fetch_body().await?;
        self.cache.get_or_try_insert_with(&body, parse_closures)
    }
}

/// User-facing message for a rejected closures request. Never includes
/// the response body, which can echo request headers.
fn status_message(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "Authentication failed. Check API key configuration.".to_string(),
        429 => "Rate limit exceeded. Please try again later.".to_string(),
        500 | 502 | 503 => "Service temporarily unavailable. Please try again.".to_string(),
        code => format!("Unable to fetch data (Error {code})"),
    }
}

/// Extract M4/M48 management records from a closures payload.
///
/// Elements are matched by local name so namespace prefixes don't matter.
/// Within a record the first occurrence of each field wins.
pub fn parse_closures(xml: &str) -> Result<Vec<ClosureEvent>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut record: Option<RecordFields> = None;
    let mut events = Vec::new();
    let mut situations = 0usize;
    let mut skipped = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| FeedError::Parse {
            feed: FEED,
            message: format!("XML error at byte {}: {e}", reader.buffer_position()),
        })?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == SITUATION_TAG {
                    situations += 1;
                } else if name == RECORD_TAG {
                    record = Some(RecordFields::default());
                }
                path.push(name);
            }
            Event::End(e) => {
                path.pop();
                if e.local_name().as_ref() == RECORD_TAG {
                    match record.take().and_then(RecordFields::into_event) {
                        Some(closure) if is_monitored_road(&closure.road) => events.push(closure),
                        _ => skipped += 1,
                    }
                }
            }
            Event::Text(t) => {
                if let Some(fields) = record.as_mut() {
                    let text = t.unescape().map_err(|e| FeedError::Parse {
                        feed: FEED,
                        message: format!("bad text content: {e}"),
                    })?;
                    fields.set(&path, text.trim());
                }
            }
            Event::CData(c) => {
                if let Some(fields) = record.as_mut() {
                    fields.set(&path, String::from_utf8_lossy(&c).trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(situations, kept = events.len(), skipped, "parsed closures payload");
    Ok(events)
}

#[derive(Debug, Default)]
struct RecordFields {
    road: Option<String>,
    location: Option<String>,
    comment: Option<String>,
    validity_status: Option<String>,
    start: Option<String>,
    end: Option<String>,
    pos_list: Option<String>,
    probability: Option<String>,
    cause: Option<String>,
    management_type: Option<String>,
    direction: Option<String>,
}

impl RecordFields {
    fn set(&mut self, path: &[Vec<u8>], text: &str) {
        let Some(tag) = path.last() else {
            return;
        };
        if text.is_empty() {
            return;
        }

        let slot = match tag.as_slice() {
            b"roadName" => &mut self.road,
            b"locationDescription" => &mut self.location,
            b"comment" => &mut self.comment,
            b"validityStatus" => &mut self.validity_status,
            b"overallStartTime" => &mut self.start,
            b"overallEndTime" => &mut self.end,
            b"posList" => &mut self.pos_list,
            b"probabilityOfOccurrence" => &mut self.probability,
            b"causeType" => &mut self.cause,
            b"directionOnLinearSection" => &mut self.direction,
            b"value" if parent(path) == Some(MANAGEMENT_TYPE_TAG) => &mut self.management_type,
            _ => return,
        };

        slot.get_or_insert_with(|| text.to_string());
    }

    /// `None` for records without a road name.
    fn into_event(self) -> Option<ClosureEvent> {
        Some(ClosureEvent {
            road: self.road?,
            location: self.location.unwrap_or_else(|| "Unknown".to_string()),
            description: self.comment.unwrap_or_else(|| "No description".to_string()),
            status: self.validity_status.unwrap_or_else(|| "Unknown".to_string()),
            probability: self.probability.unwrap_or_else(|| "unknown".to_string()),
            cause: self.cause.unwrap_or_else(|| "unknown".to_string()),
            management_type: self.management_type,
            start: self.start,
            end: self.end,
            coordinates: self.pos_list,
            direction: self.direction,
        })
    }
}

fn parent(path: &[Vec<u8>]) -> Option<&[u8]> {
    path.len().checked_sub(2).and_then(|i| path.get(i)).map(Vec::as_slice)
}
