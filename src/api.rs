// Card source client: a small blocking client for the AnkiConnect add-on's
// local HTTP API. Two actions are used, `findCards` to list the card ids of a
// deck and `cardsInfo` to fetch the full records for those ids.

use crate::error::FetchError;
use crate::report;
use anyhow::Context;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8765";
const API_VERSION: u8 = 6;

/// Body of every AnkiConnect call.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Request {
    pub action: String,
    pub version: u8,
    pub params: Value,
}

impl Request {
    pub fn new(action: &str, params: Value) -> Self {
        Request {
            action: action.to_string(),
            version: API_VERSION,
            params,
        }
    }
}

/// Response envelope. `result` is kept as a raw value so that a missing
/// field and an explicit `null` are both reported as `MissingResult`.
#[derive(Deserialize, Debug, Default)]
struct Envelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// A card record as returned by `cardsInfo`. The shape is not trusted:
/// the formatter pulls `fields.Front.value` and `fields.Back.value` out of
/// it and skips the record when they are missing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct RawCard(pub Value);

impl RawCard {
    /// Identifier used in diagnostics, `"unknown"` when absent.
    pub fn id(&self) -> String {
        match self.0.get("cardId") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "unknown".into(),
            Some(other) => other.to_string(),
        }
    }

    /// The `value` string of the named note field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get("fields")?.get(name)?.get("value")?.as_str()
    }
}

/// One request/response round trip to the card source.
pub trait Transport {
    fn invoke(&self, request: &Request) -> Result<Value, FetchError>;
}

/// reqwest-backed transport that POSTs JSON to the endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        // AnkiConnect listens on the loopback interface.
        let client = Client::builder()
            .no_proxy()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpTransport {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn invoke(&self, request: &Request) -> Result<Value, FetchError> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()?
            .error_for_status()?;
        let body: Value = res.json()?;
        Ok(body)
    }
}

/// AnkiConnect client over any transport.
pub struct AnkiConnect<T: Transport> {
    transport: T,
}

impl AnkiConnect<HttpTransport> {
    pub fn http(endpoint: &str) -> anyhow::Result<Self> {
        Ok(AnkiConnect::new(HttpTransport::new(endpoint)?))
    }
}

impl<T: Transport> AnkiConnect<T> {
    pub fn new(transport: T) -> Self {
        AnkiConnect { transport }
    }

    fn call(&self, request: Request) -> Result<Value, FetchError> {
        let body = self.transport.invoke(&request)?;
        let envelope: Envelope =
            serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))?;
        match envelope.error {
            Some(Value::Null) | None => {}
            Some(Value::String(msg)) => return Err(FetchError::Api(msg)),
            Some(other) => return Err(FetchError::Api(other.to_string())),
        }
        match envelope.result {
            Some(Value::Null) | None => Err(FetchError::MissingResult),
            Some(result) => Ok(result),
        }
    }

    /// `findCards` with the given search query.
    pub fn find_cards(&self, query: &str) -> Result<Vec<Value>, FetchError> {
        let result = self.call(Request::new(
            "findCards",
            serde_json::json!({ "query": query }),
        ))?;
        serde_json::from_value(result).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// `cardsInfo` for the given card ids.
    pub fn cards_info(&self, card_ids: &[Value]) -> Result<Vec<RawCard>, FetchError> {
        let result = self.call(Request::new(
            "cardsInfo",
            serde_json::json!({ "cards": card_ids }),
        ))?;
        serde_json::from_value(result).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Fetch every card of `deck`. An empty deck is `Ok(vec![])` and the
    /// second request is not made.
    pub fn try_fetch_cards(&self, deck: &str) -> Result<Vec<RawCard>, FetchError> {
        if deck.trim().is_empty() {
            return Err(FetchError::InvalidDeck);
        }
        let card_ids = self.find_cards(&format!("deck:{}", deck))?;
        if card_ids.is_empty() {
            report::step(&format!("No cards found in deck: {}", deck));
            return Ok(Vec::new());
        }
        report::step(&format!("Found {} cards in deck: {}", card_ids.len(), deck));
        self.cards_info(&card_ids)
    }

    /// Like `try_fetch_cards`, but every failure is reported and turned
    /// into an empty result. Callers treat empty as nothing to publish.
    pub fn fetch_cards(&self, deck: &str) -> Vec<RawCard> {
        match self.try_fetch_cards(deck) {
            Ok(cards) => cards,
            Err(e) if e.is_unreachable() => {
                report::error(&format!(
                    "{}. Make sure Anki is running and AnkiConnect is installed.",
                    e
                ));
                Vec::new()
            }
            Err(e) => {
                report::error(&format!("fetching cards from deck {}: {}", deck, e));
                Vec::new()
            }
        }
    }
}
