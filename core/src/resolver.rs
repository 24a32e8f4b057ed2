//! Recipient resolution: raw address, name-service lookup, or pass-through.
//!
//! Lookups are explicit request/response pairs keyed by the recipient text
//! that triggered them. A response whose key no longer matches the current
//! text is cached for reuse but never changes the resolution.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::address::AddressFormat;

pub const DEFAULT_NAME_SUFFIX: &str = ".ust";
pub const NOT_FOUND_MESSAGE: &str = "Address not found";
pub const SEARCHING_MESSAGE: &str = "Searching for address...";

/// Answers kept for reuse; the oldest is evicted first.
const MAX_CACHED_ANSWERS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No recipient entered.
    Unset,
    /// The text itself is a valid address.
    LiteralAddress(String),
    /// Waiting on the name service for `key`.
    Resolving { key: String },
    ResolvedFromName { name: String, address: String },
    /// A name with the service suffix that the service does not know.
    NotFound { name: String },
    /// Lookup came back empty for text without the suffix. The text is
    /// passed through as-is and left for address validation to reject.
    Unresolved(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub key: String,
    pub address: Option<String>,
}

impl LookupResponse {
    pub fn new(key: impl Into<String>, address: Option<String>) -> Self {
        Self {
            key: key.into(),
            address,
        }
    }
}

/// Side effects the host has to carry out after a resolver transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverEvent {
    /// Recipient became a literal address; move focus to the amount.
    FocusAmount,
    /// Ask the name service; answer with [`RecipientResolver::apply_lookup`].
    Lookup(LookupRequest),
    /// Entered the not-found state; surface the field error once.
    NotFound,
}

#[derive(Debug, Clone)]
pub struct RecipientResolver {
    format: AddressFormat,
    suffix: String,
    text: String,
    resolution: Resolution,
    answered: HashMap<String, Option<String>>,
    answer_order: VecDeque<String>,
    in_flight: HashSet<String>,
}

impl RecipientResolver {
    pub fn new(format: AddressFormat, suffix: impl Into<String>) -> Self {
        Self {
            format,
            suffix: suffix.into(),
            text: String::new(),
            resolution: Resolution::Unset,
            answered: HashMap::new(),
            answer_order: VecDeque::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The address a transaction would be sent to, if any.
    pub fn resolved_address(&self) -> Option<&str> {
        match &self.resolution {
            Resolution::LiteralAddress(addr) => Some(addr),
            Resolution::ResolvedFromName { address, .. } => Some(address),
            Resolution::Unresolved(text) => Some(text),
            Resolution::Unset | Resolution::Resolving { .. } | Resolution::NotFound { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self.resolution {
            Resolution::NotFound { .. } => Some(NOT_FOUND_MESSAGE),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.resolution, Resolution::Resolving { .. })
    }

    /// Re-evaluate after the user edited the recipient field.
    pub fn set_text(&mut self, text: impl Into<String>) -> Vec<ResolverEvent> {
        let text = text.into();
        if text == self.text && self.resolution != Resolution::Unset {
            return Vec::new();
        }
        self.text = text;

        let was_literal = matches!(self.resolution, Resolution::LiteralAddress(_));
        let mut events = Vec::new();

        if self.text.is_empty() {
            self.transition(Resolution::Unset);
        } else if self.format.is_valid(&self.text) {
            self.transition(Resolution::LiteralAddress(self.text.clone()));
            if !was_literal {
                events.push(ResolverEvent::FocusAmount);
            }
        } else if let Some(answer) = self.answered.get(&self.text).cloned() {
            events.extend(self.settle(answer));
        } else {
            let key = self.text.clone();
            if self.in_flight.insert(key.clone()) {
                events.push(ResolverEvent::Lookup(LookupRequest { key: key.clone() }));
            }
            self.transition(Resolution::Resolving { key });
        }

        events
    }

    /// Feed a name-service answer back in.
    pub fn apply_lookup(&mut self, response: LookupResponse) -> Vec<ResolverEvent> {
        self.in_flight.remove(&response.key);
        self.remember(response.key.clone(), response.address.clone());

        let current = matches!(
            &self.resolution,
            Resolution::Resolving { key } if *key == response.key
        );
        if !current {
            debug!(key = %response.key, current = %self.text, "discarding stale lookup");
            return Vec::new();
        }
        self.settle(response.address)
    }

    fn remember(&mut self, key: String, answer: Option<String>) {
        if self.answered.insert(key.clone(), answer).is_none() {
            self.answer_order.push_back(key);
        }
        while self.answer_order.len() > MAX_CACHED_ANSWERS {
            if let Some(oldest) = self.answer_order.pop_front() {
                self.answered.remove(&oldest);
            }
        }
    }

    fn settle(&mut self, answer: Option<String>) -> Vec<ResolverEvent> {
        match answer {
            Some(address) => {
                self.transition(Resolution::ResolvedFromName {
                    name: self.text.clone(),
                    address,
                });
                Vec::new()
            }
            None if self.text.ends_with(&self.suffix) => {
                self.transition(Resolution::NotFound {
                    name: self.text.clone(),
                });
                vec![ResolverEvent::NotFound]
            }
            None => {
                self.transition(Resolution::Unresolved(self.text.clone()));
                Vec::new()
            }
        }
    }

    fn transition(&mut self, next: Resolution) {
        debug!(from = ?self.resolution, to = ?next, "recipient resolution");
        self.resolution = next;
    }
}
