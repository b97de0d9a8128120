//! # Registry Events
//!
//! Every successful mutating operation produces exactly one
//! [`RegistryEvent`]. The registry stamps it with the height and time of
//! the state transition and pushes it into an [`EventSink`]. Sinks are
//! write-only from the registry's point of view: nothing is ever read back.
//!
//! Two sinks ship with the crate:
//!
//! - [`EventLog`] keeps events in order in memory. Tests use it to assert on
//!   exactly what was emitted; hosts use it to collect a batch's events.
//! - [`TracingSink`] writes each event as a structured `tracing` record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::denom::{Amount, Coin, Denom};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// RegistryEvent
// ---------------------------------------------------------------------------

/// A domain event describing one applied operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A denom was registered.
    DenomCreated { denom: Denom, owner: Address },

    /// A denom changed hands (possibly to the same owner).
    DenomUpdated {
        denom: Denom,
        previous_owner: Address,
        owner: Address,
    },

    /// A denom record was removed.
    DenomDeleted { denom: Denom, owner: Address },

    /// New supply was credited to `recipient`.
    TokensMinted {
        owner: Address,
        denom: Denom,
        amount: Amount,
        recipient: Address,
    },

    /// Existing balance moved between two accounts.
    TokensTransferred {
        from: Address,
        to: Address,
        amount: Coin,
    },
}

impl RegistryEvent {
    /// The event type name.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryEvent::DenomCreated { .. } => "denom_created",
            RegistryEvent::DenomUpdated { .. } => "denom_updated",
            RegistryEvent::DenomDeleted { .. } => "denom_deleted",
            RegistryEvent::TokensMinted { .. } => "tokens_minted",
            RegistryEvent::TokensTransferred { .. } => "tokens_transferred",
        }
    }

    /// Ordered key/value attributes, all rendered as strings.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            RegistryEvent::DenomCreated { denom, owner } => vec![
                ("denom", denom.to_string()),
                ("owner", owner.to_string()),
            ],
            RegistryEvent::DenomUpdated {
                denom,
                previous_owner,
                owner,
            } => vec![
                ("denom", denom.to_string()),
                ("previous_owner", previous_owner.to_string()),
                ("owner", owner.to_string()),
            ],
            RegistryEvent::DenomDeleted { denom, owner } => vec![
                ("denom", denom.to_string()),
                ("owner", owner.to_string()),
            ],
            RegistryEvent::TokensMinted {
                owner,
                denom,
                amount,
                recipient,
            } => vec![
                ("owner", owner.to_string()),
                ("denom", denom.to_string()),
                ("amount", amount.to_string()),
                ("recipient", recipient.to_string()),
            ],
            RegistryEvent::TokensTransferred { from, to, amount } => vec![
                ("from", from.to_string()),
                ("to", to.to_string()),
                ("amount", amount.to_string()),
            ],
        }
    }
}

/// An event together with the transition that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Height of the state transition.
    pub height: u64,
    /// Time of the state transition, as supplied by the host.
    pub time: DateTime<Utc>,
    /// The event itself.
    #[serde(flatten)]
    pub event: RegistryEvent,
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Append-only destination for registry events.
pub trait EventSink {
    /// Publishes one event. Must not fail; a sink that can lose events is
    /// responsible for its own buffering.
    fn publish(&mut self, record: EventRecord);
}

/// Fan-out to two sinks, in order.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn publish(&mut self, record: EventRecord) {
        self.0.publish(record.clone());
        self.1.publish(record);
    }
}

/// In-memory, ordered event capture.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Just the events, oldest first.
    pub fn events(&self) -> Vec<&RegistryEvent> {
        self.records.iter().map(|r| &r.event).collect()
    }

    /// Event kinds, oldest first.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.records.iter().map(|r| r.event.kind()).collect()
    }

    /// The most recent event.
    pub fn last(&self) -> Option<&RegistryEvent> {
        self.records.last().map(|r| &r.event)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes and returns everything captured so far.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, record: EventRecord) {
        self.records.push(record);
    }
}

/// Writes every event as an `info` record on the `mintgate::events` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&mut self, record: EventRecord) {
        let attributes = record
            .event
            .attributes()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(
            target: "mintgate::events",
            kind = record.event.kind(),
            height = record.height,
            %attributes,
            "event"
        );
    }
}
