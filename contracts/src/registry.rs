//! # Denom Registry
//!
//! The keeper for denom records. It is the only component that writes the
//! record store, and every write goes through an ownership check first.
//!
//! ## Operation shape
//!
//! Every mutating operation follows the same sequence:
//!
//! 1. Validate inputs that need no state (denom syntax, account addresses).
//! 2. Look up the record and check the caller against its owner.
//! 3. Perform exactly one fallible mutation: a store write, a store remove,
//!    or one ledger call.
//! 4. Publish exactly one event.
//!
//! A failure at any step leaves the store and the ledger as they were, and
//! no event is published. `&mut self` gives each operation exclusive access
//! for its whole duration.
//!
//! Mint and transfer live in [`crate::authorizer`]; they share the same
//! shape and the same lookup/ownership helpers defined here.

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span};

use mintgate_protocol::config::RegistryConfig;
use mintgate_protocol::{
    Address, AddressError, AddressValidator, Amount, Denom, DenomRecord, EventRecord, EventSink,
    Ledger, RecordStore, RegistryEvent,
};

use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Where an operation happens: the height and time of the state transition.
///
/// Supplied by the host. The registry never reads a clock on its own, so
/// replaying the same operations with the same contexts produces the same
/// events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub height: u64,
    pub time: DateTime<Utc>,
}

impl Context {
    pub fn new(height: u64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }

    /// A context at `height`, stamped with the current wall-clock time.
    pub fn at_height(height: u64) -> Self {
        Self::new(height, Utc::now())
    }
}

/// Height zero at the Unix epoch.
impl Default for Context {
    fn default() -> Self {
        Self::new(0, DateTime::<Utc>::default())
    }
}

// ---------------------------------------------------------------------------
// DenomRegistry
// ---------------------------------------------------------------------------

/// Ownership-gated registry of denom records.
///
/// Generic over its three collaborators so the same rules run against an
/// in-memory store in tests and a sled database in the node.
#[derive(Debug)]
pub struct DenomRegistry<S, L, E> {
    pub(crate) store: S,
    pub(crate) ledger: L,
    pub(crate) events: E,
    pub(crate) addresses: AddressValidator,
    pub(crate) config: RegistryConfig,
}

impl<S, L, E> DenomRegistry<S, L, E>
where
    S: RecordStore,
    L: Ledger,
    E: EventSink,
{
    /// Builds a registry with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails if `config.address_prefix` is not a valid bech32 prefix.
    pub fn new(store: S, ledger: L, events: E, config: RegistryConfig) -> Result<Self, AddressError> {
        let addresses = AddressValidator::new(&config.address_prefix)?;
        Ok(Self {
            store,
            ledger,
            events,
            addresses,
            config,
        })
    }

    /// Builds a registry with the default configuration (`cosmos` prefix).
    pub fn with_defaults(store: S, ledger: L, events: E) -> Self {
        Self {
            store,
            ledger,
            events,
            addresses: AddressValidator::default(),
            config: RegistryConfig::default(),
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access, for hosts that seed balances outside the
    /// registry (genesis allocations, test fixtures).
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn addresses(&self) -> &AddressValidator {
        &self.addresses
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Tears the registry down into its collaborators.
    pub fn into_parts(self) -> (S, L, E) {
        (self.store, self.ledger, self.events)
    }

    // -- mutations ----------------------------------------------------------

    /// Registers `denom` under `owner`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidAddress`] if `owner` does not parse.
    /// - [`RegistryError::InvalidDenom`] if `denom` is malformed.
    /// - [`RegistryError::AlreadyExists`] if a record is already present.
    pub fn create_denom(
        &mut self,
        ctx: &Context,
        denom: &str,
        owner: &str,
    ) -> Result<DenomRecord, RegistryError> {
        let _span = info_span!("registry", op = "create_denom", height = ctx.height).entered();

        let result = self.try_create_denom(ctx, denom, owner);
        match &result {
            Ok(record) => info!(denom = %record.denom, owner = %record.owner, "denom created"),
            Err(e) => debug!(denom, error = %e, "create_denom rejected"),
        }
        result
    }

    fn try_create_denom(
        &mut self,
        ctx: &Context,
        denom: &str,
        owner: &str,
    ) -> Result<DenomRecord, RegistryError> {
        let owner = self.parse_address("owner", owner)?;
        let denom = Denom::new(denom)?;
        if self.store.get(&denom)?.is_some() {
            return Err(RegistryError::AlreadyExists(denom));
        }

        let record = DenomRecord::new(denom, owner);
        self.store.set(&record)?;
        self.emit(
            ctx,
            RegistryEvent::DenomCreated {
                denom: record.denom.clone(),
                owner: record.owner.clone(),
            },
        );
        Ok(record)
    }

    /// Hands `denom` to `new_owner`. `requester` must be the current owner.
    ///
    /// Setting the owner to itself is allowed and still emits an event.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    ///
    /// - [`RegistryError::InvalidDenom`] if `denom` is malformed.
    /// - [`RegistryError::NotFound`] if there is no record.
    /// - [`RegistryError::Unauthorized`] if `requester` is not the owner.
    /// - [`RegistryError::InvalidAddress`] if `new_owner` does not parse.
    pub fn update_denom(
        &mut self,
        ctx: &Context,
        requester: &str,
        denom: &str,
        new_owner: &str,
    ) -> Result<DenomRecord, RegistryError> {
        let _span = info_span!("registry", op = "update_denom", height = ctx.height).entered();

        let result = self.try_update_denom(ctx, requester, denom, new_owner);
        match &result {
            Ok(record) => info!(denom = %record.denom, owner = %record.owner, "denom updated"),
            Err(e) => debug!(denom, requester, error = %e, "update_denom rejected"),
        }
        result
    }

    fn try_update_denom(
        &mut self,
        ctx: &Context,
        requester: &str,
        denom: &str,
        new_owner: &str,
    ) -> Result<DenomRecord, RegistryError> {
        let mut record = self.load(denom)?;
        self.ensure_owner(&record, requester)?;
        let new_owner = self.parse_address("new_owner", new_owner)?;

        let previous_owner = std::mem::replace(&mut record.owner, new_owner);
        self.store.set(&record)?;
        self.emit(
            ctx,
            RegistryEvent::DenomUpdated {
                denom: record.denom.clone(),
                previous_owner,
                owner: record.owner.clone(),
            },
        );
        Ok(record)
    }

    /// Removes the record for `denom`. `requester` must be the current owner.
    ///
    /// Balances already issued in `denom` stay where they are; only the
    /// record goes away, so nobody can mint or transfer through the registry
    /// until someone creates it again.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidDenom`] if `denom` is malformed.
    /// - [`RegistryError::NotFound`] if there is no record.
    /// - [`RegistryError::Unauthorized`] if `requester` is not the owner,
    ///   including when `requester` is not a valid address at all.
    pub fn delete_denom(
        &mut self,
        ctx: &Context,
        requester: &str,
        denom: &str,
    ) -> Result<DenomRecord, RegistryError> {
        let _span = info_span!("registry", op = "delete_denom", height = ctx.height).entered();

        let result = self.try_delete_denom(ctx, requester, denom);
        match &result {
            Ok(record) => info!(denom = %record.denom, "denom deleted"),
            Err(e) => debug!(denom, requester, error = %e, "delete_denom rejected"),
        }
        result
    }

    fn try_delete_denom(
        &mut self,
        ctx: &Context,
        requester: &str,
        denom: &str,
    ) -> Result<DenomRecord, RegistryError> {
        let record = self.load(denom)?;
        self.ensure_owner(&record, requester)?;

        self.store.remove(&record.denom)?;
        self.emit(
            ctx,
            RegistryEvent::DenomDeleted {
                denom: record.denom.clone(),
                owner: record.owner.clone(),
            },
        );
        Ok(record)
    }

    // -- queries ------------------------------------------------------------

    /// Looks up the record for `denom`. A missing record is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidDenom`] if `denom` is malformed, so a caller
    /// can tell "no such denom" from "that can't be a denom".
    pub fn get_denom(&self, denom: &str) -> Result<Option<DenomRecord>, RegistryError> {
        let denom = Denom::new(denom)?;
        Ok(self.store.get(&denom)?)
    }

    /// One page of records in ascending denom order.
    ///
    /// `start_after` is exclusive. `limit` falls back to the configured
    /// default and is clamped to the configured maximum.
    pub fn list_denoms(
        &self,
        start_after: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<DenomRecord>, RegistryError> {
        let start_after = start_after.map(Denom::new).transpose()?;
        let limit = self.config.page_limit(limit);
        Ok(self.store.range(start_after.as_ref(), limit)?)
    }

    /// Every record, in ascending denom order.
    pub fn all_denoms(&self) -> Result<Vec<DenomRecord>, RegistryError> {
        Ok(self.store.all()?)
    }

    /// Number of registered denoms.
    pub fn denom_count(&self) -> Result<usize, RegistryError> {
        Ok(self.store.len()?)
    }

    /// Balance of `account` in `denom`, read straight from the ledger.
    pub fn balance(&self, account: &str, denom: &str) -> Result<Amount, RegistryError> {
        let account = self.parse_address("account", account)?;
        let denom = Denom::new(denom)?;
        Ok(self.ledger.balance(&account, &denom)?)
    }

    // -- bulk ---------------------------------------------------------------

    /// Swaps the whole record set for `records`. No ownership checks, no
    /// events. Callers validate first; see
    /// [`init_genesis`](DenomRegistry::init_genesis).
    pub(crate) fn replace_all(&mut self, records: &[DenomRecord]) -> Result<(), RegistryError> {
        self.store.replace_all(records)?;
        info!(count = records.len(), "denom records replaced");
        Ok(())
    }

    // -- shared helpers -----------------------------------------------------

    pub(crate) fn parse_address(&self, field: &'static str, raw: &str) -> Result<Address, RegistryError> {
        self.addresses
            .parse(raw)
            .map_err(|source| RegistryError::InvalidAddress { field, source })
    }

    /// Parses `denom` and fetches its record.
    pub(crate) fn load(&self, denom: &str) -> Result<DenomRecord, RegistryError> {
        let denom = Denom::new(denom)?;
        match self.store.get(&denom)? {
            Some(record) => Ok(record),
            None => Err(RegistryError::NotFound(denom)),
        }
    }

    /// Fails unless `claimant` parses to the record's owner. An unparseable
    /// claimant cannot be the owner, so it is reported as unauthorized.
    pub(crate) fn ensure_owner(&self, record: &DenomRecord, claimant: &str) -> Result<(), RegistryError> {
        match self.addresses.parse(claimant) {
            Ok(address) if record.is_owned_by(&address) => Ok(()),
            _ => Err(RegistryError::Unauthorized {
                denom: record.denom.clone(),
                claimant: claimant.to_string(),
            }),
        }
    }

    pub(crate) fn emit(&mut self, ctx: &Context, event: RegistryEvent) {
        self.events.publish(EventRecord {
            height: ctx.height,
            time: ctx.time,
            event,
        });
    }
}
