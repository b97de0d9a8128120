//! Ownership-gated value movement.
//!
//! The registry never keeps balances. Mint and transfer check the caller
//! against the denom record and then delegate to the [`Ledger`] in a single
//! call. A ledger failure comes back unchanged as [`RegistryError::Ledger`],
//! and since that call is the only mutation, a rejected ledger call leaves
//! nothing behind.

use tracing::{debug, info, info_span};

use mintgate_protocol::{Amount, Coin, EventSink, Ledger, RecordStore, RegistryEvent};

use crate::error::RegistryError;
use crate::registry::{Context, DenomRegistry};

impl<S, L, E> DenomRegistry<S, L, E>
where
    S: RecordStore,
    L: Ledger,
    E: EventSink,
{
    /// Credits `amount` of `denom` to `recipient`. Only the denom's owner
    /// may mint.
    ///
    /// Zero amounts pass through to the ledger and still emit an event.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    ///
    /// - [`RegistryError::InvalidAddress`] if `owner` does not parse.
    /// - [`RegistryError::InvalidDenom`] if `denom` is malformed.
    /// - [`RegistryError::NotFound`] if there is no record.
    /// - [`RegistryError::Unauthorized`] if `owner` is not the record owner.
    /// - [`RegistryError::InvalidAddress`] if `recipient` does not parse.
    /// - [`RegistryError::Ledger`] if the ledger refuses the credit.
    pub fn mint_tokens(
        &mut self,
        ctx: &Context,
        owner: &str,
        denom: &str,
        amount: Amount,
        recipient: &str,
    ) -> Result<(), RegistryError> {
        let _span = info_span!("registry", op = "mint_tokens", height = ctx.height).entered();

        let result = self.try_mint_tokens(ctx, owner, denom, amount, recipient);
        match &result {
            Ok(()) => info!(denom, amount = amount.get(), recipient, "tokens minted"),
            Err(e) => debug!(denom, owner, error = %e, "mint_tokens rejected"),
        }
        result
    }

    fn try_mint_tokens(
        &mut self,
        ctx: &Context,
        owner: &str,
        denom: &str,
        amount: Amount,
        recipient: &str,
    ) -> Result<(), RegistryError> {
        let owner = self.parse_address("owner", owner)?;
        let record = self.load(denom)?;
        if !record.is_owned_by(&owner) {
            return Err(RegistryError::Unauthorized {
                denom: record.denom,
                claimant: owner.to_string(),
            });
        }
        let recipient = self.parse_address("recipient", recipient)?;

        self.ledger.credit(&recipient, &record.denom, amount)?;
        self.emit(
            ctx,
            RegistryEvent::TokensMinted {
                owner,
                denom: record.denom,
                amount,
                recipient,
            },
        );
        Ok(())
    }

    /// Moves `amount` of `denom` from `from` to `to`. `owner` must be the
    /// denom's owner; `from` does not have to be.
    ///
    /// The owner authorizes movement out of any account holding the denom.
    /// Each address is parsed exactly once, `to` before `from`.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    ///
    /// - [`RegistryError::InvalidDenom`] if `denom` is malformed.
    /// - [`RegistryError::NotFound`] if there is no record.
    /// - [`RegistryError::Unauthorized`] if `owner` is not the record owner.
    /// - [`RegistryError::InvalidAddress`] if `to`, then `from`, does not parse.
    /// - [`RegistryError::Ledger`] if the ledger refuses the transfer, e.g.
    ///   insufficient funds in `from`.
    pub fn transfer_tokens(
        &mut self,
        ctx: &Context,
        owner: &str,
        denom: &str,
        from: &str,
        to: &str,
        amount: Amount,
    ) -> Result<(), RegistryError> {
        let _span = info_span!("registry", op = "transfer_tokens", height = ctx.height).entered();

        let result = self.try_transfer_tokens(ctx, owner, denom, from, to, amount);
        match &result {
            Ok(()) => info!(denom, from, to, amount = amount.get(), "tokens transferred"),
            Err(e) => debug!(denom, owner, error = %e, "transfer_tokens rejected"),
        }
        result
    }

    fn try_transfer_tokens(
        &mut self,
        ctx: &Context,
        owner: &str,
        denom: &str,
        from: &str,
        to: &str,
        amount: Amount,
    ) -> Result<(), RegistryError> {
        let record = self.load(denom)?;
        self.ensure_owner(&record, owner)?;
        let to = self.parse_address("to", to)?;
        let from = self.parse_address("from", from)?;

        self.ledger.transfer(&from, &to, &record.denom, amount)?;
        self.emit(
            ctx,
            RegistryEvent::TokensTransferred {
                from,
                to,
                amount: Coin::new(amount, record.denom),
            },
        );
        Ok(())
    }
}
