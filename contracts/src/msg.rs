//! # Registry Messages
//!
//! The serializable envelope hosts use to drive the registry: a batch file,
//! a transaction body, an RPC payload. [`DenomRegistry::execute`] runs the
//! stateless [`ExecuteMsg::validate_basic`] pre-check and then dispatches to
//! the matching keeper method.
//!
//! ```json
//! {"type": "create_denom", "owner": "cosmos1...", "denom": "gold"}
//! {"type": "mint_tokens", "owner": "cosmos1...", "denom": "gold", "amount": 100, "recipient": "cosmos1..."}
//! ```

use serde::{Deserialize, Serialize};

use mintgate_protocol::{AddressValidator, Amount, DenomRecord, EventSink, Ledger, RecordStore};

use crate::error::RegistryError;
use crate::registry::{Context, DenomRegistry};

/// One registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecuteMsg {
    CreateDenom {
        owner: String,
        denom: String,
    },
    UpdateDenom {
        requester: String,
        denom: String,
        new_owner: String,
    },
    DeleteDenom {
        requester: String,
        denom: String,
    },
    MintTokens {
        owner: String,
        denom: String,
        amount: Amount,
        recipient: String,
    },
    TransferTokens {
        owner: String,
        denom: String,
        from: String,
        to: String,
        amount: Amount,
    },
}

impl ExecuteMsg {
    /// The snake_case operation name, matching the serde tag.
    pub fn name(&self) -> &'static str {
        match self {
            ExecuteMsg::CreateDenom { .. } => "create_denom",
            ExecuteMsg::UpdateDenom { .. } => "update_denom",
            ExecuteMsg::DeleteDenom { .. } => "delete_denom",
            ExecuteMsg::MintTokens { .. } => "mint_tokens",
            ExecuteMsg::TransferTokens { .. } => "transfer_tokens",
        }
    }

    /// The identity acting on the registry.
    pub fn signer(&self) -> &str {
        match self {
            ExecuteMsg::CreateDenom { owner, .. }
            | ExecuteMsg::MintTokens { owner, .. }
            | ExecuteMsg::TransferTokens { owner, .. } => owner,
            ExecuteMsg::UpdateDenom { requester, .. } | ExecuteMsg::DeleteDenom { requester, .. } => {
                requester
            }
        }
    }

    /// Stateless pre-check of the signer address.
    ///
    /// Covers create, mint, and transfer, whose signer is named `owner`.
    /// Update and delete leave their requester to the ownership check, which
    /// reports an unparseable requester as unauthorized.
    pub fn validate_basic(&self, addresses: &AddressValidator) -> Result<(), RegistryError> {
        match self {
            ExecuteMsg::CreateDenom { owner, .. }
            | ExecuteMsg::MintTokens { owner, .. }
            | ExecuteMsg::TransferTokens { owner, .. } => addresses
                .parse(owner)
                .map(|_| ())
                .map_err(|source| RegistryError::InvalidAddress {
                    field: "owner",
                    source,
                }),
            ExecuteMsg::UpdateDenom { .. } | ExecuteMsg::DeleteDenom { .. } => Ok(()),
        }
    }
}

/// What a successful [`ExecuteMsg`] hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ExecuteResponse {
    /// The record as it stands after create or update, or as it stood
    /// before delete.
    Record(DenomRecord),
    /// Mint and transfer report through events only.
    Empty,
}

impl<S, L, E> DenomRegistry<S, L, E>
where
    S: RecordStore,
    L: Ledger,
    E: EventSink,
{
    /// Runs one message against the registry.
    pub fn execute(&mut self, ctx: &Context, msg: &ExecuteMsg) -> Result<ExecuteResponse, RegistryError> {
        msg.validate_basic(&self.addresses)?;

        match msg {
            ExecuteMsg::CreateDenom { owner, denom } => {
                self.create_denom(ctx, denom, owner).map(ExecuteResponse::Record)
            }
            ExecuteMsg::UpdateDenom {
                requester,
                denom,
                new_owner,
            } => self
                .update_denom(ctx, requester, denom, new_owner)
                .map(ExecuteResponse::Record),
            ExecuteMsg::DeleteDenom { requester, denom } => self
                .delete_denom(ctx, requester, denom)
                .map(ExecuteResponse::Record),
            ExecuteMsg::MintTokens {
                owner,
                denom,
                amount,
                recipient,
            } => self
                .mint_tokens(ctx, owner, denom, *amount, recipient)
                .map(|()| ExecuteResponse::Empty),
            ExecuteMsg::TransferTokens {
                owner,
                denom,
                from,
                to,
                amount,
            } => self
                .transfer_tokens(ctx, owner, denom, from, to, *amount)
                .map(|()| ExecuteResponse::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintgate_protocol::{BankLedger, EventLog, MemoryStore};

    fn addr(seed: u8) -> String {
        AddressValidator::default()
            .encode(&[seed; 20])
            .unwrap()
            .to_string()
    }

    #[test]
    fn parses_tagged_json() {
        let raw = format!(
            r#"{{"type":"mint_tokens","owner":"{}","denom":"gold","amount":100,"recipient":"{}"}}"#,
            addr(1),
            addr(2)
        );
        let msg: ExecuteMsg = serde_json::from_str(&raw).unwrap();
        assert_eq!(msg.name(), "mint_tokens");
        assert_eq!(msg.signer(), addr(1));
    }

    #[test]
    fn validate_basic_skips_requester() {
        let v = AddressValidator::default();
        let delete = ExecuteMsg::DeleteDenom {
            requester: "garbage".into(),
            denom: "gold".into(),
        };
        assert!(delete.validate_basic(&v).is_ok());

        let create = ExecuteMsg::CreateDenom {
            owner: "garbage".into(),
            denom: "gold".into(),
        };
        assert!(create.validate_basic(&v).is_err());
    }

    #[test]
    fn execute_dispatches() {
        let mut reg =
            DenomRegistry::with_defaults(MemoryStore::new(), BankLedger::new(), EventLog::new());
        let ctx = Context::default();
        let alice = addr(1);

        let response = reg
            .execute(
                &ctx,
                &ExecuteMsg::CreateDenom {
                    owner: alice.clone(),
                    denom: "gold".into(),
                },
            )
            .unwrap();
        assert!(matches!(response, ExecuteResponse::Record(_)));

        let response = reg
            .execute(
                &ctx,
                &ExecuteMsg::MintTokens {
                    owner: alice.clone(),
                    denom: "gold".into(),
                    amount: Amount::new(10),
                    recipient: alice,
                },
            )
            .unwrap();
        assert_eq!(response, ExecuteResponse::Empty);
        assert_eq!(reg.events().kinds(), vec!["denom_created", "tokens_minted"]);
    }

    #[test]
    fn execute_reports_transfer_owner_before_lookup() {
        let mut reg =
            DenomRegistry::with_defaults(MemoryStore::new(), BankLedger::new(), EventLog::new());
        let err = reg
            .execute(
                &Context::default(),
                &ExecuteMsg::TransferTokens {
                    owner: "garbage".into(),
                    denom: "nothing".into(),
                    from: addr(1),
                    to: addr(2),
                    amount: Amount::new(1),
                },
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAddress { field: "owner", .. }));
    }
}
