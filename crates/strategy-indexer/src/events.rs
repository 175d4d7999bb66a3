//! Decoded vault and strategy events and their record form.

use alloy::primitives::{Address, B256, Log};
use alloy::sol_types::SolEventInterface;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use strategy_contracts::IBaseStrategy::IBaseStrategyEvents;
use strategy_contracts::IVault::IVaultEvents;
use strategy_contracts::{event_id, hex_address, hex_b256};
use strategy_db::models::NewEventRecord;
use strum::{AsRefStr, Display};

/// Record kind, one per event of the vault and strategy ABIs.
///
/// Strategy events share names with vault events (roles) so they are
/// prefixed with `Strategy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum EventKind {
    Approval,
    Deposit,
    Reported,
    RoleAdminChanged,
    RoleGranted,
    RoleRevoked,
    StrategyAdded,
    StrategyMigrated,
    StrategyRemoved,
    Transfer,
    UpdateManagementFee,
    UpdateManagementRecipient,
    UpdatePerformanceFee,
    UpdateStrategyInfo,
    UpdateStrategySharePercent,
    UpdateWithdrawalQueue,
    Withdraw,

    StrategyEmergencyWithdraw,
    StrategyPull,
    StrategyPush,
    StrategyReport,
    StrategyRoleAdminChanged,
    StrategyRoleGranted,
    StrategyRoleRevoked,
    StrategyPaused,
    StrategyUnpaused,
}

/// Where a log sits on chain and who emitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMeta {
    pub address: Address,
    pub block_number: u64,
    pub block_timestamp: DateTime<Utc>,
    pub transaction_hash: B256,
    pub log_index: u64,
}

impl EventMeta {
    /// `transactionHash || logIndex`
    pub fn record_id(&self) -> String {
        event_id(self.transaction_hash, self.log_index)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ContractEvent {
    Vault(IVaultEvents),
    Strategy(IBaseStrategyEvents),
}

impl ContractEvent {
    /// Decode a log with the vault ABI when `vault` emitted it, with the
    /// strategy ABI otherwise.
    ///
    /// Returns `Ok(None)` for logs whose signature belongs to neither ABI.
    pub fn decode(log: &Log, vault: Address) -> Result<Option<Self>, alloy::sol_types::Error> {
        let Some(topic0) = log.topics().first() else {
            return Ok(None);
        };

        if log.address == vault {
            if !IVaultEvents::SELECTORS.contains(&topic0.0) {
                return Ok(None);
            }
            IVaultEvents::decode_log(log).map(|decoded| Some(Self::Vault(decoded.data)))
        } else {
            if !IBaseStrategyEvents::SELECTORS.contains(&topic0.0) {
                return Ok(None);
            }
            IBaseStrategyEvents::decode_log(log).map(|decoded| Some(Self::Strategy(decoded.data)))
        }
    }

    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Vault(event) => match event {
                IVaultEvents::Approval(_) => EventKind::Approval,
                IVaultEvents::Deposit(_) => EventKind::Deposit,
                IVaultEvents::Reported(_) => EventKind::Reported,
                IVaultEvents::RoleAdminChanged(_) => EventKind::RoleAdminChanged,
                IVaultEvents::RoleGranted(_) => EventKind::RoleGranted,
                IVaultEvents::RoleRevoked(_) => EventKind::RoleRevoked,
                IVaultEvents::StrategyAdded(_) => EventKind::StrategyAdded,
                IVaultEvents::StrategyMigrated(_) => EventKind::StrategyMigrated,
                IVaultEvents::StrategyRemoved(_) => EventKind::StrategyRemoved,
                IVaultEvents::Transfer(_) => EventKind::Transfer,
                IVaultEvents::UpdateManagementFee(_) => EventKind::UpdateManagementFee,
                IVaultEvents::UpdateManagementRecipient(_) => EventKind::UpdateManagementRecipient,
                IVaultEvents::UpdatePerformanceFee(_) => EventKind::UpdatePerformanceFee,
                IVaultEvents::UpdateStrategyInfo(_) => EventKind::UpdateStrategyInfo,
                IVaultEvents::UpdateStrategySharePercent(_) => {
                    EventKind::UpdateStrategySharePercent
                }
                IVaultEvents::UpdateWithdrawalQueue(_) => EventKind::UpdateWithdrawalQueue,
                IVaultEvents::Withdraw(_) => EventKind::Withdraw,
            },
            Self::Strategy(event) => match event {
                IBaseStrategyEvents::EmergencyWithdraw(_) => EventKind::StrategyEmergencyWithdraw,
                IBaseStrategyEvents::Pull(_) => EventKind::StrategyPull,
                IBaseStrategyEvents::Push(_) => EventKind::StrategyPush,
                IBaseStrategyEvents::Report(_) => EventKind::StrategyReport,
                IBaseStrategyEvents::RoleAdminChanged(_) => EventKind::StrategyRoleAdminChanged,
                IBaseStrategyEvents::RoleGranted(_) => EventKind::StrategyRoleGranted,
                IBaseStrategyEvents::RoleRevoked(_) => EventKind::StrategyRoleRevoked,
                IBaseStrategyEvents::StrategyPaused(_) => EventKind::StrategyPaused,
                IBaseStrategyEvents::StrategyUnpaused(_) => EventKind::StrategyUnpaused,
            },
        }
    }

    /// Strategy whose logs must be followed from now on, if any.
    pub const fn registered_strategy(&self) -> Option<Address> {
        match self {
            Self::Vault(IVaultEvents::StrategyAdded(added)) => Some(added.strategy),
            Self::Vault(IVaultEvents::StrategyMigrated(migrated)) => Some(migrated.newVersion),
            _ => None,
        }
    }

    /// Event parameters under their ABI names. Strategy events also carry
    /// the emitting strategy.
    pub fn params(&self, emitter: Address) -> Value {
        match self {
            Self::Vault(event) => vault_params(event),
            Self::Strategy(event) => {
                let mut params = strategy_params(event);
                params["strategy"] = json!(hex_address(emitter));
                params
            }
        }
    }

    pub fn to_record(&self, meta: &EventMeta) -> NewEventRecord {
        NewEventRecord {
            id: meta.record_id(),
            kind: self.kind().to_string(),
            contract_address: hex_address(meta.address),
            block_number: meta.block_number as i64,
            block_timestamp: meta.block_timestamp,
            transaction_hash: hex_b256(meta.transaction_hash),
            log_index: meta.log_index as i64,
            params: self.params(meta.address),
        }
    }
}

fn vault_params(event: &IVaultEvents) -> Value {
    match event {
        IVaultEvents::Approval(e) => json!({
            "owner": hex_address(e.owner),
            "spender": hex_address(e.spender),
            "value": e.value.to_string(),
        }),
        IVaultEvents::Deposit(e) => json!({
            "sender": hex_address(e.sender),
            "owner": hex_address(e.owner),
            "assets": e.assets.to_string(),
            "shares": e.shares.to_string(),
        }),
        IVaultEvents::Reported(e) => json!({
            "profit": e.profit.to_string(),
            "loss": e.loss.to_string(),
            "managementFees": e.managementFees.to_string(),
            "performanceFees": e.performanceFees.to_string(),
        }),
        IVaultEvents::RoleAdminChanged(e) => json!({
            "role": hex_b256(e.role),
            "previousAdminRole": hex_b256(e.previousAdminRole),
            "newAdminRole": hex_b256(e.newAdminRole),
        }),
        IVaultEvents::RoleGranted(e) => json!({
            "role": hex_b256(e.role),
            "account": hex_address(e.account),
            "sender": hex_address(e.sender),
        }),
        IVaultEvents::RoleRevoked(e) => json!({
            "role": hex_b256(e.role),
            "account": hex_address(e.account),
            "sender": hex_address(e.sender),
        }),
        IVaultEvents::StrategyAdded(e) => json!({
            "strategy": hex_address(e.strategy),
        }),
        IVaultEvents::StrategyMigrated(e) => json!({
            "oldVersion": hex_address(e.oldVersion),
            "newVersion": hex_address(e.newVersion),
        }),
        IVaultEvents::StrategyRemoved(e) => json!({
            "strategy": hex_address(e.strategy),
            "totalAssets": e.totalAssets.to_string(),
        }),
        IVaultEvents::Transfer(e) => json!({
            "from": hex_address(e.from),
            "to": hex_address(e.to),
            "value": e.value.to_string(),
        }),
        IVaultEvents::UpdateManagementFee(e) => json!({
            "fee": e.fee.to_string(),
        }),
        IVaultEvents::UpdateManagementRecipient(e) => json!({
            "recipient": hex_address(e.recipient),
        }),
        IVaultEvents::UpdatePerformanceFee(e) => json!({
            "strategy": hex_address(e.strategy),
            "newFee": e.newFee.to_string(),
        }),
        IVaultEvents::UpdateStrategyInfo(e) => json!({
            "strategy": hex_address(e.strategy),
            "newBalance": e.newBalance.to_string(),
        }),
        IVaultEvents::UpdateStrategySharePercent(e) => json!({
            "strategy": hex_address(e.strategy),
            "newPercent": e.newPercent.to_string(),
        }),
        IVaultEvents::UpdateWithdrawalQueue(e) => json!({
            "queue": e.queue.iter().copied().map(hex_address).collect::<Vec<_>>(),
        }),
        IVaultEvents::Withdraw(e) => json!({
            "sender": hex_address(e.sender),
            "receiver": hex_address(e.receiver),
            "owner": hex_address(e.owner),
            "assets": e.assets.to_string(),
            "shares": e.shares.to_string(),
        }),
    }
}

fn strategy_params(event: &IBaseStrategyEvents) -> Value {
    match event {
        IBaseStrategyEvents::EmergencyWithdraw(e) => json!({
            "timestamp": e.timestamp.to_string(),
            "amount": e.amount.to_string(),
        }),
        IBaseStrategyEvents::Pull(e) => json!({
            "assetPull": e.assetPull.to_string(),
        }),
        IBaseStrategyEvents::Push(e) => json!({
            "assetPush": e.assetPush.to_string(),
        }),
        IBaseStrategyEvents::Report(e) => json!({
            "time": e.time.to_string(),
            "profit": e.profit.to_string(),
            "loss": e.loss.to_string(),
        }),
        IBaseStrategyEvents::RoleAdminChanged(e) => json!({
            "role": hex_b256(e.role),
            "previousAdminRole": hex_b256(e.previousAdminRole),
            "newAdminRole": hex_b256(e.newAdminRole),
        }),
        IBaseStrategyEvents::RoleGranted(e) => json!({
            "role": hex_b256(e.role),
            "account": hex_address(e.account),
            "sender": hex_address(e.sender),
        }),
        IBaseStrategyEvents::RoleRevoked(e) => json!({
            "role": hex_b256(e.role),
            "account": hex_address(e.account),
            "sender": hex_address(e.sender),
        }),
        IBaseStrategyEvents::StrategyPaused(e) => json!({
            "timestamp": e.timestamp.to_string(),
        }),
        IBaseStrategyEvents::StrategyUnpaused(e) => json!({
            "timestamp": e.timestamp.to_string(),
        }),
    }
}
