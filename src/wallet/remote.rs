//! JSON wallet client
//!
//! Request body: `{"userId", "action", "amount"}` with the amount in dollars.
//! Reply: `{"balance", "message"}` on success, `{"error"}` otherwise. The
//! transport is injected; it only has to POST a body and hand back the reply.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Wallet, WalletError};
use crate::{Cents, cents_to_dollars, dollars_to_cents};

/// Reply text the wallet endpoint uses for a rejected bet
pub const INSUFFICIENT_FUNDS: &str = "Insufficient funds";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletAction {
    Balance,
    Deposit,
    Withdraw,
    Bet,
    Payout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRequest {
    #[serde(default)]
    pub user_id: String,
    pub action: WalletAction,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WalletResponse {
    Ok {
        balance: f64,
        #[serde(default)]
        message: String,
    },
    Err {
        error: String,
    },
}

/// Raw reply from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
#[error("wallet transport failed: {0}")]
pub struct TransportError(pub String);

/// Sends a JSON body to the wallet endpoint
pub trait Transport {
    fn post(&mut self, body: &str) -> Result<HttpReply, TransportError>;
}

/// Wallet reached through a [`Transport`]
#[derive(Debug)]
pub struct RemoteWallet<T> {
    user_id: String,
    transport: T,
    last_balance: Option<Cents>,
}

impl<T: Transport> RemoteWallet<T> {
    pub fn new(user_id: impl Into<String>, transport: T) -> Self {
        Self {
            user_id: user_id.into(),
            transport,
            last_balance: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Balance from the most recent successful reply
    pub fn last_balance(&self) -> Option<Cents> {
        self.last_balance
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn send(&mut self, action: WalletAction, amount: Cents) -> Result<Cents, WalletError> {
        let request = WalletRequest {
            user_id: self.user_id.clone(),
            action,
            amount: cents_to_dollars(amount),
        };
        let body = serde_json::to_string(&request)?;
        let reply = self.transport.post(&body)?;
        let response: WalletResponse = serde_json::from_str(&reply.body)?;

        match response {
            WalletResponse::Ok { balance, .. } => {
                let balance = dollars_to_cents(balance).ok_or(WalletError::InvalidAmount(balance))?;
                self.last_balance = Some(balance);
                Ok(balance)
            }
            WalletResponse::Err { error } => Err(match reply.status {
                400 if error == INSUFFICIENT_FUNDS => WalletError::Insufficient {
                    balance: self.last_balance.unwrap_or(0),
                    requested: amount,
                },
                404 => WalletError::NotFound {
                    user_id: self.user_id.clone(),
                },
                status => WalletError::Rejected {
                    status,
                    message: error,
                },
            }),
        }
    }
}

impl<T: Transport> Wallet for RemoteWallet<T> {
    fn balance(&mut self) -> Result<Cents, WalletError> {
        self.send(WalletAction::Balance, 0)
    }

    fn debit(&mut self, amount: Cents) -> Result<Cents, WalletError> {
        match self.send(WalletAction::Bet, amount) {
            Err(WalletError::Insufficient { requested, .. }) => {
                // Refresh so the caller sees the balance that blocked the bet
                let balance = self.balance().unwrap_or(self.last_balance.unwrap_or(0));
                Err(WalletError::Insufficient { balance, requested })
            }
            other => other,
        }
    }

    fn credit(&mut self, amount: Cents) -> Result<Cents, WalletError> {
        self.send(WalletAction::Payout, amount)
    }
}
