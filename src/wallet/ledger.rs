//! In-process wallet endpoint
//!
//! Holds per-user balances and answers the same JSON bodies and status codes
//! as the wallet HTTP endpoint. Serves as a loopback [`Transport`].

use std::collections::BTreeMap;

use super::remote::{
    HttpReply, INSUFFICIENT_FUNDS, Transport, TransportError, WalletAction, WalletRequest,
    WalletResponse,
};
use crate::{Cents, cents_to_dollars, dollars_to_cents};

/// Per-user balances
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    wallets: BTreeMap<String, Cents>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) a user's wallet
    pub fn open_wallet(&mut self, user_id: impl Into<String>, balance: Cents) {
        self.wallets.insert(user_id.into(), balance);
    }

    pub fn balance_of(&self, user_id: &str) -> Option<Cents> {
        self.wallets.get(user_id).copied()
    }

    /// Apply one request, returning the status code and reply
    pub fn handle(&mut self, request: &WalletRequest) -> (u16, WalletResponse) {
        if request.user_id.is_empty() {
            return error(400, "User ID required");
        }
        let Some(balance) = self.wallets.get_mut(&request.user_id) else {
            return error(404, "Wallet not found");
        };

        let amount = match request.action {
            WalletAction::Balance | WalletAction::Withdraw => 0,
            _ => match dollars_to_cents(request.amount) {
                Some(amount) => amount,
                None => return error(400, "Invalid amount"),
            },
        };

        match request.action {
            WalletAction::Balance => {}
            WalletAction::Deposit | WalletAction::Payout => {
                *balance = balance.saturating_add(amount);
            }
            WalletAction::Withdraw => {
                log::info!("Withdrew {} for {}", crate::format_cents(*balance), request.user_id);
                *balance = 0;
            }
            WalletAction::Bet => {
                if *balance < amount {
                    return error(400, INSUFFICIENT_FUNDS);
                }
                *balance -= amount;
            }
        }

        (
            200,
            WalletResponse::Ok {
                balance: cents_to_dollars(*balance),
                message: "Success".to_string(),
            },
        )
    }

    /// Apply a raw JSON body
    pub fn handle_json(&mut self, body: &str) -> HttpReply {
        let (status, response) = match serde_json::from_str::<WalletRequest>(body) {
            Ok(request) => self.handle(&request),
            Err(e) => error(500, &e.to_string()),
        };
        let body = serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"error":"encode failed"}"#.to_string());
        HttpReply { status, body }
    }
}

fn error(status: u16, message: &str) -> (u16, WalletResponse) {
    (
        status,
        WalletResponse::Err {
            error: message.to_string(),
        },
    )
}

impl Transport for Ledger {
    fn post(&mut self, body: &str) -> Result<HttpReply, TransportError> {
        Ok(self.handle_json(body))
    }
}
