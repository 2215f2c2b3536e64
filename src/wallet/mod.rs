//! Balance register boundary
//!
//! The simulation only ever debits a stake when a ball is created and credits
//! winnings when it lands. Both go through [`Wallet`], whether the balance
//! lives in memory or behind the JSON wallet endpoint.

pub mod ledger;
pub mod remote;

use thiserror::Error;

use crate::Cents;

pub use ledger::Ledger;
pub use remote::{
    HttpReply, RemoteWallet, Transport, TransportError, WalletAction, WalletRequest, WalletResponse,
};

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("insufficient funds (balance={balance}, requested={requested})")]
    Insufficient { balance: Cents, requested: Cents },
    #[error("wallet not found for user {user_id}")]
    NotFound { user_id: String },
    #[error("wallet rejected request: {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid amount in wallet reply: {0}")]
    InvalidAmount(f64),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("wallet codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// A balance register supporting debit-if-sufficient and credit
pub trait Wallet {
    /// Current balance
    fn balance(&mut self) -> Result<Cents, WalletError>;

    /// Remove `amount` if the balance covers it; returns the new balance
    fn debit(&mut self, amount: Cents) -> Result<Cents, WalletError>;

    /// Add `amount`; returns the new balance
    fn credit(&mut self, amount: Cents) -> Result<Cents, WalletError>;
}

impl<W: Wallet + ?Sized> Wallet for &mut W {
    fn balance(&mut self) -> Result<Cents, WalletError> {
        (**self).balance()
    }

    fn debit(&mut self, amount: Cents) -> Result<Cents, WalletError> {
        (**self).debit(amount)
    }

    fn credit(&mut self, amount: Cents) -> Result<Cents, WalletError> {
        (**self).credit(amount)
    }
}

/// Local wallet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryWallet {
    balance: Cents,
}

impl InMemoryWallet {
    pub fn new(balance: Cents) -> Self {
        Self { balance }
    }

    pub fn get(&self) -> Cents {
        self.balance
    }
}

impl Wallet for InMemoryWallet {
    fn balance(&mut self) -> Result<Cents, WalletError> {
        Ok(self.balance)
    }

    fn debit(&mut self, amount: Cents) -> Result<Cents, WalletError> {
        if self.balance < amount {
            return Err(WalletError::Insufficient {
                balance: self.balance,
                requested: amount,
            });
        }
        self.balance -= amount;
        Ok(self.balance)
    }

    fn credit(&mut self, amount: Cents) -> Result<Cents, WalletError> {
        self.balance = self.balance.saturating_add(amount);
        Ok(self.balance)
    }
}
