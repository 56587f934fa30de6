//! Wire DTOs for the aggregation backend.
//!
//! # Design
//! Field names follow the backend's camelCase JSON. These types mirror the
//! mock server's schema but are defined independently; the integration test
//! catches drift between the two crates.

use serde::{Deserialize, Serialize};

/// A bank account linked to the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    /// Bank identifier (1 = VBank, 2 = SBank, 3 = ABank).
    pub client_id: i64,
    pub client_name: String,
    #[serde(default)]
    pub account_name: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Debit,
    Credit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// ISO-8601 date or date-time as sent by the server.
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Filters for an account's transaction history. `None` fields are left out
/// of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionsQuery {
    pub client_id: Option<i64>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreateRequest {
    pub client_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub account_id: String,
    #[serde(default)]
    pub account_name: Option<String>,
    pub client_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedAccount {
    pub message: String,
    pub account: NewAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Free,
    Premium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account_id: String,
    pub to_phone: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub message: String,
    pub payment_id: String,
    /// Sender's balance after the transfer.
    pub balance: Balance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_uses_camel_case() {
        let account: Account = serde_json::from_str(
            r#"{"accountId":"a1","clientId":1,"clientName":"VBank","accountName":null,"isActive":true}"#,
        )
        .unwrap();
        assert_eq!(account.account_id, "a1");
        assert_eq!(account.client_name, "VBank");
        assert!(account.account_name.is_none());
    }

    #[test]
    fn transaction_kind_reads_type_field() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id":"t1","date":"2025-01-15","description":"Coffee","amount":3.5,"currency":"RUB","type":"debit"}"#,
        )
        .unwrap();
        assert_eq!(tx.kind, TransactionKind::Debit);
    }

    #[test]
    fn transfer_request_omits_missing_description() {
        let req = TransferRequest {
            from_account_id: "a1".to_string(),
            to_phone: "+70000000000".to_string(),
            amount: 10.0,
            description: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["fromAccountId"], "a1");
        assert!(json.get("description").is_none());
    }
}
