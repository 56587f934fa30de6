//! Account endpoints.

use crate::client::ApiClient;
use crate::endpoints;
use crate::error::Result;
use crate::query::QueryParams;
use crate::transport::Transport;
use crate::types::{Account, AccountCreateRequest, Balance, CreatedAccount, Transaction, TransactionsQuery};

impl TransactionsQuery {
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("client_id", self.client_id)
            .with_opt("offset", self.offset)
            .with_opt("limit", self.limit)
            .with_opt("start_date", self.start_date.as_deref())
            .with_opt("end_date", self.end_date.as_deref())
    }
}

impl<T: Transport> ApiClient<T> {
    /// List the user's accounts, optionally restricted to one bank.
    pub async fn list_accounts(&self, client_id: Option<i64>) -> Result<Vec<Account>> {
        let params = client_id.map(|id| QueryParams::new().with("client_id", id));
        self.get(endpoints::ACCOUNTS, params).await
    }

    pub async fn get_balance(&self, account_id: &str, client_id: i64) -> Result<Balance> {
        let params = QueryParams::new().with("client_id", client_id);
        self.get(&endpoints::account_balances(account_id), Some(params)).await
    }

    pub async fn list_transactions(&self, account_id: &str, query: &TransactionsQuery) -> Result<Vec<Transaction>> {
        self.get(&endpoints::account_transactions(account_id), Some(query.to_params()))
            .await
    }

    /// Open a new account at bank `client_id`.
    pub async fn create_account(&self, client_id: i64) -> Result<CreatedAccount> {
        self.post(endpoints::ACCOUNTS, &AccountCreateRequest { client_id }).await
    }
}
