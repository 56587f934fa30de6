//! Payment endpoints.

use crate::client::ApiClient;
use crate::endpoints;
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{TransferReceipt, TransferRequest};

impl<T: Transport> ApiClient<T> {
    /// Transfer money from one of the user's accounts to a phone number.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt> {
        self.post(endpoints::PAYMENTS_TRANSFER, request).await
    }
}
