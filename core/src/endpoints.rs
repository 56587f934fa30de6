//! Backend resource paths.

pub const AUTH_SIGN_IN: &str = "/api/auth/sign-in";
pub const AUTH_ME: &str = "/api/auth/me";
pub const AUTH_LOGOUT: &str = "/api/auth/logout";

pub const ACCOUNTS: &str = "/api/accounts";

pub const PAYMENTS_TRANSFER: &str = "/api/payments/transfer";

pub fn account_balances(account_id: &str) -> String {
    format!("{ACCOUNTS}/{}/balances", encode_segment(account_id))
}

pub fn account_transactions(account_id: &str) -> String {
    format!("{ACCOUNTS}/{}/transactions", encode_segment(account_id))
}

/// Percent-encode a single path segment.
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
