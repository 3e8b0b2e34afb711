use std::sync::Arc;

use lan_share::crypto::{tokens_match, PinSigner};
use lan_share::{hash_pin, DeviceRegistry, StorageError, Transfer, TransferStore};
use rocket::http::{Cookie, CookieJar};

use crate::error::ApiError;

/// How long a PIN unlock stays valid in the browser.
pub const PIN_COOKIE_MAX_AGE_SECS: i64 = 2 * 60 * 60;

/// Shared state handed to every route through rocket's managed state.
pub struct AppState {
    pub store: Arc<TransferStore>,
    pub registry: Arc<DeviceRegistry>,
    pins: PinSigner,
}

impl AppState {
    pub fn new(store: Arc<TransferStore>, registry: Arc<DeviceRegistry>) -> Result<Self, StorageError> {
        let pins = PinSigner::new().map_err(|_| StorageError::Random)?;
        Ok(Self {
            store,
            registry,
            pins,
        })
    }

    /// Access gate for every transfer route.
    pub async fn transfer(&self, id: Option<&str>, token: Option<&str>) -> Result<Transfer, ApiError> {
        let id = id.unwrap_or_default();
        let token = token.unwrap_or_default();
        if id.is_empty() || token.is_empty() {
            return Err(ApiError::bad_request("missing id or token"));
        }
        Ok(self.store.authorize(id, token).await?)
    }

    pub fn has_pin_access(&self, cookies: &CookieJar<'_>, transfer: &Transfer) -> bool {
        if !transfer.requires_pin() {
            return true;
        }
        cookies
            .get(&PinSigner::cookie_name(&transfer.id))
            .is_some_and(|c| self.pins.verify(&transfer.pin_hash, &transfer.id, c.value()))
    }

    pub fn require_pin(&self, cookies: &CookieJar<'_>, transfer: &Transfer) -> Result<(), ApiError> {
        if self.has_pin_access(cookies, transfer) {
            Ok(())
        } else {
            Err(ApiError::forbidden("pin required"))
        }
    }

    pub fn validate_pin(&self, input: &str, transfer: &Transfer) -> bool {
        !transfer.requires_pin() || tokens_match(&hash_pin(input), &transfer.pin_hash)
    }

    pub fn grant_pin_access(&self, cookies: &CookieJar<'_>, transfer: &Transfer) {
        let value = self.pins.sign(&transfer.pin_hash, &transfer.id);
        let mut cookie = Cookie::new(PinSigner::cookie_name(&transfer.id), value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_max_age(rocket::time::Duration::seconds(PIN_COOKIE_MAX_AGE_SECS));
        cookies.add(cookie);
    }
}
