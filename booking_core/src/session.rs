//! Authenticated HTTP session against the scheduling service admin API.
//!
//! [`HttpSession::open`] performs the token handshake; the session logs out
//! when [`HttpSession::close`] is called or, failing that, when it is
//! dropped. Fatal errors anywhere in a run therefore still release the
//! token.

use crate::api::{
    parse_booking_response, parse_client_response, BookingRequest, NewClient, Page, SchedulingApi,
};
use crate::config::{AccountConfig, HttpConfig};
use crate::{BookingResult, ClientResult, EntityKind, Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct AuthRequest<'a> {
    company: &'a str,
    login: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    auth_token: &'a str,
}

/// Authenticated connection to the admin API
pub struct HttpSession {
    client: Client,
    api_base: String,
    token: String,
    closed: bool,
}

impl HttpSession {
    /// Authenticate and return a session carrying the token headers
    pub fn open(account: &AccountConfig, http: &HttpConfig) -> Result<Self> {
        let api_base = account.api_base();
        let company = account.company().to_string();

        tracing::debug!("Authenticating..");
        let anonymous = build_client(http, base_headers())?;
        let payload = AuthRequest {
            company: &company,
            login: &account.user,
            password: &account.password,
        };
        let body = anonymous
            .post(format!("{}/auth", api_base))
            .json(&payload)
            .send()?
            .text()?;

        let auth: AuthResponse = serde_json::from_str(&body)
            .map_err(|_| Error::Auth(body.trim().to_string()))?;
        let token = match auth.token {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(Error::Auth(
                    auth.message.unwrap_or_else(|| "no token in response".into()),
                ))
            }
        };

        let mut headers = base_headers();
        headers.insert("X-Company-Login", header_value(&company)?);
        headers.insert("X-Token", header_value(&token)?);
        let client = build_client(http, headers)?;

        tracing::debug!("Authentication successful");
        Ok(Self {
            client,
            api_base,
            token,
            closed: false,
        })
    }

    /// Log out and invalidate the token
    pub fn close(mut self) -> Result<()> {
        self.logout()
    }

    fn logout(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        tracing::debug!("Logging out..");
        self.client
            .post(format!("{}/auth/logout", self.api_base))
            .json(&LogoutRequest {
                auth_token: &self.token,
            })
            .send()?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        if let Err(e) = self.logout() {
            tracing::warn!("Logout failed: {}", e);
        }
    }
}

impl SchedulingApi for HttpSession {
    fn fetch_page(&mut self, kind: EntityKind, page: u32) -> Result<Page> {
        let mut request = self.client.get(self.url(kind.path()));
        if page > 1 {
            request = request.query(&[("page", page)]);
        }
        let body = request.send()?.text()?;
        serde_json::from_str(&body).map_err(|e| {
            Error::Api(format!(
                "unexpected response for {} page {}: {} ({})",
                kind,
                page,
                e,
                body.trim()
            ))
        })
    }

    fn create_client(&mut self, client: &NewClient) -> Result<ClientResult> {
        let body = self
            .client
            .post(self.url("clients"))
            .json(client)
            .send()?
            .text()?;
        Ok(parse_client_response(&body))
    }

    fn create_booking(&mut self, booking: &BookingRequest) -> Result<BookingResult> {
        let body = self
            .client
            .post(self.url("bookings"))
            .json(booking)
            .send()?
            .text()?;
        Ok(parse_booking_response(&body))
    }
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("invalid header value {:?}: {}", value, e)))
}

fn build_client(http: &HttpConfig, headers: HeaderMap) -> Result<Client> {
    if http.accept_invalid_certs {
        tracing::info!("TLS certificate verification is disabled");
    }
    let client = Client::builder()
        .user_agent(http.user_agent.as_str())
        .default_headers(headers)
        .danger_accept_invalid_certs(http.accept_invalid_certs)
        .timeout(http.timeout_secs.map(Duration::from_secs))
        .build()?;
    Ok(client)
}
