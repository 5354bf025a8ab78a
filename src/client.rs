//! Session client for the MTUCI web API.
//!
//! Getting the timetable takes three dependent requests:
//! 1. `GET web` hands out the `XSRF-TOKEN` and `mtusi_tech_session` cookies
//! 2. `POST api/web/token/validate?token=<key>` exchanges the API key for a `token` cookie
//! 3. `GET api/web/get` returns the timetable JSON

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::{Method, Response, StatusCode};
use timetable_core::{FetchedTimetable, TimetableError, TimetableResult, TimetableSource};
use tracing::debug;
use url::Url;

const BASE_URL: &str = "https://apimtuci.ru/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const XSRF_COOKIE: &str = "XSRF-TOKEN";
const SESSION_COOKIE: &str = "mtusi_tech_session";
const TOKEN_COOKIE: &str = "token";
const XSRF_HEADER: &str = "x-xsrf-token";

pub struct MtuciClient {
    http: reqwest::Client,
    base: Url,
}

/// Cookies gathered during the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookies {
    xsrf_token: String,
    session: String,
    token: Option<String>,
}

impl SessionCookies {
    fn from_set_cookie(set_cookies: &[&str]) -> TimetableResult<Self> {
        let xsrf_token = required_cookie(set_cookies, XSRF_COOKIE)?;
        let session = required_cookie(set_cookies, SESSION_COOKIE)?;

        Ok(SessionCookies {
            xsrf_token,
            session,
            token: None,
        })
    }

    /// Value of the `Cookie` header for the next request.
    pub fn cookie_header(&self) -> String {
        let mut header = format!(
            "{XSRF_COOKIE}={}; {SESSION_COOKIE}={}",
            self.xsrf_token, self.session
        );
        if let Some(token) = &self.token {
            header.push_str(&format!("; {TOKEN_COOKIE}={token}"));
        }
        header
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&self.cookie_header()).context("Cookie is not a valid header value")?,
        );
        headers.insert(
            XSRF_HEADER,
            HeaderValue::from_str(&self.xsrf_token).context("XSRF token is not a valid header value")?,
        );
        Ok(headers)
    }
}

/// Find `name` among `Set-Cookie` header values and return its URL-decoded value.
pub fn extract_cookie(set_cookies: &[&str], name: &str) -> Option<String> {
    set_cookies.iter().find_map(|header| {
        let pair = header.split(';').next()?;
        let (key, value) = pair.split_once('=')?;
        if key.trim() != name {
            return None;
        }
        let decoded = urlencoding::decode(value.trim()).ok()?;
        (!decoded.is_empty()).then(|| decoded.into_owned())
    })
}

fn required_cookie(set_cookies: &[&str], name: &str) -> TimetableResult<String> {
    extract_cookie(set_cookies, name)
        .ok_or_else(|| TimetableError::Auth(format!("server did not set the {name} cookie")))
}

fn set_cookie_values(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Map an error from the request chain onto the sync error taxonomy.
fn into_timetable_error(err: anyhow::Error) -> TimetableError {
    match err.downcast::<TimetableError>() {
        Ok(err) => err,
        Err(err) => TimetableError::Transport(format!("{err:#}")),
    }
}

impl MtuciClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(MtuciClient { http, base })
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        self.base
            .join(endpoint)
            .with_context(|| format!("Invalid endpoint: {endpoint}"))
    }

    async fn send(&self, method: Method, url: Url, headers: HeaderMap) -> Result<Response> {
        debug!(%method, path = url.path(), "api request");

        let response = self
            .http
            .request(method, url.clone())
            .headers(headers)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url.path()))?;

        let status = response.status();
        debug!(%status, path = url.path(), "api response");

        // 419 is the framework's "CSRF token mismatch"
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) || status.as_u16() == 419 {
            return Err(TimetableError::Auth(format!("{} returned {}", url.path(), status)).into());
        }
        if !status.is_success() {
            anyhow::bail!("{} returned {}", url.path(), status);
        }

        Ok(response)
    }

    /// Step 1: pick up the XSRF and session cookies.
    async fn handshake(&self) -> Result<SessionCookies> {
        let response = self.send(Method::GET, self.url("web")?, HeaderMap::new()).await?;
        let set_cookies = set_cookie_values(&response);
        let refs: Vec<&str> = set_cookies.iter().map(String::as_str).collect();

        Ok(SessionCookies::from_set_cookie(&refs)?)
    }

    /// Step 2: trade the API key for the `token` cookie.
    async fn validate_token(&self, cookies: &mut SessionCookies, api_key: &str) -> Result<()> {
        let mut url = self.url("api/web/token/validate")?;
        url.query_pairs_mut().append_pair("token", api_key);

        let response = self.send(Method::POST, url, cookies.headers()?).await?;
        let set_cookies = set_cookie_values(&response);
        let refs: Vec<&str> = set_cookies.iter().map(String::as_str).collect();

        cookies.token = Some(required_cookie(&refs, TOKEN_COOKIE)?);
        Ok(())
    }

    /// Step 3: fetch the timetable with the full cookie set.
    async fn get_timetable(&self, cookies: &SessionCookies) -> Result<FetchedTimetable> {
        let response = self
            .send(Method::GET, self.url("api/web/get")?, cookies.headers()?)
            .await?;
        let body = response
            .text()
            .await
            .context("Failed to read timetable response")?;

        Ok(FetchedTimetable::from_json(&body)?)
    }

    async fn fetch_inner(&self, api_key: &str) -> Result<FetchedTimetable> {
        let mut cookies = self.handshake().await?;
        self.validate_token(&mut cookies, api_key).await?;
        self.get_timetable(&cookies).await
    }
}

impl TimetableSource for MtuciClient {
    async fn fetch(&self, api_key: &str) -> TimetableResult<FetchedTimetable> {
        self.fetch_inner(api_key).await.map_err(into_timetable_error)
    }
}
