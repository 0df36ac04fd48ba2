//! Netscape `cookies.txt` parsing and the authenticated [`Session`] built from it.

use std::path::Path;

use chrono::Utc;
use log::{debug, info};
use sha1::{Digest, Sha1};

use crate::config;
use crate::error::UploadError;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// One line of a Netscape cookie file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds; `None` for session cookies.
    pub expires: Option<i64>,
    pub name: String,
    pub value: String,
    pub http_only: bool,
}

impl Cookie {
    fn is_for_host(&self) -> bool {
        let domain = self.domain.trim_start_matches('.');
        config::COOKIE_DOMAINS
            .iter()
            .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
    }

    /// Session cookies never expire.
    pub fn is_expired_at(&self, unix_secs: i64) -> bool {
        self.expires.is_some_and(|t| t <= unix_secs)
    }
}

/// Authentication context shared by every request of an upload.
///
/// Cheap to clone; one clone per concurrent upload.
#[derive(Debug, Clone)]
pub struct Session {
    cookies: Vec<Cookie>,
    cookie_header: String,
    sapisid: String,
}

impl Session {
    /// Build a session from already-parsed cookies.
    ///
    /// Cookies for other hosts and cookies already past their expiry are
    /// dropped before the SAPISID lookup.
    pub fn from_cookies(cookies: Vec<Cookie>) -> Result<Self, UploadError> {
        let now = Utc::now().timestamp();
        let cookies: Vec<Cookie> = cookies
            .into_iter()
            .filter(Cookie::is_for_host)
            .filter(|c| {
                let expired = c.is_expired_at(now);
                if expired {
                    debug!("dropping expired cookie {} for {}", c.name, c.domain);
                }
                !expired
            })
            .collect();

        let sapisid = config::SAPISID_COOKIES
            .iter()
            .find_map(|name| cookies.iter().find(|c| c.name == *name))
            .map(|c| c.value.clone())
            .ok_or_else(|| {
                UploadError::Credentials(format!(
                    "no {} cookie for youtube.com; export cookies while signed in",
                    config::SAPISID_COOKIES.join(" or ")
                ))
            })?;

        let cookie_header = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        Ok(Self {
            cookies,
            cookie_header,
            sapisid,
        })
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> &str {
        &self.cookie_header
    }

    /// `Authorization` header value signed for `origin` at `unix_secs`.
    pub fn authorization_at(&self, origin: &str, unix_secs: i64) -> String {
        let mut hasher = Sha1::new();
        hasher.update(format!("{unix_secs} {} {origin}", self.sapisid).as_bytes());
        format!("SAPISIDHASH {unix_secs}_{}", hex::encode(hasher.finalize()))
    }

    /// `Authorization` header value signed for `origin` now.
    pub fn authorization(&self, origin: &str) -> String {
        self.authorization_at(origin, Utc::now().timestamp())
    }
}

/// Read a cookie file and build a [`Session`]. Performs no network access.
pub fn load(path: &Path) -> Result<Session, UploadError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        UploadError::Credentials(format!("cannot read cookie file {}: {e}", path.display()))
    })?;
    let cookies = parse(&text)?;
    debug!("parsed {} cookies from {}", cookies.len(), path.display());
    let session = Session::from_cookies(cookies)?;
    info!(
        "loaded {} host cookies from {}",
        session.cookies().len(),
        path.display()
    );
    Ok(session)
}

/// Parse the Netscape cookie file format.
///
/// Seven tab-separated fields per line: domain, include-subdomains flag, path,
/// secure flag, expiry, name, value. Lines prefixed `#HttpOnly_` are cookies,
/// any other `#` line is a comment.
pub fn parse(text: &str) -> Result<Vec<Cookie>, UploadError> {
    let mut cookies = Vec::new();

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None if line.starts_with('#') => continue,
            None => (line, false),
        };

        let malformed = |what: &str| {
            UploadError::Credentials(format!("malformed cookie file, line {}: {what}", lineno + 1))
        };

        let fields: Vec<&str> = line.splitn(7, '\t').collect();
        if fields.len() < 7 {
            return Err(malformed(&format!("expected 7 fields, found {}", fields.len())));
        }

        let include_subdomains = parse_flag(fields[1]).ok_or_else(|| malformed("bad subdomain flag"))?;
        let secure = parse_flag(fields[3]).ok_or_else(|| malformed("bad secure flag"))?;
        let expires = match fields[4].trim() {
            "" | "0" => None,
            s => Some(s.parse::<i64>().map_err(|_| malformed("bad expiry"))?),
        };
        let name = fields[5].trim();
        if name.is_empty() {
            return Err(malformed("empty cookie name"));
        }

        cookies.push(Cookie {
            domain: fields[0].trim().to_string(),
            include_subdomains,
            path: fields[2].to_string(),
            secure,
            expires,
            name: name.to_string(),
            value: fields[6].to_string(),
            http_only,
        });
    }

    if cookies.is_empty() {
        return Err(UploadError::Credentials("cookie file contains no cookies".into()));
    }

    Ok(cookies)
}

fn parse_flag(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("TRUE") {
        Some(true)
    } else if s.eq_ignore_ascii_case("FALSE") {
        Some(false)
    } else {
        None
    }
}
