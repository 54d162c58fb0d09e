//! Google Drive (v3) client for publishing reports as spreadsheets.
//!
//! Authentication uses an OAuth refresh token, or exchanges a one-time
//! authorization code when no refresh token is known yet.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const REDIRECT_URI: &str = "http://localhost";
const SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const BOUNDARY: &str = "pager-hours-report-boundary";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Folder id Drive uses for the top of "My Drive".
pub const ROOT_FOLDER: &str = "root";

/// OAuth client and grant used to reach Drive.
#[derive(Debug, Clone)]
pub struct DriveCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Consent page where an operator obtains a fresh authorization code.
pub fn authorization_url(client_id: &str) -> Result<Url> {
    Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("scope", SCOPE),
            ("access_type", "offline"),
        ],
    )
    .context("authorization url build failed")
}

pub struct GoogleDrive {
    http: reqwest::blocking::Client,
    access_token: String,
}

impl GoogleDrive {
    /// Obtain an access token for `credentials`.
    pub fn connect(credentials: &DriveCredentials) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("drive http client build failed")?;

        let mut form = vec![
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];
        let exchanging = match (&credentials.refresh_token, &credentials.code) {
            (Some(token), _) => {
                form.push(("grant_type", "refresh_token"));
                form.push(("refresh_token", token.as_str()));
                false
            }
            (None, Some(code)) => {
                form.push(("grant_type", "authorization_code"));
                form.push(("code", code.as_str()));
                form.push(("redirect_uri", REDIRECT_URI));
                true
            }
            (None, None) => bail!(
                "either a refresh token or an authorization code is needed, get a code at {}",
                authorization_url(&credentials.client_id)?
            ),
        };

        let resp = http
            .post(TOKEN_URL)
            .form(&form)
            .send()
            .context("POST token request failed")?;
        let token: TokenResponse = json_or_error(resp, "POST token")?;

        if exchanging {
            match &token.refresh_token {
                Some(refresh) => info!(refresh_token = %refresh, "new drive refresh token, pass it via GDRIVE_REFRESH_TOKEN"),
                None => info!("authorization code exchanged, no refresh token was issued"),
            }
        }

        Ok(Self {
            http,
            access_token: token.access_token,
        })
    }

    /// Folders named exactly `name` directly under `parent`, ignoring trashed ones.
    pub fn find_directories(&self, name: &str, parent: &str) -> Result<Vec<DriveFile>> {
        let query = directory_query(name, parent);
        debug!(%query, "drive folder lookup");
        let resp = self
            .http
            .get(FILES_URL)
            .bearer_auth(&self.access_token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .with_context(|| format!("GET files '{}' in {} request failed", name, parent))?;
        let list: FileList = json_or_error(resp, "GET files")?;
        Ok(list.files)
    }

    pub fn create_directory(&self, name: &str, parent: &str) -> Result<DriveFile> {
        let metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent],
        });
        let resp = self
            .http
            .post(FILES_URL)
            .bearer_auth(&self.access_token)
            .json(&metadata)
            .send()
            .with_context(|| format!("POST folder '{}' in {} request failed", name, parent))?;
        json_or_error(resp, "POST folder")
    }

    /// Return the single folder `name` under `parent`, creating it if absent.
    pub fn get_or_create_directory(&self, name: &str, parent: &str) -> Result<DriveFile> {
        let mut found = self.find_directories(name, parent)?;
        match found.len() {
            0 => self.create_directory(name, parent),
            1 => Ok(found.remove(0)),
            n => Err(anyhow!(
                "more than one directory named '{}' in {} ({} found)",
                name,
                parent,
                n
            )),
        }
    }

    /// Upload CSV bytes into `parent` as a spreadsheet called `title`.
    pub fn upload_csv(&self, csv: &[u8], parent: &str, title: &str) -> Result<DriveFile> {
        let body = multipart_body(title, parent, csv);
        let resp = self
            .http
            .post(UPLOAD_URL)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id,name")])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", BOUNDARY),
            )
            .body(body)
            .send()
            .with_context(|| format!("POST upload '{}' request failed", title))?;
        json_or_error(resp, "POST upload")
    }
}

fn json_or_error<T: serde::de::DeserializeOwned>(
    resp: reqwest::blocking::Response,
    what: &str,
) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(anyhow!(
            "{} http error status={} body={}",
            what,
            status.as_u16(),
            body.trim()
        ));
    }
    resp.json()
        .with_context(|| format!("{} response json decode failed", what))
}

/// Escape a value for a single-quoted Drive query literal.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn directory_query(name: &str, parent: &str) -> String {
    format!(
        "name = '{}' and '{}' in parents and mimeType = '{}' and trashed = false",
        escape_query(name),
        escape_query(parent),
        FOLDER_MIME
    )
}

/// A `multipart/related` body: JSON metadata, then the CSV media.
fn multipart_body(title: &str, parent: &str, csv: &[u8]) -> Vec<u8> {
    let metadata = json!({
        "name": title,
        "parents": [parent],
        "mimeType": SPREADSHEET_MIME,
    });

    let mut body = Vec::with_capacity(csv.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(csv);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_escapes_quotes() {
        assert_eq!(
            directory_query("Bob's Team", "root"),
            "name = 'Bob\\'s Team' and 'root' in parents \
             and mimeType = 'application/vnd.google-apps.folder' and trashed = false"
        );
    }

    #[test]
    fn query_escapes_backslashes() {
        assert_eq!(escape_query(r"a\b"), r"a\\b");
    }

    #[test]
    fn multipart_body_layout() {
        let body = multipart_body("2024-03-01 - 2024-04-01.csv", "PARENT", b"Date,User\n");
        let text = String::from_utf8(body).unwrap();
        let parts: Vec<&str> = text.split("--pager-hours-report-boundary").collect();

        // leading empty chunk, metadata, media, closing marker
        assert_eq!(parts.len(), 4);
        assert!(parts[1].contains("application/json"));
        assert!(parts[1].contains("\"name\":\"2024-03-01 - 2024-04-01.csv\""));
        assert!(parts[1].contains("\"parents\":[\"PARENT\"]"));
        assert!(parts[1].contains(SPREADSHEET_MIME));
        assert_eq!(parts[2], "\r\nContent-Type: text/csv\r\n\r\nDate,User\n\r\n");
        assert_eq!(parts[3], "--\r\n");
    }

    #[test]
    fn authorization_url_carries_client_and_scope() {
        let url = authorization_url("client-123").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("client_id".to_string(), "client-123".to_string())));
        assert!(pairs.contains(&("scope".to_string(), SCOPE.to_string())));
        assert!(pairs.contains(&("access_type".to_string(), "offline".to_string())));
    }

    #[test]
    fn file_list_tolerates_missing_files() {
        let list: FileList = serde_json::from_str("{}").unwrap();
        assert!(list.files.is_empty());
    }
}
