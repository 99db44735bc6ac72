use serde::Deserialize;

#[derive(Deserialize)]
pub struct SessionInfoResponse {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieEntry {
    pub domain: String,
    pub include_subdomains: bool,
    pub expires_at: i64,
    pub name: String,
    pub value: String,
}
