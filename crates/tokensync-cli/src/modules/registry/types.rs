use serde::Deserialize;

#[derive(Deserialize)]
pub struct ImportResponse {
    pub success: bool,
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub message: Option<String>,
}
