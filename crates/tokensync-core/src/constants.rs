pub mod host {
    pub const DEFAULT_HOST: &str = "https://chatgpt.com";

    pub const SESSION_COOKIE_NAME: &str = "__Secure-next-auth.session-token";

    pub const SESSION_INFO_PATH: &str = "/api/auth/session";

    /// Claim the identity provider uses for profile data.
    pub const PROFILE_CLAIM: &str = "https://api.openai.com/profile";
}

pub mod registry {
    pub const IMPORT_PATH: &str = "/api/tokens/import";

    /// Image concurrency sentinel: no limit.
    pub const UNBOUNDED_CONCURRENCY: i64 = -1;

    pub const DEFAULT_VIDEO_CONCURRENCY: i64 = 3;
}

pub mod placeholders {
    pub const SESSION_NOT_FOUND: &str = "Not found. Please log in.";
    pub const SESSION_FETCH_ERROR: &str = "Error fetching cookie.";
    pub const ACCESS_NOT_FOUND: &str = "accessToken not found in response.";

    pub const ACCESS_PREFIXES: &[&str] = &[
        "Error",
        "Fetching",
        "Failed to fetch session",
        "accessToken not found",
    ];

    pub const SESSION_PREFIXES: &[&str] = &["Not found", "Fetching", "Error fetching cookie"];
}
