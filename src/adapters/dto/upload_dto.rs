use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Overrides the server's default renaming behaviour.
    pub rename: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}
