use serde::Deserialize;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollDTO {
    pub question: String,
    pub options: Vec<String>,
    /// Raw form input. Absent or empty means open-ended.
    #[serde(default)]
    pub end_date: Option<String>,
}
