use serde::{Deserialize, Serialize};

/// `GET /user_metadata/me`. Only `anon_username` is shown in the client; the
/// onboarding fields may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserMetadata {
    #[serde(default)]
    pub anon_username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub med_school: Option<String>,
    #[serde(default)]
    pub year_group: Option<String>,
    #[serde(default)]
    pub desired_specialty: Option<String>,
}
