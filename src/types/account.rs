//! Account types: credentials, workspaces and projects

use serde::Deserialize;
use std::fmt;

use super::id_string;

/// Password paired with an API token for basic auth
pub const API_TOKEN_PASSWORD: &str = "api_token";

/// Authentication pair sent with every remote call
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Account email and password
    Basic { email: String, password: String },
    /// API token, sent as `(token, "api_token")`
    ApiToken(String),
}

impl Credential {
    pub fn username(&self) -> &str {
        match self {
            Credential::Basic { email, .. } => email,
            Credential::ApiToken(token) => token,
        }
    }

    pub fn password(&self) -> &str {
        match self {
            Credential::Basic { password, .. } => password,
            Credential::ApiToken(_) => API_TOKEN_PASSWORD,
        }
    }

    /// True when nothing was entered for the user part
    pub fn is_empty(&self) -> bool {
        self.username().is_empty()
    }
}

// Never print secrets in logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .field("password", &"***")
                .finish(),
            Credential::ApiToken(_) => f.debug_tuple("ApiToken").field(&"***").finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workspace {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

/// Project as listed by the remote service for one workspace
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteProject {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

/// Project row in the local store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub workspace_id: String,
    pub id: String,
    pub name: String,
}

/// One line of the cross-workspace project listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListing {
    pub project_name: String,
    pub workspace_name: String,
    pub project_id: String,
}

/// Payload of the user-info endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub api_token: String,
    #[serde(rename = "default_wid", deserialize_with = "id_string")]
    pub default_workspace_id: String,
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataEnvelope;

    #[test]
    fn test_api_token_credential_uses_fixed_password() {
        let cred = Credential::ApiToken("abc123".to_string());
        assert_eq!(cred.username(), "abc123");
        assert_eq!(cred.password(), "api_token");
    }

    #[test]
    fn test_basic_credential_pair() {
        let cred = Credential::Basic {
            email: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert_eq!(cred.username(), "me@example.com");
        assert_eq!(cred.password(), "hunter2");
        assert!(!cred.is_empty());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let cred = Credential::Basic {
            email: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{:?}", cred);
        assert!(printed.contains("me@example.com"));
        assert!(!printed.contains("hunter2"));

        let token = format!("{:?}", Credential::ApiToken("secret".to_string()));
        assert!(!token.contains("secret"));
    }

    #[test]
    fn test_user_info_numeric_ids_become_strings() {
        let json = r#"{"data": {
            "api_token": "tok",
            "default_wid": 777,
            "workspaces": [{"id": 777, "name": "Personal"}, {"id": "12", "name": "Team"}]
        }}"#;
        let info: DataEnvelope<UserInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(info.data.default_workspace_id, "777");
        assert_eq!(info.data.workspaces[0].id, "777");
        assert_eq!(info.data.workspaces[1].id, "12");
    }

    #[test]
    fn test_remote_project_rejects_bad_id() {
        let json = r#"{"id": true, "name": "X"}"#;
        assert!(serde_json::from_str::<RemoteProject>(json).is_err());
    }
}
