use serde::{Deserialize, Serialize};

pub const LIST_USERS: &str = "list_users";
pub const CREATE_USER: &str = "create_user";

/// Form body of `POST /api/users`.
///
/// The username is stored verbatim, including an empty string; only a
/// missing field leaves it absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults_to_no_username() {
        let form: CreateUserForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.username, None);

        let form: CreateUserForm = serde_json::from_str(r#"{"username": ""}"#).unwrap();
        assert_eq!(form.username.as_deref(), Some(""));
    }
}
