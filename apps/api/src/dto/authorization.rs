use serde::{Deserialize, Serialize};

/// Query string for template-layer authorization checks.
///
/// `roles` and `any_permissions` accept comma-separated lists.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizationCheckQuery {
    pub roles: Option<String>,
    pub permission: Option<String>,
    pub any_permissions: Option<String>,
}

impl AuthorizationCheckQuery {
    pub fn any_permission_names(&self) -> Option<Vec<String>> {
        self.any_permissions.as_deref().map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
    }
}

/// Answers for each requested check. Checks that were not requested are
/// omitted.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuthorizationCheckResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_permission: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::AuthorizationCheckQuery;

    #[test]
    fn any_permissions_are_split_and_trimmed() {
        let query = AuthorizationCheckQuery {
            any_permissions: Some("user_view, ,role_view ".to_owned()),
            ..AuthorizationCheckQuery::default()
        };

        assert_eq!(
            query.any_permission_names(),
            Some(vec!["user_view".to_owned(), "role_view".to_owned()])
        );
        assert_eq!(AuthorizationCheckQuery::default().any_permission_names(), None);
    }
}
