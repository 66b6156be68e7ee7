use super::*;

impl UserService {
    /// Authenticates a user with email and password.
    ///
    /// Unknown emails and wrong passwords both return
    /// `AuthOutcome::Failed`, and a hash is computed either way.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let credentials = self
            .user_repository
            .find_credentials_by_email(email.trim())
            .await?;

        let Some(credentials) = credentials else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        if !self
            .password_hasher
            .verify_password(password, &credentials.password_hash)?
        {
            return Ok(AuthOutcome::Failed);
        }

        Ok(AuthOutcome::Authenticated(credentials.user))
    }
}
