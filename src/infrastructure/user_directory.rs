use crate::infrastructure::error::InfraError;

pub trait UserDirectory: Send + Sync {
    fn all_user_ids(&self) -> Result<Vec<String>, InfraError>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    user_ids: Vec<String>,
}

impl StaticUserDirectory {
    pub fn new<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut user_ids: Vec<String> = user_ids.into_iter().map(Into::into).collect();
        user_ids.sort();
        user_ids.dedup();
        Self { user_ids }
    }
}

impl UserDirectory for StaticUserDirectory {
    fn all_user_ids(&self) -> Result<Vec<String>, InfraError> {
        Ok(self.user_ids.clone())
    }
}
