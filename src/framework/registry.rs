use crate::error::DeclarationError;
use std::collections::BTreeMap;

/// Operation nicknames seen so far within one Api.
///
/// Owned by the Api and handed down the setup cascade so operations in
/// sibling resources are checked against the same set.
#[derive(Debug, Clone, Default)]
pub struct NicknameRegistry {
    resource_path: String,
    /// nickname -> `METHOD path` of the operation that claimed it
    seen: BTreeMap<String, String>,
}

impl NicknameRegistry {
    pub fn new(resource_path: impl Into<String>) -> Self {
        NicknameRegistry {
            resource_path: resource_path.into(),
            seen: BTreeMap::new(),
        }
    }

    /// Claim `nickname` for the operation at `method path`.
    pub fn register(&mut self, nickname: &str, method: &str, path: &str) -> Result<(), DeclarationError> {
        if self.seen.contains_key(nickname) {
            return Err(DeclarationError::DuplicateNickname {
                nickname: nickname.to_string(),
                resource_path: self.resource_path.clone(),
            });
        }
        self.seen
            .insert(nickname.to_string(), format!("{} {}", method, path));
        Ok(())
    }

    pub fn contains(&self, nickname: &str) -> bool {
        self.seen.contains_key(nickname)
    }

    /// Route claimed by `nickname`, as `METHOD path`.
    pub fn route(&self, nickname: &str) -> Option<&str> {
        self.seen.get(nickname).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_nickname_rejected() {
        let mut registry = NicknameRegistry::new("/pet");
        registry.register("getPetById", "GET", "/pet/{petId}").unwrap();
        let err = registry
            .register("getPetById", "POST", "/pet/other")
            .unwrap_err();
        assert_eq!(
            err,
            DeclarationError::DuplicateNickname {
                nickname: "getPetById".into(),
                resource_path: "/pet".into(),
            }
        );
        assert_eq!(registry.route("getPetById"), Some("GET /pet/{petId}"));
        assert_eq!(registry.len(), 1);
    }
}
