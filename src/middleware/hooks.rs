use super::core::Stage;
use std::fmt;
use std::sync::Arc;

/// Pluggable request hooks.
///
/// Hooks can be attached to the framework, an api, a resource or an
/// operation. Each operation resolves the nearest hook of every kind once,
/// at setup.
#[derive(Clone, Default)]
pub struct Hooks {
    pub before: Option<Arc<dyn Stage>>,
    pub authenticate: Option<Arc<dyn Stage>>,
    pub authorize: Option<Arc<dyn Stage>>,
    pub after: Option<Arc<dyn Stage>>,
}

impl Hooks {
    /// Own hooks, falling back to `parent` for the ones not set.
    pub fn inherit(&self, parent: &Hooks) -> Hooks {
        Hooks {
            before: self.before.clone().or_else(|| parent.before.clone()),
            authenticate: self
                .authenticate
                .clone()
                .or_else(|| parent.authenticate.clone()),
            authorize: self.authorize.clone().or_else(|| parent.authorize.clone()),
            after: self.after.clone().or_else(|| parent.after.clone()),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |hook: &Option<Arc<dyn Stage>>| hook.as_ref().map(|h| h.name().to_string());
        f.debug_struct("Hooks")
            .field("before", &name(&self.before))
            .field("authenticate", &name(&self.authenticate))
            .field("authorize", &name(&self.authorize))
            .field("after", &name(&self.after))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{named, Outcome};

    #[test]
    fn test_inherit_prefers_own_hooks() {
        let parent = Hooks {
            authenticate: Some(named("api-auth", |_| Outcome::Continue)),
            after: Some(named("api-after", |_| Outcome::Continue)),
            ..Default::default()
        };
        let own = Hooks {
            authenticate: Some(named("op-auth", |_| Outcome::Continue)),
            ..Default::default()
        };
        let effective = own.inherit(&parent);
        assert_eq!(effective.authenticate.as_ref().map(|h| h.name()), Some("op-auth"));
        assert_eq!(effective.after.as_ref().map(|h| h.name()), Some("api-after"));
        assert!(effective.before.is_none());
    }
}
