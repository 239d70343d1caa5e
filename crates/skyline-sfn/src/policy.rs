//! Execution-role permission collection.
//!
//! Every state declares the permissions it requires; the collector walks a
//! chain once, recursing into map iterators, parallel branches, and catch
//! handlers, and emits a deduplicated manifest ready for attachment to an
//! execution-role policy. The manifest must exist before the workflow can
//! run, so collection happens during compilation rather than being deferred.

use serde::Serialize;

use crate::chain::Chain;

/// A set of allowed actions over a set of resource identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Permission {
    actions: Vec<String>,
    resources: Vec<String>,
}

impl Permission {
    /// Creates a permission from actions and the resources they apply to.
    pub fn new<A, R, S, T>(actions: A, resources: R) -> Self
    where
        A: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the allowed actions.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Returns the resource identifiers the actions apply to.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }
}

/// Deduplicated, ordered list of execution-role grants.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PermissionManifest {
    statements: Vec<Permission>,
}

impl PermissionManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission unless an identical (actions, resources) entry is
    /// already present. First-seen order is preserved.
    pub fn push(&mut self, permission: Permission) {
        if !self.statements.contains(&permission) {
            self.statements.push(permission);
        }
    }

    /// Returns the deduplicated entries in first-seen order.
    pub fn statements(&self) -> &[Permission] {
        &self.statements
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Extend<Permission> for PermissionManifest {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, permissions: I) {
        for permission in permissions {
            self.push(permission);
        }
    }
}

/// Collects the union of permissions required by every state reachable from
/// the chain, visiting each exactly once and deduplicating by
/// (actions, resources) identity.
pub fn collect_permissions(chain: &Chain) -> PermissionManifest {
    let mut manifest = PermissionManifest::new();
    manifest.extend(chain.required_permissions());
    manifest
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::{MapParams, State, TaskParams};

    fn invoke(name: &str, arn: &str) -> State {
        State::task(name, TaskParams::lambda_invoke(arn))
    }

    #[test]
    fn identical_targets_deduplicate_to_one_entry() {
        let arn = "arn:aws:lambda:us-east-1:0:function:Shared";
        let chain = invoke("First", arn)
            .next(invoke("Second", arn))
            .and_then(|chain| chain.next(State::succeed("Done")))
            .expect("chain links");

        let manifest = collect_permissions(&chain);
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.statements()[0].resources(), [arn]);
    }

    #[test]
    fn map_iterator_permissions_are_collected() {
        let inner = invoke("Inner", "arn:aws:lambda:us-east-1:0:function:Inner")
            .next(State::succeed("InnerDone"))
            .expect("chain links");
        let chain = invoke("Outer", "arn:aws:lambda:us-east-1:0:function:Outer")
            .next(State::map("Iterate", MapParams::new("$.items", inner)))
            .expect("chain links");

        let manifest = collect_permissions(&chain);
        let resources: Vec<_> = manifest
            .statements()
            .iter()
            .flat_map(|p| p.resources().to_vec())
            .collect();
        assert_eq!(
            resources,
            [
                "arn:aws:lambda:us-east-1:0:function:Outer",
                "arn:aws:lambda:us-east-1:0:function:Inner",
            ]
        );
    }

    #[test]
    fn catch_handler_permissions_are_collected() {
        use crate::retry::Catcher;

        let handler = invoke("Cleanup", "arn:aws:lambda:us-east-1:0:function:Cleanup")
            .next(State::fail("GiveUp"))
            .expect("chain links");
        let guarded = invoke("Fragile", "arn:aws:lambda:us-east-1:0:function:Fragile")
            .with_catch(Catcher::new(handler))
            .expect("task states accept catchers");
        let chain = guarded.next(State::succeed("Done")).expect("chain links");

        let manifest = collect_permissions(&chain);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn manifest_serializes_as_plain_statement_list() {
        let mut manifest = PermissionManifest::new();
        manifest.push(Permission::new(
            ["lambda:InvokeFunction"],
            ["arn:aws:lambda:us-east-1:0:function:Publish"],
        ));

        let value = serde_json::to_value(&manifest).expect("manifest serializes");
        assert_eq!(
            value,
            json!([{
                "actions": ["lambda:InvokeFunction"],
                "resources": ["arn:aws:lambda:us-east-1:0:function:Publish"],
            }])
        );
    }
}
