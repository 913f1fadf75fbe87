//! Process-wide lookup of scopes by name.
//!
//! Scopes are registered once at startup and live until the thread that
//! owns them exits. The registry is thread-local: a scope registered on one
//! thread is invisible to every other thread, and because [`Scope`] is not
//! `Send`, it cannot be moved to one either. Programs that read and edit
//! live values from several threads must funnel those accesses through the
//! thread that registered the scope.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{DataHubError, Result};
use crate::schema::{Scope, ScopeSchema};

thread_local! {
    static SCOPES: RefCell<BTreeMap<String, Rc<Scope>>> = const { RefCell::new(BTreeMap::new()) };
}

/// Instantiates `schema` and registers it under its name.
///
/// Fails if a scope of that name already exists.
pub fn register(schema: &ScopeSchema) -> Result<Rc<Scope>> {
    if contains(schema.name()) {
        return Err(DataHubError::DuplicateScope {
            name: schema.name().to_owned(),
        });
    }

    let scope = Rc::new(Scope::new(schema));
    SCOPES.with_borrow_mut(|scopes| {
        scopes.insert(scope.name().to_owned(), Rc::clone(&scope));
    });
    tracing::info!(scope = scope.name(), "scope registered");
    Ok(scope)
}

/// Returns the scope registered under `schema`'s name, registering it first
/// if needed.
///
/// This is the usual way to define a scope as a process-wide singleton:
/// every caller gets the same instance.
pub fn get_or_register(schema: &ScopeSchema) -> Rc<Scope> {
    match get(schema.name()) {
        Ok(scope) => scope,
        Err(_) => {
            let scope = Rc::new(Scope::new(schema));
            SCOPES.with_borrow_mut(|scopes| {
                scopes.insert(scope.name().to_owned(), Rc::clone(&scope));
            });
            tracing::info!(scope = scope.name(), "scope registered on first use");
            scope
        }
    }
}

/// Scope registered under `name`.
pub fn get(name: &str) -> Result<Rc<Scope>> {
    SCOPES.with_borrow(|scopes| scopes.get(name).cloned()).ok_or_else(|| {
        DataHubError::UnknownScope {
            name: name.to_owned(),
        }
    })
}

/// Returns true if a scope is registered under `name`.
pub fn contains(name: &str) -> bool {
    SCOPES.with_borrow(|scopes| scopes.contains_key(name))
}

/// Registered scope names, sorted.
pub fn names() -> Vec<String> {
    SCOPES.with_borrow(|scopes| scopes.keys().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn schema(name: &str) -> ScopeSchema {
        let fields = Schema::builder().value("counter", 0).build().unwrap();
        ScopeSchema::new(name, fields).unwrap()
    }

    #[test]
    fn registered_scope_is_shared_by_name() {
        let scope = register(&schema("session")).unwrap();
        scope.value("counter").unwrap().assign(3).unwrap();

        let again = get("session").unwrap();
        assert!(Rc::ptr_eq(&scope, &again));
        assert!(*again.value("counter").unwrap() == 3);
        assert!(names().contains(&"session".to_owned()));
    }

    #[test]
    fn duplicate_and_unknown_names_fail() {
        register(&schema("combat")).unwrap();
        assert_eq!(
            register(&schema("combat")).unwrap_err(),
            DataHubError::DuplicateScope {
                name: "combat".to_owned()
            }
        );
        assert_eq!(
            get("nowhere").unwrap_err(),
            DataHubError::UnknownScope {
                name: "nowhere".to_owned()
            }
        );
    }

    #[test]
    fn get_or_register_returns_one_instance() {
        let first = get_or_register(&schema("tuning"));
        let second = get_or_register(&schema("tuning"));
        assert!(Rc::ptr_eq(&first, &second));
        assert!(contains("tuning"));
    }
}
