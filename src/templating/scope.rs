//! Thread-local stack of active function scopes.
//!
//! Template backends register scoped functions once, at compile time, as
//! dispatchers. When a dispatcher runs it asks this module for the scope of the
//! execution currently running on the calling thread. Execution is synchronous,
//! so a thread-local stack is enough to keep concurrent renders of the same
//! compiled template from seeing each other's `embed` content or translator.
//!
//! Nested executions (a `component` rendered from inside a template) push their
//! own scope and only see that scope until they return.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use super::functions::{FunctionScope, TemplateFunction};

thread_local! {
    static ACTIVE_SCOPES: RefCell<Vec<Arc<FunctionScope>>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a scope active until dropped.
///
/// Not `Send`: the guard must be dropped on the thread that entered the scope.
#[must_use = "the scope is popped as soon as the guard is dropped"]
pub struct ScopeGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE_SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

/// Make `scope` the active scope for the current thread.
pub fn enter(scope: Arc<FunctionScope>) -> ScopeGuard {
    ACTIVE_SCOPES.with(|scopes| scopes.borrow_mut().push(scope));
    ScopeGuard {
        _not_send: PhantomData,
    }
}

/// Look up `name` in the innermost active scope.
pub fn lookup(name: &str) -> Option<Arc<dyn TemplateFunction>> {
    ACTIVE_SCOPES.with(|scopes| scopes.borrow().last().and_then(|scope| scope.get(name)))
}

/// Number of scopes active on the current thread.
pub fn depth() -> usize {
    ACTIVE_SCOPES.with(|scopes| scopes.borrow().len())
}
