//! Lexical scope environments.
//!
//! A scope maps names to bindings and chains to its enclosing scope; name
//! lookup and assignment walk outward through the chain.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// How a binding may be written after declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `fairy` - single assignment.
    Fixed,
    /// `magic`, `dragon`, and the literal declarations.
    Mutable,
    /// `unicorn` - re-assignable, strings only.
    StringOnly,
}

/// Why an assignment was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    Undefined,
    Fixed,
    NotAString,
}

#[derive(Debug)]
struct Binding {
    value: Value,
    kind: BindingKind,
}

/// One lexical scope.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Binding>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Creates a root (global) scope.
    pub fn root() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Creates a scope enclosed by `parent`.
    pub fn child_of(parent: &Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            values: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Declares a binding in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value, kind: BindingKind) {
        self.values.insert(name.into(), Binding { value, kind });
    }

    /// Looks a name up through the scope chain.
    pub fn get(env: &Rc<RefCell<Environment>>, name: &str) -> Option<Value> {
        let e = env.borrow();
        if let Some(binding) = e.values.get(name) {
            return Some(binding.value.clone());
        }
        match &e.parent {
            Some(parent) => Environment::get(parent, name),
            None => None,
        }
    }

    /// Assigns to an existing binding, honoring its kind.
    pub fn assign(
        env: &Rc<RefCell<Environment>>,
        name: &str,
        value: Value,
    ) -> Result<(), AssignError> {
        let mut e = env.borrow_mut();
        if let Some(binding) = e.values.get_mut(name) {
            return match binding.kind {
                BindingKind::Fixed => Err(AssignError::Fixed),
                BindingKind::StringOnly if !matches!(value, Value::Str(_)) => {
                    Err(AssignError::NotAString)
                }
                _ => {
                    binding.value = value;
                    Ok(())
                }
            };
        }
        let parent = e.parent.clone();
        drop(e);
        match parent {
            Some(parent) => Environment::assign(&parent, name, value),
            None => Err(AssignError::Undefined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Environment::root();
        env.borrow_mut()
            .define("x", Value::Number(1.0), BindingKind::Mutable);
        assert!(matches!(Environment::get(&env, "x"), Some(Value::Number(n)) if n == 1.0));
        assert!(Environment::get(&env, "y").is_none());
    }

    #[test]
    fn test_lookup_walks_chain() {
        let root = Environment::root();
        root.borrow_mut()
            .define("x", Value::Number(1.0), BindingKind::Mutable);
        let inner = Environment::child_of(&root);
        assert!(Environment::get(&inner, "x").is_some());
    }

    #[test]
    fn test_shadowing() {
        let root = Environment::root();
        root.borrow_mut()
            .define("x", Value::Number(1.0), BindingKind::Mutable);
        let inner = Environment::child_of(&root);
        inner
            .borrow_mut()
            .define("x", Value::Number(2.0), BindingKind::Mutable);
        assert!(matches!(Environment::get(&inner, "x"), Some(Value::Number(n)) if n == 2.0));
        assert!(matches!(Environment::get(&root, "x"), Some(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn test_assign_through_chain() {
        let root = Environment::root();
        root.borrow_mut()
            .define("x", Value::Number(1.0), BindingKind::Mutable);
        let inner = Environment::child_of(&root);
        Environment::assign(&inner, "x", Value::Number(5.0)).unwrap();
        assert!(matches!(Environment::get(&root, "x"), Some(Value::Number(n)) if n == 5.0));
    }

    #[test]
    fn test_fixed_binding_rejects_assignment() {
        let env = Environment::root();
        env.borrow_mut()
            .define("pi", Value::Number(3.14), BindingKind::Fixed);
        assert_eq!(
            Environment::assign(&env, "pi", Value::Number(3.0)),
            Err(AssignError::Fixed)
        );
    }

    #[test]
    fn test_string_only_binding() {
        let env = Environment::root();
        env.borrow_mut().define(
            "name",
            Value::Str("Star".to_string()),
            BindingKind::StringOnly,
        );
        assert_eq!(
            Environment::assign(&env, "name", Value::Number(1.0)),
            Err(AssignError::NotAString)
        );
        assert!(Environment::assign(&env, "name", Value::Str("Moon".to_string())).is_ok());
    }

    #[test]
    fn test_assign_undefined() {
        let env = Environment::root();
        assert_eq!(
            Environment::assign(&env, "ghost", Value::Null),
            Err(AssignError::Undefined)
        );
    }
}
