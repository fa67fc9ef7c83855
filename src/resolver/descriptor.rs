// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Component descriptors: what to instantiate, and with which arguments.

use std::any::Any;

use crate::types::Arg;

/// Symbolic reference to an instrumentation type plus its positional
/// constructor arguments.
///
/// The type name is kept as written and only parsed when the descriptor is
/// resolved, so a malformed name fails the one initializer that uses it.
#[derive(Debug)]
pub struct ComponentDescriptor {
    type_name: String,
    args: Vec<Arg>,
}

impl ComponentDescriptor {
    /// Describe a type with no constructor arguments yet.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg<T: Any + Send>(mut self, value: T) -> Self {
        self.args.push(Arg::new(value));
        self
    }

    /// Append an already wrapped argument.
    pub fn with_arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    /// The type name as written.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Number of constructor arguments.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Split into the type name and argument list.
    pub fn into_parts(self) -> (String, Vec<Arg>) {
        (self.type_name, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_keeps_argument_order() {
        let descriptor = ComponentDescriptor::new("Foo.Bar, Foo")
            .arg(1u8)
            .arg("second")
            .with_arg(Arg::new(3.0f64));

        assert_eq!(descriptor.type_name(), "Foo.Bar, Foo");
        assert_eq!(descriptor.arity(), 3);

        let (_, args) = descriptor.into_parts();
        assert!(args[0].is::<u8>());
        assert!(args[1].is::<&str>());
        assert!(args[2].is::<f64>());
    }
}
