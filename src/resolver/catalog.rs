// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Type catalog: assembly-qualified names mapped to factories.
//!
//! Factories are registered while the loader is being configured. At
//! activation time the catalog is read-only and shared behind an `Arc`, so
//! lookups take no lock.

use std::any::{self, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConfigurationError, ResolutionError};
use crate::types::{Arg, BoxedInstrumentation, Instrumentation};

use super::descriptor::ComponentDescriptor;
use super::type_name::TypeName;

/// Builds an instrumentation from positional arguments.
pub type Factory =
    Arc<dyn Fn(Vec<Arg>) -> Result<BoxedInstrumentation, ResolutionError> + Send + Sync>;

/// A type found in the catalog, ready to be instantiated.
#[derive(Clone)]
pub struct ResolvedType {
    name: TypeName,
    factory: Factory,
}

impl ResolvedType {
    /// The fully qualified name the type was registered under.
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Run the type's constructor with the given arguments.
    pub fn instantiate(&self, args: Vec<Arg>) -> Result<BoxedInstrumentation, ResolutionError> {
        debug!(type_name = %self.name, args = args.len(), "Instantiating instrumentation");
        (self.factory)(args)
    }
}

impl fmt::Debug for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedType").field("name", &self.name).finish()
    }
}

/// Registry of instantiable instrumentation types.
///
/// # Example
///
/// ```rust,ignore
/// use lazy_instr::resolver::{ComponentDescriptor, TypeResolver};
///
/// let mut resolver = TypeResolver::new();
/// resolver.register("Acme.HttpInstrumentation, Acme.Http", |opts: HttpOptions| {
///     Ok(HttpInstrumentation::new(opts))
/// })?;
///
/// let instance = resolver.resolve(
///     ComponentDescriptor::new("Acme.HttpInstrumentation, Acme.Http").arg(HttpOptions::default()),
/// )?;
/// ```
#[derive(Default)]
pub struct TypeResolver {
    types: HashMap<TypeName, Factory>,
}

impl TypeResolver {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register a type whose constructor takes a single options value `O`.
    pub fn register<O, I, F>(
        &mut self,
        name: &str,
        ctor: F,
    ) -> Result<&mut Self, ConfigurationError>
    where
        O: Any + Send,
        I: Instrumentation + 'static,
        F: Fn(O) -> anyhow::Result<I> + Send + Sync + 'static,
    {
        let display = name.trim().to_string();
        self.register_raw(name, move |args| {
            let options = single_arg::<O>(&display, args)?;
            let instance = ctor(options).map_err(|source| ResolutionError::Construction {
                type_name: display.clone(),
                source,
            })?;
            Ok(Box::new(instance) as BoxedInstrumentation)
        })
    }

    /// Register a type with full control over argument handling.
    pub fn register_raw<F>(&mut self, name: &str, factory: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(Vec<Arg>) -> Result<BoxedInstrumentation, ResolutionError> + Send + Sync + 'static,
    {
        let type_name = TypeName::parse(name)
            .map_err(|_| ConfigurationError::InvalidTypeName(name.to_string()))?;
        if !type_name.is_qualified() {
            return Err(ConfigurationError::InvalidTypeName(format!(
                "{} (an assembly is required at registration)",
                name
            )));
        }
        if self.types.contains_key(&type_name) {
            return Err(ConfigurationError::DuplicateType(type_name.to_string()));
        }

        debug!(type_name = %type_name, "Registered instrumentation type");
        self.types.insert(type_name, Arc::new(factory));
        Ok(self)
    }

    /// Check whether a name resolves to exactly one type.
    pub fn contains(&self, name: &str) -> bool {
        TypeName::parse(name)
            .and_then(|name| self.lookup(&name))
            .is_ok()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All registered names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().map(TypeName::to_string).collect();
        names.sort();
        names
    }

    /// Find the type a name refers to.
    ///
    /// A qualified name must match exactly. An unqualified name matches the
    /// type in any assembly, and fails if more than one assembly has it.
    pub fn lookup(&self, name: &TypeName) -> Result<ResolvedType, ResolutionError> {
        if name.is_qualified() {
            return self
                .types
                .get_key_value(name)
                .map(|(name, factory)| ResolvedType {
                    name: name.clone(),
                    factory: factory.clone(),
                })
                .ok_or_else(|| ResolutionError::TypeNotFound(name.to_string()));
        }

        let mut matches: Vec<(&TypeName, &Factory)> = self
            .types
            .iter()
            .filter(|(candidate, _)| candidate.type_name() == name.type_name())
            .collect();

        match matches.len() {
            0 => Err(ResolutionError::TypeNotFound(name.to_string())),
            1 => {
                let (name, factory) = matches.remove(0);
                Ok(ResolvedType {
                    name: name.clone(),
                    factory: factory.clone(),
                })
            }
            _ => {
                let mut candidates: Vec<String> =
                    matches.iter().map(|(name, _)| name.to_string()).collect();
                candidates.sort();
                Err(ResolutionError::Ambiguous {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Look up the descriptor's type and instantiate it.
    pub fn resolve(
        &self,
        descriptor: ComponentDescriptor,
    ) -> Result<BoxedInstrumentation, ResolutionError> {
        let (type_name, args) = descriptor.into_parts();
        let name = TypeName::parse(&type_name)?;
        self.lookup(&name)?.instantiate(args)
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeResolver")
            .field("types", &self.type_names())
            .finish()
    }
}

/// Unpack a one-argument constructor call.
fn single_arg<O: Any>(type_name: &str, args: Vec<Arg>) -> Result<O, ResolutionError> {
    let actual = args.len();
    let mut args = args.into_iter();
    let arg = match (args.next(), args.next()) {
        (Some(arg), None) => arg,
        _ => {
            return Err(ResolutionError::ArgumentCount {
                type_name: type_name.to_string(),
                expected: 1,
                actual,
            })
        }
    };

    arg.downcast::<O>().map_err(|arg| ResolutionError::ArgumentType {
        type_name: type_name.to_string(),
        index: 0,
        expected: any::type_name::<O>(),
        actual: arg.type_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct HttpOptions {
        record_exception: bool,
    }

    struct HttpInstrumentation {
        #[allow(dead_code)]
        options: HttpOptions,
    }

    impl Instrumentation for HttpInstrumentation {
        fn name(&self) -> &str {
            "http"
        }
    }

    const HTTP: &str = "Acme.HttpInstrumentation, Acme.Http";

    fn resolver() -> TypeResolver {
        let mut resolver = TypeResolver::new();
        resolver
            .register(HTTP, |options: HttpOptions| {
                Ok(HttpInstrumentation { options })
            })
            .unwrap();
        resolver
    }

    #[test]
    fn test_resolve_with_options() {
        let resolver = resolver();
        let instance = resolver
            .resolve(ComponentDescriptor::new(HTTP).arg(HttpOptions {
                record_exception: true,
            }))
            .unwrap();
        assert_eq!(instance.name(), "http");
    }

    #[test]
    fn test_factory_receives_options() {
        let mut resolver = TypeResolver::new();
        resolver
            .register(HTTP, |options: HttpOptions| {
                anyhow::ensure!(options.record_exception, "record_exception must be set");
                Ok(HttpInstrumentation { options })
            })
            .unwrap();

        assert!(resolver
            .resolve(ComponentDescriptor::new(HTTP).arg(HttpOptions::default()))
            .is_err());

        let instance = resolver
            .resolve(ComponentDescriptor::new(HTTP).arg(HttpOptions {
                record_exception: true,
            }))
            .unwrap();
        assert_eq!(instance.name(), "http");
    }

    #[test]
    fn test_type_not_found() {
        let resolver = resolver();
        let err = resolver
            .resolve(ComponentDescriptor::new("Acme.Missing, Acme.Http").arg(HttpOptions::default()))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::TypeNotFound(_)));
    }

    #[test]
    fn test_wrong_assembly_is_not_found() {
        let resolver = resolver();
        let err = resolver
            .resolve(
                ComponentDescriptor::new("Acme.HttpInstrumentation, Other").arg(HttpOptions::default()),
            )
            .unwrap_err();
        assert!(matches!(err, ResolutionError::TypeNotFound(_)));
    }

    #[test]
    fn test_invalid_name_is_resolution_error() {
        let resolver = resolver();
        let err = resolver
            .resolve(ComponentDescriptor::new(", Acme.Http"))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidTypeName(_)));
    }

    #[test]
    fn test_argument_count_mismatch() {
        let resolver = resolver();
        let err = resolver.resolve(ComponentDescriptor::new(HTTP)).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::ArgumentCount {
                expected: 1,
                actual: 0,
                ..
            }
        ));

        let err = resolver
            .resolve(
                ComponentDescriptor::new(HTTP)
                    .arg(HttpOptions::default())
                    .arg(1u8),
            )
            .unwrap_err();
        assert!(matches!(err, ResolutionError::ArgumentCount { actual: 2, .. }));
    }

    #[test]
    fn test_argument_type_mismatch() {
        let resolver = resolver();
        let err = resolver
            .resolve(ComponentDescriptor::new(HTTP).arg("not options"))
            .unwrap_err();
        match err {
            ResolutionError::ArgumentType {
                index, expected, ..
            } => {
                assert_eq!(index, 0);
                assert!(expected.ends_with("HttpOptions"));
            }
            other => panic!("Expected ArgumentType, got {:?}", other),
        }
    }

    #[test]
    fn test_constructor_failure() {
        let mut resolver = TypeResolver::new();
        resolver
            .register(HTTP, |_: HttpOptions| -> anyhow::Result<HttpInstrumentation> {
                anyhow::bail!("listener unavailable")
            })
            .unwrap();

        let err = resolver
            .resolve(ComponentDescriptor::new(HTTP).arg(HttpOptions::default()))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Construction { .. }));
        assert!(err.to_string().contains("listener unavailable"));
    }

    #[test]
    fn test_unqualified_lookup() {
        let resolver = resolver();
        let resolved = resolver
            .lookup(&TypeName::parse("Acme.HttpInstrumentation").unwrap())
            .unwrap();
        assert_eq!(resolved.name().assembly(), Some("Acme.Http"));
        assert!(resolver.contains("Acme.HttpInstrumentation"));
    }

    #[test]
    fn test_unqualified_lookup_ambiguous() {
        let mut resolver = resolver();
        resolver
            .register("Acme.HttpInstrumentation, Acme.Http.Legacy", |options: HttpOptions| {
                Ok(HttpInstrumentation { options })
            })
            .unwrap();

        let err = resolver
            .lookup(&TypeName::parse("Acme.HttpInstrumentation").unwrap())
            .unwrap_err();
        match err {
            ResolutionError::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("Expected Ambiguous, got {:?}", other),
        }
        assert!(!resolver.contains("Acme.HttpInstrumentation"));
        assert!(resolver.contains(HTTP));
    }

    #[test]
    fn test_incompatible_type_from_raw_factory() {
        let mut resolver = TypeResolver::new();
        resolver
            .register_raw("Acme.NotAnInstrumentation, Acme", |_| {
                Err(ResolutionError::Incompatible {
                    type_name: "Acme.NotAnInstrumentation".to_string(),
                    reason: "does not implement Instrumentation".to_string(),
                })
            })
            .unwrap();

        let err = resolver
            .resolve(ComponentDescriptor::new("Acme.NotAnInstrumentation, Acme"))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Incompatible { .. }));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut resolver = resolver();
        let err = resolver
            .register(HTTP, |options: HttpOptions| {
                Ok(HttpInstrumentation { options })
            })
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateType(_)));
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_registration_requires_assembly() {
        let mut resolver = TypeResolver::new();
        let err = resolver
            .register("Acme.HttpInstrumentation", |options: HttpOptions| {
                Ok(HttpInstrumentation { options })
            })
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidTypeName(_)));
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_type_names_sorted() {
        let mut resolver = resolver();
        resolver
            .register("Acme.AdoInstrumentation, Acme.Ado", |options: HttpOptions| {
                Ok(HttpInstrumentation { options })
            })
            .unwrap();
        assert_eq!(
            resolver.type_names(),
            vec![
                "Acme.AdoInstrumentation, Acme.Ado".to_string(),
                HTTP.to_string()
            ]
        );
    }
}
