// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Type resolution for deferred instrumentation.
//!
//! Instrumentations are referred to by assembly-qualified name, the same way
//! the host runtime names its types. Instead of loading types at runtime, the
//! resolver holds a catalog of factories registered while the loader is
//! configured:
//!
//! - [`TypeName`] - Parsed `Namespace.Type, Assembly` reference
//! - [`ComponentDescriptor`] - A type name plus positional constructor arguments
//! - [`TypeResolver`] - Catalog of factories, and the `resolve` entry point
//!
//! Every lookup or construction failure is a [`ResolutionError`](crate::error::ResolutionError);
//! none of them are fatal to the process.

mod catalog;
mod descriptor;
mod type_name;

pub use catalog::{Factory, ResolvedType, TypeResolver};
pub use descriptor::ComponentDescriptor;
pub use type_name::TypeName;
