// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Assembly-qualified type names.
//!
//! Accepts the `Namespace.Type, Assembly[, Version=..., Culture=..., PublicKeyToken=...]`
//! form. Only the type and assembly parts take part in lookup; the trailing
//! attributes are accepted and ignored.

use std::fmt;
use std::str::FromStr;

use crate::error::ResolutionError;

/// A parsed type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    type_name: String,
    assembly: Option<String>,
}

impl TypeName {
    /// Create a fully qualified type name.
    pub fn new(type_name: impl Into<String>, assembly: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            assembly: Some(assembly.into()),
        }
    }

    /// Parse a possibly assembly-qualified name.
    pub fn parse(input: &str) -> Result<Self, ResolutionError> {
        let mut parts = input.split(',').map(str::trim);

        let type_name = parts.next().unwrap_or_default();
        if type_name.is_empty() || type_name.contains(char::is_whitespace) {
            return Err(ResolutionError::InvalidTypeName(input.to_string()));
        }

        let assembly = match parts.next() {
            None => None,
            Some("") => return Err(ResolutionError::InvalidTypeName(input.to_string())),
            Some(assembly) if assembly.contains('=') => {
                // Attributes with no assembly name in front of them.
                return Err(ResolutionError::InvalidTypeName(input.to_string()));
            }
            Some(assembly) => Some(assembly.to_string()),
        };

        for attribute in parts {
            if !attribute.contains('=') {
                return Err(ResolutionError::InvalidTypeName(input.to_string()));
            }
        }

        Ok(Self {
            type_name: type_name.to_string(),
            assembly,
        })
    }

    /// The namespace-qualified type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The assembly, if the name was assembly-qualified.
    pub fn assembly(&self) -> Option<&str> {
        self.assembly.as_deref()
    }

    /// Whether an assembly was given.
    pub fn is_qualified(&self) -> bool {
        self.assembly.is_some()
    }

    /// Type name without its namespace.
    pub fn short_name(&self) -> &str {
        self.type_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.type_name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.assembly {
            Some(assembly) => write!(f, "{}, {}", self.type_name, assembly),
            None => f.write_str(&self.type_name),
        }
    }
}

impl FromStr for TypeName {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
