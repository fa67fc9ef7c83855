// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration plugins.
//!
//! Plugins get one chance to adjust an instrumentation's options before the
//! instrumentation is built. They are supplied at configuration time, either
//! directly through [`PluginManagerBuilder`] or by name through a
//! [`PluginCatalog`].

mod catalog;
mod manager;

pub use catalog::{PluginCatalog, PluginFactory};
pub use manager::{OptionsPlugin, Plugin, PluginManager, PluginManagerBuilder};
