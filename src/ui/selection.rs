//! Instruction-set selection
//!
//! A chat turn carries one instruction id. It comes from, in order: a custom
//! numeric value typed by the user, the entry picked from the catalog, the
//! first catalog entry, and finally [`DEFAULT_INSTRUCTION_ID`].

use crate::backend::{InstructionCatalog, DEFAULT_INSTRUCTION_ID};

#[derive(Debug, Clone, Default)]
pub struct InstructionSelection {
    catalog: InstructionCatalog,
    selected: Option<String>,
    custom: String,
}

impl InstructionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &InstructionCatalog {
        &self.catalog
    }

    /// Install the fetched catalog; its first entry becomes the selection
    pub fn set_catalog(&mut self, catalog: InstructionCatalog) {
        if self.selected.is_none() && self.custom.is_empty() {
            self.selected = catalog.first_id().map(str::to_string);
        }
        self.catalog = catalog;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn custom(&self) -> &str {
        &self.custom
    }

    /// Pick a catalog entry. Clears any custom value.
    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
        self.custom.clear();
    }

    /// Set the custom value, keeping only numeric characters.
    /// A non-empty value clears the catalog selection.
    pub fn set_custom(&mut self, raw: &str) {
        self.custom = sanitize_numeric(raw);
        if !self.custom.is_empty() {
            self.selected = None;
        }
    }

    /// Instruction id the next chat turn will carry
    pub fn active(&self) -> &str {
        if !self.custom.is_empty() {
            return &self.custom;
        }
        self.selected
            .as_deref()
            .or_else(|| self.catalog.first_id())
            .unwrap_or(DEFAULT_INSTRUCTION_ID)
    }
}

/// Digits, an optional leading `-` and at most one `.`
pub fn sanitize_numeric(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut seen_dot = false;
    for c in raw.trim().chars() {
        match c {
            '0'..='9' => out.push(c),
            '-' if out.is_empty() => out.push(c),
            '.' if !seen_dot => {
                seen_dot = true;
                out.push(c);
            }
            _ => {}
        }
    }
    out
}
