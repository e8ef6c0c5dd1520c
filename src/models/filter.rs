// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live text search over list widgets.
//!
//! A filter never removes entries: it only decides which rows are drawn.
//! Matching is a case-sensitive substring test on the row's display text.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    text: String,
}

impl ListFilter {
    /// Mutable access for binding to a text edit.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.text.is_empty()
    }

    /// Whether a row with this display text stays visible.
    pub fn matches(&self, display: &str) -> bool {
        display.contains(self.text.as_str())
    }

    /// Indices of the rows that stay visible, in their original order.
    pub fn visible_indices<'a, I>(&self, items: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        items
            .into_iter()
            .enumerate()
            .filter(|(_, text)| self.matches(text))
            .map(|(i, _)| i)
            .collect()
    }
}
