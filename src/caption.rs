//! Bounded descriptive text rendered from the latest sample.
//!
//! Each component has a fixed byte capacity. Writes past it are cut at a
//! char boundary and flagged; formatting into a caption never fails.

use std::fmt::{self, Write};

use serde::Serialize;

/// Default per-component capacity in bytes.
pub const CAPTION_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionComponent {
    Title,
    Body,
    Footer,
}

/// String with a hard byte capacity that truncates instead of growing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundedString {
    text: String,
    #[serde(skip)]
    capacity: usize,
    truncated: bool,
}

impl BoundedString {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity,
            truncated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }

    /// Appends as much of `s` as fits. Returns `false` if anything was cut.
    pub fn push_str(&mut self, s: &str) -> bool {
        let room = self.capacity.saturating_sub(self.text.len());
        if s.len() <= room {
            self.text.push_str(s);
            return true;
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&s[..cut]);
        self.truncated = true;
        false
    }
}

impl Write for BoundedString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        // Truncation is recorded, not reported, so `write!` keeps going.
        self.push_str(s);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    title: BoundedString,
    body: BoundedString,
    footer: BoundedString,
}

impl Default for Caption {
    fn default() -> Self {
        Self::with_capacity(CAPTION_CAPACITY)
    }
}

impl Caption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            title: BoundedString::new(capacity),
            body: BoundedString::new(capacity),
            footer: BoundedString::new(capacity),
        }
    }

    fn component_mut(&mut self, component: CaptionComponent) -> &mut BoundedString {
        match component {
            CaptionComponent::Title => &mut self.title,
            CaptionComponent::Body => &mut self.body,
            CaptionComponent::Footer => &mut self.footer,
        }
    }

    pub fn get(&self, component: CaptionComponent) -> &str {
        match component {
            CaptionComponent::Title => self.title.as_str(),
            CaptionComponent::Body => self.body.as_str(),
            CaptionComponent::Footer => self.footer.as_str(),
        }
    }

    /// Replaces a component's text.
    pub fn set(&mut self, component: CaptionComponent, args: fmt::Arguments<'_>) {
        let target = self.component_mut(component);
        target.clear();
        let _ = target.write_fmt(args);
    }

    /// Appends to a component's text.
    pub fn append(&mut self, component: CaptionComponent, args: fmt::Arguments<'_>) {
        let _ = self.component_mut(component).write_fmt(args);
    }

    /// Appends a line to the body, separating it from previous lines.
    pub fn body_line(&mut self, args: fmt::Arguments<'_>) {
        if !self.body.as_str().is_empty() {
            self.body.push_str("\n");
        }
        let _ = self.body.write_fmt(args);
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.body.clear();
        self.footer.clear();
    }

    pub fn is_truncated(&self) -> bool {
        self.title.is_truncated() || self.body.is_truncated() || self.footer.is_truncated()
    }
}
