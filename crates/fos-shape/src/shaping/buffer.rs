//! Shaping buffer
//!
//! Holds characters before shaping and positioned glyphs after. The buffer is
//! owned by the caller and mutated in place by the shaper.

use super::script::{Direction, Language, Script, SegmentProperties};

/// What the items of a buffer currently hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// Unicode codepoints, not yet shaped
    #[default]
    Text,
    /// Glyph ids with positions
    Glyphs,
}

/// A character or shaped glyph with position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphItem {
    /// Unicode scalar before shaping, glyph id after
    pub codepoint: u32,
    /// Cluster index (original character position)
    pub cluster: u32,
    /// Horizontal advance (in font units)
    pub x_advance: i32,
    /// Vertical advance (in font units)
    pub y_advance: i32,
    /// X offset from current position (in font units)
    pub x_offset: i32,
    /// Y offset from current position (in font units)
    pub y_offset: i32,
}

impl GlyphItem {
    /// Unshaped character item
    pub fn text(c: char, cluster: u32) -> Self {
        Self {
            codepoint: c as u32,
            cluster,
            ..Default::default()
        }
    }

    /// Advance along a direction's axis
    pub fn advance(&self, direction: Direction) -> i32 {
        if direction.is_vertical() {
            self.y_advance.abs()
        } else {
            self.x_advance
        }
    }
}

/// Text or glyph buffer with segment properties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Buffer {
    items: Vec<GlyphItem>,
    props: SegmentProperties,
    content_type: ContentType,
}

impl Buffer {
    /// Create an empty text buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a text buffer from a string
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.push_str(text);
        buffer
    }

    /// Append text; clusters are UTF-8 byte offsets into `text`
    pub fn push_str(&mut self, text: &str) {
        self.items.reserve(text.len());
        for (offset, c) in text.char_indices() {
            self.items.push(GlyphItem::text(c, offset as u32));
        }
    }

    /// Append one character with an explicit cluster
    pub fn add(&mut self, c: char, cluster: u32) {
        self.items.push(GlyphItem::text(c, cluster));
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[GlyphItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [GlyphItem] {
        &mut self.items
    }

    /// Replace all items; used by shapers once output is complete
    pub(crate) fn replace_items(&mut self, items: Vec<GlyphItem>) {
        self.items = items;
    }

    /// Remove all items and return to text content, keeping properties
    pub fn clear(&mut self) {
        self.items.clear();
        self.content_type = ContentType::Text;
    }

    /// Reverse item order
    pub fn reverse(&mut self) {
        self.items.reverse();
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
    }

    pub fn props(&self) -> &SegmentProperties {
        &self.props
    }

    pub fn set_props(&mut self, props: SegmentProperties) {
        self.props = props;
    }

    pub(crate) fn props_mut(&mut self) -> &mut SegmentProperties {
        &mut self.props
    }

    pub fn direction(&self) -> Direction {
        self.props.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.props.direction = direction;
    }

    pub fn script(&self) -> Option<Script> {
        self.props.script
    }

    pub fn set_script(&mut self, script: Script) {
        self.props.script = Some(script);
    }

    pub fn language(&self) -> Option<&Language> {
        self.props.language.as_ref()
    }

    pub fn set_language(&mut self, language: Language) {
        self.props.language = Some(language);
    }

    /// Fill in properties left unset (currently the direction)
    pub fn guess_segment_properties(&mut self) {
        self.props.resolve_direction();
    }

    /// Sum of advances along the buffer direction
    pub fn advance_total(&self) -> i64 {
        let direction = self.props.direction;
        self.items.iter().map(|g| i64::from(g.advance(direction))).sum()
    }

    /// New glyph buffer holding a copy of `items`, with this buffer's properties
    pub(crate) fn sub_buffer(&self, items: &[GlyphItem]) -> Buffer {
        Buffer {
            items: items.to_vec(),
            props: self.props.clone(),
            content_type: self.content_type,
        }
    }
}
