use serde::{Deserialize, Serialize};

/// Character-level style attribute carried by a [`TextRun`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Strikethrough,
}

impl Mark {
    pub const ALL: [Mark; 3] = [Mark::Bold, Mark::Italic, Mark::Strikethrough];

    pub fn name(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Strikethrough => "strikethrough",
        }
    }
}

/// The set of marks applied to a run.
///
/// Serialized as optional boolean fields next to the run's text, so a run
/// looks like `{"text": "hi", "bold": true}` on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Marks {
    pub fn get(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Strikethrough => self.strikethrough,
        }
    }

    pub fn set(&mut self, mark: Mark, value: bool) {
        match mark {
            Mark::Bold => self.bold = value,
            Mark::Italic => self.italic = value,
            Mark::Strikethrough => self.strikethrough = value,
        }
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.set(mark, true);
        self
    }

    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.strikethrough)
    }
}

/// A contiguous string sharing one set of marks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn styled(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// An empty run that keeps the given marks
    pub fn empty_with(marks: Marks) -> Self {
        Self::styled(String::new(), marks)
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.set(mark, true);
        self
    }

    /// Length in chars (the unit used for every offset in the model)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split into two runs with identical marks at a char offset
    pub(crate) fn split_at_char(&self, at: usize) -> (TextRun, TextRun) {
        let byte = byte_index(&self.text, at);
        let (head, tail) = self.text.split_at(byte);
        (
            TextRun::styled(head, self.marks),
            TextRun::styled(tail, self.marks),
        )
    }
}

/// Convert a char offset into a byte index, clamping to the end of the string.
pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(i, _)| i)
}
