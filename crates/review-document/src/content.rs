use crate::model::Paragraph;

/// Structural equality over the fields a reviewer can actually change.
///
/// Timings, ids and bookkeeping are ignored: two transcripts are the same
/// content when their paragraphs carry the same speaker and text, in order.
pub trait SameContent {
    fn same_content(&self, other: &Self) -> bool;
}

impl SameContent for Paragraph {
    fn same_content(&self, other: &Self) -> bool {
        self.speaker == other.speaker && self.text == other.text
    }
}

impl<T: SameContent> SameContent for [T] {
    fn same_content(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same_content(b))
    }
}

impl<T: SameContent> SameContent for Vec<T> {
    fn same_content(&self, other: &Self) -> bool {
        self.as_slice().same_content(other.as_slice())
    }
}

impl SameContent for String {
    fn same_content(&self, other: &Self) -> bool {
        self == other
    }
}
