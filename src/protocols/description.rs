//! Rich descriptions of composites
//!
//! Rendering layers consume descriptions fragment by fragment, so the
//! sequence of `(kind, text)` pairs is the stable contract and the
//! concatenated string is only a convenience.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentKind {
    Name,
    Comma,
    Misc,
    EndOfDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
}

impl Fragment {
    pub fn new(kind: FragmentKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

#[derive(Debug, Default)]
pub struct DescriptionBuilder {
    fragments: Vec<Fragment>,
}

impl DescriptionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(FragmentKind::Name, text)
    }

    pub fn comma(&mut self) -> &mut Self {
        self.push(FragmentKind::Comma, ", ")
    }

    pub fn misc(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(FragmentKind::Misc, text)
    }

    pub fn end_declaration(&mut self) -> &mut Self {
        self.push(FragmentKind::EndOfDeclaration, "")
    }

    /// `[a, b, c]` with items sorted; nothing at all for an empty list
    pub fn sorted_list<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut items: Vec<String> = items.into_iter().collect();
        if items.is_empty() {
            return self;
        }
        items.sort();

        self.misc("[");
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.misc(item);
        }
        self.misc("]")
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn finish(self) -> Vec<Fragment> {
        self.fragments
    }

    fn push(&mut self, kind: FragmentKind, text: impl Into<String>) -> &mut Self {
        self.fragments.push(Fragment::new(kind, text));
        self
    }
}

/// Concatenate fragment texts
pub fn render(fragments: &[Fragment]) -> String {
    fragments.iter().map(|f| f.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_list() {
        let mut builder = DescriptionBuilder::new();
        builder.name("iterable").sorted_list(vec!["str".to_string(), "int".to_string()]);
        let fragments = builder.finish();

        let kinds: Vec<_> = fragments.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FragmentKind::Name,
                FragmentKind::Misc,
                FragmentKind::Misc,
                FragmentKind::Comma,
                FragmentKind::Misc,
                FragmentKind::Misc,
            ]
        );
        assert_eq!(render(&fragments), "iterable[int, str]");
    }

    #[test]
    fn test_empty_list_emits_nothing() {
        let mut builder = DescriptionBuilder::new();
        builder.sorted_list(Vec::new());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_fragment_json_shape() {
        let fragment = Fragment::new(FragmentKind::EndOfDeclaration, "");
        let json = serde_json::to_string(&fragment).unwrap();
        assert_eq!(json, r#"{"kind":"EndOfDeclaration","text":""}"#);
    }
}
