use std::fmt;

use crate::format::{ArchiveKind, CompressionKind};

/// One decoding step between a raw source and a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Compression(CompressionKind),
    Archive(ArchiveKind),
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compression(kind) => kind.as_str(),
            Self::Archive(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered layers traversed so far, outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerStack(Vec<Layer>);

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer) {
        self.0.push(layer);
    }

    pub fn pop(&mut self) -> Option<Layer> {
        self.0.pop()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.0.iter()
    }
}

impl fmt::Display for LayerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("raw");
        }
        for (i, layer) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{layer}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_display() {
        let mut stack = LayerStack::new();
        assert_eq!(stack.to_string(), "raw");

        stack.push(Layer::Compression(CompressionKind::Gzip));
        stack.push(Layer::Archive(ArchiveKind::Tar));
        assert_eq!(stack.to_string(), "gzip > tar");
        assert_eq!(stack.depth(), 2);

        stack.pop();
        assert_eq!(stack.to_string(), "gzip");
    }
}
