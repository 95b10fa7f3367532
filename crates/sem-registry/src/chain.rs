//! Superclass-chain traversal over qualified class terms
//!
//! A qualified class term nests its superclasses as suffixes:
//! `"Apple_ Banana_ Orange"` has superclasses `"Banana_ Orange"` and
//! `"Orange"`. Each step strips one `"<qualifier>_ "` prefix.

/// Iterator over the superclass terms of a qualified class term.
#[derive(Debug, Clone)]
pub struct SuperclassChain {
    term: String,
    emit_self: bool,
}

impl Iterator for SuperclassChain {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.emit_self {
            self.emit_self = false;
            return Some(self.term.clone());
        }
        let idx = self.term.find('_')?;
        if idx + 2 > self.term.len() {
            return None;
        }
        self.term = self.term[idx + 2..].to_string();
        Some(self.term.clone())
    }
}

/// Walk the superclass chain of `class_term`, optionally starting with
/// the term itself.
pub fn superclass_chain(class_term: &str, include_self: bool) -> SuperclassChain {
    SuperclassChain {
        term: class_term.to_string(),
        emit_self: include_self,
    }
}
