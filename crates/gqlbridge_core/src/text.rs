//! String interning for GraphQL names.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// An interned name identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Text(u32);

impl Text {
    /// Creates a new text from a raw index.
    #[must_use]
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

/// Names that show up in almost every document.
const PRELUDE: &[&str] = &[
    "Int",
    "Float",
    "String",
    "Boolean",
    "ID",
    "Query",
    "Mutation",
    "Subscription",
    "__typename",
    "skip",
    "include",
    "deprecated",
    "if",
    "reason",
];

/// A string interner that deduplicates names.
///
/// One interner lives as long as the documents parsed with it; it is
/// single-threaded by construction.
#[derive(Debug)]
pub struct Interner {
    map: RefCell<FxHashMap<String, Text>>,
    strings: RefCell<Vec<String>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates a new interner with common names pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let interner = Self {
            map: RefCell::new(FxHashMap::default()),
            strings: RefCell::new(Vec::with_capacity(64)),
        };
        for name in PRELUDE {
            interner.intern(name);
        }
        interner
    }

    /// Interns a string, returning its identifier.
    pub fn intern(&self, s: &str) -> Text {
        let mut map = self.map.borrow_mut();
        if let Some(&id) = map.get(s) {
            return id;
        }

        let mut strings = self.strings.borrow_mut();
        let id = Text(strings.len() as u32);
        strings.push(s.to_string());
        map.insert(s.to_string(), id);
        id
    }

    /// Returns the identifier of an already interned string.
    #[must_use]
    pub fn lookup(&self, s: &str) -> Option<Text> {
        self.map.borrow().get(s).copied()
    }

    /// Gets the string for an identifier.
    #[must_use]
    pub fn get(&self, id: Text) -> String {
        self.strings
            .borrow()
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns true if `id` names exactly `s`.
    #[must_use]
    pub fn is(&self, id: Text, s: &str) -> bool {
        self.strings
            .borrow()
            .get(id.0 as usize)
            .is_some_and(|stored| stored == s)
    }

    /// Returns the number of interned strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    /// Returns true if no strings are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern() {
        let interner = Interner::new();
        let id1 = interner.intern("hello");
        let id2 = interner.intern("hello");
        let id3 = interner.intern("world");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_get_and_is() {
        let interner = Interner::new();
        let id = interner.intern("user");
        assert_eq!(interner.get(id), "user");
        assert!(interner.is(id, "user"));
        assert!(!interner.is(id, "users"));
    }

    #[test]
    fn test_prelude_is_preregistered() {
        let interner = Interner::new();
        assert_eq!(interner.len(), PRELUDE.len());
        assert!(interner.lookup("__typename").is_some());
        assert!(interner.lookup("hello").is_none());
    }
}
