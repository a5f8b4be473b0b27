//! Property path tokenizer.
//!
//! Splits `order.items[0].name` into its head segment and the remaining path:
//!
//! | path                    | name    | index | indexed_name | children       |
//! |-------------------------|---------|-------|--------------|----------------|
//! | `order.items[0].name`   | `order` |       | `order`      | `items[0].name`|
//! | `items[0].name`         | `items` | `0`   | `items[0]`   | `name`         |
//! | `name`                  | `name`  |       | `name`       |                |

/// The head segment of a dotted, optionally indexed property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTokenizer<'a> {
    name: &'a str,
    indexed_name: &'a str,
    index: Option<&'a str>,
    children: Option<&'a str>,
}

impl<'a> PropertyTokenizer<'a> {
    /// Split `fullname` at its first `.`
    #[must_use]
    pub fn new(fullname: &'a str) -> Self {
        let (indexed_name, children) = match fullname.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (fullname, None),
        };

        let (name, index) = match indexed_name.split_once('[') {
            Some((name, rest)) => (name, Some(rest.strip_suffix(']').unwrap_or(rest))),
            None => (indexed_name, None),
        };

        PropertyTokenizer {
            name,
            indexed_name,
            index,
            children,
        }
    }

    /// Segment name without index
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Segment name including the `[index]` suffix, if any
    #[must_use]
    pub fn indexed_name(&self) -> &'a str {
        self.indexed_name
    }

    /// The text between the brackets
    #[must_use]
    pub fn index(&self) -> Option<&'a str> {
        self.index
    }

    /// The path after the first `.`
    #[must_use]
    pub fn children(&self) -> Option<&'a str> {
        self.children
    }

    /// Returns `true` if there is a path after this segment
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.children.is_some()
    }

    /// Tokenize the remaining path
    #[must_use]
    pub fn next_child(&self) -> Option<PropertyTokenizer<'a>> {
        self.children.map(PropertyTokenizer::new)
    }
}
