use std::fmt;

/// Formats a sequence of items as `{ a, b, c }` for logging and test output.
///
/// Obtained from [`DenseStore::dump()`][crate::DenseStore::dump] or
/// [`SlotMap::dump()`][crate::SlotMap::dump]. Formatting never modifies the underlying
/// collection. A name can be attached with [`named()`](Self::named), in which case the items are
/// preceded by a `name[len]:` header line.
///
/// # Examples
///
/// ```
/// use slot_map::DenseStore;
///
/// let mut store = DenseStore::new();
/// store.push(1_u8);
/// store.push(2_u8);
///
/// assert_eq!(store.dump().to_string(), "{ 1, 2 }");
/// assert_eq!(store.dump().named("bytes").to_string(), "bytes[2]:\n{ 1, 2 }");
/// ```
#[derive(Clone, Copy, Debug)]
#[must_use]
pub struct Dump<'a, T> {
    name: Option<&'a str>,
    items: &'a [T],
}

impl<'a, T> Dump<'a, T> {
    /// Creates a dump of the given items.
    #[inline]
    pub fn new(items: &'a [T]) -> Self {
        Self { name: None, items }
    }

    /// Attaches a name that is printed in a header line before the items.
    #[inline]
    pub fn named(self, name: &'a str) -> Self {
        Self {
            name: Some(name),
            ..self
        }
    }
}

impl<T: fmt::Debug> fmt::Display for Dump<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name {
            writeln!(f, "{name}[{}]:", self.items.len())?;
        }

        let Some((last, leading)) = self.items.split_last() else {
            return f.write_str("{ }");
        };

        f.write_str("{ ")?;

        for item in leading {
            write!(f, "{item:?}, ")?;
        }

        write!(f, "{last:?} }}")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence() {
        let items: [u32; 0] = [];

        assert_eq!(Dump::new(&items).to_string(), "{ }");
    }

    #[test]
    fn single_item() {
        assert_eq!(Dump::new(&[7_i32]).to_string(), "{ 7 }");
    }

    #[test]
    fn uses_debug_formatting_of_items() {
        assert_eq!(
            Dump::new(&[(1, 'a'), (2, 'b')]).to_string(),
            "{ (1, 'a'), (2, 'b') }"
        );
    }

    #[test]
    fn named_has_header_line() {
        assert_eq!(
            Dump::new(&[0.5_f32, 1.5]).named("weights").to_string(),
            "weights[2]:\n{ 0.5, 1.5 }"
        );
    }
}
