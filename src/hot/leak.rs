use std::ops::Deref;

/// A value that is intentionally never freed.
///
/// Superseded modules are kept mapped for the rest of the process: there is
/// no point at which the host can prove nothing still refers to their code
/// or static data. Wrapping the library handle in `Leaked` makes that
/// decision visible in the types instead of relying on a forgotten `drop`.
pub struct Leaked<T: 'static>(&'static T);

impl<T: 'static> Leaked<T> {
    pub fn new(value: T) -> Self {
        Self(Box::leak(Box::new(value)))
    }
}

impl<T: 'static> Deref for Leaked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.0
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Leaked<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Leaked").field(self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_leaked_value_is_never_dropped() {
        let tracker = Arc::new(());
        let leaked = Leaked::new(Arc::clone(&tracker));
        drop(leaked);
        assert_eq!(Arc::strong_count(&tracker), 2);
    }
}
