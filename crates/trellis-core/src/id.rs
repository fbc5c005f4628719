//! Component identifiers.

use slotmap::new_key_type;

new_key_type! {
    /// A stable handle naming a component in a component tree arena.
    ///
    /// A `ComponentId` stays valid while the component exists and becomes
    /// stale once it is destroyed. Stale ids are never reused for a
    /// different component, so lookups through them simply fail.
    pub struct ComponentId;
}

impl ComponentId {
    /// Convert the id to a raw u64 value for logging or interop.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_stale_ids_do_not_alias() {
        let mut map: SlotMap<ComponentId, ()> = SlotMap::with_key();
        let a = map.insert(());
        map.remove(a);
        let b = map.insert(());
        assert_ne!(a, b);
        assert_ne!(a.as_raw(), b.as_raw());
        assert!(!map.contains_key(a));
    }
}
