//! Per-architecture value container.

use std::ops::{Index, IndexMut};

use super::Architecture;

/// One value per [`Architecture`].
///
/// Every architecture always has an entry: construction either broadcasts a
/// single value or computes one per architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchMap<T> {
    values: [T; 4],
}

impl<T: Clone> ArchMap<T> {
    /// Broadcasts `value` to every architecture.
    pub fn new(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }

    /// Overwrites every architecture's entry with `value`.
    pub fn set_all(&mut self, value: T) {
        for slot in &mut self.values {
            *slot = value.clone();
        }
    }
}

impl<T> ArchMap<T> {
    /// Computes the entry for each architecture.
    pub fn from_fn(mut f: impl FnMut(Architecture) -> T) -> Self {
        Self {
            values: Architecture::ALL.map(&mut f),
        }
    }

    /// The entry for `arch`.
    pub fn get(&self, arch: Architecture) -> &T {
        &self.values[arch.index()]
    }

    /// Replaces the entry for `arch`, leaving the others untouched.
    pub fn set(&mut self, arch: Architecture, value: impl Into<T>) {
        self.values[arch.index()] = value.into();
    }

    /// The entry for the architecture of the running process.
    pub fn current(&self) -> &T {
        self.get(Architecture::current())
    }

    /// Entries in [`Architecture::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Architecture, &T)> {
        Architecture::ALL.into_iter().zip(self.values.iter())
    }
}

impl<T: Default> Default for ArchMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T: Clone> From<T> for ArchMap<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ArchMap<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl<T> Index<Architecture> for ArchMap<T> {
    type Output = T;

    fn index(&self, arch: Architecture) -> &T {
        self.get(arch)
    }
}

impl<T> IndexMut<Architecture> for ArchMap<T> {
    fn index_mut(&mut self, arch: Architecture) -> &mut T {
        &mut self.values[arch.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_fills_every_architecture() {
        let map = ArchMap::new("test".to_string());
        for arch in Architecture::ALL {
            assert_eq!(map.get(arch), "test");
        }
    }

    #[test]
    fn set_touches_one_architecture() {
        let mut map = ArchMap::new(5);
        map.set(Architecture::Arm, 3);
        assert_eq!(*map.get(Architecture::Arm), 3);
        assert_eq!(*map.get(Architecture::X86), 5);
        assert_eq!(*map.get(Architecture::X64), 5);
        assert_eq!(*map.get(Architecture::Arm64), 5);
    }

    #[test]
    fn index_assignment() {
        let mut map: ArchMap<String> = ArchMap::default();
        map[Architecture::X86] = "test1".into();
        map[Architecture::X64] = "test2".into();
        map[Architecture::Arm] = "test3".into();
        map[Architecture::Arm64] = "test4".into();
        assert_eq!(map[Architecture::X86], "test1");
        assert_eq!(map[Architecture::X64], "test2");
        assert_eq!(map[Architecture::Arm], "test3");
        assert_eq!(map[Architecture::Arm64], "test4");
    }

    #[test]
    fn set_all_overwrites() {
        let mut map = ArchMap::from_fn(|arch| arch.index());
        map.set_all(9);
        assert!(map.iter().all(|(_, v)| *v == 9));
    }

    #[test]
    fn conversions_round_trip_through_current() {
        let ints: ArchMap<i32> = 1.into();
        assert_eq!(*ints.current(), 1);
        let strings: ArchMap<String> = "lib".into();
        assert_eq!(strings.current(), "lib");
    }

    #[test]
    fn iter_follows_declaration_order() {
        let map = ArchMap::from_fn(|arch| arch.to_string());
        let archs: Vec<_> = map.iter().map(|(arch, _)| arch).collect();
        assert_eq!(archs, Architecture::ALL.to_vec());
    }
}
