use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global string interner for document IDs: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

static COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_suffix() -> u64 {
    COUNTER.fetch_add(1, AtomicOrdering::Relaxed)
}

/// A lightweight, interned identifier for a component in the document.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(Spur);

impl ComponentId {
    /// Intern a new string as a ComponentId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        ComponentId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique ID with a kind prefix (e.g. `hero-1`, `biography-2`).
    pub fn generate(prefix: &str) -> Self {
        Self::intern(&format!("{prefix}-{}", next_suffix()))
    }
}

/// A lightweight, interned identifier for a layout section.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(Spur);

impl SectionId {
    /// Intern a new string as a SectionId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        SectionId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique section ID (e.g. `section-3`).
    pub fn generate() -> Self {
        Self::intern(&format!("section-{}", next_suffix()))
    }
}

// IDs key ordered maps and sorted output, so ordering compares the resolved
// strings rather than interner indices (which depend on intern order).
macro_rules! impl_id_traits {
    ($ty:ident) => {
        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> Ordering {
                self.as_str().cmp(other.as_str())
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($ty::intern(&s))
            }
        }
    };
}

impl_id_traits!(ComponentId);
impl_id_traits!(SectionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ComponentId::intern("hero-abc123");
        let b = ComponentId::intern("hero-abc123");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hero-abc123");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ComponentId::generate("hero");
        let b = ComponentId::generate("hero");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("hero-"));
    }

    #[test]
    fn section_ids_do_not_collide_with_component_interning() {
        let s = SectionId::generate();
        let c = ComponentId::intern(s.as_str());
        assert_eq!(s.as_str(), c.as_str());
    }

    #[test]
    fn ordering_follows_strings() {
        let a = ComponentId::intern("alpha");
        let z = ComponentId::intern("zulu");
        assert!(a < z);
    }

    #[test]
    fn serde_as_plain_string() {
        let id = ComponentId::intern("topics-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"topics-1\"");
        let back: ComponentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
