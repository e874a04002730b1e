// ABOUTME: Phantom-typed identifiers for compile-time type safety.
// ABOUTME: Keeps container, image and inventory record IDs from being swapped.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
pub enum ContainerMarker {}
pub enum ImageMarker {}
pub enum RecordMarker {}

/// A type-safe identifier that prevents accidental mixing of different ID types.
///
/// ```compile_fail
/// use dockscout::types::{ContainerId, ImageId};
///
/// fn takes_container_id(_id: ContainerId) {}
///
/// takes_container_id(ImageId::new("sha256:abc"));
/// ```
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

// T is only a marker, so these impls must not require anything of it.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type ContainerId = Id<ContainerMarker>;
pub type ImageId = Id<ImageMarker>;
/// Composite key of an inventory record: `repo-key|tag|digest|stack|service`.
pub type RecordId = Id<RecordMarker>;

impl RecordId {
    /// Compose the stable record key. Absent parts become empty placeholders.
    pub fn compose(
        repo_key: &str,
        tag: Option<&str>,
        digest: Option<&str>,
        stack: Option<&str>,
        service: Option<&str>,
    ) -> Self {
        let parts = [
            repo_key,
            tag.unwrap_or(""),
            digest.unwrap_or(""),
            stack.unwrap_or(""),
            service.unwrap_or(""),
        ];
        Self::new(parts.join("|"))
    }
}
