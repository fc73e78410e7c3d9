//! Remote object handles.
//!
//! A handle refers to a resource that lives only in the driver process; it
//! carries identity, never a value. The codec moves handle descriptors in
//! and out of [`SerializedArgument`](pwire_protocol::SerializedArgument)
//! envelopes; dereferencing a handle into a live object is the job of the
//! connection layer, not the codec.

use pwire_protocol::HandleChannel;
use std::sync::Arc;

/// Opaque descriptor of a remote-resident object.
///
/// Cheap to clone; identity is the guid, not the allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRef {
    guid: Arc<str>,
}

impl RemoteRef {
    /// Creates a descriptor for the given remote guid.
    pub fn new(guid: impl Into<Arc<str>>) -> Self {
        Self { guid: guid.into() }
    }

    /// Returns the remote object's guid.
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Converts to the wire channel shape carried in argument envelopes.
    pub fn to_channel(&self) -> HandleChannel {
        HandleChannel {
            guid: self.guid.to_string(),
        }
    }
}

impl From<&HandleChannel> for RemoteRef {
    fn from(channel: &HandleChannel) -> Self {
        RemoteRef::new(channel.guid.as_str())
    }
}

/// The remote-resource collaborator seam.
///
/// Protocol objects that live in the driver process (element handles,
/// JS handles) implement this to be passed by reference through the codec.
pub trait RemoteObject {
    /// Returns the unique guid of the remote object.
    fn guid(&self) -> &str;

    /// Returns the handle descriptor for this object.
    fn remote_ref(&self) -> RemoteRef {
        RemoteRef::new(self.guid())
    }
}

impl RemoteObject for RemoteRef {
    fn guid(&self) -> &str {
        RemoteRef::guid(self)
    }

    fn remote_ref(&self) -> RemoteRef {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_the_guid() {
        let a = RemoteRef::new("element@1a2b");
        let b = RemoteRef::new("element@1a2b".to_string());
        assert_eq!(a, b);
        assert_ne!(a, RemoteRef::new("element@ffff"));
    }

    #[test]
    fn channel_round_trip() {
        let handle = RemoteRef::new("js-handle@77");
        let channel = handle.to_channel();
        assert_eq!(channel.guid, "js-handle@77");
        assert_eq!(RemoteRef::from(&channel), handle);
    }
}
