//! Helpers for serializing JSON-RPC request parameters.

use serde::{Serialize, Serializer, ser::SerializeSeq};

/// Serializes `()` into `[]`.
pub(crate) fn empty<SerializerT: Serializer, T>(
    _value: &T,
    serializer: SerializerT,
) -> Result<SerializerT::Ok, SerializerT::Error> {
    serializer.serialize_seq(Some(0))?.end()
}

/// Serializes a single value into a sequence of length one.
pub(crate) fn sequence<SerializerT: Serializer, T: Serialize>(
    value: &T,
    serializer: SerializerT,
) -> Result<SerializerT::Ok, SerializerT::Error> {
    let mut seq = serializer.serialize_seq(Some(1))?;
    seq.serialize_element(value)?;
    seq.end()
}
