use alloy_rlp::Encodable;

/// Encodes a typed transaction payload prefixed with its type identifier.
pub fn enveloped<T: Encodable>(id: u8, v: &T, out: &mut dyn alloy_rlp::BufMut) {
    out.put_u8(id);
    v.encode(out);
}
