use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A block number or the `latest` tag.
///
/// Serializes as a hexadecimal quantity or `"latest"`. Deserialization also
/// accepts plain integers, where `-1` denotes the latest block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSpec {
    /// A concrete block number
    Number(u64),
    /// The latest block
    Latest,
}

impl BlockSpec {
    /// Resolves the block spec to a concrete block number, given the number
    /// of the latest block.
    pub fn resolve(&self, latest_block_number: u64) -> u64 {
        match self {
            BlockSpec::Number(number) => *number,
            BlockSpec::Latest => latest_block_number,
        }
    }
}

impl From<u64> for BlockSpec {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl Serialize for BlockSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockSpec::Number(number) => serializer.serialize_str(&format!("{number:#x}")),
            BlockSpec::Latest => serializer.serialize_str("latest"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBlockSpec {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for BlockSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawBlockSpec::deserialize(deserializer)? {
            RawBlockSpec::Unsigned(number) => Ok(BlockSpec::Number(number)),
            RawBlockSpec::Signed(-1) => Ok(BlockSpec::Latest),
            RawBlockSpec::Signed(number) => Err(de::Error::custom(format!(
                "invalid block number: {number}"
            ))),
            RawBlockSpec::Text(text) if text == "latest" => Ok(BlockSpec::Latest),
            RawBlockSpec::Text(text) => text
                .strip_prefix("0x")
                .and_then(|digits| u64::from_str_radix(digits, 16).ok())
                .map(BlockSpec::Number)
                .ok_or_else(|| de::Error::custom(format!("invalid block spec: {text}"))),
        }
    }
}
