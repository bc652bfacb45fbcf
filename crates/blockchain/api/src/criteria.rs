use devchain_block_api::BlockSpec;
use devchain_primitives::{Address, B256, HashSet};
use devchain_receipt::{filter::normalize_topics, log::FilterLog};
use serde::{Deserialize, Deserializer};

use crate::{BlockchainMetadata, GetBlockchainLogs};

/// Criteria for a log query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilterCriteria {
    /// The first block of the range (inclusive)
    pub from_block: Option<BlockSpec>,
    /// The last block of the range (inclusive)
    pub to_block: Option<BlockSpec>,
    /// Addresses of the contracts that emitted the logs. Empty matches any
    /// address.
    pub addresses: HashSet<Address>,
    /// Normalized topic alternatives per position. `None` matches any topic.
    pub topics: Vec<Option<Vec<B256>>>,
}

impl LogFilterCriteria {
    /// Resolves the block range, given the last block number. A missing bound
    /// denotes the latest block.
    pub fn block_range(&self, last_block_number: u64) -> (u64, u64) {
        let resolve =
            |spec: &Option<BlockSpec>| spec.unwrap_or(BlockSpec::Latest).resolve(last_block_number);

        (resolve(&self.from_block), resolve(&self.to_block))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressFilter {
    One(Address),
    Many(Vec<Address>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopicFilter {
    One(Option<B256>),
    Many(Vec<Option<B256>>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLogFilterCriteria {
    #[serde(default)]
    from_block: Option<BlockSpec>,
    #[serde(default)]
    to_block: Option<BlockSpec>,
    #[serde(default)]
    address: Option<AddressFilter>,
    #[serde(default)]
    topics: Option<Vec<Option<TopicFilter>>>,
}

impl<'de> Deserialize<'de> for LogFilterCriteria {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawLogFilterCriteria::deserialize(deserializer)?;

        let addresses = match raw.address {
            None => HashSet::default(),
            Some(AddressFilter::One(address)) => std::iter::once(address).collect(),
            Some(AddressFilter::Many(addresses)) => addresses.into_iter().collect(),
        };

        let topics = raw
            .topics
            .unwrap_or_default()
            .into_iter()
            .map(|topic| {
                topic.map(|topic| match topic {
                    TopicFilter::One(topic) => vec![topic],
                    TopicFilter::Many(topics) => topics,
                })
            })
            .collect();

        Ok(Self {
            from_block: raw.from_block,
            to_block: raw.to_block,
            addresses,
            topics: normalize_topics(topics),
        })
    }
}

/// Retrieves the logs that match the provided criteria, resolving `latest`
/// against the blockchain's last block number.
pub fn logs_by_criteria<BlockchainT: BlockchainMetadata + GetBlockchainLogs + ?Sized>(
    blockchain: &mut BlockchainT,
    criteria: &LogFilterCriteria,
) -> Result<Vec<FilterLog>, BlockchainT::Error> {
    let (from_block, to_block) = criteria.block_range(blockchain.last_block_number());

    blockchain.logs(from_block, to_block, &criteria.addresses, &criteria.topics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_latest_sentinel() -> Result<(), serde_json::Error> {
        let address = Address::with_last_byte(0xaa);
        let topic = B256::with_last_byte(0xbb);

        let criteria: LogFilterCriteria = serde_json::from_value(serde_json::json!({
            "fromBlock": 5,
            "toBlock": -1,
            "address": address,
            "topics": [null, [topic, null], [topic]],
        }))?;

        assert_eq!(criteria.from_block, Some(BlockSpec::Number(5)));
        assert_eq!(criteria.to_block, Some(BlockSpec::Latest));
        assert_eq!(
            criteria.addresses,
            std::iter::once(address).collect::<HashSet<_>>()
        );
        assert_eq!(criteria.topics, vec![None, None, Some(vec![topic])]);

        assert_eq!(criteria.block_range(42), (5, 42));

        Ok(())
    }

    #[test]
    fn missing_bounds_resolve_to_latest() -> Result<(), serde_json::Error> {
        let criteria: LogFilterCriteria = serde_json::from_str("{}")?;

        assert!(criteria.addresses.is_empty());
        assert!(criteria.topics.is_empty());
        assert_eq!(criteria.block_range(9), (9, 9));

        Ok(())
    }
}
