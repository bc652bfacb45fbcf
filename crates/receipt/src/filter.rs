use devchain_primitives::{Address, B256, Bloom, BloomInput, HashSet};

use crate::log::{FilterLog, Log};

/// Topic filter with one entry per position. `None` matches any topic at
/// that position; `Some` matches any of the listed topics.
pub type TopicsFilter = [Option<Vec<B256>>];

/// Converts user-provided topic alternatives into the form used for matching.
///
/// A position that is `null`, an empty list, or a list containing `null`
/// becomes a wildcard. Trailing wildcards are kept as they still require the
/// log to have a topic at that position.
pub fn normalize_topics(topics: Vec<Option<Vec<Option<B256>>>>) -> Vec<Option<Vec<B256>>> {
    topics
        .into_iter()
        .map(|alternatives| {
            let alternatives = alternatives?;
            if alternatives.is_empty() {
                return None;
            }

            alternatives.into_iter().collect::<Option<Vec<_>>>()
        })
        .collect()
}

/// Accrues the bloom filter of the provided logs.
pub fn logs_to_bloom<'log>(logs: impl IntoIterator<Item = &'log Log>) -> Bloom {
    let mut bloom = Bloom::ZERO;
    for log in logs {
        bloom.accrue(BloomInput::Raw(log.address.as_slice()));
        for topic in &log.topics {
            bloom.accrue(BloomInput::Raw(topic.as_slice()));
        }
    }
    bloom
}

/// Checks whether a block with the given bloom could contain a log matching
/// the filter. A `false` result is definitive; a `true` result may be a false
/// positive.
pub fn bloom_filter(bloom: &Bloom, addresses: &HashSet<Address>, topics: &TopicsFilter) -> bool {
    let address_match = addresses.is_empty()
        || addresses
            .iter()
            .any(|address| bloom.contains_input(BloomInput::Raw(address.as_slice())));

    address_match
        && topics.iter().all(|alternatives| {
            alternatives.as_ref().is_none_or(|alternatives| {
                alternatives
                    .iter()
                    .any(|topic| bloom.contains_input(BloomInput::Raw(topic.as_slice())))
            })
        })
}

/// Whether the log's address passes the address filter.
pub fn matches_address_filter(address: &Address, addresses: &HashSet<Address>) -> bool {
    addresses.is_empty() || addresses.contains(address)
}

/// Whether the log's topics pass the topic filter.
pub fn matches_topics_filter(log_topics: &[B256], topics_filter: &TopicsFilter) -> bool {
    if topics_filter.len() > log_topics.len() {
        return false;
    }

    topics_filter
        .iter()
        .zip(log_topics.iter())
        .all(|(alternatives, log_topic)| {
            alternatives
                .as_ref()
                .is_none_or(|alternatives| alternatives.contains(log_topic))
        })
}

/// Returns the logs within `[from_block, to_block]` that match the address
/// and topic filters, in the order they were provided.
pub fn filter_logs<'log>(
    logs: impl IntoIterator<Item = &'log FilterLog>,
    from_block: u64,
    to_block: u64,
    addresses: &HashSet<Address>,
    topics: &TopicsFilter,
) -> Vec<FilterLog> {
    logs.into_iter()
        .filter(|log| {
            from_block <= log.block_number
                && log.block_number <= to_block
                && matches_address_filter(&log.address, addresses)
                && matches_topics_filter(log.topics(), topics)
        })
        .cloned()
        .collect()
}
