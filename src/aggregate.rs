//! Aggregator: per-zip grouping, cheapest station selection and the price
//! range of a fetch round.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::{PriceRange, StationRecord, ZipSummary};

/// Groups records by their zip code, keeping input order within each zip.
pub fn group_by_zip(records: Vec<StationRecord>) -> BTreeMap<String, Vec<StationRecord>> {
    let mut groups: BTreeMap<String, Vec<StationRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.zip.clone()).or_default().push(record);
    }
    groups
}

/// Price order, with equal prices broken by the lower station id.
fn by_price_then_id(a: &StationRecord, b: &StationRecord) -> Ordering {
    a.price.total_cmp(&b.price).then_with(|| a.id.cmp(&b.id))
}

/// Returns the lowest-priced record. Ties go to the lowest station id.
pub fn cheapest_station(records: &[StationRecord]) -> Option<&StationRecord> {
    records.iter().min_by(|a, b| by_price_then_id(a, b))
}

/// One summary per zip with at least one record, sorted ascending by price
/// (ties by zip code).
pub fn summarize(groups: &BTreeMap<String, Vec<StationRecord>>) -> Vec<ZipSummary> {
    let mut summaries: Vec<ZipSummary> = groups
        .iter()
        .filter_map(|(zip, records)| {
            let cheapest = cheapest_station(records)?;
            Some(ZipSummary {
                zip: zip.clone(),
                price: cheapest.price,
                cheapest: cheapest.clone(),
            })
        })
        .collect();

    summaries.sort_by(|a, b| a.price.total_cmp(&b.price).then_with(|| a.zip.cmp(&b.zip)));
    summaries
}

/// Lowest and highest cheapest-price across `summaries`.
pub fn price_range(summaries: &[ZipSummary]) -> Option<PriceRange> {
    let first = summaries.first()?.price;
    let range = summaries.iter().fold(
        PriceRange {
            min: first,
            max: first,
        },
        |range, s| PriceRange {
            min: range.min.min(s.price),
            max: range.max.max(s.price),
        },
    );
    Some(range)
}

/// Zip code to cheapest price, the input of the color gradient.
pub fn cheapest_prices(summaries: &[ZipSummary]) -> BTreeMap<String, f64> {
    summaries.iter().map(|s| (s.zip.clone(), s.price)).collect()
}
