//! Flatten a chart bundle into output records.

use crate::model::{AuctionRecord, AuctionRequest, AuctionType, ChartSlot, RawChartBundle, RecordBatch};

/// One record per (phase, slot, index), opening before closing and slots in
/// chart order. Absent slots contribute nothing; values are not validated
/// and repeated time points are kept.
pub fn normalize(request: &AuctionRequest, bundle: &RawChartBundle) -> RecordBatch {
    let date = request.date_param();
    let mut records = Vec::with_capacity(bundle.point_count());

    for auction in AuctionType::ALL {
        let Some(phase) = bundle.phase(auction) else {
            continue;
        };
        for slot in ChartSlot::ALL {
            let Some(series) = phase.slot(slot) else {
                continue;
            };
            let metric = slot.metric();
            records.extend(series.times.iter().zip(&series.values).map(|(time, point)| {
                AuctionRecord {
                    symbol: request.symbol.clone(),
                    date: date.clone(),
                    auction_type: auction,
                    metric,
                    time: time.clone(),
                    value: point.y,
                    label: point.label.clone(),
                }
            }));
        }
    }

    records
}
