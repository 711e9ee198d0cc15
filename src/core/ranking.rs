use crate::models::PricedLocation;
use std::cmp::Ordering;

/// Ordering applied to priced rows before display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    /// Keep the working set order (remote, custom, dataset)
    #[default]
    Input,
    /// Highest net pay first, ties broken by distance
    NetPay,
    /// Closest first
    Distance,
}

/// Sort rows in place. The sort is stable, so equal rows keep their order.
pub fn rank(rows: &mut [PricedLocation], key: SortKey) {
    match key {
        SortKey::Input => {}
        SortKey::NetPay => rows.sort_by(|a, b| {
            b.breakdown
                .net_pay_annual
                .partial_cmp(&a.breakdown.net_pay_annual)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    a.distance_miles
                        .partial_cmp(&b.distance_miles)
                        .unwrap_or(Ordering::Equal)
                })
        }),
        SortKey::Distance => rows.sort_by(|a, b| {
            a.distance_miles
                .partial_cmp(&b.distance_miles)
                .unwrap_or(Ordering::Equal)
        }),
    }
}
