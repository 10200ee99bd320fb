/// CSV export of the daily consumption series.
pub mod export;
