use super::config;
use super::models::{IndexSnapshot, OptionData, OptionDetail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Ratio and difference of open-interest change, per band width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandAggregates {
    pub ratios: BTreeMap<u32, f64>,
    pub differences: BTreeMap<u32, f64>,
}

/// Strikes with the highest put (support) and call (resistance) open
/// interest, strongest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportResistance {
    pub support: [Option<f64>; 3],
    pub resistance: [Option<f64>; 3],
}

// -----------------------------------------------
// STRIKE BAND FILTER
// -----------------------------------------------

/// For each band width, the strikes of `expiry` within
/// `price ± width * step` (inclusive). Bands overlap: band 5 holds every
/// strike of band 2.
pub fn filter_strike_bands<'a>(
    data: &'a [OptionData],
    current_price: f64,
    bands: &[u32],
    step: f64,
    expiry: &str,
) -> BTreeMap<u32, Vec<&'a OptionData>> {
    bands
        .iter()
        .map(|&band| {
            let radius = f64::from(band) * step;
            let low = current_price - radius;
            let high = current_price + radius;

            let selected = data
                .iter()
                .filter(|opt| opt.expiry_date == expiry)
                .filter(|opt| opt.strike_price >= low && opt.strike_price <= high)
                .collect();

            (band, selected)
        })
        .collect()
}

// -----------------------------------------------
// PCR / DIFFERENCE
// -----------------------------------------------

/// Put sum over call sum, 0 when there is no call-side change
pub fn put_call_ratio(put_sum: f64, call_sum: f64) -> f64 {
    if call_sum == 0.0 {
        0.0
    } else {
        put_sum / call_sum
    }
}

/// Sum of change in OI over the (call, put) sides present in `data`
pub fn sum_oi_change(data: &[&OptionData]) -> (f64, f64) {
    let call_sum: f64 = data
        .iter()
        .filter_map(|opt| opt.call.as_ref())
        .map(|ce| ce.change_in_oi)
        .sum();

    let put_sum: f64 = data
        .iter()
        .filter_map(|opt| opt.put.as_ref())
        .map(|pe| pe.change_in_oi)
        .sum();

    (call_sum, put_sum)
}

pub fn aggregate_bands(filtered: &BTreeMap<u32, Vec<&OptionData>>) -> BandAggregates {
    let mut aggregates = BandAggregates::default();

    for (&band, data) in filtered {
        let (call_sum, put_sum) = sum_oi_change(data);
        aggregates.ratios.insert(band, put_call_ratio(put_sum, call_sum));
        aggregates.differences.insert(band, put_sum - call_sum);
    }

    aggregates
}

// -----------------------------------------------
// SUPPORT / RESISTANCE
// -----------------------------------------------

/// Top three strikes by open interest on each side of the whole chain
/// (every expiry, no band restriction)
pub fn support_resistance(data: &[OptionData]) -> SupportResistance {
    SupportResistance {
        support: top_three_by_oi(data, |opt| opt.put.as_ref()),
        resistance: top_three_by_oi(data, |opt| opt.call.as_ref()),
    }
}

fn top_three_by_oi<F>(data: &[OptionData], side: F) -> [Option<f64>; 3]
where
    F: Fn(&OptionData) -> Option<&OptionDetail>,
{
    let mut ranked: Vec<(f64, f64)> = data
        .iter()
        .filter_map(|opt| side(opt).map(|detail| (detail.open_interest, opt.strike_price)))
        .collect();

    // stable, so equal OI keeps chain order
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut levels = [None; 3];
    for (slot, (_, strike)) in levels.iter_mut().zip(ranked) {
        *slot = Some(strike);
    }
    levels
}

// -----------------------------------------------
// VWAP
// -----------------------------------------------

/// Traded value over traded volume; `None` for zero volume
pub fn vwap(traded_value: f64, traded_volume: f64) -> Option<f64> {
    if traded_volume == 0.0 {
        return None;
    }
    let result = traded_value / traded_volume;
    result.is_finite().then_some(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VwapMode {
    /// `initial_vwap - current_vwap + reference_price`, anchored on the
    /// startup snapshot
    Running,
    /// Plain traded value / traded volume of the current snapshot
    Session,
}

impl FromStr for VwapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(VwapMode::Running),
            "session" => Ok(VwapMode::Session),
            other => Err(format!("unknown VWAP mode '{}' (use running or session)", other)),
        }
    }
}

/// Composes the reported VWAP across iterations
#[derive(Debug, Clone)]
pub struct VwapTracker {
    mode: VwapMode,
    reference_price: f64,
    initial_vwap: Option<f64>,
}

impl VwapTracker {
    /// Anchors on the snapshot taken before the poll loop starts
    pub fn new(mode: VwapMode, startup: &IndexSnapshot) -> Self {
        Self {
            mode,
            reference_price: startup.last_price,
            initial_vwap: vwap(startup.traded_value, startup.traded_volume),
        }
    }

    pub fn next(&self, snapshot: &IndexSnapshot) -> Option<f64> {
        let current = vwap(snapshot.traded_value, snapshot.traded_volume)?;

        match self.mode {
            VwapMode::Session => Some(current),
            VwapMode::Running => {
                let initial = self.initial_vwap?;
                Some(initial - current + self.reference_price)
            }
        }
    }
}

// -----------------------------------------------
// EXPIRY SELECTION
// -----------------------------------------------

/// Nearest expiry still tradable at `now`: today's expiry counts until
/// market close, past dates never do. `expiry_dates` must be sorted.
pub fn nearest_expiry(expiry_dates: &[String], now: NaiveDateTime) -> Option<&String> {
    let today = now.date();
    let cutoff = NaiveTime::from_hms_opt(15, 30, 0)?;

    expiry_dates.iter().find(|s| {
        match NaiveDate::parse_from_str(s.as_str(), config::EXPIRY_DATE_FORMAT) {
            Ok(date) if date > today => true,
            Ok(date) if date == today => now.time() < cutoff,
            _ => false,
        }
    })
}
