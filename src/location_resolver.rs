//! Location Resolution Module
//!
//! Turns a loosely typed Taiwanese place name ("台北", "新竹縣竹北", "板橋")
//! into a single CWA observation station.

use crate::models::StationRecord;
use tracing::debug;

/// County and city names in match priority order.
///
/// The first entry contained in the input wins, so the order here is
/// part of the matching behavior.
pub static COUNTIES: [&str; 22] = [
    "臺北市", "新北市", "桃園市", "臺中市", "臺南市", "高雄市", "基隆市", "新竹市",
    "嘉義市", "新竹縣", "苗栗縣", "彰化縣", "南投縣", "雲林縣", "嘉義縣", "屏東縣",
    "宜蘭縣", "花蓮縣", "臺東縣", "澎湖縣", "金門縣", "連江縣",
];

/// One of the 22 known county names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountyHint(&'static str);

impl CountyHint {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Normalized user query split into a county hint and a locality keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery {
    pub county: Option<CountyHint>,
    pub keyword: String,
}

/// How a station was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Station name or town matched the keyword
    Exact,
    /// First station of the hinted county, no locality match
    Nearby,
}

/// A selected station together with how it was found
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationMatch<'a> {
    pub station: &'a StationRecord,
    pub kind: MatchKind,
}

/// Trim the input and replace the variant 台 with the 臺 used by CWA records
#[must_use]
pub fn normalize_input(raw: &str) -> String {
    raw.trim().replace('台', "臺")
}

/// Split normalized input into a county hint and the remaining keyword.
///
/// The county is removed once. When nothing is left after removal the
/// keyword falls back to the full input, so "臺北市" still matches on
/// the county name itself. A bare county stem such as "臺北" or "花蓮" is
/// read as the full county name.
#[must_use]
pub fn extract_county(normalized: &str) -> PlaceQuery {
    if let Some(county) = COUNTIES.into_iter().find(|c| county_stem(c) == normalized) {
        return PlaceQuery {
            county: Some(CountyHint(county)),
            keyword: county.to_string(),
        };
    }

    for county in COUNTIES {
        if normalized.contains(county) {
            let residual = normalized.replacen(county, "", 1);
            // Trimmed so "臺北市 大安區" keys on "大安區" and can match the town exactly
            let residual = residual.trim();
            let keyword = if residual.is_empty() {
                normalized.to_string()
            } else {
                residual.to_string()
            };
            return PlaceQuery {
                county: Some(CountyHint(county)),
                keyword,
            };
        }
    }

    PlaceQuery {
        county: None,
        keyword: normalized.to_string(),
    }
}

fn county_stem(county: &str) -> &str {
    county
        .strip_suffix('市')
        .or_else(|| county.strip_suffix('縣'))
        .unwrap_or(county)
}

/// Normalize raw text and extract the county hint in one step
#[must_use]
pub fn parse_place(raw: &str) -> PlaceQuery {
    extract_county(&normalize_input(raw))
}

/// Pick the best station for a query.
///
/// Stations are scanned in order. A station whose name or town matches the
/// keyword becomes the best candidate, and an exact town or name match ends
/// the scan. With a county hint, stations outside that county are skipped and
/// the first station of the county is kept as a backup.
#[must_use]
pub fn resolve_station<'a>(
    query: &PlaceQuery,
    stations: &'a [StationRecord],
) -> Option<StationMatch<'a>> {
    let keyword = query.keyword.as_str();
    let mut best: Option<&StationRecord> = None;
    let mut backup: Option<&StationRecord> = None;

    for station in stations {
        if let Some(hint) = query.county {
            if backup.is_none() && station.county == hint.as_str() {
                backup = Some(station);
            }
            if !station.county.contains(hint.as_str()) {
                continue;
            }
        }

        if station.name.contains(keyword)
            || station.town.contains(keyword)
            || keyword.contains(station.name.as_str())
        {
            best = Some(station);
            if keyword == station.town || keyword == station.name {
                break;
            }
        }
    }

    let found = match (best, backup) {
        (Some(station), _) => Some(StationMatch {
            station,
            kind: MatchKind::Exact,
        }),
        (None, Some(station)) => Some(StationMatch {
            station,
            kind: MatchKind::Nearby,
        }),
        (None, None) => None,
    };

    match &found {
        Some(m) => debug!(
            "Resolved '{}' to station {} ({} {}, {:?})",
            keyword, m.station.name, m.station.county, m.station.town, m.kind
        ),
        None => debug!(
            "No station matches keyword '{}' (county hint {:?})",
            keyword,
            query.county.map(|c| c.as_str())
        ),
    }

    found
}
