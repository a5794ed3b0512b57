use bytes::{Buf, Bytes};
use log::debug;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::BmpParserError;
use crate::parser::utils::ReadUtils;

/// BMP statistics report, RFC 7854 §4.8.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsReport {
    /// Number of stat records declared on the wire, including any that were
    /// skipped as unrecognized.
    pub stats_count: u32,
    pub counters: Vec<StatCounter>,
}

/// Statistics type codes.
///
/// <https://www.iana.org/assignments/bmp-parameters/bmp-parameters.xhtml#statistics-types>
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum StatType {
    PrefixesRejected = 0,
    DuplicatePrefixes = 1,
    DuplicateWithdraws = 2,
    InvalidClusterList = 3,
    InvalidAsPath = 4,
    InvalidOriginatorId = 5,
    InvalidAsConfed = 6,
    AdjRibInRoutes = 7,
    LocRibRoutes = 8,
    UpdatesAsWithdraw = 11,
    PrefixesAsWithdraw = 12,
    DuplicateUpdates = 13,
}

impl StatType {
    /// 64-bit gauge types; all other recognized types are 32-bit counters.
    fn is_gauge(&self) -> bool {
        matches!(self, StatType::AdjRibInRoutes | StatType::LocRibRoutes)
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatCounter {
    pub stat_type: StatType,
    pub stat_len: u16,
    pub stat_data: StatsData,
}

#[derive(Debug, PartialEq, Clone, Copy, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatsData {
    Counter(u32),
    Gauge(u64),
}

/// Parse a statistics report.
///
/// Unrecognized stat types are skipped over using their declared length
/// rather than rejected, so reports from exporters with newer counters still
/// decode.
pub fn parse_stats_report(data: &mut Bytes) -> Result<StatsReport, BmpParserError> {
    let stats_count = data.read_u32()?;
    let mut counters = vec![];

    for _ in 0..stats_count {
        let type_code = data.read_u16()?;
        let stat_len = data.read_u16()?;
        if data.remaining() < stat_len as usize {
            return Err(BmpParserError::Malformed(format!(
                "stat record length {} exceeds remaining {} bytes",
                stat_len,
                data.remaining()
            )));
        }
        let mut value = data.split_to(stat_len as usize);

        match StatType::try_from(type_code) {
            Ok(stat_type) => {
                let stat_data = match (stat_type.is_gauge(), stat_len) {
                    (false, 4) => StatsData::Counter(value.get_u32()),
                    (true, 8) => StatsData::Gauge(value.get_u64()),
                    _ => {
                        return Err(BmpParserError::Malformed(format!(
                            "invalid length {} for stat type {:?}",
                            stat_len, stat_type
                        )))
                    }
                };
                counters.push(StatCounter {
                    stat_type,
                    stat_len,
                    stat_data,
                });
            }
            Err(_) => {
                debug!("skipping unrecognized stat type {} ({} bytes)", type_code, stat_len);
            }
        }
    }

    Ok(StatsReport {
        stats_count,
        counters,
    })
}
