//! Wall-clock codec for `SystemTime`.
//!
//! Layout: one version byte followed by the generic binary encoding of
//! `(secs, nanos)` relative to the UNIX epoch. `secs` is the floor of the offset, so
//! instants before the epoch carry a negative `secs` and a non-negative `nanos`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dynpack_common::{Result, binary, error::Error, verify_data};
use serde::{Deserialize, Serialize};

const TIME_FORMAT_V1: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct EpochOffset {
    secs: i64,
    nanos: u32,
}

impl EpochOffset {
    fn of(time: SystemTime) -> Result<EpochOffset> {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Ok(EpochOffset {
                secs: i64::try_from(after.as_secs())
                    .map_err(|_| Error::invalid_arg("time", "too far after the epoch"))?,
                nanos: after.subsec_nanos(),
            }),
            Err(e) => {
                let before = e.duration();
                let secs = i64::try_from(before.as_secs())
                    .map_err(|_| Error::invalid_arg("time", "too far before the epoch"))?;
                if before.subsec_nanos() == 0 {
                    Ok(EpochOffset {
                        secs: -secs,
                        nanos: 0,
                    })
                } else {
                    Ok(EpochOffset {
                        secs: -secs - 1,
                        nanos: 1_000_000_000 - before.subsec_nanos(),
                    })
                }
            }
        }
    }

    fn to_system_time(self) -> Result<SystemTime> {
        verify_data!(nanos, self.nanos < 1_000_000_000);
        let time = if self.secs >= 0 {
            UNIX_EPOCH.checked_add(Duration::new(self.secs.unsigned_abs(), self.nanos))
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_secs(self.secs.unsigned_abs()))
                .and_then(|t| t.checked_add(Duration::from_nanos(self.nanos.into())))
        };
        time.ok_or_else(|| Error::invalid_format("time", "out of range for SystemTime"))
    }
}

pub fn encode(time: SystemTime) -> Result<Vec<u8>> {
    let body = binary::to_vec(&EpochOffset::of(time)?)?;
    let mut buf = Vec::with_capacity(body.len() + 1);
    buf.push(TIME_FORMAT_V1);
    buf.extend_from_slice(&body);
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<SystemTime> {
    let Some((&version, body)) = bytes.split_first() else {
        return Err(Error::invalid_format("time", "empty"));
    };
    if version != TIME_FORMAT_V1 {
        return Err(Error::unsupported_version("time format", version.into()));
    }
    binary::from_slice::<EpochOffset>(body)?.to_system_time()
}
