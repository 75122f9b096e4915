//! Text formatting for times and deltas

use super::LapDelta;

/// Format a lap or stage time as `m:ss.mmm`; non-positive times show as
/// `--:--.---`.
pub fn format_lap_time(ms: i64) -> String {
    if ms <= 0 {
        return "--:--.---".to_string();
    }
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{minutes}:{seconds:02}.{millis:03}")
}

/// Format a delta to best as `+s.mmm`, or `+m:ss.mmm` past a minute.
pub fn format_delta(delta: LapDelta) -> String {
    let ms = match delta {
        LapDelta::Valid(ms) => ms,
        LapDelta::Invalid => return "+--.---".to_string(),
    };
    if ms == 0 {
        return "+0.000".to_string();
    }

    let sign = if ms > 0 { '+' } else { '-' };
    let abs = ms.unsigned_abs();
    let minutes = abs / 60_000;
    let seconds = (abs / 1000) % 60;
    let millis = abs % 1000;
    if minutes > 0 {
        format!("{sign}{minutes}:{seconds:02}.{millis:03}")
    } else {
        format!("{sign}{seconds}.{millis:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lap_times() {
        assert_eq!(format_lap_time(0), "--:--.---");
        assert_eq!(format_lap_time(-5), "--:--.---");
        assert_eq!(format_lap_time(7), "0:00.007");
        assert_eq!(format_lap_time(62_345), "1:02.345");
        assert_eq!(format_lap_time(3_600_000), "60:00.000");
    }

    #[test]
    fn deltas() {
        assert_eq!(format_delta(LapDelta::Invalid), "+--.---");
        assert_eq!(format_delta(LapDelta::Valid(0)), "+0.000");
        assert_eq!(format_delta(LapDelta::Valid(1_250)), "+1.250");
        assert_eq!(format_delta(LapDelta::Valid(-830)), "-0.830");
        assert_eq!(format_delta(LapDelta::Valid(-75_004)), "-1:15.004");
        assert_eq!(format_delta(LapDelta::Valid(i64::MIN)).chars().next(), Some('-'));
    }
}
