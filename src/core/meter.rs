//! What the nixie meter shows when no worldline shift is running.

use time::OffsetDateTime;

pub const DEFAULT_CUSTOM: &str = "12345678";
const CUSTOM_DIGITS: usize = 8;
const CUSTOM_DECIMALS: usize = 6;
const COUNTER_WRAP: u64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeterMode {
    /// The settled divergence value.
    #[default]
    Divergence,
    /// Local time as `HH.MM.SS`.
    Clock,
    /// A user-entered number.
    Custom,
    /// Seconds since the mode was entered.
    Counter,
}

impl MeterMode {
    pub fn next(self) -> MeterMode {
        match self {
            MeterMode::Divergence => MeterMode::Clock,
            MeterMode::Clock => MeterMode::Custom,
            MeterMode::Custom => MeterMode::Counter,
            MeterMode::Counter => MeterMode::Divergence,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeterMode::Divergence => "DIVERGENCE",
            MeterMode::Clock => "CLOCK",
            MeterMode::Custom => "CUSTOM",
            MeterMode::Counter => "COUNTER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl WallTime {
    /// Local time, or UTC when the local offset cannot be determined.
    pub fn now() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self {
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Meter {
    mode: MeterMode,
    custom: String,
    counter_origin_ms: u64,
}

impl Default for Meter {
    fn default() -> Self {
        Self {
            mode: MeterMode::Divergence,
            custom: DEFAULT_CUSTOM.to_string(),
            counter_origin_ms: 0,
        }
    }
}

impl Meter {
    pub fn mode(&self) -> MeterMode {
        self.mode
    }

    pub fn custom(&self) -> &str {
        &self.custom
    }

    /// Advance to the next mode. The counter restarts each time it is entered.
    pub fn cycle(&mut self, now_ms: u64) -> MeterMode {
        self.mode = self.mode.next();
        if self.mode == MeterMode::Counter {
            self.counter_origin_ms = now_ms;
        }
        self.mode
    }

    pub fn show_divergence(&mut self) {
        self.mode = MeterMode::Divergence;
    }

    /// Append to the custom value. Ignored outside custom mode.
    pub fn push_custom(&mut self, c: char) -> bool {
        if self.mode != MeterMode::Custom {
            return false;
        }
        let mut raw = self.custom.clone();
        raw.push(c);
        self.custom = format_custom(&raw);
        true
    }

    pub fn erase_custom(&mut self) -> bool {
        if self.mode != MeterMode::Custom {
            return false;
        }
        self.custom.pop();
        true
    }

    /// Text for the meter glyphs. `divergence` is used in divergence mode.
    pub fn text(&self, divergence: &str, now_ms: u64, wall: WallTime) -> String {
        match self.mode {
            MeterMode::Divergence => divergence.to_string(),
            MeterMode::Clock => clock_text(wall),
            MeterMode::Custom => self.custom.clone(),
            MeterMode::Counter => counter_text(now_ms.saturating_sub(self.counter_origin_ms)),
        }
    }
}

/// Keep digits and dots, then shape as `XXXXXXXX` or `X.XXXXXX`.
///
/// With a dot, only the last digit before the first dot and up to six
/// digits after it survive.
pub fn format_custom(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = cleaned.split('.');
    let head = parts.next().unwrap_or_default();
    match parts.next() {
        Some(tail) => {
            let mut out: String = head.chars().last().into_iter().collect();
            out.push('.');
            out.extend(tail.chars().take(CUSTOM_DECIMALS));
            out
        }
        None => head.chars().take(CUSTOM_DIGITS).collect(),
    }
}

pub fn clock_text(wall: WallTime) -> String {
    format!("{:02}.{:02}.{:02}", wall.hour, wall.minute, wall.second)
}

pub fn counter_text(elapsed_ms: u64) -> String {
    format!("{:08}", (elapsed_ms / 1000) % COUNTER_WRAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOON: WallTime = WallTime {
        hour: 12,
        minute: 5,
        second: 9,
    };

    #[test]
    fn modes_cycle_back_to_divergence() {
        let mut meter = Meter::default();
        let seen: Vec<MeterMode> = (0..4).map(|i| meter.cycle(i)).collect();
        assert_eq!(
            seen,
            vec![
                MeterMode::Clock,
                MeterMode::Custom,
                MeterMode::Counter,
                MeterMode::Divergence
            ]
        );
    }

    #[test]
    fn custom_value_keeps_eight_plain_digits() {
        assert_eq!(format_custom("123456789"), "12345678");
        assert_eq!(format_custom("12a3"), "123");
        assert_eq!(format_custom(""), "");
    }

    #[test]
    fn custom_value_with_a_dot_keeps_one_digit_before_and_six_after() {
        assert_eq!(format_custom("1.048596"), "1.048596");
        assert_eq!(format_custom("42.1234567"), "2.123456");
        assert_eq!(format_custom("7."), "7.");
        assert_eq!(format_custom(".5"), ".5");
        assert_eq!(format_custom("1.2.3"), "1.2");
    }

    #[test]
    fn typing_only_applies_in_custom_mode() {
        let mut meter = Meter::default();
        assert!(!meter.push_custom('9'));
        meter.cycle(0);
        meter.cycle(0);
        assert_eq!(meter.mode(), MeterMode::Custom);
        for _ in 0..DEFAULT_CUSTOM.len() {
            meter.erase_custom();
        }
        for c in "1.0485961".chars() {
            assert!(meter.push_custom(c));
        }
        assert_eq!(meter.custom(), "1.048596");
        assert_eq!(meter.text("0.000000", 0, NOON), "1.048596");
    }

    #[test]
    fn clock_pads_each_field() {
        assert_eq!(clock_text(NOON), "12.05.09");
    }

    #[test]
    fn counter_counts_whole_seconds_from_entry() {
        let mut meter = Meter::default();
        for _ in 0..3 {
            meter.cycle(5_000);
        }
        assert_eq!(meter.mode(), MeterMode::Counter);
        assert_eq!(meter.text("", 5_000, NOON), "00000000");
        assert_eq!(meter.text("", 17_999, NOON), "00000012");
        assert_eq!(counter_text(100_000_001_000), "00000001");
    }

    #[test]
    fn divergence_mode_passes_the_readout_through() {
        let meter = Meter::default();
        assert_eq!(meter.text("1.130205", 0, NOON), "1.130205");
    }
}
