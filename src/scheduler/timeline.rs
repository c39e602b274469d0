//! Text to absolute-offset tone events.

use crate::coding::morse::{self, Encoding, Symbol, UnknownCharacter};

/// Silence after every character, on top of the gap each symbol already carries.
pub const LETTER_GAP_UNITS: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToneOn,
    ToneOff,
    /// End of playback, returns the scheduler to idle
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEvent {
    /// Milliseconds from the start of playback
    pub offset_ms: u64,
    pub action: Action,
}

/// Every event of one playback, in firing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
    skipped: Vec<UnknownCharacter>,
    units: u64,
    unit_ms: f64,
}

impl Timeline {
    /// Walks the text once, keeping the cursor in whole units.
    /// Each offset is converted on its own so rounding never accumulates.
    pub fn build(text: &str, unit_ms: f64) -> Self {
        let mut timeline = Self {
            events: Vec::new(),
            skipped: Vec::new(),
            units: 0,
            unit_ms,
        };

        for c in text.chars() {
            match morse::lookup(c) {
                Ok(Encoding::Letter(symbols)) => symbols.iter().for_each(|x| timeline.symbol(*x)),
                Ok(Encoding::WordGap) => {}
                Err(unknown) => {
                    timeline.skipped.push(unknown);
                    continue;
                }
            }

            timeline.units += LETTER_GAP_UNITS;
        }

        if timeline.units > 0 {
            timeline.push(timeline.units, Action::Finish);
        }

        timeline
    }

    fn symbol(&mut self, symbol: Symbol) {
        let start = self.units + 1;
        self.push(start, Action::ToneOn);
        self.push(start + symbol.tone_units(), Action::ToneOff);
        self.units += symbol.units();
    }

    fn push(&mut self, units: u64, action: Action) {
        self.events.push(TimelineEvent {
            offset_ms: self.to_ms(units),
            action,
        });
    }

    fn to_ms(&self, units: u64) -> u64 {
        (units as f64 * self.unit_ms).floor() as u64
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Characters left out because they have no code.
    pub fn skipped(&self) -> &[UnknownCharacter] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Length of the playback in units.
    pub fn units(&self) -> u64 {
        self.units
    }

    /// Offset of the final event.
    pub fn duration_ms(&self) -> u64 {
        self.to_ms(self.units)
    }
}

#[cfg(test)]
mod test {
    use super::{Action::*, Timeline, TimelineEvent, LETTER_GAP_UNITS};
    use crate::coding::morse::{self, UnknownCharacter};

    fn pairs(timeline: &Timeline) -> Vec<(u64, super::Action)> {
        timeline
            .events()
            .iter()
            .map(|TimelineEvent { offset_ms, action }| (*offset_ms, *action))
            .collect()
    }

    #[test]
    fn test_single_dot() {
        let timeline = Timeline::build("e", 60.0);
        assert_eq!(pairs(&timeline), [(60, ToneOn), (120, ToneOff), (240, Finish)]);
        assert_eq!(timeline.duration_ms(), 240);
    }

    #[test]
    fn test_single_dash() {
        let timeline = Timeline::build("T", 60.0);
        assert_eq!(pairs(&timeline), [(60, ToneOn), (240, ToneOff), (360, Finish)]);
    }

    #[test]
    fn test_sos() {
        let timeline = Timeline::build("sos", 60.0);
        #[rustfmt::skip]
        let expected = [
            // s: cursor 0
            (60, ToneOn), (120, ToneOff), (180, ToneOn), (240, ToneOff), (300, ToneOn), (360, ToneOff),
            // o: cursor 8 units
            (540, ToneOn), (720, ToneOff), (780, ToneOn), (960, ToneOff), (1020, ToneOn), (1200, ToneOff),
            // s: cursor 22 units
            (1380, ToneOn), (1440, ToneOff), (1500, ToneOn), (1560, ToneOff), (1620, ToneOn), (1680, ToneOff),
            (1800, Finish),
        ];
        assert_eq!(pairs(&timeline), expected);
        assert_eq!(Timeline::build("sos", 60.0), timeline);
    }

    #[test]
    fn test_empty() {
        let timeline = Timeline::build("", 60.0);
        assert!(timeline.is_empty());
        assert_eq!(timeline.duration_ms(), 0);
    }

    #[test]
    fn test_space_is_only_a_letter_gap() {
        let timeline = Timeline::build(" ", 60.0);
        assert_eq!(pairs(&timeline), [(120, Finish)]);

        let joined = Timeline::build("ee", 60.0).units();
        let spaced = Timeline::build("e e", 60.0).units();
        assert_eq!(spaced - joined, LETTER_GAP_UNITS);
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        let timeline = Timeline::build("a\u{7}b#", 60.0);
        assert_eq!(
            timeline.skipped(),
            [UnknownCharacter('\u{7}'), UnknownCharacter('#')]
        );
        assert_eq!(pairs(&timeline), pairs(&Timeline::build("ab", 60.0)));

        let only_unknown = Timeline::build("##", 60.0);
        assert!(only_unknown.is_empty());
        assert_eq!(only_unknown.skipped().len(), 2);
    }

    #[test]
    fn test_every_character_is_unit_multiple() {
        for (c, symbols) in morse::table() {
            let expected = symbols.iter().map(|x| x.units()).sum::<u64>() + LETTER_GAP_UNITS;
            let timeline = Timeline::build(&c.to_string(), 60.0);
            assert_eq!(timeline.units(), expected, "{c}");
            assert_eq!(timeline.duration_ms(), expected * 60, "{c}");
            assert_eq!(timeline.events().len(), symbols.len() * 2 + 1);
        }
    }

    #[test]
    fn test_offsets_non_decreasing() {
        let timeline = Timeline::build("The quick brown fox, 1234567890?", 92.307);
        let events = timeline.events();
        assert!(events.windows(2).all(|x| x[0].offset_ms <= x[1].offset_ms));
        assert_eq!(events.last().unwrap().action, Finish);
        assert_eq!(events.iter().filter(|x| x.action == Finish).count(), 1);
    }

    #[test]
    fn test_bounded_drift() {
        // 13 wpm, unit is not a whole number of milliseconds
        let unit_ms = 60_000.0 / (13.0 * 50.0);
        let text = "paris ".repeat(200);
        let timeline = Timeline::build(&text, unit_ms);

        let exact = timeline.units() as f64 * unit_ms;
        let drift = exact - timeline.duration_ms() as f64;
        assert!((0.0..1.0).contains(&drift), "drift {drift}");
        assert_eq!(timeline.units(), 200 * Timeline::build("paris ", unit_ms).units());
    }
}
