use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

/// Numbers drawn per set, both for the main and the extra numbers.
pub const NUMBERS_PER_DRAW: usize = 5;

/// One MillionDay draw as listed in the yearly archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawRecord {
    draw_timestamp: NaiveDateTime,
    draw_index: i64,
    main_numbers: [u32; NUMBERS_PER_DRAW],
    extra_numbers: [u32; NUMBERS_PER_DRAW],
    unix_timestamp: i64,
}

impl DrawRecord {
    pub(crate) fn new(
        draw_timestamp: NaiveDateTime,
        draw_index: i64,
        main_numbers: [u32; NUMBERS_PER_DRAW],
        extra_numbers: [u32; NUMBERS_PER_DRAW],
        unix_timestamp: i64,
    ) -> Self {
        Self {
            draw_timestamp,
            draw_index,
            main_numbers,
            extra_numbers,
            unix_timestamp,
        }
    }

    pub fn draw_timestamp(&self) -> NaiveDateTime {
        self.draw_timestamp
    }

    pub fn draw_date(&self) -> NaiveDate {
        self.draw_timestamp.date()
    }

    pub fn draw_index(&self) -> i64 {
        self.draw_index
    }

    pub fn main_numbers(&self) -> &[u32; NUMBERS_PER_DRAW] {
        &self.main_numbers
    }

    pub fn extra_numbers(&self) -> &[u32; NUMBERS_PER_DRAW] {
        &self.extra_numbers
    }

    pub fn unix_timestamp(&self) -> i64 {
        self.unix_timestamp
    }

    pub fn key(&self) -> DrawKey {
        DrawKey {
            date: self.draw_date(),
            draw_index: self.draw_index,
        }
    }
}

/// Identity of a draw across runs: the calendar day plus its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawKey {
    pub date: NaiveDate,
    pub draw_index: i64,
}

/// The two daily sessions. Even draw indices are evening draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Midday,
    Evening,
}

impl Session {
    pub fn from_draw_index(draw_index: i64) -> Self {
        if draw_index % 2 == 0 {
            Session::Evening
        } else {
            Session::Midday
        }
    }

    pub fn time(self) -> NaiveTime {
        let minutes = match self {
            Session::Midday => 13 * 60,
            Session::Evening => 20 * 60 + 30,
        };
        NaiveTime::MIN + TimeDelta::minutes(minutes)
    }
}
