//! Named, directional orderings for report rows.
//!
//! Each report mode has its own key enum mapping a sort name onto an accessor
//! for its row type, so an unknown name is caught when the sort is parsed.

use crate::analysis::Cumulative;
use crate::request::{Request, Stage};
use crate::{Error, Result};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A comparable value pulled out of a row. Missing values order first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Number(Option<f64>),
    Text(Option<&'a str>),
    Stage(Stage),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => match (a, b) {
                (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
                _ => a.is_some().cmp(&b.is_some()),
            },
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Stage(a), SortValue::Stage(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A family of sort names valid for one kind of row.
pub trait SortKey: Copy + std::fmt::Debug {
    type Record;

    /// Report mode name, used in error messages.
    const MODE: &'static str;
    const NAMES: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;
    fn value<'a>(&self, record: &'a Self::Record) -> SortValue<'a>;
    fn default_direction(&self) -> Direction;
}

/// A key plus a direction. Rows with equal keys compare equal either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<K> {
    pub key: K,
    pub direction: Direction,
}

impl<K: SortKey> Sort<K> {
    /// Sort by `key` in its customary direction.
    pub fn new(key: K) -> Self {
        Self {
            key,
            direction: key.default_direction(),
        }
    }

    /// Parse a sort name, rejecting names that do not apply to this mode.
    pub fn parse(name: &str) -> Result<Self> {
        K::from_name(name.trim())
            .map(Self::new)
            .ok_or_else(|| Error::InvalidSort {
                spec: name.to_string(),
                mode: K::MODE,
                valid: K::NAMES,
            })
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn compare(&self, a: &K::Record, b: &K::Record) -> Ordering {
        let ordering = self.key.value(a).compare(&self.key.value(b));
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }

    /// Stable in-place sort.
    pub fn apply(&self, records: &mut [K::Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

impl<K: SortKey + Default> Default for Sort<K> {
    fn default() -> Self {
        Self::new(K::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CumulativeSort {
    Url,
    Hits,
    Hangs,
    Max,
    Min,
    Median,
    Mean,
    #[default]
    Total,
}

impl SortKey for CumulativeSort {
    type Record = Cumulative;

    const MODE: &'static str = "cumulative";
    const NAMES: &'static [&'static str] =
        &["url", "hits", "hangs", "max", "min", "median", "mean", "total"];

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "url" => CumulativeSort::Url,
            "hits" => CumulativeSort::Hits,
            "hangs" => CumulativeSort::Hangs,
            "max" => CumulativeSort::Max,
            "min" => CumulativeSort::Min,
            "median" => CumulativeSort::Median,
            "mean" => CumulativeSort::Mean,
            "total" => CumulativeSort::Total,
            _ => return None,
        })
    }

    fn value<'a>(&self, stats: &'a Cumulative) -> SortValue<'a> {
        match self {
            CumulativeSort::Url => SortValue::Text(Some(&stats.url)),
            CumulativeSort::Hits => SortValue::Number(Some(stats.hits() as f64)),
            CumulativeSort::Hangs => SortValue::Number(Some(stats.hangs as f64)),
            CumulativeSort::Max => SortValue::Number(Some(stats.max())),
            CumulativeSort::Min => SortValue::Number(Some(stats.min())),
            CumulativeSort::Median => SortValue::Number(Some(stats.median())),
            CumulativeSort::Mean => SortValue::Number(Some(stats.mean())),
            CumulativeSort::Total => SortValue::Number(Some(stats.total())),
        }
    }

    fn default_direction(&self) -> Direction {
        match self {
            CumulativeSort::Url => Direction::Ascending,
            _ => Direction::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailedSort {
    #[default]
    Start,
    Win,
    Wout,
    Wend,
    Total,
    EndStage,
    Isize,
    Osize,
    HttpCode,
    Active,
    Url,
}

impl SortKey for DetailedSort {
    type Record = Request;

    const MODE: &'static str = "detailed";
    const NAMES: &'static [&'static str] = &[
        "start", "win", "wout", "wend", "total", "endstage", "isize", "osize", "httpcode",
        "active", "url",
    ];

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "start" => DetailedSort::Start,
            "win" => DetailedSort::Win,
            "wout" => DetailedSort::Wout,
            "wend" => DetailedSort::Wend,
            "total" => DetailedSort::Total,
            "endstage" => DetailedSort::EndStage,
            "isize" => DetailedSort::Isize,
            "osize" => DetailedSort::Osize,
            "httpcode" => DetailedSort::HttpCode,
            "active" => DetailedSort::Active,
            "url" => DetailedSort::Url,
            _ => return None,
        })
    }

    fn value<'a>(&self, request: &'a Request) -> SortValue<'a> {
        match self {
            DetailedSort::Start => SortValue::Number(Some(request.start)),
            DetailedSort::Win => SortValue::Number(request.win()),
            DetailedSort::Wout => SortValue::Number(request.wout()),
            DetailedSort::Wend => SortValue::Number(request.wend()),
            DetailedSort::Total => SortValue::Number(Some(request.total())),
            DetailedSort::EndStage => SortValue::Stage(request.stage()),
            DetailedSort::Isize => SortValue::Number(Some(request.input_size as f64)),
            DetailedSort::Osize => SortValue::Number(
                request
                    .output_size
                    .as_deref()
                    .and_then(|s| s.parse::<f64>().ok()),
            ),
            DetailedSort::HttpCode => SortValue::Text(request.http_code.as_deref()),
            DetailedSort::Active => SortValue::Number(Some(f64::from(request.active))),
            DetailedSort::Url => SortValue::Text(Some(&request.url)),
        }
    }

    fn default_direction(&self) -> Direction {
        match self {
            DetailedSort::Start
            | DetailedSort::Url
            | DetailedSort::HttpCode
            | DetailedSort::EndStage => Direction::Ascending,
            _ => Direction::Descending,
        }
    }
}
