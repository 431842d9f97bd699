//! Time and duration models
//!
//! Times are stored in the first accepted format of a fixed list and
//! written back as `%Y-%m-%d %H:%M:%S` UTC. Durations use the human form
//! (`1h45m`, `300ms`, `-1.5h`) with the units ns, us, ms, s, m and h.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::prelude::*;
use crate::scoped::Scoped;
use crate::service::Setter;

use super::{BaseValue, Field};

const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn decode_time(data: &[u8]) -> CsResult<DateTime<Utc>> {
	let s = std::str::from_utf8(data)?.trim();

	if let Ok(t) = DateTime::parse_from_rfc3339(s) {
		return Ok(t.with_timezone(&Utc));
	}
	if let Ok(t) = NaiveDateTime::parse_from_str(s, WRITE_FORMAT) {
		return Ok(Utc.from_utc_datetime(&t));
	}
	if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
		if let Some(t) = d.and_hms_opt(0, 0, 0) {
			return Ok(Utc.from_utc_datetime(&t));
		}
	}
	Err(Error::NotValid(format!("{:?} matches no accepted time format", s)))
}

/// Timestamp field. `value` is `None` when no scope stores one and the
/// field has no default; there is no zero time.
#[derive(Debug, Clone)]
pub struct Time {
	base: BaseValue,
}

impl Time {
	pub fn new(route: &str) -> CsResult<Time> {
		Ok(Time { base: BaseValue::new(route)? })
	}

	pub fn with_field(mut self, field: Field) -> Time {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<Option<DateTime<Utc>>> {
		match self.base.raw(sg).await? {
			Some(raw) => Ok(Some(decode_time(&raw)?)),
			None => match self.base.default_raw() {
				Some(d) => Ok(Some(decode_time(d)?)),
				None => Ok(None),
			},
		}
	}

	pub async fn write(&self, w: &dyn Setter, v: DateTime<Utc>, scope: ScopeId) -> CsResult<()> {
		let encoded = v.format(WRITE_FORMAT).to_string();
		self.base.write_raw(w, encoded.as_bytes(), scope).await
	}
}

const NANOS_PER_HOUR: i64 = 3_600_000_000_000;
const NANOS_PER_MINUTE: i64 = 60_000_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

fn unit_nanos(s: &str) -> Option<(i64, usize)> {
	// longest units first, "ms" before "m"
	for (unit, nanos) in [
		("ns", 1),
		("us", 1_000),
		("\u{b5}s", 1_000),
		("ms", 1_000_000),
		("s", NANOS_PER_SECOND),
		("m", NANOS_PER_MINUTE),
		("h", NANOS_PER_HOUR),
	] {
		if s.starts_with(unit) {
			return Some((nanos, unit.len()));
		}
	}
	None
}

/// Parses the human duration form: a signed sequence of decimal numbers,
/// each with an optional fraction and a unit suffix.
pub fn parse_duration(input: &str) -> CsResult<chrono::Duration> {
	let invalid = || Error::NotValid(format!("{:?} is not a duration", input));

	let mut s = input;
	let negative = match s.as_bytes().first() {
		Some(b'-') => {
			s = &s[1..];
			true
		}
		Some(b'+') => {
			s = &s[1..];
			false
		}
		_ => false,
	};
	if s == "0" {
		return Ok(chrono::Duration::zero());
	}
	if s.is_empty() {
		return Err(invalid());
	}

	let mut total_ns: i64 = 0;
	while !s.is_empty() {
		let num_end = s
			.find(|c: char| !c.is_ascii_digit() && c != '.')
			.unwrap_or(s.len());
		if num_end == 0 {
			return Err(invalid());
		}
		let num: f64 = s[..num_end].parse().map_err(|_| invalid())?;
		s = &s[num_end..];

		let (nanos, unit_len) = unit_nanos(s).ok_or_else(invalid)?;
		s = &s[unit_len..];

		total_ns = total_ns
			.checked_add((num * nanos as f64) as i64)
			.ok_or_else(invalid)?;
	}

	if negative {
		total_ns = -total_ns;
	}
	Ok(chrono::Duration::nanoseconds(total_ns))
}

/// Formats a duration back into its human form. Zero components are
/// omitted, a zero duration is `0s`.
pub fn format_duration(d: chrono::Duration) -> String {
	let Some(mut ns) = d.num_nanoseconds() else {
		return format!("{}s", d.num_seconds());
	};
	if ns == 0 {
		return "0s".to_string();
	}

	let mut out = String::new();
	if ns < 0 {
		out.push('-');
		ns = -ns;
	}

	let hours = ns / NANOS_PER_HOUR;
	ns %= NANOS_PER_HOUR;
	let minutes = ns / NANOS_PER_MINUTE;
	ns %= NANOS_PER_MINUTE;
	let seconds = ns / NANOS_PER_SECOND;
	ns %= NANOS_PER_SECOND;

	if hours > 0 {
		out.push_str(&format!("{}h", hours));
	}
	if minutes > 0 {
		out.push_str(&format!("{}m", minutes));
	}
	if ns == 0 {
		if seconds > 0 {
			out.push_str(&format!("{}s", seconds));
		}
	} else if hours == 0 && minutes == 0 && seconds == 0 {
		// pure sub-second values keep their natural unit
		if ns % 1_000_000 == 0 {
			out.push_str(&format!("{}ms", ns / 1_000_000));
		} else if ns % 1_000 == 0 {
			out.push_str(&format!("{}us", ns / 1_000));
		} else {
			out.push_str(&format!("{}ns", ns));
		}
	} else {
		let frac = format!("{:09}", ns);
		out.push_str(&format!("{}.{}s", seconds, frac.trim_end_matches('0')));
	}
	out
}

/// Duration field in the human encoding
#[derive(Debug, Clone)]
pub struct Duration {
	base: BaseValue,
}

impl Duration {
	pub fn new(route: &str) -> CsResult<Duration> {
		Ok(Duration { base: BaseValue::new(route)? })
	}

	pub fn with_field(mut self, field: Field) -> Duration {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<chrono::Duration> {
		let raw = match self.base.raw(sg).await? {
			Some(raw) => raw,
			None => match self.base.default_raw() {
				Some(d) => d.into(),
				None => return Ok(chrono::Duration::zero()),
			},
		};
		parse_duration(std::str::from_utf8(&raw)?)
	}

	pub async fn write(
		&self,
		w: &dyn Setter,
		v: chrono::Duration,
		scope: ScopeId,
	) -> CsResult<()> {
		self.base.write_raw(w, format_duration(v).as_bytes(), scope).await
	}
}


// vim: ts=4
