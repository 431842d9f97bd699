//! Built-in validation observers
//!
//! Typed validators selected by name when loading an observer
//! configuration document, also constructible directly in code.

use std::sync::Arc;

use crate::prelude::*;

use super::Observer;

/// Validates an int64 value against a condition list.
///
/// With two or more conditions the value must lie in
/// `[conditions[0], conditions[1]]`; any further conditions are exact
/// matches that also pass. A single condition is an exact match. An empty
/// list passes everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinMaxInt64 {
	pub conditions: Vec<i64>,
}

impl MinMaxInt64 {
	pub fn new(conditions: Vec<i64>) -> MinMaxInt64 {
		MinMaxInt64 { conditions }
	}

	fn is_valid(&self, v: i64) -> bool {
		match self.conditions.len() {
			0 => true,
			1 => v == self.conditions[0],
			_ => {
				(self.conditions[0] <= v && v <= self.conditions[1])
					|| self.conditions[2..].contains(&v)
			}
		}
	}
}

impl Observer for MinMaxInt64 {
	fn observe(&self, path: &Path, data: &[u8]) -> CsResult<Vec<u8>> {
		let s = std::str::from_utf8(data)?;
		let v: i64 = s
			.trim()
			.parse()
			.map_err(|_| Error::NotValid(format!("{:?} at {} is not an int64", s, path)))?;
		if !self.is_valid(v) {
			return Err(Error::NotValid(format!(
				"{} at {} is outside {:?}",
				v, path, self.conditions
			)));
		}
		Ok(data.to_vec())
	}
}

/// The checks a [`Strings`] validator can apply per token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrCheck {
	Locale,
	Iso3166Alpha2,
	Int64,
	Bool,
	NotEmpty,
}

impl StrCheck {
	fn parse(name: &str) -> CsResult<StrCheck> {
		match name {
			"Locale" => Ok(StrCheck::Locale),
			"ISO3166Alpha2" => Ok(StrCheck::Iso3166Alpha2),
			"int64" => Ok(StrCheck::Int64),
			"bool" => Ok(StrCheck::Bool),
			"not_empty" => Ok(StrCheck::NotEmpty),
			_ => Err(Error::NotSupported(format!("string validator {:?}", name))),
		}
	}

	fn check(&self, token: &str) -> bool {
		match self {
			StrCheck::Locale => is_locale(token),
			StrCheck::Iso3166Alpha2 => ISO3166_ALPHA2.contains(&token),
			StrCheck::Int64 => token.parse::<i64>().is_ok(),
			StrCheck::Bool => matches!(token, "1" | "0" | "true" | "false"),
			StrCheck::NotEmpty => !token.is_empty(),
		}
	}
}

/// `ll`, `lll`, `ll_CC` or `lll_CC` language tags
fn is_locale(token: &str) -> bool {
	let (lang, region) = match token.split_once('_') {
		Some((lang, region)) => (lang, Some(region)),
		None => (token, None),
	};
	let lang_ok = (2..=3).contains(&lang.len()) && lang.bytes().all(|b| b.is_ascii_lowercase());
	let region_ok = match region {
		Some(r) => r.len() == 2 && r.bytes().all(|b| b.is_ascii_uppercase()),
		None => true,
	};
	lang_ok && region_ok
}

/// Validates a separated string value token by token. Each token must pass
/// at least one of the named checks or be listed in `extra_allowed`.
#[derive(Debug)]
pub struct Strings {
	checks: Vec<StrCheck>,
	csv_sep: char,
	extra_allowed: Vec<String>,
}

impl Strings {
	/// Fails with `NotSupported` when a check name is unknown.
	pub fn new(
		validators: &[String],
		csv_sep: char,
		extra_allowed: Vec<String>,
	) -> CsResult<Strings> {
		let checks = validators
			.iter()
			.map(|name| StrCheck::parse(name))
			.collect::<CsResult<Vec<_>>>()?;
		Ok(Strings { checks, csv_sep, extra_allowed })
	}

	/// Convenience for code-side registration
	pub fn arc(
		validators: &[&str],
		csv_sep: char,
		extra_allowed: &[&str],
	) -> CsResult<Arc<Strings>> {
		let validators: Vec<String> = validators.iter().map(|s| s.to_string()).collect();
		let extra: Vec<String> = extra_allowed.iter().map(|s| s.to_string()).collect();
		Ok(Arc::new(Strings::new(&validators, csv_sep, extra)?))
	}

	fn token_ok(&self, token: &str) -> bool {
		if self.extra_allowed.iter().any(|a| a == token) {
			return true;
		}
		self.checks.iter().any(|c| c.check(token))
	}
}

impl Observer for Strings {
	fn observe(&self, path: &Path, data: &[u8]) -> CsResult<Vec<u8>> {
		let s = std::str::from_utf8(data)?;
		for token in s.split(self.csv_sep) {
			if !self.token_ok(token) {
				return Err(Error::NotValid(format!(
					"token {:?} at {} failed validation",
					token, path
				)));
			}
		}
		Ok(data.to_vec())
	}
}

/// ISO 3166-1 alpha-2 country codes
const ISO3166_ALPHA2: &[&str] = &[
	"AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX",
	"AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ",
	"BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK",
	"CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
	"DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
	"GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
	"GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN",
	"IO", "IQ", "IR", "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
	"KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV",
	"LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ",
	"MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI",
	"NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
	"PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC",
	"SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV",
	"SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR",
	"TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
	"VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];


// vim: ts=4
