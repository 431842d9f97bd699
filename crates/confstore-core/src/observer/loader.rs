//! Observer configuration document loader
//!
//! Materialises observers from a JSON array of
//! `{event, route, type, condition}` elements. Built-in validator types are
//! always available; callers can register additional factories by name.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::prelude::*;

use super::validate::{MinMaxInt64, Strings};
use super::{Event, Observer, ObserverRegistry};

/// One element of the configuration document
#[derive(Debug, Deserialize)]
struct ObserverDoc {
	event: String,
	route: String,
	#[serde(rename = "type")]
	typ: String,
	#[serde(default)]
	condition: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MinMaxCondition {
	conditions: Vec<i64>,
}

fn default_sep() -> char {
	','
}

#[derive(Debug, Deserialize)]
struct StringsCondition {
	validators: Vec<String>,
	#[serde(default = "default_sep")]
	csv_separator: char,
	#[serde(default)]
	additional_allowed: Vec<String>,
}

/// Builds an observer from the `condition` payload of a document element
pub type ObserverFactory =
	Box<dyn Fn(&serde_json::Value) -> CsResult<Arc<dyn Observer>> + Send + Sync>;

/// Resolves the `type` names of a configuration document. Built-ins
/// (`MinMaxInt64`, `Strings`) are implicit; user types get registered here.
#[derive(Default)]
pub struct FactoryRegistry {
	factories: HashMap<Box<str>, ObserverFactory>,
}

impl FactoryRegistry {
	pub fn new() -> FactoryRegistry {
		FactoryRegistry::default()
	}

	/// Registers a custom observer type under the given document name
	pub fn register<F>(&mut self, name: &str, factory: F)
	where
		F: Fn(&serde_json::Value) -> CsResult<Arc<dyn Observer>> + Send + Sync + 'static,
	{
		self.factories.insert(name.into(), Box::new(factory));
	}

	/// Parses a document and registers every observer it describes.
	/// Returns the number of registered observers.
	///
	/// Error kinds: malformed JSON `BadEncoding`, missing condition
	/// `Empty`, unknown event or type `NotFound`, invalid route
	/// `NotValid`, unsupported sub-validator `NotSupported`.
	pub fn load(&self, registry: &ObserverRegistry, json: &str) -> CsResult<usize> {
		let docs: Vec<ObserverDoc> = serde_json::from_str(json)?;
		for doc in &docs {
			let event = Event::parse(&doc.event)?;
			let route = Route::new(&doc.route)?;
			let observer = self.build(&doc.typ, doc.condition.as_ref())?;
			registry.register(event, route.as_str(), observer)?;
			debug!("registered {} observer on {} ({})", doc.typ, route, event.as_str());
		}
		Ok(docs.len())
	}

	fn build(
		&self,
		typ: &str,
		condition: Option<&serde_json::Value>,
	) -> CsResult<Arc<dyn Observer>> {
		match typ {
			"MinMaxInt64" => {
				let cond = condition
					.ok_or_else(|| Error::Empty("condition for MinMaxInt64".into()))?;
				let c: MinMaxCondition = serde_json::from_value(cond.clone())?;
				Ok(Arc::new(MinMaxInt64::new(c.conditions)))
			}
			"Strings" => {
				let cond =
					condition.ok_or_else(|| Error::Empty("condition for Strings".into()))?;
				let c: StringsCondition = serde_json::from_value(cond.clone())?;
				Ok(Arc::new(Strings::new(
					&c.validators,
					c.csv_separator,
					c.additional_allowed,
				)?))
			}
			_ => match self.factories.get(typ) {
				Some(factory) => {
					let null = serde_json::Value::Null;
					factory(condition.unwrap_or(&null))
				}
				None => Err(Error::NotFound),
			},
		}
	}
}

impl std::fmt::Debug for FactoryRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("FactoryRegistry")
			.field("custom_types", &self.factories.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::observer::Event;

	fn load(json: &str) -> (ObserverRegistry, CsResult<usize>) {
		let registry = ObserverRegistry::new();
		let res = FactoryRegistry::new().load(&registry, json);
		(registry, res)
	}

	#[test]
	fn test_min_max_ok() {
		let (registry, res) = load(
			r#"[{ "event":"before_set", "route":"payment/pp/port",
				"type":"MinMaxInt64", "condition":{"conditions":[8080,8090]} }]"#,
		);
		assert_eq!(res.unwrap(), 1);

		let p = Path::make("payment/pp/port").unwrap();
		assert!(registry.evaluate(Event::BeforeSet, &p, b"8085".to_vec()).is_ok());
		assert!(registry
			.evaluate(Event::BeforeSet, &p, b"7000".to_vec())
			.unwrap_err()
			.is_not_valid());
	}

	#[test]
	fn test_malformed_json() {
		let (_, res) = load(
			r#"[{ "event":before_set, "route":"payment/pp/port",
				"type":"MinMaxInt64", "condition":{"conditions":[8080,8090]} }]"#,
		);
		assert!(res.unwrap_err().is_bad_encoding());
	}

	#[test]
	fn test_missing_condition() {
		let (_, res) =
			load(r#"[{ "event":"before_set", "route":"payment/pp/port", "type":"MinMaxInt64" }]"#);
		assert!(res.unwrap_err().is_empty_input());
	}

	#[test]
	fn test_empty_conditions_list_ok() {
		let (_, res) = load(
			r#"[{ "event":"before_set", "route":"payment/pp/port",
				"type":"MinMaxInt64", "condition":{"conditions":[]} }]"#,
		);
		assert_eq!(res.unwrap(), 1);
	}

	#[test]
	fn test_unknown_event() {
		let (_, res) = load(
			r#"[{ "event":"while_set", "route":"payment/pp/port",
				"type":"MinMaxInt64", "condition":{"conditions":[1]} }]"#,
		);
		assert!(res.unwrap_err().is_not_found());
	}

	#[test]
	fn test_unknown_type() {
		let (_, res) = load(
			r#"[{ "event":"before_set", "route":"payment/pp/port",
				"type":"MaxMinInt64", "condition":{"conditions":[1]} }]"#,
		);
		assert!(res.unwrap_err().is_not_found());
	}

	#[test]
	fn test_invalid_route() {
		let (_, res) = load(
			r#"[{ "event":"before_set", "route":"pay",
				"type":"MinMaxInt64", "condition":{"conditions":[1]} }]"#,
		);
		assert!(res.unwrap_err().is_not_valid());
	}

	#[test]
	fn test_strings_with_unsupported_check() {
		let (_, res) = load(
			r#"[{ "event":"before_set", "route":"general/country/allow",
				"type":"Strings", "condition":{"validators":["ISO9000"]} }]"#,
		);
		assert!(res.unwrap_err().is_not_supported());
	}

	#[test]
	fn test_strings_ok() {
		let (registry, res) = load(
			r#"[{ "event":"before_set", "route":"general/country/allow",
				"type":"Strings",
				"condition":{"validators":["ISO3166Alpha2"], "additional_allowed":["EU"]} }]"#,
		);
		assert_eq!(res.unwrap(), 1);

		let p = Path::make("general/country/allow").unwrap();
		assert!(registry.evaluate(Event::BeforeSet, &p, b"DE,EU".to_vec()).is_ok());
		assert!(registry
			.evaluate(Event::BeforeSet, &p, b"DE,QQ".to_vec())
			.unwrap_err()
			.is_not_valid());
	}

	#[test]
	fn test_custom_type() {
		let registry = ObserverRegistry::new();
		let mut factories = FactoryRegistry::new();
		factories.register("Reverse", |_cond| {
			Ok(Arc::new(|_: &Path, data: &[u8]| -> CsResult<Vec<u8>> {
				let mut v = data.to_vec();
				v.reverse();
				Ok(v)
			}) as Arc<dyn Observer>)
		});

		let n = factories
			.load(
				&registry,
				r#"[{ "event":"after_get", "route":"system/smtp/host", "type":"Reverse" }]"#,
			)
			.unwrap();
		assert_eq!(n, 1);

		let p = Path::make("system/smtp/host").unwrap();
		let out = registry.evaluate(Event::AfterGet, &p, b"abc".to_vec()).unwrap();
		assert_eq!(out, b"cba");
	}
}

// vim: ts=4
