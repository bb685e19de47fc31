//! Query-string codec used for authorize URLs and callback parsing.
//!
//! [`encode`] joins parameters verbatim as `key=value` pairs; it does not percent-encode, so
//! callers supply values that are already URL-safe. [`decode`] only understands the ten reserved
//! characters in [`RESERVED`]; every other `%XX` sequence is left untouched. That is a known
//! limitation of the codec rather than a general percent-decoder.

// self
use crate::{_prelude::*, error::CallbackError};

/// Percent-encoded reserved characters understood by [`decode`].
pub const RESERVED: [(&str, char); 10] = [
	("%24", '$'),
	("%26", '&'),
	("%2B", '+'),
	("%2C", ','),
	("%2F", '/'),
	("%3A", ':'),
	("%3B", ';'),
	("%3D", '='),
	("%3F", '?'),
	("%40", '@'),
];

/// Builds a `key=value&...` string from ordered pairs, omitting every key listed in `skip`.
///
/// Pairs keep the iteration order of `params`. Exactly one trailing `&` is stripped, so a single
/// pair yields `key=value` and an empty input yields an empty string.
pub fn encode<I, K, V>(params: I, skip: &[&str]) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let mut buf = String::new();

	for (key, value) in params {
		let key = key.as_ref();

		if skip.contains(&key) {
			continue;
		}

		buf.push_str(key);
		buf.push('=');
		buf.push_str(value.as_ref());
		buf.push('&');
	}

	if buf.ends_with('&') {
		buf.pop();
	}

	buf
}

/// Replaces the encodings in [`RESERVED`] with their literal characters until none remain.
///
/// Hex digits are matched case-insensitively. Every substituting pass shortens the string, so the
/// iteration reaches a fixed point.
pub fn decode(raw: &str) -> String {
	let mut current = raw.to_owned();

	loop {
		match decode_pass(&current) {
			Some(next) => current = next,
			None => return current,
		}
	}
}

/// Parsed provider callback query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackQuery {
	/// Decoded authorization code.
	pub code: String,
	/// Opaque `state` value, passed through untouched apart from decoding.
	pub state: Option<String>,
	/// Every parameter in arrival order, values decoded.
	pub params: Vec<(String, String)>,
}
impl CallbackQuery {
	/// Parses the raw query (with or without the leading `?`).
	///
	/// A query containing `error` anywhere is rejected before the code is looked at. Otherwise the
	/// `code` parameter may appear at any position.
	pub fn parse(search: &str) -> Result<Self, CallbackError> {
		let query = search.strip_prefix('?').unwrap_or(search);
		let params = parse_pairs(query);

		if query.contains("error") {
			let error = find(&params, "error").unwrap_or("callback_error").to_owned();
			let description = find(&params, "error_description").map(str::to_owned);

			return Err(CallbackError::ProviderDenied { error, description });
		}

		let code = find(&params, "code")
			.filter(|code| !code.is_empty())
			.ok_or(CallbackError::MissingCode)?
			.to_owned();
		let state = find(&params, "state").map(str::to_owned);

		Ok(Self { code, state, params })
	}

	/// Returns the first decoded value for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		find(&self.params, key)
	}
}

/// Splits `a=1&b=2` into decoded pairs; segments without `=` map to empty values.
pub fn parse_pairs(query: &str) -> Vec<(String, String)> {
	query
		.split('&')
		.filter(|segment| !segment.is_empty())
		.map(|segment| {
			let (key, value) = segment.split_once('=').unwrap_or((segment, ""));

			(decode(key), decode(value))
		})
		.collect()
}

fn find<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
	params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn decode_pass(input: &str) -> Option<String> {
	let mut buf = String::with_capacity(input.len());
	let mut changed = false;
	let mut idx = 0;

	while idx < input.len() {
		if let Some(ch) = reserved_at(input, idx) {
			buf.push(ch);
			idx += 3;
			changed = true;

			continue;
		}

		let ch = input[idx..].chars().next().unwrap_or_default();

		buf.push(ch);
		idx += ch.len_utf8().max(1);
	}

	changed.then_some(buf)
}

fn reserved_at(input: &str, idx: usize) -> Option<char> {
	if input.as_bytes().get(idx) != Some(&b'%') {
		return None;
	}

	let seq = input.get(idx..idx + 3)?;

	RESERVED.iter().find(|(code, _)| code.eq_ignore_ascii_case(seq)).map(|(_, ch)| *ch)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn encode_joins_pairs_without_trailing_separator() {
		assert_eq!(encode(Vec::<(&str, &str)>::new(), &[]), "");
		assert_eq!(encode([("a", "1")], &[]), "a=1");
		assert_eq!(encode([("a", "1"), ("b", "2"), ("c", "3")], &[]), "a=1&b=2&c=3");
	}

	#[test]
	fn encode_honors_skip_list_and_order() {
		let params = [
			("client_id", "id"),
			("client_secret", "shh"),
			("redirect_uri", "https://app.example.com/cb"),
			("scope", "user-read-email"),
		];
		let encoded = encode(params, &["client_secret"]);

		assert_eq!(
			encoded,
			"client_id=id&redirect_uri=https://app.example.com/cb&scope=user-read-email"
		);
		assert!(!encoded.contains("shh"));
		assert_eq!(encode([("only", "x")], &["only"]), "");
	}

	#[test]
	fn encode_emits_each_key_once() {
		let params = [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")];
		let encoded = encode(params, &["b"]);
		let segments = encoded.split('&').collect::<Vec<_>>();

		assert_eq!(segments, ["a=1", "c=3", "d=4"]);
		assert!(!encoded.starts_with('&') && !encoded.ends_with('&'));
	}

	#[test]
	fn decode_handles_reserved_characters() {
		assert_eq!(decode("a%3Db%26c"), "a=b&c");
		assert_eq!(decode("%24%26%2B%2C%2F%3A%3B%3D%3F%40"), "$&+,/:;=?@");
		assert_eq!(decode("%2f%3a"), "/:");
		assert_eq!(decode("x%26y%26z"), "x&y&z");
	}

	#[test]
	fn decode_leaves_other_encodings_alone() {
		assert_eq!(decode("hello%20world"), "hello%20world");
		assert_eq!(decode("100%"), "100%");
		assert_eq!(decode("caf\u{e9}%3D"), "caf\u{e9}=");
	}

	#[test]
	fn callback_extracts_and_decodes_code() {
		let query = CallbackQuery::parse("?code=abc%26123").expect("Callback should parse.");

		assert_eq!(query.code, "abc&123");
		assert_eq!(query.state, None);
	}

	#[test]
	fn callback_finds_code_after_other_params() {
		let query =
			CallbackQuery::parse("?state=xyz&code=c0de&extra=1").expect("Callback should parse.");

		assert_eq!(query.code, "c0de");
		assert_eq!(query.state.as_deref(), Some("xyz"));
		assert_eq!(query.get("extra"), Some("1"));
	}

	#[test]
	fn callback_error_short_circuits() {
		let err = CallbackQuery::parse("?error=access_denied&error_description=User%3Ddenied")
			.expect_err("Error callbacks must be rejected.");

		assert_eq!(
			err,
			CallbackError::ProviderDenied {
				error: "access_denied".into(),
				description: Some("User=denied".into()),
			}
		);

		let err = CallbackQuery::parse("?code=abc&state=error")
			.expect_err("Any `error` substring must short-circuit.");

		assert!(matches!(err, CallbackError::ProviderDenied { .. }));
	}

	#[test]
	fn callback_without_code_is_rejected() {
		assert_eq!(CallbackQuery::parse("?state=abc"), Err(CallbackError::MissingCode));
		assert_eq!(CallbackQuery::parse("?code="), Err(CallbackError::MissingCode));
	}
}
