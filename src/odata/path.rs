//! OData containment path parsing.
//!
//! Turns the fixture's declared route shapes into a typed path, built as
//! an explicit parser rather than attribute reflection:
//!
//! ```text
//! /Accounts
//! /Accounts({key})/PayinPIs
//! /Accounts({accountId})/PayinPIs({paymentInstrumentId})
//! /Accounts({key})/PayoutPI
//! /Accounts({accountId})/PayinPIs/GetCount(NameContains={name})
//! /ResetDataSource
//! ```

/// A parsed resource path. The HTTP method is matched separately by the
/// dispatcher, so one variant can cover e.g. GET/POST on `PayinPIs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ODataPath {
    /// `/Accounts`
    Accounts,
    /// `/Accounts({key})/PayinPIs`
    PayinPis { account_id: i32 },
    /// `/Accounts({accountId})/PayinPIs({paymentInstrumentId})`
    PayinPi {
        account_id: i32,
        payment_instrument_id: i32,
    },
    /// `/Accounts({key})/PayoutPI`
    PayoutPi { account_id: i32 },
    /// `/Accounts({accountId})/PayinPIs/GetCount(NameContains={name})`
    PayinPisCount {
        account_id: i32,
        name_contains: String,
    },
    /// `/ResetDataSource`
    ResetDataSource,
}

/// Parse a request path into an `ODataPath`, or `None` when it matches no
/// declared route shape.
#[must_use]
pub fn parse(path: &str) -> Option<ODataPath> {
    let trimmed = path.strip_prefix('/')?;
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let segments: Vec<&str> = trimmed.split('/').collect();

    match segments.as_slice() {
        ["Accounts"] => Some(ODataPath::Accounts),
        ["ResetDataSource"] => Some(ODataPath::ResetDataSource),
        [account, child] => {
            let account_id = account_key(account)?;
            match *child {
                "PayinPIs" => Some(ODataPath::PayinPis { account_id }),
                "PayoutPI" => Some(ODataPath::PayoutPi { account_id }),
                keyed => {
                    let (name, key) = keyed_segment(keyed)?;
                    if name != "PayinPIs" {
                        return None;
                    }
                    Some(ODataPath::PayinPi {
                        account_id,
                        payment_instrument_id: key.parse().ok()?,
                    })
                }
            }
        }
        [account, "PayinPIs", function] => {
            let account_id = account_key(account)?;
            let name_contains = get_count_argument(function)?;
            Some(ODataPath::PayinPisCount {
                account_id,
                name_contains,
            })
        }
        _ => None,
    }
}

/// Split a `Name(arg)` segment into name and raw argument.
fn keyed_segment(segment: &str) -> Option<(&str, &str)> {
    let open = segment.find('(')?;
    let inner = segment[open..].strip_prefix('(')?.strip_suffix(')')?;
    Some((&segment[..open], inner))
}

/// Extract the integer key from an `Accounts({key})` segment.
fn account_key(segment: &str) -> Option<i32> {
    let (name, key) = keyed_segment(segment)?;
    if name != "Accounts" {
        return None;
    }
    key.parse().ok()
}

/// Parse the bound-function segment `GetCount(NameContains={name})`,
/// optionally namespace-qualified (`Containment.GetCount`) as the
/// original route declared it.
fn get_count_argument(segment: &str) -> Option<String> {
    let (name, args) = keyed_segment(segment)?;
    let name = name.strip_prefix("Containment.").unwrap_or(name);
    if name != "GetCount" {
        return None;
    }
    let value = args.strip_prefix("NameContains=")?;
    Some(unquote(value))
}

/// Strip an OData single-quoted string literal, unescaping doubled
/// quotes. Bare tokens pass through unchanged.
fn unquote(value: &str) -> String {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .map_or_else(|| value.to_string(), |inner| inner.replace("''", "'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_set() {
        assert_eq!(parse("/Accounts"), Some(ODataPath::Accounts));
        assert_eq!(parse("/Accounts/"), Some(ODataPath::Accounts));
    }

    #[test]
    fn test_parse_reset() {
        assert_eq!(parse("/ResetDataSource"), Some(ODataPath::ResetDataSource));
    }

    #[test]
    fn test_parse_nested_collection() {
        assert_eq!(
            parse("/Accounts(100)/PayinPIs"),
            Some(ODataPath::PayinPis { account_id: 100 })
        );
    }

    #[test]
    fn test_parse_nested_keyed_item() {
        assert_eq!(
            parse("/Accounts(100)/PayinPIs(101)"),
            Some(ODataPath::PayinPi {
                account_id: 100,
                payment_instrument_id: 101
            })
        );
    }

    #[test]
    fn test_parse_payout_singleton() {
        assert_eq!(
            parse("/Accounts(100)/PayoutPI"),
            Some(ODataPath::PayoutPi { account_id: 100 })
        );
    }

    #[test]
    fn test_parse_get_count() {
        assert_eq!(
            parse("/Accounts(100)/PayinPIs/GetCount(NameContains='PI')"),
            Some(ODataPath::PayinPisCount {
                account_id: 100,
                name_contains: "PI".to_string()
            })
        );
    }

    #[test]
    fn test_parse_get_count_namespace_qualified() {
        assert_eq!(
            parse("/Accounts(100)/PayinPIs/Containment.GetCount(NameContains='PI')"),
            Some(ODataPath::PayinPisCount {
                account_id: 100,
                name_contains: "PI".to_string()
            })
        );
    }

    #[test]
    fn test_parse_get_count_bare_and_escaped_literals() {
        assert_eq!(
            parse("/Accounts(100)/PayinPIs/GetCount(NameContains=PI)"),
            Some(ODataPath::PayinPisCount {
                account_id: 100,
                name_contains: "PI".to_string()
            })
        );
        assert_eq!(
            parse("/Accounts(100)/PayinPIs/GetCount(NameContains='it''s')"),
            Some(ODataPath::PayinPisCount {
                account_id: 100,
                name_contains: "it's".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(parse("/"), None);
        assert_eq!(parse("/Orders"), None);
        assert_eq!(parse("/Accounts(abc)/PayinPIs"), None);
        assert_eq!(parse("/Accounts(100)"), None);
        assert_eq!(parse("/Accounts(100)/PayoutPI(100)"), None);
        assert_eq!(parse("/Accounts(100)/PayinPIs/GetTotal(NameContains='x')"), None);
        assert_eq!(parse("/Accounts(100)/PayinPIs/GetCount(Name='x')"), None);
        assert_eq!(parse("/Accounts(100)/PayinPIs(101)/extra"), None);
    }
}
