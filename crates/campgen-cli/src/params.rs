use std::path::PathBuf;

use campgen_store::StoreOptions;

/// Run parameters resolved from `key=value` tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub store: StoreOptions,
    /// Overrides the plan's scaling factor when present.
    pub scaling_factor: Option<u32>,
    /// Overrides the plan's seed when present.
    pub seed: Option<u64>,
    pub plan: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub report: PathBuf,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            store: StoreOptions::default(),
            scaling_factor: None,
            seed: None,
            plan: None,
            out_dir: PathBuf::from("runs"),
            report: PathBuf::from("campaigns.html"),
        }
    }
}

impl Params {
    /// True when rows only go to the CSV artifacts.
    pub fn csv_only(&self) -> bool {
        self.store.instance == "csv"
    }
}

/// Why a token was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not exactly one `=`.
    Malformed,
    UnknownKey,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::UnknownKey => "unknown_key",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedToken {
    pub token: String,
    pub reason: SkipReason,
}

/// A known key whose value does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidParam {
    pub key: String,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedParams {
    pub params: Params,
    pub skipped: Vec<SkippedToken>,
}

/// Resolve `key=value` tokens over the defaults. Later tokens win.
pub fn parse_params<I, S>(tokens: I) -> Result<ParsedParams, InvalidParam>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedParams::default();

    for token in tokens {
        let token = token.as_ref();
        let mut parts = token.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            parsed.skipped.push(SkippedToken {
                token: token.to_string(),
                reason: SkipReason::Malformed,
            });
            continue;
        };

        let params = &mut parsed.params;
        match key.trim() {
            "instance" => params.store.instance = value.to_string(),
            "host" => params.store.host = value.to_string(),
            "port" => params.store.port = parse_value(key, value, "a port number")?,
            "database" => params.store.database = value.to_string(),
            "user" => params.store.user = value.to_string(),
            "password" => params.store.password = value.to_string(),
            "scaling-factor" => {
                params.scaling_factor = Some(parse_value(key, value, "a positive integer")?)
            }
            "seed" => params.seed = Some(parse_seed(key, value)?),
            "plan" => params.plan = Some(PathBuf::from(value)),
            "out-dir" => params.out_dir = PathBuf::from(value),
            "report" => params.report = PathBuf::from(value),
            _ => parsed.skipped.push(SkippedToken {
                token: token.to_string(),
                reason: SkipReason::UnknownKey,
            }),
        }
    }

    Ok(parsed)
}

/// Negative seeds keep their two's complement bits, so `seed=-1` is
/// `u64::MAX`.
fn parse_seed(key: &str, value: &str) -> Result<u64, InvalidParam> {
    let trimmed = value.trim();
    trimmed
        .parse::<u64>()
        .or_else(|_| trimmed.parse::<i64>().map(|seed| seed as u64))
        .map_err(|_| InvalidParam {
            key: key.to_string(),
            value: value.to_string(),
            expected: "an integer",
        })
}

fn parse_value<T: std::str::FromStr>(
    key: &str,
    value: &str,
    expected: &'static str,
) -> Result<T, InvalidParam> {
    value.trim().parse().map_err(|_| InvalidParam {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_tokens() {
        let parsed = parse_params(Vec::<String>::new()).expect("parse");

        assert_eq!(parsed.params, Params::default());
        assert_eq!(parsed.params.store.instance, "postgres");
        assert_eq!(parsed.params.store.port, 5432);
        assert_eq!(parsed.params.store.database, "meta_db");
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn known_keys_override_defaults() {
        let parsed = parse_params([
            "host=db.internal",
            "port=6543",
            "user=bench",
            "password=pw",
            "scaling-factor=4",
            "seed=99",
            "out-dir=/tmp/out",
            "report=campaigns.md",
        ])
        .expect("parse");

        let params = parsed.params;
        assert_eq!(params.store.host, "db.internal");
        assert_eq!(params.store.port, 6543);
        assert_eq!(params.store.user, "bench");
        assert_eq!(params.store.password, "pw");
        assert_eq!(params.scaling_factor, Some(4));
        assert_eq!(params.seed, Some(99));
        assert_eq!(params.out_dir, PathBuf::from("/tmp/out"));
        assert_eq!(params.report, PathBuf::from("campaigns.md"));
    }

    #[test]
    fn malformed_and_unknown_tokens_are_skipped() {
        let parsed = parse_params(["seed", "a=b=c", "colour=blue", "seed=3"]).expect("parse");

        assert_eq!(parsed.params.seed, Some(3));
        let reasons: Vec<SkipReason> = parsed.skipped.iter().map(|skip| skip.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::Malformed,
                SkipReason::Malformed,
                SkipReason::UnknownKey
            ]
        );
    }

    #[test]
    fn empty_password_is_allowed() {
        let parsed = parse_params(["password="]).expect("parse");
        assert_eq!(parsed.params.store.password, "");
    }

    #[test]
    fn unparsable_value_of_known_key_is_an_error() {
        let err = parse_params(["port=fifty"]).expect_err("bad port");
        assert_eq!(err.key, "port");
        assert_eq!(err.value, "fifty");

        assert!(parse_params(["seed=one"]).is_err());
    }

    #[test]
    fn negative_seed_is_reinterpreted() {
        let parsed = parse_params(["seed=-5"]).expect("parse");
        assert_eq!(parsed.params.seed, Some(-5_i64 as u64));

        let parsed = parse_params(["seed=-1"]).expect("parse");
        assert_eq!(parsed.params.seed, Some(u64::MAX));

        let parsed = parse_params(["seed=18446744073709551615"]).expect("parse");
        assert_eq!(parsed.params.seed, Some(u64::MAX));
    }

    #[test]
    fn csv_instance_skips_the_store() {
        let parsed = parse_params(["instance=csv"]).expect("parse");
        assert!(parsed.params.csv_only());
    }
}
