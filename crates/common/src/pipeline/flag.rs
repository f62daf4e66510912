// Per-file directive flag.
//
//   (ignore_flag)        → default configuration
//   no flag key          → skip
//   true / false         → default configuration / skip
//   "name"               → configuration `name`
//   { config, options? } → configuration `config` with file options

use serde_json::{Map, Value};
use thiserror::Error;

use crate::options::OptionsArg;

use super::settings::Settings;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlagError {
    #[error("doctoc [{filename}]: file[{flag}] object must have a 'config' property")]
    MissingConfig { filename: String, flag: String },

    #[error("doctoc [{filename}]: file[{flag}].config must be a string value")]
    ConfigNotString { filename: String, flag: String },

    #[error("doctoc [{filename}]: file[{flag}].options is invalid: {message}")]
    InvalidOptions { filename: String, flag: String, message: String },

    #[error("doctoc [{filename}]: file[{flag}] has an invalid value")]
    InvalidValue { filename: String, flag: String },
}

/// What to do with one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Skip,
    Default,
    Config { config: String, options: Option<OptionsArg> },
}

pub fn resolve_flag(
    filename: &str,
    metadata: &Map<String, Value>,
    settings: &Settings,
) -> Result<FlagValue, FlagError> {
    if settings.ignore_flag {
        return Ok(FlagValue::Default);
    }

    let flag = settings.flag.as_str();
    let Some(value) = metadata.get(flag) else {
        return Ok(FlagValue::Skip);
    };

    match value {
        Value::Bool(true) => Ok(FlagValue::Default),
        Value::Bool(false) => Ok(FlagValue::Skip),
        Value::String(config) => Ok(FlagValue::Config { config: config.clone(), options: None }),
        Value::Object(object) => {
            let config = match object.get("config") {
                None => {
                    return Err(FlagError::MissingConfig {
                        filename: filename.to_string(),
                        flag: flag.to_string(),
                    })
                }
                Some(Value::String(config)) => config.clone(),
                Some(_) => {
                    return Err(FlagError::ConfigNotString {
                        filename: filename.to_string(),
                        flag: flag.to_string(),
                    })
                }
            };
            let options = match object.get("options") {
                None | Some(Value::Null) => None,
                Some(options) => Some(serde_json::from_value(options.clone()).map_err(|error| {
                    FlagError::InvalidOptions {
                        filename: filename.to_string(),
                        flag: flag.to_string(),
                        message: error.to_string(),
                    }
                })?),
            };
            Ok(FlagValue::Config { config, options })
        }
        _ => Err(FlagError::InvalidValue {
            filename: filename.to_string(),
            flag: flag.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionsPatch;
    use serde_json::json;

    fn resolve(metadata: Value, settings: &Settings) -> Result<FlagValue, FlagError> {
        let Value::Object(metadata) = metadata else {
            panic!("metadata must be an object");
        };
        resolve_flag("a.html", &metadata, settings)
    }

    #[test]
    fn missing_flag_skips() {
        assert_eq!(resolve(json!({}), &Settings::default()), Ok(FlagValue::Skip));
    }

    #[test]
    fn boolean_flags() {
        let settings = Settings::default();
        assert_eq!(resolve(json!({ "doctoc": true }), &settings), Ok(FlagValue::Default));
        assert_eq!(resolve(json!({ "doctoc": false }), &settings), Ok(FlagValue::Skip));
    }

    #[test]
    fn ignore_flag_uses_default_for_everything() {
        let settings = Settings { ignore_flag: true, ..Settings::default() };
        assert_eq!(resolve(json!({}), &settings), Ok(FlagValue::Default));
        assert_eq!(resolve(json!({ "doctoc": false }), &settings), Ok(FlagValue::Default));
    }

    #[test]
    fn string_names_a_configuration() {
        assert_eq!(
            resolve(json!({ "doctoc": "shallow" }), &Settings::default()),
            Ok(FlagValue::Config { config: "shallow".into(), options: None })
        );
    }

    #[test]
    fn object_carries_file_options() {
        let value = resolve(
            json!({ "doctoc": { "config": "default", "options": { "id_prefix": "f-" } } }),
            &Settings::default(),
        );
        assert_eq!(
            value,
            Ok(FlagValue::Config {
                config: "default".into(),
                options: Some(OptionsArg::Fields(OptionsPatch {
                    id_prefix: Some("f-".into()),
                    ..OptionsPatch::default()
                })),
            })
        );
    }

    #[test]
    fn object_options_may_be_a_range() {
        let flag = json!({ "doctoc": { "config": "x", "options": "h2-3" } });
        assert_eq!(
            resolve(flag, &Settings::default()),
            Ok(FlagValue::Config {
                config: "x".into(),
                options: Some(OptionsArg::Range("h2-3".into())),
            })
        );
    }

    #[test]
    fn custom_flag_key() {
        let settings = Settings { flag: "toc".into(), ..Settings::default() };
        assert_eq!(resolve(json!({ "doctoc": true }), &settings), Ok(FlagValue::Skip));
        assert_eq!(resolve(json!({ "toc": true }), &settings), Ok(FlagValue::Default));
    }

    #[test]
    fn object_without_config_is_rejected() {
        let error = resolve(json!({ "doctoc": { "options": {} } }), &Settings::default());
        assert_eq!(
            error,
            Err(FlagError::MissingConfig { filename: "a.html".into(), flag: "doctoc".into() })
        );
    }

    #[test]
    fn non_string_config_is_rejected() {
        let error = resolve(json!({ "doctoc": { "config": 3 } }), &Settings::default());
        assert!(matches!(error, Err(FlagError::ConfigNotString { .. })));
    }

    #[test]
    fn malformed_options_are_rejected() {
        let error =
            resolve(json!({ "doctoc": { "config": "x", "options": 12 } }), &Settings::default());
        assert!(matches!(error, Err(FlagError::InvalidOptions { .. })));
    }

    #[test]
    fn other_shapes_are_rejected() {
        for value in [json!(1), json!(null), json!(["x"])] {
            let error = resolve(json!({ "doctoc": value }), &Settings::default());
            assert_eq!(
                error,
                Err(FlagError::InvalidValue { filename: "a.html".into(), flag: "doctoc".into() })
            );
        }
    }
}
