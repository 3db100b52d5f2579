use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::InputError;
use crate::models::message::Message;
use crate::models::request::{AgentCoordinates, RunRequest, ToolChoice};

pub const DATABASE_ENV: &str = "CORTEX_AGENT_DATABASE";
pub const DATABASE_FALLBACK_ENV: &str = "SNOWFLAKE_DATABASE";
pub const SCHEMA_ENV: &str = "CORTEX_AGENT_SCHEMA";
pub const SCHEMA_FALLBACK_ENV: &str = "SNOWFLAKE_SCHEMA";
pub const AGENT_NAME_ENV: &str = "CORTEX_AGENT_NAME";
pub const MESSAGES_ENV: &str = "CORTEX_AGENT_MESSAGES";
pub const MESSAGE_ENV: &str = "CORTEX_AGENT_MESSAGE";
pub const THREAD_ID_ENV: &str = "CORTEX_AGENT_THREAD_ID";
pub const PARENT_MESSAGE_ID_ENV: &str = "CORTEX_AGENT_PARENT_MESSAGE_ID";
pub const TOOL_CHOICE_ENV: &str = "CORTEX_AGENT_TOOL_CHOICE";
pub const PERSIST_RESULTS_ENV: &str = "CORTEX_AGENT_PERSIST_RESULTS";
pub const PERSIST_DIR_ENV: &str = "CORTEX_AGENT_PERSIST_DIR";

pub const DEFAULT_PERSIST_DIR: &str = "cortex-agent-results";

/// Read access to environment variables
pub trait EnvLookup {
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the running process
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Returns the first candidate that is not blank, trimmed.
pub fn first_non_blank<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(|candidate| candidate.trim().to_string())
        .find(|candidate| !candidate.is_empty())
}

/// Raw inputs as passed explicitly on the command line. Every field is
/// optional; missing ones fall back to the environment.
#[derive(Debug, Clone, Default)]
pub struct ActionInputs {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub agent_name: Option<String>,
    pub messages: Option<String>,
    pub message: Option<String>,
    pub thread_id: Option<String>,
    pub parent_message_id: Option<String>,
    pub tool_choice: Option<String>,
    pub persist_results: Option<String>,
    pub persist_dir: Option<String>,
}

/// Validated configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub request: RunRequest,
    pub persist: bool,
    pub persist_dir: PathBuf,
}

impl ActionInputs {
    pub fn resolve(&self, env: &impl EnvLookup) -> Result<RunConfig, InputError> {
        let coordinates = self.resolve_coordinates(env)?;
        let messages = resolve_messages(
            pick(&self.messages, &[MESSAGES_ENV], env),
            pick(&self.message, &[MESSAGE_ENV], env),
        )?;
        let thread_id = parse_optional_int(
            "thread_id",
            pick(&self.thread_id, &[THREAD_ID_ENV], env),
        )?;
        let parent_message_id = parse_optional_int(
            "parent_message_id",
            pick(&self.parent_message_id, &[PARENT_MESSAGE_ID_ENV], env),
        )?;
        let tool_choice = parse_tool_choice(pick(&self.tool_choice, &[TOOL_CHOICE_ENV], env))?;

        let persist = parse_bool(
            pick(&self.persist_results, &[PERSIST_RESULTS_ENV], env).as_deref(),
        );
        let persist_dir = pick(&self.persist_dir, &[PERSIST_DIR_ENV], env)
            .unwrap_or_else(|| DEFAULT_PERSIST_DIR.to_string());

        Ok(RunConfig {
            request: RunRequest {
                coordinates,
                messages,
                thread_id,
                parent_message_id,
                tool_choice,
            },
            persist,
            persist_dir: PathBuf::from(persist_dir),
        })
    }

    pub fn resolve_coordinates(
        &self,
        env: &impl EnvLookup,
    ) -> Result<AgentCoordinates, InputError> {
        let database = pick(&self.database, &[DATABASE_ENV, DATABASE_FALLBACK_ENV], env)
            .ok_or(InputError::MissingField("database"))?;
        let schema = pick(&self.schema, &[SCHEMA_ENV, SCHEMA_FALLBACK_ENV], env)
            .ok_or(InputError::MissingField("schema"))?;
        let agent_name = pick(&self.agent_name, &[AGENT_NAME_ENV], env)
            .ok_or(InputError::MissingField("agent_name"))?;

        Ok(AgentCoordinates {
            database,
            schema,
            agent_name,
        })
    }
}

fn pick(explicit: &Option<String>, env_keys: &[&str], env: &impl EnvLookup) -> Option<String> {
    first_non_blank(
        std::iter::once(explicit.clone()).chain(env_keys.iter().map(|key| env.var(key))),
    )
}

/// Parses a JSON message history, or wraps a single prompt as a user message.
pub fn resolve_messages(
    raw_messages: Option<String>,
    message: Option<String>,
) -> Result<Vec<Message>, InputError> {
    if let Some(raw) = first_non_blank([raw_messages]) {
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| InputError::InvalidMessages(e.to_string()))?;
        if !value.is_array() {
            return Err(InputError::MessagesNotArray);
        }
        let messages: Vec<Message> = serde_json::from_value(value)
            .map_err(|e| InputError::InvalidMessages(e.to_string()))?;
        if messages.is_empty() {
            return Err(InputError::EmptyMessages);
        }
        return Ok(messages);
    }

    let text = first_non_blank([message]).ok_or(InputError::MissingMessages)?;
    Ok(vec![Message::user_text(text)])
}

/// Blank means absent. Fractional values are floored; values outside the
/// `i64` range are rejected.
pub fn parse_optional_int(
    field: &'static str,
    raw: Option<String>,
) -> Result<Option<i64>, InputError> {
    let Some(raw) = first_non_blank([raw]) else {
        return Ok(None);
    };

    // i64::MAX as f64 rounds up to 2^63, hence the exclusive upper bound
    let in_range = |n: f64| n >= i64::MIN as f64 && n < i64::MAX as f64;
    match raw.parse::<f64>().map(f64::floor) {
        Ok(number) if number.is_finite() && in_range(number) => Ok(Some(number as i64)),
        _ => Err(InputError::InvalidInteger { field, value: raw }),
    }
}

pub fn parse_tool_choice(raw: Option<String>) -> Result<Option<ToolChoice>, InputError> {
    let Some(raw) = first_non_blank([raw]) else {
        return Ok(None);
    };

    if !raw.starts_with('{') {
        return Ok(Some(ToolChoice::shorthand(raw)));
    }

    serde_json::from_str::<Map<String, Value>>(&raw)
        .map(|map| Some(ToolChoice(map)))
        .map_err(|e| InputError::InvalidToolChoice(e.to_string()))
}

pub fn parse_bool(raw: Option<&str>) -> bool {
    raw.map(|value| {
        let value = value.trim();
        ["true", "1", "yes"]
            .iter()
            .any(|truthy| value.eq_ignore_ascii_case(truthy))
    })
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn explicit_coordinates() -> ActionInputs {
        ActionInputs {
            database: Some("EXPLICIT_DB".to_string()),
            schema: Some("EXPLICIT_SCHEMA".to_string()),
            agent_name: Some("explicit_agent".to_string()),
            message: Some("hello".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_non_blank() {
        assert_eq!(
            first_non_blank([None, Some("  ".to_string()), Some(" x ".to_string())]),
            Some("x".to_string())
        );
        assert_eq!(first_non_blank([None, Some("\t".to_string())]), None);
    }

    #[test]
    fn test_explicit_coordinates_override_env() {
        let env = env_map(&[
            (DATABASE_ENV, "ENV_DB"),
            (SCHEMA_ENV, "ENV_SCHEMA"),
            (AGENT_NAME_ENV, "env_agent"),
        ]);

        let coordinates = explicit_coordinates().resolve_coordinates(&env).unwrap();
        assert_eq!(coordinates.database, "EXPLICIT_DB");
        assert_eq!(coordinates.schema, "EXPLICIT_SCHEMA");
        assert_eq!(coordinates.agent_name, "explicit_agent");
    }

    #[test]
    fn test_coordinates_fall_back_through_env_chain() {
        let env = env_map(&[
            (DATABASE_ENV, "   "),
            (DATABASE_FALLBACK_ENV, " SNOW_DB "),
            (SCHEMA_ENV, "PRIMARY_SCHEMA"),
            (SCHEMA_FALLBACK_ENV, "SECONDARY_SCHEMA"),
            (AGENT_NAME_ENV, "agent"),
        ]);
        let inputs = ActionInputs {
            database: Some("".to_string()),
            ..Default::default()
        };

        let coordinates = inputs.resolve_coordinates(&env).unwrap();
        assert_eq!(coordinates.database, "SNOW_DB");
        assert_eq!(coordinates.schema, "PRIMARY_SCHEMA");
        assert_eq!(coordinates.agent_name, "agent");
    }

    #[test]
    fn test_missing_coordinates_name_the_field() {
        let env = env_map(&[(DATABASE_ENV, "DB"), (SCHEMA_ENV, " ")]);
        let err = ActionInputs::default()
            .resolve_coordinates(&env)
            .unwrap_err();
        assert_eq!(err, InputError::MissingField("schema"));

        let env = env_map(&[(DATABASE_ENV, "DB"), (SCHEMA_ENV, "S")]);
        let err = ActionInputs::default()
            .resolve_coordinates(&env)
            .unwrap_err();
        assert!(err.to_string().contains("agent_name"));

        // The agent name has no secondary fallback
        let err = ActionInputs::default()
            .resolve_coordinates(&HashMap::<String, String>::new())
            .unwrap_err();
        assert_eq!(err, InputError::MissingField("database"));
    }

    #[test]
    fn test_messages_json_takes_precedence_over_message() {
        let raw = r#"[{"role":"user","content":[{"type":"text","text":"hi"}]}]"#;
        let messages =
            resolve_messages(Some(raw.to_string()), Some("ignored".to_string())).unwrap();
        assert_eq!(messages, vec![Message::user_text("hi")]);
    }

    #[test]
    fn test_messages_keep_extra_keys() {
        let raw = r#"[{"role":"user","content":[{"type":"text","text":"hi"}],"name":"alice"}]"#;
        let messages = resolve_messages(Some(raw.to_string()), None).unwrap();

        assert_eq!(
            serde_json::to_value(&messages).unwrap(),
            json!([{"role": "user", "content": [{"type": "text", "text": "hi"}], "name": "alice"}])
        );
    }

    #[test]
    fn test_single_message_is_wrapped_as_user_text() {
        let messages = resolve_messages(Some("  ".to_string()), Some("what's up".to_string()))
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content[0].as_text(), Some("what's up"));
    }

    #[test]
    fn test_message_errors() {
        assert_eq!(
            resolve_messages(None, Some(" ".to_string())).unwrap_err(),
            InputError::MissingMessages
        );
        assert_eq!(
            resolve_messages(Some(r#"{"role":"user"}"#.to_string()), None).unwrap_err(),
            InputError::MessagesNotArray
        );
        assert_eq!(
            resolve_messages(Some("[]".to_string()), None).unwrap_err(),
            InputError::EmptyMessages
        );
        assert!(matches!(
            resolve_messages(Some("[{".to_string()), None).unwrap_err(),
            InputError::InvalidMessages(_)
        ));
    }

    #[test]
    fn test_parse_optional_int() {
        assert_eq!(parse_optional_int("thread_id", Some("3.9".to_string())), Ok(Some(3)));
        assert_eq!(parse_optional_int("thread_id", Some("-1.5".to_string())), Ok(Some(-2)));
        assert_eq!(parse_optional_int("thread_id", Some(" 42 ".to_string())), Ok(Some(42)));
        assert_eq!(parse_optional_int("thread_id", Some("".to_string())), Ok(None));
        assert_eq!(parse_optional_int("thread_id", None), Ok(None));
        assert_eq!(
            parse_optional_int("thread_id", Some("abc".to_string())),
            Err(InputError::InvalidInteger {
                field: "thread_id",
                value: "abc".to_string()
            })
        );
        assert!(parse_optional_int("thread_id", Some("NaN".to_string())).is_err());
    }

    #[test]
    fn test_parse_optional_int_rejects_out_of_range() {
        for huge in ["1e30", "-1e30", "9223372036854775808"] {
            assert_eq!(
                parse_optional_int("parent_message_id", Some(huge.to_string())),
                Err(InputError::InvalidInteger {
                    field: "parent_message_id",
                    value: huge.to_string()
                })
            );
        }
        assert_eq!(
            parse_optional_int("parent_message_id", Some("-9223372036854775808".to_string())),
            Ok(Some(i64::MIN))
        );
    }

    #[test]
    fn test_parse_tool_choice() {
        let shorthand = parse_tool_choice(Some("auto".to_string())).unwrap().unwrap();
        assert_eq!(serde_json::to_value(&shorthand).unwrap(), json!({"type": "auto"}));

        let object = parse_tool_choice(Some(r#"{"type":"auto","name":["X"]}"#.to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&object).unwrap(),
            json!({"type": "auto", "name": ["X"]})
        );

        assert_eq!(parse_tool_choice(Some("  ".to_string())), Ok(None));
        assert!(matches!(
            parse_tool_choice(Some("{type: auto".to_string())),
            Err(InputError::InvalidToolChoice(_))
        ));
        assert!(matches!(
            parse_tool_choice(Some(r#"{"type":"auto"} trailing"#.to_string())),
            Err(InputError::InvalidToolChoice(_))
        ));
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "TRUE", "1", "Yes", " yes "] {
            assert!(parse_bool(Some(truthy)), "{truthy} should be true");
        }
        for falsy in ["false", "0", "no", "", "on"] {
            assert!(!parse_bool(Some(falsy)), "{falsy} should be false");
        }
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_resolve_full_config() {
        let env = env_map(&[
            (THREAD_ID_ENV, "12"),
            (PARENT_MESSAGE_ID_ENV, "0"),
            (TOOL_CHOICE_ENV, "required"),
            (PERSIST_RESULTS_ENV, "yes"),
        ]);

        let config = explicit_coordinates().resolve(&env).unwrap();
        assert_eq!(config.request.thread_id, Some(12));
        assert_eq!(config.request.parent_message_id, Some(0));
        assert_eq!(
            config.request.tool_choice,
            Some(ToolChoice::shorthand("required"))
        );
        assert!(config.persist);
        assert_eq!(config.persist_dir, PathBuf::from(DEFAULT_PERSIST_DIR));
    }

    #[test]
    #[serial]
    fn test_resolve_from_process_env() {
        std::env::set_var(DATABASE_FALLBACK_ENV, "PROC_DB");
        std::env::set_var(SCHEMA_ENV, "PROC_SCHEMA");
        std::env::set_var(AGENT_NAME_ENV, "proc_agent");
        std::env::set_var(MESSAGE_ENV, "from env");

        let config = ActionInputs::default().resolve(&ProcessEnv);

        std::env::remove_var(DATABASE_FALLBACK_ENV);
        std::env::remove_var(SCHEMA_ENV);
        std::env::remove_var(AGENT_NAME_ENV);
        std::env::remove_var(MESSAGE_ENV);

        let config = config.unwrap();
        assert_eq!(config.request.coordinates.database, "PROC_DB");
        assert_eq!(config.request.coordinates.schema, "PROC_SCHEMA");
        assert_eq!(config.request.messages, vec![Message::user_text("from env")]);
        assert!(!config.persist);
    }
}
