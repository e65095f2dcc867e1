/// Request body validation
///
/// Checks decoded JSON bodies against per-operation field schemas before a
/// typed resource is built, then checks the values themselves.
use crate::{
    error::{MockError, MockResult},
    store::{IndexSet, StreamPatch, StreamRule, User},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::ValidateEmail;

/// Field schema for one operation
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    /// Request type named in error messages
    pub resource: &'static str,
    /// Must be present, not null and not an empty string
    pub required: &'static [&'static str],
    /// May be present
    pub allowed: &'static [&'static str],
    /// Partial updates: only these keys are kept, anything else is dropped
    pub accepted: Option<&'static [&'static str]>,
}

pub const USER_CREATE: FieldRules = FieldRules {
    resource: "CreateUserRequest",
    required: &["username", "email", "permissions", "full_name", "password"],
    allowed: &["startpage", "timezone", "session_timeout_ms", "roles"],
    accepted: None,
};

pub const USER_UPDATE: FieldRules = FieldRules {
    resource: "ChangeUserRequest",
    required: &[],
    allowed: &[],
    accepted: Some(&[
        "email",
        "permissions",
        "full_name",
        "password",
        "timezone",
        "session_timeout_ms",
        "startpage",
        "roles",
    ]),
};

pub const ROLE: FieldRules = FieldRules {
    resource: "RoleResponse",
    required: &["name", "permissions"],
    allowed: &["description"],
    accepted: None,
};

const INDEX_SET_OPTIONAL: &[&str] = &[
    "id",
    "description",
    "writable",
    "default",
    "shards",
    "replicas",
    "retention_strategy_class",
    "retention_strategy",
    "creation_date",
    "index_analyzer",
    "index_optimization_max_num_segments",
    "index_optimization_disabled",
    "field_type_refresh_interval",
];

pub const INDEX_SET: FieldRules = FieldRules {
    resource: "IndexSetSummary",
    required: &[
        "title",
        "index_prefix",
        "rotation_strategy_class",
        "rotation_strategy",
    ],
    allowed: INDEX_SET_OPTIONAL,
    accepted: None,
};

pub const STREAM_CREATE: FieldRules = FieldRules {
    resource: "CreateStreamRequest",
    required: &["title", "index_set_id"],
    allowed: &[
        "id",
        "description",
        "rules",
        "matching_type",
        "remove_matches_from_default_stream",
    ],
    accepted: None,
};

pub const STREAM_UPDATE: FieldRules = FieldRules {
    resource: "UpdateStreamRequest",
    required: &[],
    allowed: &[],
    accepted: Some(&[
        "title",
        "description",
        "index_set_id",
        "matching_type",
        "remove_matches_from_default_stream",
    ]),
};

pub const STREAM_RULE: FieldRules = FieldRules {
    resource: "CreateStreamRuleRequest",
    required: &["field", "type"],
    allowed: &["value", "inverted", "description"],
    accepted: None,
};

pub const INPUT_CREATE: FieldRules = FieldRules {
    resource: "InputCreateRequest",
    required: &["title", "type", "configuration"],
    allowed: &["id", "global", "node"],
    accepted: None,
};

pub const INPUT_UPDATE: FieldRules = FieldRules {
    resource: "InputCreateRequest",
    required: &["title", "type", "configuration"],
    allowed: &["global", "node"],
    accepted: None,
};

/// Resource ids are MongoDB ObjectIds rendered as hex
const OBJECT_ID_LEN: usize = 24;

/// Highest stream rule type (ALWAYS_MATCH=7, MATCH_INPUT=8)
const MAX_STREAM_RULE_TYPE: u8 = 8;

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Check a request body against a field schema
pub fn validate_body(body: Value, rules: &FieldRules) -> MockResult<Map<String, Value>> {
    let mut fields = match body {
        Value::Object(fields) => fields,
        _ => {
            return Err(MockError::Validation(format!(
                "Can not construct instance of {}: request body must be a JSON object",
                rules.resource
            )))
        }
    };

    match rules.accepted {
        Some(accepted) => fields.retain(|key, _| accepted.contains(&key.as_str())),
        None => {
            if let Some(unknown) = fields
                .keys()
                .find(|key| !rules.required.contains(&key.as_str()) && !rules.allowed.contains(&key.as_str()))
            {
                return Err(MockError::Validation(format!(
                    "Unrecognized field \"{}\" (class {}), not marked as ignorable",
                    unknown, rules.resource
                )));
            }
        }
    }

    for field in rules.required {
        if fields.get(*field).map_or(true, is_blank) {
            return Err(MockError::Validation(format!(
                "Can not construct instance of {}, problem: Null {}",
                rules.resource, field
            )));
        }
    }

    Ok(fields)
}

/// Build a typed value from validated fields
pub fn decode<T: DeserializeOwned>(fields: Map<String, Value>, rules: &FieldRules) -> MockResult<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        MockError::Validation(format!(
            "Can not construct instance of {}, problem: {}",
            rules.resource, e
        ))
    })
}

/// Validate and decode in one step
pub fn parse<T: DeserializeOwned>(body: Value, rules: &FieldRules) -> MockResult<T> {
    decode(validate_body(body, rules)?, rules)
}

pub fn check_email(email: &str) -> MockResult<()> {
    if !email.validate_email() {
        return Err(MockError::Validation(format!(
            "Invalid email address: {}",
            email
        )));
    }
    Ok(())
}

/// A caller-supplied id must look like a server-generated one; empty means
/// "generate one"
pub fn check_explicit_id(id: &str) -> MockResult<()> {
    if id.is_empty() || (id.len() == OBJECT_ID_LEN && id.chars().all(|c| c.is_ascii_hexdigit())) {
        return Ok(());
    }
    Err(MockError::Validation(format!(
        "Invalid ObjectId: \"{}\" must be {} hexadecimal characters",
        id, OBJECT_ID_LEN
    )))
}

pub fn check_user(user: &User) -> MockResult<()> {
    check_email(&user.email)
}

/// Index prefixes become index names, so they follow index naming rules
pub fn check_index_prefix(prefix: &str) -> MockResult<()> {
    let mut chars = prefix.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first.is_ascii_digit() => chars
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '+' | '-')),
        _ => false,
    };

    if !valid {
        return Err(MockError::Validation(format!(
            "Index prefix \"{}\" must start with a letter or number, and can only contain lowercase letters, numbers, '_', '-' and '+'",
            prefix
        )));
    }
    Ok(())
}

pub fn check_index_set(index_set: &IndexSet) -> MockResult<()> {
    check_explicit_id(&index_set.id)?;
    check_index_prefix(&index_set.index_prefix)?;

    if index_set.shards == 0 {
        return Err(MockError::Validation(
            "Index set must have at least one shard".to_string(),
        ));
    }
    if index_set.index_optimization_max_num_segments == 0 {
        return Err(MockError::Validation(
            "index_optimization_max_num_segments must be at least 1".to_string(),
        ));
    }
    if !index_set.rotation_strategy.is_object() {
        return Err(MockError::Validation(
            "rotation_strategy must be a JSON object".to_string(),
        ));
    }
    if !index_set.retention_strategy.is_object() {
        return Err(MockError::Validation(
            "retention_strategy must be a JSON object".to_string(),
        ));
    }
    Ok(())
}

pub fn check_stream_rule(rule: &StreamRule) -> MockResult<()> {
    if rule.rule_type == 0 || rule.rule_type > MAX_STREAM_RULE_TYPE {
        return Err(MockError::Validation(format!(
            "Unknown stream rule type {}",
            rule.rule_type
        )));
    }
    Ok(())
}

pub fn check_stream_patch(patch: &StreamPatch) -> MockResult<()> {
    if matches!(patch.title.as_deref(), Some("")) {
        return Err(MockError::Validation(format!(
            "Can not construct instance of {}, problem: Null title",
            STREAM_UPDATE.resource
        )));
    }
    Ok(())
}
