use std::fmt;

use serde_json::{Map, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::MessageError;
use crate::fields::Fields;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MessageKind {
    Page,
    Identify,
    Group,
    Track,
    Alias,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::Page,
        MessageKind::Identify,
        MessageKind::Group,
        MessageKind::Track,
        MessageKind::Alias,
    ];

    /// The facade action name, also used as the wire `type`.
    pub fn action(self) -> &'static str {
        match self {
            MessageKind::Page => "page",
            MessageKind::Identify => "identify",
            MessageKind::Group => "group",
            MessageKind::Track => "track",
            MessageKind::Alias => "alias",
        }
    }

    pub fn from_action(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.action() == action)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

/// An inbound analytics call. The payload is the facade's JSON form, untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Page(Fields),
    Identify(Fields),
    Group(Fields),
    Track(Fields),
    Alias(Fields),
}

impl Message {
    pub fn new(kind: MessageKind, fields: Fields) -> Self {
        match kind {
            MessageKind::Page => Message::Page(fields),
            MessageKind::Identify => Message::Identify(fields),
            MessageKind::Group => Message::Group(fields),
            MessageKind::Track => Message::Track(fields),
            MessageKind::Alias => Message::Alias(fields),
        }
    }

    /// Builds a message from a JSON object whose `type` names the kind.
    pub fn from_json(value: Value) -> Result<Self, MessageError> {
        let Value::Object(fields) = value else {
            return Err(MessageError::NotAnObject);
        };
        let action = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or(MessageError::MissingType)?;
        let kind = MessageKind::from_action(action)
            .ok_or_else(|| MessageError::UnsupportedType(action.to_string()))?;
        Ok(Self::new(kind, fields))
    }

    pub fn page(
        category: Option<&str>,
        name: Option<&str>,
        properties: Option<Fields>,
        options: Option<Fields>,
    ) -> Self {
        let mut fields = base_fields(MessageKind::Page, options);
        put_str(&mut fields, "category", category);
        put_str(&mut fields, "name", name);
        put_object(&mut fields, "properties", Some(properties.unwrap_or_default()));
        Message::Page(fields)
    }

    pub fn identify(user_id: Option<&str>, traits: Option<Fields>, options: Option<Fields>) -> Self {
        let mut fields = base_fields(MessageKind::Identify, options);
        put_str(&mut fields, "userId", user_id);
        put_object(&mut fields, "traits", Some(traits.unwrap_or_default()));
        Message::Identify(fields)
    }

    pub fn group(group_id: &str, traits: Option<Fields>, options: Option<Fields>) -> Self {
        let mut fields = base_fields(MessageKind::Group, options);
        put_str(&mut fields, "groupId", Some(group_id));
        put_object(&mut fields, "traits", Some(traits.unwrap_or_default()));
        Message::Group(fields)
    }

    pub fn track(event: &str, properties: Option<Fields>, options: Option<Fields>) -> Self {
        let mut fields = base_fields(MessageKind::Track, options);
        put_str(&mut fields, "event", Some(event));
        put_object(&mut fields, "properties", Some(properties.unwrap_or_default()));
        Message::Track(fields)
    }

    /// `to` becomes the new user id; `from` is the id being replaced.
    pub fn alias(to: &str, from: Option<&str>, options: Option<Fields>) -> Self {
        let mut fields = base_fields(MessageKind::Alias, options);
        put_str(&mut fields, "to", Some(to));
        put_str(&mut fields, "from", from);
        Message::Alias(fields)
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Page(_) => MessageKind::Page,
            Message::Identify(_) => MessageKind::Identify,
            Message::Group(_) => MessageKind::Group,
            Message::Track(_) => MessageKind::Track,
            Message::Alias(_) => MessageKind::Alias,
        }
    }

    pub fn fields(&self) -> &Fields {
        match self {
            Message::Page(fields)
            | Message::Identify(fields)
            | Message::Group(fields)
            | Message::Track(fields)
            | Message::Alias(fields) => fields,
        }
    }

    pub fn into_fields(self) -> Fields {
        match self {
            Message::Page(fields)
            | Message::Identify(fields)
            | Message::Group(fields)
            | Message::Track(fields)
            | Message::Alias(fields) => fields,
        }
    }
}

fn base_fields(kind: MessageKind, options: Option<Fields>) -> Fields {
    let mut fields = Map::new();
    fields.insert("type".to_string(), Value::from(kind.action()));
    if let Some(timestamp) = now_rfc3339() {
        fields.insert("timestamp".to_string(), Value::String(timestamp));
    }
    put_object(&mut fields, "options", options);
    fields
}

fn put_str(fields: &mut Fields, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), Value::from(value));
    }
}

fn put_object(fields: &mut Fields, key: &str, value: Option<Fields>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), Value::Object(value));
    }
}

fn now_rfc3339() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}
