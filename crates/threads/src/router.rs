use serde_json::Value;
use threads_messages::{first_truthy, Fields, Message, MessageKind, UserIdentity};

/// Collector path for each message kind.
pub fn endpoint(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Page => "/p",
        MessageKind::Identify => "/i",
        MessageKind::Group => "/g",
        MessageKind::Track => "/t",
        MessageKind::Alias => "/a",
    }
}

/// A message shaped for its endpoint, ready for normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub kind: MessageKind,
    pub path: &'static str,
    pub fields: Fields,
}

pub fn route(message: Message, user: &UserIdentity) -> Routed {
    let kind = message.kind();
    let fields = match message {
        Message::Page(fields) | Message::Identify(fields) | Message::Group(fields) => fields,
        Message::Track(mut fields) => {
            // The collector has always received track calls without traits.
            fields.remove("traits");
            fields
        }
        Message::Alias(fields) => shape_alias(fields, user),
    };
    Routed {
        kind,
        path: endpoint(kind),
        fields,
    }
}

fn shape_alias(mut fields: Fields, user: &UserIdentity) -> Fields {
    let previous_id = first_truthy(&fields, &["previousId", "from"])
        .or_else(|| user.id().map(Value::from))
        .unwrap_or_else(|| Value::from(user.anonymous_id.as_str()));
    fields.insert("previousId".to_string(), previous_id);

    if let Some(user_id) = first_truthy(&fields, &["userId", "to"]) {
        fields.insert("userId".to_string(), user_id);
    }

    fields.remove("from");
    fields.remove("to");
    fields
}
