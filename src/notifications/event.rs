//! Notification event delivered by the event source.

use serde::Deserialize;

/// A notification posted by another application.
///
/// Only the source identifier and the title take part in matching. Any other
/// field present on the wire (body, timestamp, ...) is ignored when decoding.
///
/// # Wire format
///
/// ```json
/// {"source_id": "org.telegram.messenger", "title": "Message from Boss"}
/// ```
///
/// `sourceId` and `package` are accepted as aliases of `source_id`, and a
/// missing title decodes as an empty one.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Identifier of the posting application, e.g. `org.telegram.messenger`.
    #[serde(alias = "sourceId", alias = "package")]
    pub source_id: String,
    /// Notification title, usually the contact or group name.
    #[serde(default)]
    pub title: String,
}

impl NotificationEvent {
    pub fn new(source_id: &str, title: &str) -> Self {
        NotificationEvent {
            source_id: source_id.to_owned(),
            title: title.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_body() {
        let event: NotificationEvent = serde_json::from_str(
            r#"{"source_id": "com.whatsapp", "title": "Mom", "body": "call me"}"#,
        )
        .unwrap();

        assert_eq!(event, NotificationEvent::new("com.whatsapp", "Mom"));
    }

    #[test]
    fn test_decode_accepts_aliases() {
        let camel: NotificationEvent =
            serde_json::from_str(r#"{"sourceId": "org.telegram.messenger", "title": "Boss"}"#)
                .unwrap();
        let package: NotificationEvent =
            serde_json::from_str(r#"{"package": "org.telegram.messenger", "title": "Boss"}"#)
                .unwrap();

        assert_eq!(camel.source_id, "org.telegram.messenger");
        assert_eq!(package, camel);
    }

    #[test]
    fn test_decode_missing_title_is_empty() {
        let event: NotificationEvent =
            serde_json::from_str(r#"{"source_id": "com.whatsapp"}"#).unwrap();

        assert!(event.title.is_empty());
    }

    #[test]
    fn test_decode_requires_source() {
        let result = serde_json::from_str::<NotificationEvent>(r#"{"title": "Boss"}"#);

        assert!(result.is_err());
    }
}
