use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub icon: String,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Email {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub folder: String,
    pub starred: bool,
    pub attachments: Vec<String>,
}

#[derive(Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmailPage {
    pub emails: Vec<Email>,
    pub total: usize,
    pub has_more: bool,
}

#[derive(Deserialize)]
pub struct SendResponse {
    pub email: Email,
}

#[derive(Deserialize)]
pub struct DeleteResponse {
    pub permanent: bool,
}

#[derive(Serialize)]
pub struct ReadUpdate {
    pub read: bool,
}

#[derive(Serialize)]
pub struct StarUpdate {
    pub starred: bool,
}

#[derive(Serialize)]
pub struct MoveRequest<'a> {
    pub folder: &'a str,
}

/// initial content of the compose form
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Draft {
    pub fn reply_to(email: &Email) -> Self {
        let subject = if email.subject.to_lowercase().starts_with("re:") {
            email.subject.clone()
        } else {
            format!("Re: {}", email.subject)
        };

        Draft {
            to: email.from.clone(),
            subject,
            body: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Draft, Email};

    fn email(subject: &str) -> Email {
        Email {
            id: "1".to_owned(),
            from: "john.smith@company.com".to_owned(),
            to: "you@company.com".to_owned(),
            subject: subject.to_owned(),
            body: String::new(),
            timestamp: "2025-01-20T09:30:00Z".parse().unwrap(),
            read: true,
            folder: "inbox".to_owned(),
            starred: false,
            attachments: vec![],
        }
    }

    #[test]
    fn reply_prefills_sender_and_subject() {
        let draft = Draft::reply_to(&email("Q4 Report"));

        assert_eq!(draft.to, "john.smith@company.com");
        assert_eq!(draft.subject, "Re: Q4 Report");
        assert!(draft.body.is_empty());
    }

    #[test]
    fn reply_prefix_is_not_repeated() {
        let draft = Draft::reply_to(&email("Re: Q4 Report"));

        assert_eq!(draft.subject, "Re: Q4 Report");
    }
}
