use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::Error;

pub type EmailId = String;

pub const DEFAULT_LIMIT: usize = 50;

/// The fixed set of folders, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderId {
    Inbox,
    Sent,
    Drafts,
    Spam,
    Trash,
}

impl FolderId {
    pub const ALL: [FolderId; 5] = [
        FolderId::Inbox,
        FolderId::Sent,
        FolderId::Drafts,
        FolderId::Spam,
        FolderId::Trash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FolderId::Inbox => "inbox",
            FolderId::Sent => "sent",
            FolderId::Drafts => "drafts",
            FolderId::Spam => "spam",
            FolderId::Trash => "trash",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FolderId::Inbox => "Inbox",
            FolderId::Sent => "Sent",
            FolderId::Drafts => "Drafts",
            FolderId::Spam => "Spam",
            FolderId::Trash => "Trash",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            FolderId::Inbox => "inbox",
            FolderId::Sent => "send",
            FolderId::Drafts => "file-text",
            FolderId::Spam => "shield",
            FolderId::Trash => "trash-2",
        }
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FolderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FolderId::ALL
            .into_iter()
            .find(|folder| folder.as_str() == s)
            .ok_or_else(|| Error::UnknownFolder(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub count: usize,
    pub icon: String,
}

impl From<FolderId> for Folder {
    fn from(id: FolderId) -> Self {
        Folder {
            id,
            name: id.name().to_owned(),
            count: 0,
            icon: id.icon().to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub folder: FolderId,
    pub starred: bool,
    pub attachments: Vec<String>,
}

impl Email {
    /// case-insensitive substring match on subject, sender and body,
    /// `needle` is expected to be lowercase already
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [&self.subject, &self.from, &self.body]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// fields supplied by the user when sending a message
#[derive(Clone, Debug, Default)]
pub struct NewEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// the email was moved to the trash folder
    Trashed,
    /// the email was already in the trash and is gone now
    Removed,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub folder: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPage {
    pub emails: Vec<Email>,
    pub total: usize,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReadUpdate {
    pub read: bool,
}

#[derive(Debug, Deserialize)]
pub struct StarUpdate {
    pub starred: bool,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub folder: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub message: String,
    pub email: Email,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub permanent: bool,
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        let (message, permanent) = match outcome {
            DeleteOutcome::Trashed => ("Email moved to trash", false),
            DeleteOutcome::Removed => ("Email deleted successfully", true),
        };

        DeleteResponse {
            message: message.to_owned(),
            permanent,
        }
    }
}
