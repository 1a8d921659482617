use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    types::{DeleteOutcome, Email, EmailPage, Folder, FolderId, NewEmail},
};

/// In-memory email store
///
/// Folder counts are cached and kept up to date by every operation that
/// adds, moves or removes an email, they are never recomputed.
#[derive(Debug, Clone)]
pub struct Mailbox {
    // own address, used as the sender of outgoing mail
    address: String,
    emails: Vec<Email>,
    // always holds every folder, in `FolderId::ALL` order
    folders: Vec<Folder>,
}

impl Mailbox {
    pub fn empty(address: impl Into<String>) -> Self {
        Mailbox {
            address: address.into(),
            emails: Vec::new(),
            folders: FolderId::ALL.into_iter().map(Folder::from).collect(),
        }
    }

    /// a mailbox holding the demo messages
    pub fn seeded(address: impl Into<String>) -> Self {
        let mut mailbox = Self::empty(address);

        for email in fixtures(&mailbox.address) {
            mailbox.folder_mut(email.folder).count += 1;
            mailbox.emails.push(email);
        }

        mailbox
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    fn folder_mut(&mut self, id: FolderId) -> &mut Folder {
        &mut self.folders[id as usize]
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.emails
            .iter()
            .position(|email| email.id == id)
            .ok_or(Error::NotFound)
    }

    fn email_mut(&mut self, id: &str) -> Result<&mut Email> {
        self.emails
            .iter_mut()
            .find(|email| email.id == id)
            .ok_or(Error::NotFound)
    }

    /// return a page of the emails in `folder`, newest first, optionally
    /// filtered by a case-insensitive search term
    pub fn list(
        &self,
        folder: FolderId,
        search: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> EmailPage {
        let needle = search
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        let mut matching = self
            .emails
            .iter()
            .filter(|email| email.folder == folder)
            .filter(|email| needle.as_deref().map_or(true, |n| email.matches(n)))
            .collect::<Vec<&Email>>();

        // stable, equal timestamps keep insertion order
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total = matching.len();
        let emails = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        EmailPage {
            emails,
            total,
            has_more: total > offset.saturating_add(limit),
        }
    }

    pub fn get(&self, id: &str) -> Result<&Email> {
        self.emails
            .iter()
            .find(|email| email.id == id)
            .ok_or(Error::NotFound)
    }

    /// store an outgoing message in the sent folder
    pub fn send(&mut self, new_email: NewEmail) -> Email {
        let email = Email {
            id: Uuid::new_v4().to_string(),
            from: self.address.clone(),
            to: new_email.to,
            subject: new_email.subject,
            body: new_email.body,
            timestamp: Utc::now(),
            read: true,
            folder: FolderId::Sent,
            starred: false,
            attachments: new_email.attachments,
        };

        self.folder_mut(FolderId::Sent).count += 1;
        self.emails.push(email.clone());

        info!("email {} sent to {}", email.id, email.to);

        email
    }

    pub fn set_read(&mut self, id: &str, read: bool) -> Result<Email> {
        let email = self.email_mut(id)?;
        email.read = read;

        Ok(email.clone())
    }

    pub fn set_starred(&mut self, id: &str, starred: bool) -> Result<Email> {
        let email = self.email_mut(id)?;
        email.starred = starred;

        Ok(email.clone())
    }

    pub fn move_to(&mut self, id: &str, target: FolderId) -> Result<Email> {
        let index = self.position(id)?;
        let source = std::mem::replace(&mut self.emails[index].folder, target);

        let source_folder = self.folder_mut(source);
        source_folder.count = source_folder.count.saturating_sub(1);
        self.folder_mut(target).count += 1;

        info!("email {id} moved from {source} to {target}");

        Ok(self.emails[index].clone())
    }

    /// move an email to the trash, or remove it when it already is in the trash
    pub fn delete(&mut self, id: &str) -> Result<DeleteOutcome> {
        let index = self.position(id)?;

        if self.emails[index].folder == FolderId::Trash {
            self.emails.remove(index);

            let trash = self.folder_mut(FolderId::Trash);
            trash.count = trash.count.saturating_sub(1);

            info!("email {id} permanently deleted");

            Ok(DeleteOutcome::Removed)
        } else {
            self.move_to(id, FolderId::Trash)?;

            Ok(DeleteOutcome::Trashed)
        }
    }
}

fn fixture_time(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().unwrap_or_default()
}

fn fixtures(address: &str) -> Vec<Email> {
    vec![
        Email {
            id: "1".to_owned(),
            from: "john.doe@company.com".to_owned(),
            to: address.to_owned(),
            subject: "Project Update - Q4 Results".to_owned(),
            body: "Hi team,\n\nI wanted to share the latest updates on our Q4 project results. \
                We've exceeded our targets by 15% and received excellent feedback from \
                stakeholders.\n\nKey achievements:\n- Completed all deliverables on time\n\
                - Budget came in 8% under projected costs\n- Client satisfaction score: 9.2/10\n\n\
                Let's schedule a team meeting next week to discuss next steps.\n\n\
                Best regards,\nJohn"
                .to_owned(),
            timestamp: fixture_time("2025-01-20T09:30:00Z"),
            read: false,
            folder: FolderId::Inbox,
            starred: true,
            attachments: vec![],
        },
        Email {
            id: "2".to_owned(),
            from: "sarah.wilson@marketing.com".to_owned(),
            to: address.to_owned(),
            subject: "New Marketing Campaign Proposal".to_owned(),
            body: "Hello,\n\nI've prepared a comprehensive marketing campaign proposal for our \
                upcoming product launch. The strategy focuses on digital channels with a \
                multi-platform approach.\n\nHighlights include:\n\
                - Social media advertising across 4 platforms\n- Influencer partnerships\n\
                - Content marketing strategy\n- Email automation sequences\n\n\
                I've attached the detailed proposal document. Please review and let me know \
                your thoughts.\n\nThanks,\nSarah"
                .to_owned(),
            timestamp: fixture_time("2025-01-20T08:15:00Z"),
            read: false,
            folder: FolderId::Inbox,
            starred: false,
            attachments: vec!["campaign-proposal.pdf".to_owned()],
        },
        Email {
            id: "3".to_owned(),
            from: "noreply@bank.com".to_owned(),
            to: address.to_owned(),
            subject: "Monthly Statement Available".to_owned(),
            body: "Dear Valued Customer,\n\nYour monthly statement for January 2025 is now \
                available in your online banking portal.\n\nAccount Summary:\n\
                - Previous balance: $5,247.83\n- Total deposits: $3,200.00\n\
                - Total withdrawals: $1,876.45\n- Current balance: $6,571.38\n\n\
                For detailed transaction history, please log in to your account.\n\n\
                Thank you for banking with us.\n\nBest regards,\nFirst National Bank"
                .to_owned(),
            timestamp: fixture_time("2025-01-19T16:45:00Z"),
            read: true,
            folder: FolderId::Inbox,
            starred: false,
            attachments: vec![],
        },
        Email {
            id: "4".to_owned(),
            from: address.to_owned(),
            to: "client@business.com".to_owned(),
            subject: "Meeting Confirmation - Tomorrow 2 PM".to_owned(),
            body: "Dear Client,\n\nThis is to confirm our meeting scheduled for tomorrow \
                (January 21st) at 2:00 PM.\n\nAgenda:\n- Project timeline review\n\
                - Budget discussion\n- Next phase planning\n\n\
                Meeting will be held in Conference Room A. Please let me know if you need to \
                reschedule.\n\nLooking forward to our discussion.\n\nBest regards,\nYour Name"
                .to_owned(),
            timestamp: fixture_time("2025-01-20T14:20:00Z"),
            read: true,
            folder: FolderId::Sent,
            starred: false,
            attachments: vec![],
        },
    ]
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    const ADDRESS: &str = "you@company.com";

    fn count(mailbox: &Mailbox, id: FolderId) -> usize {
        mailbox.folders()[id as usize].count
    }

    fn assert_counts_consistent(mailbox: &Mailbox) {
        for folder in mailbox.folders() {
            let actual = mailbox
                .emails
                .iter()
                .filter(|email| email.folder == folder.id)
                .count();

            assert_eq!(folder.count, actual, "count of folder {}", folder.id);
        }
    }

    fn new_email(subject: &str) -> NewEmail {
        NewEmail {
            to: "client@business.com".to_owned(),
            subject: subject.to_owned(),
            body: "body".to_owned(),
            attachments: vec![],
        }
    }

    #[test]
    fn seeded_counts() {
        let mailbox = Mailbox::seeded(ADDRESS);

        assert_eq!(count(&mailbox, FolderId::Inbox), 3);
        assert_eq!(count(&mailbox, FolderId::Sent), 1);
        assert_eq!(count(&mailbox, FolderId::Trash), 0);
        assert_counts_consistent(&mailbox);

        let ids = mailbox
            .folders()
            .iter()
            .map(|f| f.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["inbox", "sent", "drafts", "spam", "trash"]);
    }

    #[test]
    fn inbox_is_listed_newest_first() {
        let mailbox = Mailbox::seeded(ADDRESS);
        let page = mailbox.list(FolderId::Inbox, None, 50, 0);

        let ids = page.emails.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(page.total, 3);
        assert!(!page.has_more);
    }

    #[test]
    fn delete_twice_trashes_then_removes() {
        let mut mailbox = Mailbox::seeded(ADDRESS);

        assert_eq!(mailbox.delete("3").unwrap(), DeleteOutcome::Trashed);
        assert_eq!(count(&mailbox, FolderId::Inbox), 2);
        assert_eq!(count(&mailbox, FolderId::Trash), 1);
        assert_eq!(mailbox.get("3").unwrap().folder, FolderId::Trash);

        assert_eq!(mailbox.delete("3").unwrap(), DeleteOutcome::Removed);
        assert_eq!(count(&mailbox, FolderId::Trash), 0);
        assert!(matches!(mailbox.get("3"), Err(Error::NotFound)));
        assert_counts_consistent(&mailbox);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut mailbox = Mailbox::seeded(ADDRESS);

        assert!(matches!(mailbox.get("42"), Err(Error::NotFound)));
        assert!(matches!(mailbox.set_read("42", true), Err(Error::NotFound)));
        assert!(matches!(mailbox.set_starred("42", true), Err(Error::NotFound)));
        assert!(matches!(
            mailbox.move_to("42", FolderId::Spam),
            Err(Error::NotFound)
        ));
        assert!(matches!(mailbox.delete("42"), Err(Error::NotFound)));
        assert_counts_consistent(&mailbox);
    }

    #[test]
    fn failed_move_leaves_counts_untouched() {
        let mut mailbox = Mailbox::seeded(ADDRESS);
        let before = mailbox.folders().to_vec();

        assert!(mailbox.move_to("42", FolderId::Trash).is_err());
        assert_eq!(mailbox.folders(), before.as_slice());

        // the moved email is the one returned, and only it changed folder
        let email = mailbox.move_to("4", FolderId::Inbox).unwrap();
        assert_eq!(email.id, "4");
        assert_eq!(email.folder, FolderId::Inbox);
        assert_eq!(mailbox.get("1").unwrap().folder, FolderId::Inbox);
        assert_eq!(count(&mailbox, FolderId::Sent), 0);
        assert_eq!(count(&mailbox, FolderId::Inbox), 4);
        assert_counts_consistent(&mailbox);
    }

    #[test]
    fn send_creates_read_unstarred_sent_email() {
        let mut mailbox = Mailbox::empty(ADDRESS);
        let email = mailbox.send(NewEmail {
            attachments: vec!["1737364200000-report.pdf".to_owned()],
            ..new_email("Hello")
        });

        assert!(email.read);
        assert!(!email.starred);
        assert_eq!(email.folder, FolderId::Sent);
        assert_eq!(email.from, ADDRESS);
        assert_eq!(email.attachments, ["1737364200000-report.pdf"]);
        assert_eq!(count(&mailbox, FolderId::Sent), 1);
        assert_eq!(mailbox.get(&email.id).unwrap(), &email);

        let other = mailbox.send(new_email("Hello again"));
        assert_ne!(email.id, other.id);
    }

    #[test]
    fn search_is_case_insensitive_over_subject_sender_and_body() {
        let mailbox = Mailbox::seeded(ADDRESS);

        let by_subject = mailbox.list(FolderId::Inbox, Some("MONTHLY"), 50, 0);
        assert_eq!(by_subject.emails.len(), 1);
        assert_eq!(by_subject.emails[0].id, "3");

        let by_sender = mailbox.list(FolderId::Inbox, Some("Sarah.Wilson"), 50, 0);
        assert_eq!(by_sender.emails.len(), 1);
        assert_eq!(by_sender.emails[0].id, "2");

        let by_body = mailbox.list(FolderId::Inbox, Some("influencer"), 50, 0);
        assert_eq!(by_body.emails.len(), 1);
        assert_eq!(by_body.emails[0].id, "2");

        // the recipient is not searched
        let by_recipient = mailbox.list(FolderId::Sent, Some("client@business"), 50, 0);
        assert_eq!(by_recipient.total, 0);

        // folder match is exact, even when the term matches elsewhere
        let other_folder = mailbox.list(FolderId::Sent, Some("monthly"), 50, 0);
        assert!(other_folder.emails.is_empty());

        let empty_term = mailbox.list(FolderId::Inbox, Some(""), 50, 0);
        assert_eq!(empty_term.total, 3);
    }

    #[test]
    fn pagination() {
        let mailbox = Mailbox::seeded(ADDRESS);

        let first = mailbox.list(FolderId::Inbox, None, 2, 0);
        assert_eq!(first.emails.len(), 2);
        assert_eq!(first.total, 3);
        assert!(first.has_more);

        let second = mailbox.list(FolderId::Inbox, None, 2, 2);
        assert_eq!(second.emails.len(), 1);
        assert_eq!(second.emails[0].id, "3");
        assert!(!second.has_more);

        let beyond = mailbox.list(FolderId::Inbox, None, 2, 10);
        assert!(beyond.emails.is_empty());
        assert_eq!(beyond.total, 3);
        assert!(!beyond.has_more);

        let huge = mailbox.list(FolderId::Inbox, None, usize::MAX, 1);
        assert_eq!(huge.emails.len(), 2);
        assert!(!huge.has_more);
    }

    #[test]
    fn flags_are_updated_in_place() {
        let mut mailbox = Mailbox::seeded(ADDRESS);

        let email = mailbox.set_read("1", true).unwrap();
        assert!(email.read);
        assert!(mailbox.get("1").unwrap().read);

        let email = mailbox.set_starred("1", false).unwrap();
        assert!(!email.starred);
        assert!(!mailbox.get("1").unwrap().starred);

        let email = mailbox.set_read("1", false).unwrap();
        assert!(!email.read);
    }

    #[test]
    fn move_adjusts_both_counts() {
        let mut mailbox = Mailbox::seeded(ADDRESS);

        let email = mailbox.move_to("2", FolderId::Spam).unwrap();
        assert_eq!(email.folder, FolderId::Spam);
        assert_eq!(count(&mailbox, FolderId::Inbox), 2);
        assert_eq!(count(&mailbox, FolderId::Spam), 1);

        // moving into the same folder leaves the counts alone
        mailbox.move_to("2", FolderId::Spam).unwrap();
        assert_eq!(count(&mailbox, FolderId::Spam), 1);
        assert_counts_consistent(&mailbox);

        let spam = mailbox.list(FolderId::Spam, None, 50, 0);
        assert_eq!(spam.emails[0].id, "2");
    }

    #[test]
    fn counts_stay_consistent_under_random_operations() {
        let mut rng = rand::rng();
        let mut mailbox = Mailbox::seeded(ADDRESS);
        let mut ids = vec!["1", "2", "3", "4"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<String>>();

        for i in 0..500 {
            match rng.random_range(0..3) {
                0 => ids.push(mailbox.send(new_email(&format!("message {i}"))).id),
                1 => {
                    let id = &ids[rng.random_range(0..ids.len())];
                    let target = FolderId::ALL[rng.random_range(0..FolderId::ALL.len())];
                    let _ = mailbox.move_to(id, target);
                }
                _ => {
                    let id = &ids[rng.random_range(0..ids.len())];
                    let _ = mailbox.delete(id);
                }
            }

            assert_counts_consistent(&mailbox);
        }
    }
}
