//! Customer / staff messaging
//!
//! New messages land in the `tempComplaints` staging collection. Opening the
//! staff inbox moves every customer message from staging into `complaints`
//! in one transaction. Admin messages stay where they are and are read from
//! both collections.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Customer, CustomerMessageCreate, Message, MessageMode, StaffMessageCreate};
use shared::util::{new_id, normalize_email, now_millis};

use crate::db::{Collection, DocStore};
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SUBJECT_LEN, validate_required_text};

fn validate_body(subject: &str, content: &str) -> AppResult<()> {
    validate_required_text(subject, "subject", MAX_SUBJECT_LEN)?;
    validate_required_text(content, "content", MAX_NOTE_LEN)?;
    Ok(())
}

fn newest_first(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    messages
}

/// Messages matching `pred` from staging and permanent storage
fn find_everywhere<F>(store: &DocStore, pred: F) -> AppResult<Vec<Message>>
where
    F: Fn(&Message) -> bool,
{
    let mut messages: Vec<Message> = store.find(Collection::TempComplaints, &pred)?;
    messages.extend(store.find(Collection::Complaints, &pred)?);
    Ok(newest_first(messages))
}

fn addressed_to(message: &Message, email: &str) -> bool {
    message.mode == MessageMode::SentByAdmin && message.recipients.iter().any(|r| r == email)
}

/// Customer → staff
pub fn send_from_customer(store: &DocStore, email: &str, req: CustomerMessageCreate) -> AppResult<Message> {
    validate_body(&req.subject, &req.content)?;
    let message = Message {
        id: new_id(),
        subject: req.subject.trim().to_string(),
        content: req.content.trim().to_string(),
        date: now_millis(),
        mode: MessageMode::SentByCustomer,
        email: Some(normalize_email(email)),
        recipients: Vec::new(),
        customer_ids: Vec::new(),
        is_read: false,
    };
    store.insert(Collection::TempComplaints, &message.id, &message)?;
    tracing::info!(message_id = %message.id, "Customer message received");
    Ok(message)
}

/// Staff → selected customers; recipient emails resolved from the ids
pub fn send_from_staff(store: &DocStore, req: StaffMessageCreate) -> AppResult<Message> {
    validate_body(&req.subject, &req.content)?;

    let mut customer_ids: Vec<String> = Vec::with_capacity(req.customer_ids.len());
    for id in req.customer_ids {
        if !customer_ids.contains(&id) {
            customer_ids.push(id);
        }
    }
    if customer_ids.is_empty() {
        return Err(AppError::new(ErrorCode::MessageRecipientsRequired));
    }

    let mut recipients = Vec::with_capacity(customer_ids.len());
    for id in &customer_ids {
        let customer: Customer = store.get(Collection::Customers, id)?.ok_or_else(|| {
            AppError::with_message(ErrorCode::CustomerNotFound, format!("Customer {id} not found"))
                .with_detail("customerId", id.as_str())
        })?;
        recipients.push(customer.email);
    }

    let message = Message {
        id: new_id(),
        subject: req.subject.trim().to_string(),
        content: req.content.trim().to_string(),
        date: now_millis(),
        mode: MessageMode::SentByAdmin,
        email: None,
        recipients,
        customer_ids,
        is_read: false,
    };
    store.insert(Collection::TempComplaints, &message.id, &message)?;
    tracing::info!(message_id = %message.id, recipients = message.recipients.len(), "Staff message sent");
    Ok(message)
}

/// Admin messages for a customer, newest first
///
/// Unread ones are marked read in one batch; the returned list shows the
/// state before this fetch so the client can highlight them.
pub fn customer_inbox(store: &DocStore, email: &str) -> AppResult<Vec<Message>> {
    let email = normalize_email(email);
    let messages = find_everywhere(store, |m| addressed_to(m, &email))?;

    let unread: Vec<&Message> = messages.iter().filter(|m| !m.is_read).collect();
    if !unread.is_empty() {
        let mut batch = store.batch()?;
        for message in unread {
            for collection in [Collection::TempComplaints, Collection::Complaints] {
                if let Some(mut stored) = batch.get::<Message>(collection, &message.id)? {
                    stored.is_read = true;
                    batch.put(collection, &message.id, &stored)?;
                }
            }
        }
        batch.commit()?;
    }
    Ok(messages)
}

/// Messages the customer sent
pub fn customer_sent(store: &DocStore, email: &str) -> AppResult<Vec<Message>> {
    let email = normalize_email(email);
    find_everywhere(store, |m| {
        m.mode == MessageMode::SentByCustomer && m.email.as_deref() == Some(email.as_str())
    })
}

pub fn unread_count(store: &DocStore, email: &str) -> AppResult<usize> {
    let email = normalize_email(email);
    Ok(find_everywhere(store, |m| addressed_to(m, &email) && !m.is_read)?.len())
}

/// Move customer messages from staging to `complaints`, returns how many moved
pub fn migrate_staged(store: &DocStore) -> AppResult<usize> {
    let mut batch = store.batch()?;
    let staged = batch.find(Collection::TempComplaints, |m: &Message| {
        m.mode == MessageMode::SentByCustomer
    })?;
    for (id, message) in &staged {
        batch.put(Collection::Complaints, id, message)?;
        batch.delete(Collection::TempComplaints, id)?;
    }
    batch.commit()?;
    if !staged.is_empty() {
        tracing::debug!(count = staged.len(), "Migrated staged customer messages");
    }
    Ok(staged.len())
}

/// Customer messages for the staff inbox
pub fn staff_inbox(store: &DocStore) -> AppResult<Vec<Message>> {
    migrate_staged(store)?;
    let messages: Vec<Message> = store.find(Collection::Complaints, |m: &Message| {
        m.mode == MessageMode::SentByCustomer
    })?;
    Ok(newest_first(messages))
}

/// Messages staff sent
pub fn staff_sent(store: &DocStore) -> AppResult<Vec<Message>> {
    find_everywhere(store, |m| m.mode == MessageMode::SentByAdmin)
}

/// Staff marks a customer message as handled
pub fn mark_read(store: &DocStore, id: &str) -> AppResult<Message> {
    let mut batch = store.batch()?;
    let mut found = None;
    for collection in [Collection::Complaints, Collection::TempComplaints] {
        if let Some(message) = batch.get::<Message>(collection, id)? {
            found = Some((collection, message));
            break;
        }
    }
    let Some((collection, mut message)) = found else {
        batch.abort()?;
        return Err(AppError::new(ErrorCode::MessageNotFound).with_detail("messageId", id));
    };
    message.is_read = true;
    batch.put(collection, id, &message)?;
    batch.commit()?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_customer(store: &DocStore, id: &str, email: &str) {
        let c = Customer {
            id: id.into(),
            uid: format!("uid-{id}"),
            first_name: "Ama".into(),
            last_name: "Mensah".into(),
            email: email.into(),
            contact: "024".into(),
            address: "Accra".into(),
            gender: None,
            image_url: None,
            location: None,
            status: true,
            created_at: 0,
        };
        store.put(Collection::Customers, id, &c).unwrap();
    }

    fn note(subject: &str) -> CustomerMessageCreate {
        CustomerMessageCreate { subject: subject.into(), content: "Food was cold".into() }
    }

    #[test]
    fn staff_inbox_migrates_customer_messages() {
        let store = DocStore::open_in_memory().unwrap();
        seed_customer(&store, "c1", "ama@example.com");
        send_from_customer(&store, "Ama@Example.com", note("Late")).unwrap();
        send_from_customer(&store, "ama@example.com", note("Cold")).unwrap();
        send_from_staff(
            &store,
            StaffMessageCreate { subject: "Sorry".into(), content: "Voucher".into(), customer_ids: vec!["c1".into()] },
        )
        .unwrap();

        let inbox = staff_inbox(&store).unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(store.count(Collection::Complaints).unwrap(), 2);
        // Admin message stays staged
        assert_eq!(store.count(Collection::TempComplaints).unwrap(), 1);
        assert_eq!(staff_sent(&store).unwrap().len(), 1);
        assert_eq!(customer_sent(&store, "ama@example.com").unwrap().len(), 2);
    }

    #[test]
    fn fetching_inbox_marks_read() {
        let store = DocStore::open_in_memory().unwrap();
        seed_customer(&store, "c1", "ama@example.com");
        seed_customer(&store, "c2", "kofi@example.com");
        send_from_staff(
            &store,
            StaffMessageCreate {
                subject: "Promo".into(),
                content: "Free drink".into(),
                customer_ids: vec!["c1".into(), "c1".into()],
            },
        )
        .unwrap();

        assert_eq!(unread_count(&store, "ama@example.com").unwrap(), 1);
        assert_eq!(unread_count(&store, "kofi@example.com").unwrap(), 0);

        let first = customer_inbox(&store, "ama@example.com").unwrap();
        assert_eq!(first.len(), 1);
        assert!(!first[0].is_read);
        assert_eq!(first[0].recipients, vec!["ama@example.com"]);

        let second = customer_inbox(&store, "ama@example.com").unwrap();
        assert!(second[0].is_read);
        assert_eq!(unread_count(&store, "ama@example.com").unwrap(), 0);
    }

    #[test]
    fn staff_message_validation() {
        let store = DocStore::open_in_memory().unwrap();
        let err = send_from_staff(
            &store,
            StaffMessageCreate { subject: "Hi".into(), content: "x".into(), customer_ids: vec![] },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::MessageRecipientsRequired);

        let err = send_from_staff(
            &store,
            StaffMessageCreate { subject: "Hi".into(), content: "x".into(), customer_ids: vec!["ghost".into()] },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::CustomerNotFound);

        let err = send_from_customer(&store, "a@b.co", note("  ")).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn mark_read_finds_either_collection() {
        let store = DocStore::open_in_memory().unwrap();
        let m = send_from_customer(&store, "a@b.co", note("Late")).unwrap();
        assert!(mark_read(&store, &m.id).unwrap().is_read);
        migrate_staged(&store).unwrap();
        assert!(mark_read(&store, &m.id).unwrap().is_read);
        assert_eq!(mark_read(&store, "nope").unwrap_err().code, ErrorCode::MessageNotFound);
    }
}
