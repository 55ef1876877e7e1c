use std::fmt::Write;

use chrono::TimeZone;

use chatthread_store::{AdminQuery, Message, MessageStore};

/// Plain-text summary of a thread: per-author counts, admin posts with the
/// replies they drew, and optionally the current user's posts.
pub fn render<Tz>(store: &MessageStore, mine: Option<&[&Message]>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let options = store.timestamp_options();
    let mut out = String::new();

    let _ = writeln!(out, "{} messages from {} authors", store.total_count(), store.authors().len());
    for author in store.authors() {
        let marker = if store.admin_names().iter().any(|a| a == author) { " [admin]" } else { "" };
        let _ = writeln!(out, "  {author}{marker}: {}", store.messages_by_author(author).len());
    }

    for messages in store.messages_by_admins(AdminQuery::All) {
        for message in messages {
            let _ = writeln!(
                out,
                "\n#{} {} ({})\n  {}",
                message.id,
                message.author,
                message.format_timestamp(options, tz),
                message.text
            );
            for reply in store.replies_to(message) {
                let _ = writeln!(out, "    <- #{} {}: {}", reply.id, reply.author, reply.text);
            }
        }
    }

    if let Some(mine) = mine {
        let answered = mine.iter().filter(|m| m.has_replies()).count();
        let _ = writeln!(out, "\nyou posted {} messages, {} with replies", mine.len(), answered);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatthread_store::RawMessageRecord;
    use chrono::Utc;

    fn store() -> MessageStore {
        let ts = |t: &str| format!("var timestamp = \"{t}\";");
        let mut store = MessageStore::new();
        store
            .ingest_records(vec![
                RawMessageRecord::new("lead_ren", true, "Batch 4 is live.", ts("2024-06-10T08:00:00Z")),
                RawMessageRecord::new("ana", false, "@lead_ren any rubric changes?", ts("2024-06-10T08:05:00Z")),
                RawMessageRecord::new("ana", false, "never mind", ts("2024-06-10T08:06:00Z")),
            ])
            .unwrap();
        store
    }

    #[test]
    fn summary_lists_authors_and_admin_threads() {
        let store = store();
        let text = render(&store, None, &Utc);

        assert!(text.starts_with("3 messages from 2 authors\n"));
        assert!(text.contains("  lead_ren [admin]: 1\n"));
        assert!(text.contains("  ana: 2\n"));
        assert!(text.contains("#0 lead_ren (6/10/2024, 08:00)\n  Batch 4 is live."));
        assert!(text.contains("    <- #1 ana: @lead_ren any rubric changes?"));
        assert!(!text.contains("you posted"));
    }

    #[test]
    fn summary_counts_own_messages() {
        let store = store();
        let mine = store.messages_by_author("ana");
        let text = render(&store, Some(mine.as_slice()), &Utc);
        assert!(text.contains("you posted 2 messages, 0 with replies"));
    }
}
