use std::collections::HashMap;

use crate::migration::scanner::LegacySessionRecord;

/// Collapse duplicate legacy exports into a unique working set.
///
/// Identity is the `legacy_id` alone. Records with identical message content
/// but different ids are preserved as distinct — ambiguous legacy data is
/// kept, never silently collapsed. When the same `legacy_id` appears with
/// differing content, the variant with more messages wins; on equal length
/// the first-seen record is kept. Surviving records keep the position of
/// their id's first occurrence, so the output order matches the input.
pub fn dedupe_legacy_sessions(records: Vec<LegacySessionRecord>) -> Vec<LegacySessionRecord> {
    let mut slot_by_id: HashMap<String, usize> = HashMap::new();
    let mut result: Vec<LegacySessionRecord> = Vec::new();

    for record in records {
        match slot_by_id.get(&record.legacy_id) {
            None => {
                slot_by_id.insert(record.legacy_id.clone(), result.len());
                result.push(record);
            }
            Some(&slot) => {
                if record.messages.len() > result[slot].messages.len() {
                    tracing::debug!(
                        legacy_id = %record.legacy_id,
                        kept = record.messages.len(),
                        replaced = result[slot].messages.len(),
                        "Duplicate legacy id, keeping longer variant"
                    );
                    result[slot] = record;
                }
            }
        }
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
