//! Shared persistence capabilities: timestamp bookkeeping and soft deletion.
//!
//! The repository layer runs these hooks on every entity it persists, so the
//! bookkeeping is uniform across entity types instead of re-implemented per
//! query.

use time::OffsetDateTime;

/// Creation/update timestamps maintained by the persistence hooks.
pub trait Stamped {
    fn stamp_created(&mut self, now: OffsetDateTime);
    fn touch(&mut self, now: OffsetDateTime);
}

/// Soft deletion: the record is flagged and transformed in place, never
/// physically removed. `mark_deleted` must also free any unique slots the
/// record holds (keys stay reusable by new records).
pub trait SoftDeletable: Stamped {
    fn is_deleted(&self) -> bool;
    fn mark_deleted(&mut self);
}

pub fn before_insert<T: Stamped>(entity: &mut T) {
    let now = OffsetDateTime::now_utc();
    entity.stamp_created(now);
    entity.touch(now);
}

pub fn before_update<T: Stamped>(entity: &mut T) {
    entity.touch(OffsetDateTime::now_utc());
}

pub fn before_delete<T: SoftDeletable>(entity: &mut T) {
    entity.touch(OffsetDateTime::now_utc());
    entity.mark_deleted();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Note {
        created_at: Option<OffsetDateTime>,
        updated_at: Option<OffsetDateTime>,
        deleted: bool,
        archived_body: bool,
    }

    impl Stamped for Note {
        fn stamp_created(&mut self, now: OffsetDateTime) {
            self.created_at = Some(now);
        }
        fn touch(&mut self, now: OffsetDateTime) {
            self.updated_at = Some(now);
        }
    }

    impl SoftDeletable for Note {
        fn is_deleted(&self) -> bool {
            self.deleted
        }
        fn mark_deleted(&mut self) {
            self.archived_body = true;
            self.deleted = true;
        }
    }

    #[test]
    fn insert_stamps_both_timestamps() {
        let mut note = Note::default();
        before_insert(&mut note);
        assert!(note.created_at.is_some());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn update_touches_only_the_edit_timestamp() {
        let mut note = Note::default();
        before_update(&mut note);
        assert!(note.created_at.is_none());
        assert!(note.updated_at.is_some());
    }

    #[test]
    fn delete_flags_touches_and_transforms() {
        let mut note = Note::default();
        before_delete(&mut note);
        assert!(note.is_deleted());
        assert!(note.archived_body);
        assert!(note.updated_at.is_some());
    }
}
