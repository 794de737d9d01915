/// Backend-assigned record identifier.
pub type EntityId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A record that can be located in a container by its identifier.
pub trait Record {
    fn id(&self) -> EntityId;
}

/// Derive a list projection from a full record.
///
/// Containers hold brief records in their list and a full record in the
/// "current" slot. When an update returns a full record, the matching list
/// entry is refreshed through this conversion.
pub trait BriefOf<F> {
    fn brief_of(full: &F) -> Self;
}

/// Entities whose list and detail shapes are the same type.
impl<T: Clone> BriefOf<T> for T {
    fn brief_of(full: &T) -> Self {
        full.clone()
    }
}
