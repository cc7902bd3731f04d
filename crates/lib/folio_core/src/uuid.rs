// Helper for generating UUIDv7 (timestamp-sortable UUIDs)
//
// Identities and projects are listed newest-first, so ids are generated
// app-side as v7. Both store implementations use the same generator.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}
