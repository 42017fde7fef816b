//! Store writes for the ingest run

pub mod entries;

pub use entries::{
    insert_placeholder_rows, max_entry_id, update_text_column, write_classified_batch, TextColumn,
    UPDATE_BATCH_SIZE,
};
