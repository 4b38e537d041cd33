pub mod error;
pub mod rest;
pub mod supabase;

pub use error::{is_conflict, SupabaseError};
pub use supabase::SupabaseClient;
