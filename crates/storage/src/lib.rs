pub mod db;

pub use db::{
    check_duplicates, create_account, create_db, exists_by_key, find_import_by_hash,
    from_paise, get_account_by_name, insert_batch, insert_transaction, list_accounts,
    load_taxonomy, record_import, seed_default_categories, to_paise, AccountRecord,
    DbPool, DuplicateHit,
};
