pub mod registry_entry_rto;
