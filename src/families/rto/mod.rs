pub mod family_rto;
