pub mod agenda;

pub use agenda::AgendaStoreClient;
