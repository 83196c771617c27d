//! HTTP surface for the RAG pipeline (§4.I).

pub mod transport;
