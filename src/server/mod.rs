//! # Server Module
//!
//! Everything between a compiled route and the wire: the [`Reply`] type
//! handlers return, encoders and decoders keyed by media type, request
//! helpers for headers and query strings, and a blocking `tiny_http`
//! adapter that serves an [`AppService`].

pub mod decoder;
pub mod encoder;
pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use decoder::{DecodeError, Decoder, DecoderRegistry, FormDecoder, JsonDecoder};
pub use encoder::{EncodeError, Encoder, EncoderRegistry, JsonEncoder, XmlEncoder};
pub use http_server::{HttpServer, ServerHandle};
pub use response::{status_reason, HeaderVec, Reply, ReplyBody};
pub use service::AppService;
