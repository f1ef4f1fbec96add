//! Text and binary stream transformers.
//!
//! Stream handles cross the wire as single-part blob references. Encoding
//! uploads buffered contents through the context store; a handle that
//! already carries a URI is passed through untouched, which keeps retries
//! safe. Decoding downloads the referenced bytes.

use weft_literal::{Blob, BlobType, Literal, LiteralType, Scalar};

use crate::context::ConversionContext;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue, StreamHandle, StreamKind, TypeKey};
use crate::transformer::Transformer;

/// Blob format for text streams.
pub const TEXT_STREAM_FORMAT: &str = "text/plain";

/// Blob format for binary streams.
pub const BINARY_STREAM_FORMAT: &str = "application/octet-stream";

/// Transformer for buffered stream handles.
pub struct StreamTransformer {
    name: &'static str,
    key: TypeKey,
    kind: StreamKind,
    format: &'static str,
}

impl StreamTransformer {
    /// The text stream transformer.
    pub fn text() -> Self {
        Self {
            name: "text_stream",
            key: TypeKey::TextStream,
            kind: StreamKind::Text,
            format: TEXT_STREAM_FORMAT,
        }
    }

    /// The binary stream transformer.
    pub fn binary() -> Self {
        Self {
            name: "byte_stream",
            key: TypeKey::ByteStream,
            kind: StreamKind::Binary,
            format: BINARY_STREAM_FORMAT,
        }
    }

    fn blob_type(&self) -> BlobType {
        BlobType::single(self.format)
    }

    fn check_utf8(&self, data: &[u8], ty: &NativeType) -> InterchangeResult<()> {
        if self.kind == StreamKind::Text && std::str::from_utf8(data).is_err() {
            return Err(InterchangeError::conversion(
                ty,
                "text stream contents are not valid UTF-8",
            ));
        }
        Ok(())
    }
}

impl Transformer for StreamTransformer {
    fn name(&self) -> &str {
        self.name
    }

    fn type_key(&self) -> TypeKey {
        self.key.clone()
    }

    fn get_literal_type(&self, _ty: &NativeType) -> InterchangeResult<LiteralType> {
        Ok(LiteralType::blob(self.blob_type()))
    }

    fn to_literal(
        &self,
        ctx: &ConversionContext,
        value: &NativeValue,
        ty: &NativeType,
        _expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        let NativeValue::Stream(handle) = value else {
            return Err(InterchangeError::conversion(ty, "expected a stream handle"));
        };
        if handle.kind != self.kind {
            return Err(InterchangeError::conversion(
                ty,
                format!("expected a {} stream handle", self.kind),
            ));
        }

        let uri = match (&handle.uri, &handle.contents) {
            // already uploaded; pass the reference through
            (Some(uri), _) => uri.clone(),
            (None, Some(contents)) => {
                self.check_utf8(contents, ty)?;
                ctx.store().put(contents)?
            }
            (None, None) => {
                return Err(InterchangeError::conversion(
                    ty,
                    "stream handle carries neither contents nor a location",
                ));
            }
        };
        Ok(Literal::scalar(Scalar::Blob(Blob::new(self.blob_type(), uri))))
    }

    fn to_native_value(
        &self,
        ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let blob = literal
            .as_blob()
            .ok_or_else(|| InterchangeError::conversion(ty, "literal is not a blob reference"))?;
        let contents = ctx.store().get(&blob.uri)?;
        self.check_utf8(&contents, ty)?;
        Ok(NativeValue::Stream(StreamHandle {
            kind: self.kind,
            uri: Some(blob.uri.clone()),
            contents: Some(contents),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_and_download() {
        let ctx = ConversionContext::in_memory();
        let transformer = StreamTransformer::binary();
        let ty = NativeType::ByteStream;
        let value = NativeValue::Stream(StreamHandle::binary(&b"\x00\x01"[..]));

        let lt = transformer.get_literal_type(&ty).unwrap();
        let literal = transformer.to_literal(&ctx, &value, &ty, &lt).unwrap();
        assert!(literal.as_blob().unwrap().uri.starts_with("mem://"));

        let back = transformer.to_native_value(&ctx, &literal, &ty).unwrap();
        let NativeValue::Stream(handle) = back else {
            panic!("expected a stream handle");
        };
        assert_eq!(handle.contents.as_deref(), Some(&b"\x00\x01"[..]));
    }

    #[test]
    fn test_text_contents_must_be_utf8() {
        let ctx = ConversionContext::in_memory();
        let transformer = StreamTransformer::text();
        let ty = NativeType::TextStream;
        let value = NativeValue::Stream(StreamHandle {
            kind: StreamKind::Text,
            uri: None,
            contents: Some(bytes::Bytes::from_static(b"\xff\xfe")),
        });

        let lt = transformer.get_literal_type(&ty).unwrap();
        assert!(transformer.to_literal(&ctx, &value, &ty, &lt).is_err());
    }

    #[test]
    fn test_uploaded_handle_is_passed_through() {
        let ctx = ConversionContext::in_memory();
        let transformer = StreamTransformer::text();
        let ty = NativeType::TextStream;
        let value = NativeValue::Stream(StreamHandle::reference(StreamKind::Text, "mem://known"));

        let lt = transformer.get_literal_type(&ty).unwrap();
        let literal = transformer.to_literal(&ctx, &value, &ty, &lt).unwrap();
        assert_eq!(literal.as_blob().unwrap().uri, "mem://known");
    }
}
