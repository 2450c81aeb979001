//! Block compression for container files.
//!
//! A [`Codec`] turns a serialized block into its on-disk form and back. The
//! codec in use is recorded in the file header under `avro.codec`, so a
//! reader only needs the codecs it actually encounters. [`CodecRegistry`]
//! maps those recorded names to implementations and starts out with every
//! codec this crate was built with.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;

#[cfg(feature = "deflate")]
use crate::error::Error;

#[cfg(feature = "zstandard")]
use std::cell::RefCell;

#[cfg(feature = "zstandard")]
thread_local! {
    static ZSTD_CCTX: RefCell<zstd_safe::CCtx<'static>> = RefCell::new(zstd_safe::CCtx::create());
    static ZSTD_DCTX: RefCell<zstd_safe::DCtx<'static>> = RefCell::new(zstd_safe::DCtx::create());
}

/// A block compression algorithm, identified by the name stored in the
/// container header.
pub trait Codec: Send + Sync {
    /// The name recorded under `avro.codec`.
    fn name(&self) -> &'static str;
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// The identity codec. Every container implementation supports it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCodec;

impl Codec for NullCodec {
    fn name(&self) -> &'static str {
        "null"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Raw DEFLATE (RFC 1951, no zlib wrapper), the interoperable baseline
/// compression codec.
#[cfg(feature = "deflate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct DeflateCodec;

#[cfg(feature = "deflate")]
impl Codec for DeflateCodec {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        use std::io::Read;
        let mut out = Vec::new();
        flate2::read::DeflateEncoder::new(data, flate2::Compression::default())
            .read_to_end(&mut out)
            .map_err(|e| Error::Codec(format!("deflate: {}", e)))?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        use std::io::Read;
        let mut out = Vec::new();
        flate2::read::DeflateDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| Error::Codec(format!("deflate: {}", e)))?;
        Ok(out)
    }
}

/// Zstandard compression. Frames are standard single-shot frames carrying
/// the content size, so any zstd implementation can read them back.
#[cfg(feature = "zstandard")]
#[derive(Clone, Copy, Debug)]
pub struct ZstandardCodec {
    pub level: i32,
}

#[cfg(feature = "zstandard")]
impl Default for ZstandardCodec {
    fn default() -> Self {
        ZstandardCodec { level: 3 }
    }
}

#[cfg(feature = "zstandard")]
impl Codec for ZstandardCodec {
    fn name(&self) -> &'static str {
        "zstandard"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        use zstd_safe::{CParameter, ResetDirective};
        ZSTD_CCTX.with_borrow_mut(|ctx| {
            ctx.reset(ResetDirective::SessionAndParameters)
                .map_err(zstd_error)?;
            ctx.set_parameter(CParameter::CompressionLevel(self.level))
                .map_err(zstd_error)?;
            ctx.set_pledged_src_size(Some(data.len() as u64))
                .map_err(zstd_error)?;
            let mut out = Vec::with_capacity(zstd_safe::compress_bound(data.len()));
            ctx.compress2(&mut out, data).map_err(zstd_error)?;
            Ok(out)
        })
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        use zstd_safe::{DParameter, InBuffer, OutBuffer, ResetDirective};
        ZSTD_DCTX.with_borrow_mut(|ctx| {
            ctx.reset(ResetDirective::SessionAndParameters)
                .map_err(zstd_error)?;
            // Bounds the window a frame may demand of us.
            ctx.set_parameter(DParameter::WindowLogMax(27))
                .map_err(zstd_error)?;

            let mut out = Vec::new();
            let mut scratch = [0u8; 16 * 1024];
            let mut input = InBuffer::around(data);
            loop {
                let mut output = OutBuffer::around(&mut scratch[..]);
                let hint = ctx
                    .decompress_stream(&mut output, &mut input)
                    .map_err(zstd_error)?;
                let produced = output.as_slice().len();
                out.extend_from_slice(output.as_slice());
                if hint == 0 {
                    return Ok(out);
                }
                if input.pos == data.len() && produced == 0 {
                    return Err(crate::error::Error::Codec(
                        "zstd: truncated frame".into(),
                    ));
                }
            }
        })
    }
}

#[cfg(feature = "zstandard")]
fn zstd_error(code: zstd_safe::ErrorCode) -> crate::error::Error {
    crate::error::Error::Codec(format!("zstd: {}", zstd_safe::get_error_name(code)))
}

/// The set of codecs a reader may use, keyed by header name.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: BTreeMap<&'static str, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// An empty registry. Even `"null"` must be registered by hand.
    pub fn empty() -> Self {
        CodecRegistry {
            codecs: BTreeMap::new(),
        }
    }

    /// Adds a codec, replacing any previous codec of the same name.
    pub fn register(&mut self, codec: Arc<dyn Codec>) -> &mut Self {
        self.codecs.insert(codec.name(), codec);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.get(name).cloned()
    }
}

impl Default for CodecRegistry {
    /// A registry holding every codec this crate was compiled with.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(NullCodec));
        #[cfg(feature = "deflate")]
        registry.register(Arc::new(DeflateCodec));
        #[cfg(feature = "zstandard")]
        registry.register(Arc::new(ZstandardCodec::default()));
        registry
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.codecs.keys()).finish()
    }
}
