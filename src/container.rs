//! Object container files: a self-describing, blocked, optionally
//! compressed sequence of datums all sharing one schema.
//!
//! A container starts with the 4-byte magic `Obj\x01`, a string-to-bytes
//! metadata map holding at least `avro.schema` and `avro.codec`, and a
//! random 16-byte sync marker. Each data block is then
//!
//! ```text
//! long datum count | long payload length | payload | sync marker
//! ```
//!
//! where the payload is the concatenated datum encodings, run through the
//! block codec. The sync marker after every block lets a reader confirm it
//! is still aligned with the stream; any mismatch is treated as corruption
//! rather than silently resynchronized.

use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::codec::{Codec, CodecRegistry, NullCodec};
use crate::decode;
use crate::encode;
use crate::error::{Error, Result};
use crate::reader::DatumReader;
use crate::schema::Schema;
use crate::value::Value;
use crate::writer::DatumWriter;

const MAGIC: &[u8; 4] = b"Obj\x01";
const SYNC_LEN: usize = 16;
const DEFAULT_SYNC_INTERVAL: usize = 16_000;

const META_SCHEMA: &str = "avro.schema";
const META_CODEC: &str = "avro.codec";

/// Streams datums of one schema into a container file.
///
/// Datums are buffered and flushed as a block once roughly
/// [`sync_interval`](Self::sync_interval) bytes have accumulated, on
/// [`flush`](Self::flush), and on close. The header goes out on the first
/// append, or on flush for an empty container, so metadata has to be set
/// between construction and the first datum. Dropping an unclosed writer
/// flushes on a best-effort basis; call [`close`](Self::close) to observe
/// errors and take the sink back.
pub struct FileWriter<'a, W: Write> {
    writer: DatumWriter<'a>,
    sink: Option<W>,
    codec: Arc<dyn Codec>,
    meta: BTreeMap<String, Vec<u8>>,
    sync: [u8; SYNC_LEN],
    block: Vec<u8>,
    pending: usize,
    sync_interval: usize,
    started: bool,
}

impl<'a, W: Write> FileWriter<'a, W> {
    /// A writer with no block compression.
    pub fn new(schema: &'a Schema, sink: W) -> Self {
        Self::with_codec(schema, sink, Arc::new(NullCodec))
    }

    pub fn with_codec(schema: &'a Schema, sink: W, codec: Arc<dyn Codec>) -> Self {
        FileWriter {
            writer: DatumWriter::new(schema),
            sink: Some(sink),
            codec,
            meta: BTreeMap::new(),
            sync: rand::random(),
            block: Vec::new(),
            pending: 0,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            started: false,
        }
    }

    /// Sets the approximate uncompressed block size, 16 000 bytes unless
    /// changed. A block is cut as soon as the buffered datums reach this
    /// size, so a datum larger than the interval gets a block to itself.
    pub fn sync_interval(mut self, bytes: usize) -> Self {
        self.sync_interval = bytes;
        self
    }

    pub fn schema(&self) -> &Schema {
        self.writer.schema()
    }

    /// Adds application metadata to the header. Fails once the header has
    /// been written, and for keys in the reserved `avro.` space.
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Result<()> {
        if self.started {
            return Err(Error::BadContainer(
                "metadata cannot change after the header is written".into(),
            ));
        }
        let key = key.into();
        if key.starts_with("avro.") {
            return Err(Error::BadContainer(format!(
                "metadata key {:?} is reserved",
                key
            )));
        }
        self.meta.insert(key, value.into());
        Ok(())
    }

    /// Buffers one datum, cutting a block if the buffer is full. The datum
    /// must conform to the writer's schema. The first append writes the
    /// header, freezing the metadata.
    pub fn append(&mut self, datum: &Value) -> Result<()> {
        self.write_header()?;
        let start = self.block.len();
        if let Err(e) = self.writer.write(datum, &mut self.block) {
            // Keep the block free of half-written datums
            self.block.truncate(start);
            return Err(e);
        }
        self.pending += 1;
        if self.block.len() >= self.sync_interval {
            self.write_block()?;
        }
        Ok(())
    }

    /// Writes any buffered datums as a block and flushes the sink. The
    /// header alone is written when nothing was appended, which is a valid,
    /// empty container.
    pub fn flush(&mut self) -> Result<()> {
        self.write_header()?;
        self.write_block()?;
        if let Some(sink) = self.sink.as_mut() {
            sink.flush()?;
        }
        Ok(())
    }

    /// Flushes and hands the sink back.
    pub fn close(mut self) -> Result<W> {
        self.flush()?;
        match self.sink.take() {
            Some(sink) => Ok(sink),
            None => Err(Error::BadContainer("container already closed".into())),
        }
    }

    fn write_header(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        let mut header = Vec::new();
        header.extend_from_slice(MAGIC);
        encode::write_long(&mut header, (self.meta.len() + 2) as i64);
        encode::write_str(&mut header, META_CODEC);
        encode::write_bytes(&mut header, self.codec.name().as_bytes());
        encode::write_str(&mut header, META_SCHEMA);
        encode::write_bytes(&mut header, self.writer.schema().to_string().as_bytes());
        for (key, value) in &self.meta {
            encode::write_str(&mut header, key);
            encode::write_bytes(&mut header, value);
        }
        encode::write_long(&mut header, 0);
        header.extend_from_slice(&self.sync);

        let sink = match self.sink.as_mut() {
            Some(sink) => sink,
            None => return Ok(()),
        };
        sink.write_all(&header)?;
        self.started = true;
        Ok(())
    }

    fn write_block(&mut self) -> Result<()> {
        if self.pending == 0 {
            return Ok(());
        }
        self.write_header()?;
        let payload = self.codec.compress(&self.block)?;
        let mut framing = Vec::with_capacity(20);
        encode::write_long(&mut framing, self.pending as i64);
        encode::write_long(&mut framing, payload.len() as i64);

        let sink = match self.sink.as_mut() {
            Some(sink) => sink,
            None => return Ok(()),
        };
        sink.write_all(&framing)?;
        sink.write_all(&payload)?;
        sink.write_all(&self.sync)?;
        self.block.clear();
        self.pending = 0;
        Ok(())
    }
}

impl<'a, W: Write> Drop for FileWriter<'a, W> {
    fn drop(&mut self) {
        if self.sink.is_some() {
            let _ = self.flush();
        }
    }
}

// Sinks and codecs need not be Debug themselves.
impl<'a, W: Write> std::fmt::Debug for FileWriter<'a, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("schema", &self.writer.schema())
            .field("codec", &self.codec.name())
            .field("sync_interval", &self.sync_interval)
            .field("pending", &self.pending)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

/// Iterates the datums of a container file.
///
/// The writer's schema is recovered from the header; datums come out shaped
/// by it, or by the reader schema given to
/// [`with_reader_schema`](Self::with_reader_schema) after schema
/// resolution. Blocks are read one at a time as iteration demands them. Any
/// corruption, including a sync marker mismatch, ends iteration with an
/// error; the iterator yields nothing afterwards.
pub struct FileReader<R: Read> {
    source: R,
    writer_schema: Schema,
    reader_schema: Option<Schema>,
    codec: Arc<dyn Codec>,
    meta: BTreeMap<String, Vec<u8>>,
    sync: [u8; SYNC_LEN],
    queue: VecDeque<Value>,
    done: bool,
}

impl<R: Read> FileReader<R> {
    /// Opens a container, reading datums as the schema they were written
    /// with. Knows the codecs this crate was built with.
    pub fn new(source: R) -> Result<Self> {
        Self::with_registry(source, None, &CodecRegistry::default())
    }

    /// Opens a container, resolving every datum into `reader`'s shape.
    pub fn with_reader_schema(source: R, reader: &Schema) -> Result<Self> {
        Self::with_registry(source, Some(reader), &CodecRegistry::default())
    }

    /// Opens a container with an explicit codec registry, and optionally a
    /// reader schema to resolve into.
    pub fn with_registry(
        mut source: R,
        reader: Option<&Schema>,
        registry: &CodecRegistry,
    ) -> Result<Self> {
        let magic = decode::read_fixed(&mut source, MAGIC.len())
            .map_err(|_| Error::BadContainer("missing container magic".into()))?;
        if magic[..] != MAGIC[..] {
            return Err(Error::BadContainer("missing container magic".into()));
        }

        let mut meta = BTreeMap::new();
        loop {
            let mut count = decode::read_long(&mut source)?;
            if count == 0 {
                break;
            }
            if count < 0 {
                count = count
                    .checked_neg()
                    .ok_or_else(|| Error::Integrity("block count overflows".into()))?;
                let byte_len = decode::read_long(&mut source)?;
                if byte_len < 0 {
                    return Err(Error::Integrity(format!(
                        "negative block byte length {}",
                        byte_len
                    )));
                }
            }
            for _ in 0..count {
                let key = decode::read_str(&mut source)?;
                let value = decode::read_bytes(&mut source)?;
                meta.insert(key, value);
            }
        }

        let schema_json = meta
            .get(META_SCHEMA)
            .ok_or_else(|| Error::BadContainer("header does not name a schema".into()))?;
        let schema_json = std::str::from_utf8(schema_json)
            .map_err(|_| Error::BadContainer("schema in header is not valid UTF-8".into()))?;
        let writer_schema = Schema::parse(schema_json)
            .map_err(|e| Error::BadContainer(format!("schema in header does not parse: {}", e)))?;

        let codec_name = match meta.get(META_CODEC) {
            Some(name) => std::str::from_utf8(name)
                .map_err(|_| Error::BadContainer("codec name is not valid UTF-8".into()))?,
            None => "null",
        };
        let codec = registry
            .get(codec_name)
            .ok_or_else(|| Error::UnknownCodec(codec_name.to_string()))?;

        let sync = decode::read_fixed(&mut source, SYNC_LEN)?;
        let mut marker = [0u8; SYNC_LEN];
        marker.copy_from_slice(&sync);

        Ok(FileReader {
            source,
            writer_schema,
            reader_schema: reader.cloned(),
            codec,
            meta,
            sync: marker,
            queue: VecDeque::new(),
            done: false,
        })
    }

    /// The schema the file was written with.
    pub fn writer_schema(&self) -> &Schema {
        &self.writer_schema
    }

    /// A header metadata value, including the `avro.` entries.
    pub fn meta(&self, key: &str) -> Option<&[u8]> {
        self.meta.get(key).map(|v| v.as_slice())
    }

    /// Gives the underlying source back, abandoning any unread blocks.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Reads the datum count of the next block, or `None` at a clean end of
    /// file. End of file anywhere else in a block is corruption.
    fn read_block_count(&mut self) -> Result<Option<i64>> {
        let mut first = [0u8; 1];
        loop {
            match self.source.read(&mut first) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let mut rest = io::Cursor::new(first).chain(&mut self.source);
        Ok(Some(decode::read_long(&mut rest)?))
    }

    /// Loads the next block into the queue. `Ok(false)` means the file
    /// ended cleanly.
    fn load_block(&mut self) -> Result<bool> {
        let count = match self.read_block_count()? {
            Some(count) => count,
            None => return Ok(false),
        };
        let count =
            u64::try_from(count).map_err(|_| Error::Integrity(format!("bad datum count {}", count)))?;
        let byte_len = decode::read_long(&mut self.source)?;
        let byte_len = usize::try_from(byte_len)
            .map_err(|_| Error::Integrity(format!("bad block length {}", byte_len)))?;
        let payload = decode::read_fixed(&mut self.source, byte_len)?;

        let sync = decode::read_fixed(&mut self.source, SYNC_LEN)?;
        if sync[..] != self.sync[..] {
            return Err(Error::Integrity("sync marker mismatch".into()));
        }

        let payload = self.codec.decompress(&payload)?;
        let reader_schema = self.reader_schema.as_ref().unwrap_or(&self.writer_schema);
        let datum_reader = DatumReader::resolving(&self.writer_schema, reader_schema);
        let mut cursor = &payload[..];
        for _ in 0..count {
            self.queue.push_back(datum_reader.read(&mut cursor)?);
        }
        if !cursor.is_empty() {
            return Err(Error::Integrity(format!(
                "block holds {} bytes past its last datum",
                cursor.len()
            )));
        }
        Ok(true)
    }
}

impl<R: Read> Iterator for FileReader<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.queue.pop_front() {
                return Some(Ok(value));
            }
            if self.done {
                return None;
            }
            match self.load_block() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: Read> std::fmt::Debug for FileReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileReader")
            .field("writer_schema", &self.writer_schema)
            .field("codec", &self.codec.name())
            .field("queued", &self.queue.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn query_schema() -> Schema {
        Schema::parse(
            r#"{
                "type": "record",
                "name": "Query",
                "fields": [
                    {"name": "query", "type": "string"},
                    {"name": "response", "type": "string"},
                    {"name": "type", "type": "string", "default": "A"}
                ]
            }"#,
        )
        .expect("Should have parsed the schema")
    }

    fn query(query: &str, response: &str, kind: &str) -> Value {
        Value::record(
            "Query",
            [
                ("query", Value::Str(query.into())),
                ("response", Value::Str(response.into())),
                ("type", Value::Str(kind.into())),
            ],
        )
    }

    fn sample_queries(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| {
                let kind = if i % 2 == 0 { "A" } else { "CNAME" };
                query(&format!("host{}", i), &format!("10.0.0.{}", i % 256), kind)
            })
            .collect()
    }

    fn write_queries(schema: &Schema, data: &[Value]) -> Vec<u8> {
        let mut writer = FileWriter::new(schema, Vec::new());
        for datum in data {
            writer.append(datum).expect("Should have appended the datum");
        }
        writer.close().expect("Should have closed the container")
    }

    #[test]
    fn round_trip() {
        let schema = query_schema();
        let data = vec![
            query("fox", "1.2.3.4", "A"),
            query("dog", "5.6.7.8", "CNAME"),
            query("cow", "9.9.9.9", "A"),
        ];
        let bytes = write_queries(&schema, &data);

        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        assert!(reader.writer_schema() == &schema, "Schema changed in transit");
        assert_eq!(reader.meta("avro.codec"), Some(&b"null"[..]));
        let out = reader
            .collect::<Result<Vec<Value>>>()
            .expect("Should have read every datum");
        assert!(out == data, "Datums changed in transit");
    }

    #[test]
    fn many_small_blocks() {
        let schema = query_schema();
        let data = sample_queries(100);
        let mut writer = FileWriter::new(&schema, Vec::new()).sync_interval(64);
        for datum in &data {
            writer.append(datum).expect("Should have appended the datum");
        }
        let bytes = writer.close().expect("Should have closed the container");

        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        let out = reader
            .collect::<Result<Vec<Value>>>()
            .expect("Should have read every datum");
        assert!(out == data, "Datums changed in transit");
    }

    #[test]
    fn empty_container() {
        let schema = query_schema();
        let bytes = FileWriter::new(&schema, Vec::new())
            .close()
            .expect("Should have closed the container");
        let mut reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        assert!(reader.writer_schema() == &schema);
        assert!(reader.next().is_none(), "Empty container yielded a datum");
    }

    #[test]
    fn corrupt_sync_is_detected() {
        let schema = query_schema();
        let mut bytes = write_queries(&schema, &sample_queries(3));
        // The last 16 bytes are the block's sync marker
        let n = bytes.len();
        bytes[n - 1] ^= 0xFF;

        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        let results: Vec<_> = reader.collect();
        assert!(results.len() == 1, "Iteration should end at the error");
        assert!(
            matches!(results[0], Err(Error::Integrity(_))),
            "Expected corruption, got {:?}",
            results[0]
        );
    }

    #[test]
    fn corrupt_payload_is_detected() {
        let schema = query_schema();
        let data = sample_queries(3);
        let mut bytes = write_queries(&schema, &data);

        // With the null codec the payload is the raw datum encodings, so
        // its length pins down where it starts. The first payload byte is
        // the length prefix of the first string; nudging it to an odd
        // varint turns it into a negative length.
        let writer = DatumWriter::new(&schema);
        let mut payload = Vec::new();
        for datum in &data {
            writer.write(datum, &mut payload).expect("Should have encoded the datum");
        }
        let payload_start = bytes.len() - SYNC_LEN - payload.len();
        assert_eq!(bytes[payload_start], 0x0A, "host0 should have a 5-byte prefix");
        bytes[payload_start] = 0x0B;

        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        let results: Vec<_> = reader.collect();
        assert!(results.len() == 1, "Iteration should end at the error");
        assert!(
            matches!(results[0], Err(Error::Integrity(_))),
            "Expected corruption, got {:?}",
            results[0]
        );
    }

    #[test]
    fn truncated_file_is_detected() {
        let schema = query_schema();
        let mut bytes = write_queries(&schema, &sample_queries(3));
        bytes.truncate(bytes.len() - 20);

        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        let results: Vec<_> = reader.collect();
        assert!(
            matches!(results.last(), Some(Err(Error::Integrity(_)))),
            "Truncation went unnoticed"
        );
    }

    #[test]
    fn not_a_container() {
        for bytes in [&b""[..], &b"Obj"[..], &b"PK\x03\x04stuff"[..]] {
            let result = FileReader::new(Cursor::new(bytes.to_vec()));
            assert!(
                matches!(result, Err(Error::BadContainer(_))),
                "Accepted {:?} as a container",
                bytes
            );
        }
    }

    #[test]
    fn garbled_header_schema() {
        // Right magic, but the avro.schema entry is not a schema. That is a
        // damaged container, not a schema declaration problem of ours.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        encode::write_long(&mut bytes, 2);
        encode::write_str(&mut bytes, "avro.codec");
        encode::write_bytes(&mut bytes, b"null");
        encode::write_str(&mut bytes, "avro.schema");
        encode::write_bytes(&mut bytes, b"{nonsense");
        encode::write_long(&mut bytes, 0);
        bytes.extend_from_slice(&[0x5A; SYNC_LEN]);

        let result = FileReader::new(Cursor::new(bytes));
        assert!(
            matches!(result, Err(Error::BadContainer(_))),
            "Expected a bad container, got {:?}",
            result.err()
        );
    }

    #[test]
    fn user_metadata() {
        let schema = query_schema();
        let mut writer = FileWriter::new(&schema, Vec::new());
        writer
            .set_meta("app.version", "7")
            .expect("Should have set metadata");
        assert!(
            matches!(writer.set_meta("avro.codec", "lies"), Err(Error::BadContainer(_))),
            "Reserved key was accepted"
        );
        writer
            .append(&sample_queries(1)[0])
            .expect("Should have appended the datum");
        assert!(
            matches!(writer.set_meta("late", "no"), Err(Error::BadContainer(_))),
            "Metadata changed after the header was written"
        );
        let bytes = writer.close().expect("Should have closed the container");

        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        assert_eq!(reader.meta("app.version"), Some(&b"7"[..]));
        assert_eq!(reader.meta("absent"), None);
    }

    #[test]
    fn first_append_emits_the_header() {
        struct Tap(std::rc::Rc<std::cell::Cell<usize>>);

        impl Write for Tap {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.set(self.0.get() + buf.len());
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let written = std::rc::Rc::new(std::cell::Cell::new(0));
        let schema = query_schema();
        let mut writer = FileWriter::new(&schema, Tap(written.clone()));
        assert_eq!(written.get(), 0, "Construction alone wrote to the sink");

        writer
            .append(&sample_queries(1)[0])
            .expect("Should have appended the datum");
        assert!(written.get() > 0, "The first append should emit the header");
        assert!(
            matches!(writer.set_meta("late", "no"), Err(Error::BadContainer(_))),
            "Metadata accepted after the header went out"
        );
    }

    struct XorCodec;

    impl Codec for XorCodec {
        fn name(&self) -> &'static str {
            "xor"
        }
        fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().map(|b| b ^ 0xAA).collect())
        }
        fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
            self.compress(data)
        }
    }

    #[test]
    fn codec_must_be_registered() {
        let schema = query_schema();
        let data = sample_queries(2);
        let mut writer = FileWriter::with_codec(&schema, Vec::new(), Arc::new(XorCodec));
        for datum in &data {
            writer.append(datum).expect("Should have appended the datum");
        }
        let bytes = writer.close().expect("Should have closed the container");

        match FileReader::new(Cursor::new(bytes.clone())) {
            Err(Error::UnknownCodec(name)) => assert_eq!(name, "xor"),
            other => panic!("Expected an unknown codec error, got {:?}", other.err()),
        }

        let mut registry = CodecRegistry::default();
        registry.register(Arc::new(XorCodec));
        let reader = FileReader::with_registry(Cursor::new(bytes), None, &registry)
            .expect("Should have read the header");
        let out = reader
            .collect::<Result<Vec<Value>>>()
            .expect("Should have read every datum");
        assert!(out == data, "Datums changed in transit");
    }

    #[test]
    fn resolves_through_reader_schema() {
        let schema = query_schema();
        let bytes = write_queries(&schema, &sample_queries(2));
        let evolved = Schema::parse(
            r#"{
                "type": "record",
                "name": "Query",
                "fields": [
                    {"name": "query", "type": "string"},
                    {"name": "type", "type": "string"},
                    {"name": "ttl", "type": "int", "default": 300}
                ]
            }"#,
        )
        .expect("Should have parsed the schema");

        let reader = FileReader::with_reader_schema(Cursor::new(bytes), &evolved)
            .expect("Should have read the header");
        let out = reader
            .collect::<Result<Vec<Value>>>()
            .expect("Should have read every datum");
        assert_eq!(out[1]["query"], Value::Str("host1".into()));
        assert_eq!(out[1]["type"], Value::Str("CNAME".into()));
        assert_eq!(out[1]["ttl"], Value::Int(300));
        assert_eq!(out[0].field("response"), None, "Dropped field survived");
    }

    #[test]
    fn public_types_are_debuggable() {
        let schema = query_schema();
        let bytes = write_queries(&schema, &sample_queries(1));

        assert!(format!("{:?}", DatumWriter::new(&schema)).contains("DatumWriter"));
        assert!(format!("{:?}", DatumReader::new(&schema)).contains("DatumReader"));
        let writer = FileWriter::new(&schema, Vec::new());
        assert!(format!("{:?}", writer).contains("codec: \"null\""));
        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        assert!(format!("{:?}", reader).contains("FileReader"));
    }

    #[cfg(feature = "deflate")]
    #[test]
    fn deflate_round_trip() {
        use crate::codec::DeflateCodec;
        let schema = query_schema();
        let data = sample_queries(50);
        let mut writer =
            FileWriter::with_codec(&schema, Vec::new(), Arc::new(DeflateCodec)).sync_interval(256);
        for datum in &data {
            writer.append(datum).expect("Should have appended the datum");
        }
        let bytes = writer.close().expect("Should have closed the container");

        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        let out = reader
            .collect::<Result<Vec<Value>>>()
            .expect("Should have read every datum");
        assert!(out == data, "Datums changed in transit");
    }

    #[cfg(feature = "zstandard")]
    #[test]
    fn zstandard_round_trip() {
        use crate::codec::ZstandardCodec;
        let schema = query_schema();
        let data = sample_queries(50);
        let mut writer =
            FileWriter::with_codec(&schema, Vec::new(), Arc::new(ZstandardCodec::default()));
        for datum in &data {
            writer.append(datum).expect("Should have appended the datum");
        }
        let bytes = writer.close().expect("Should have closed the container");

        let reader = FileReader::new(Cursor::new(bytes)).expect("Should have read the header");
        let out = reader
            .collect::<Result<Vec<Value>>>()
            .expect("Should have read every datum");
        assert!(out == data, "Datums changed in transit");
    }
}
